pub mod accessor;
pub mod adapter;
pub mod model;

pub use accessor::{
    first_property_or, lookup_property, property, property_or, FromProperty, PropertyScope,
};
pub use adapter::{load_elements, load_elements_bytes, MissingInputError};
pub use model::*;
