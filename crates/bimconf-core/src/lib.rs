pub mod bim;
pub mod synthesis;

pub use bim::{
    load_elements,
    load_elements_bytes,
    Element,
    MissingInputError,
    PropertyValue,
    Scalar,
    TableValue,
};
pub use synthesis::{
    synthesize,
    synthesize_with,
    ConfigurationDocument,
    DeviceCategory,
    DeviceRecord,
    DuplicateLabelError,
    InventoryEntry,
    LabelFilter,
    LabelTicket,
    SchemaRegistry,
    SynthesisOptions,
};

use anyhow::Result;

/// Loads an element export from disk and synthesizes its configuration document.
///
/// Fails with [`MissingInputError`] when the file does not exist and with
/// [`DuplicateLabelError`] when two devices share a label; both can be recovered
/// with `downcast_ref`.
pub fn synthesize_file(path: &str, options: &SynthesisOptions) -> Result<ConfigurationDocument> {
    let elements = load_elements(path)?;
    let document = synthesize(&elements, options)?;
    Ok(document)
}

/// Same as [`synthesize_file`] for an in-memory export.
pub fn synthesize_bytes(data: &[u8], options: &SynthesisOptions) -> Result<ConfigurationDocument> {
    let elements = load_elements_bytes(data)?;
    let document = synthesize(&elements, options)?;
    Ok(document)
}
