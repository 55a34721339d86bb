use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Properties of one property set, keyed by property name
pub type PropertySet = BTreeMap<String, PropertyValue>;

/// Largest magnitude below which every integral `f64` is exact
pub(crate) const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Integral value of `value`, if it is exactly representable.
pub(crate) fn exact_integer(value: f64) -> Option<i64> {
    (value.is_finite() && value.abs() <= MAX_EXACT_INTEGER).then(|| value.round() as i64)
}

/// Element exported from a building model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Element name as authored in the model, used as the device label
    #[serde(default)]
    pub name: String,
    /// Model class of the element (e.g. IfcBuildingElementProxy), if exported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifc_class: Option<String>,
    /// Free-form tag attribute; older models carry the bus address here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Property sets assigned directly to the element, keyed by set name
    #[serde(default)]
    pub property_sets: BTreeMap<String, PropertySet>,
    /// Property sets shared through the element type, keyed by set name
    #[serde(default)]
    pub type_property_sets: BTreeMap<String, PropertySet>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, ifc_class: impl Into<String>) -> Self {
        self.ifc_class = Some(ifc_class.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_property(
        mut self,
        set: &str,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.property_sets
            .entry(set.to_string())
            .or_default()
            .insert(name.to_string(), value.into());
        self
    }

    pub fn with_type_property(
        mut self,
        set: &str,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.type_property_sets
            .entry(set.to_string())
            .or_default()
            .insert(name.to_string(), value.into());
        self
    }

    /// Trimmed element name.
    pub fn label(&self) -> &str {
        self.name.trim()
    }
}

/// Single property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Scalar {
    /// Text rendering used when a scalar ends up in a string field.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Bool(value) => value.to_string(),
            Scalar::Integer(value) => value.to_string(),
            Scalar::Real(value) if value.fract() == 0.0 => match exact_integer(*value) {
                Some(integer) => integer.to_string(),
                None => value.to_string(),
            },
            Scalar::Real(value) => value.to_string(),
            Scalar::Text(value) => value.trim().to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Bool(value) => Value::from(*value),
            Scalar::Integer(value) => Value::from(*value),
            Scalar::Real(value) => Value::from(*value),
            Scalar::Text(value) => Value::from(value.trim()),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Integer(value.into())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Real(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// Table of defining/defined value pairs (e.g. channel to signal)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TableValue {
    #[serde(default)]
    pub defining_values: Vec<Scalar>,
    #[serde(default)]
    pub defined_values: Vec<Scalar>,
}

impl TableValue {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Scalar>,
        V: Into<Scalar>,
    {
        let mut table = TableValue::default();
        for (defining, defined) in pairs {
            table.defining_values.push(defining.into());
            table.defined_values.push(defined.into());
        }
        table
    }

    /// Pairs in model order. Unmatched trailing values are ignored.
    pub fn pairs(&self) -> impl Iterator<Item = (&Scalar, &Scalar)> {
        self.defining_values.iter().zip(self.defined_values.iter())
    }
}

/// Raw property value as exported by the model reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Scalar(Scalar),
    List(Vec<Scalar>),
    Table(TableValue),
    /// Any other JSON shape (plain objects, nested values, lists with nulls)
    Other(Value),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Null => Value::Null,
            PropertyValue::Scalar(scalar) => scalar.to_json(),
            PropertyValue::List(items) => Value::Array(items.iter().map(Scalar::to_json).collect()),
            PropertyValue::Table(table) => Value::Object(
                table
                    .pairs()
                    .map(|(defining, defined)| (defining.to_text(), defined.to_json()))
                    .collect(),
            ),
            PropertyValue::Other(value) => value.clone(),
        }
    }
}

/// Text of a scalar JSON value; `None` for null, arrays and objects.
pub(crate) fn json_scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(match number.as_f64() {
            Some(real) if number.is_f64() => Scalar::Real(real).to_text(),
            _ => number.to_string(),
        }),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

macro_rules! scalar_property_value {
    ($($source:ty),*) => {
        $(
            impl From<$source> for PropertyValue {
                fn from(value: $source) -> Self {
                    PropertyValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_property_value!(bool, i32, i64, f64, &str, String, Scalar);

impl From<Vec<Scalar>> for PropertyValue {
    fn from(items: Vec<Scalar>) -> Self {
        PropertyValue::List(items)
    }
}

impl From<TableValue> for PropertyValue {
    fn from(table: TableValue) -> Self {
        PropertyValue::Table(table)
    }
}
