use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::synthesis::schema::DeviceCategory;

/// Canonical configuration of one device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRecord {
    /// Unique device identifier across the whole document
    pub label: String,
    /// Bucket the record belongs to; implied by its position in the document
    #[serde(skip)]
    pub category: DeviceCategory,
    /// Model name used for the catalog and project tables
    #[serde(skip)]
    pub model_name: String,
    /// Zone group the device references
    #[serde(skip)]
    pub group: i64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl DeviceRecord {
    pub fn new(label: impl Into<String>, category: DeviceCategory) -> Self {
        let label = label.into();
        Self {
            model_name: category.tag().to_string(),
            label,
            category,
            group: 0,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        self.fields.get(field).and_then(Value::as_i64)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field.to_string(), value.into());
    }
}
