use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::bim::{first_property_or, property_or, Element, PropertyScope};
use crate::synthesis::document::{
    assemble, ConfigurationDocument, DeviceBucket, GroupEntry, ModelCatalogEntry, ProjectEntry,
};
use crate::synthesis::record::DeviceRecord;
use crate::synthesis::schema::{Addressing, DeviceCategory};

pub const VENDOR_PROPERTIES: &[&str] = &["Manufacturer", "ManufacturName (BO_Manufac)"];
pub const URL_PROPERTIES: &[&str] = &[
    "Reference",
    "TechnicalDescription (BO_techcert)",
    "ProductUrl (BO_producturl)",
];
pub const PRODUCTION_YEAR_PROPERTY: &str = "ProductionYear";
pub const GROUP_ADDRESS_PROPERTY: &str = "GroupModbusID";

/// Two elements resolved to the same device label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateLabelError {
    pub label: String,
}

impl fmt::Display for DuplicateLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duplicate device label: {}", self.label)
    }
}

impl std::error::Error for DuplicateLabelError {}

/// Running state of one synthesis pass.
///
/// Groups and catalog models follow a first-seen-wins policy: the first device
/// referencing a group id or model name defines the entry, and later devices
/// never update it. Input order therefore decides which vendor, url and group
/// address end up in the document.
#[derive(Debug, Default)]
pub struct Aggregator {
    labels: HashSet<String>,
    buckets: BTreeMap<DeviceCategory, DeviceBucket>,
    groups: BTreeMap<i64, GroupEntry>,
    models: BTreeMap<String, ModelCatalogEntry>,
    projects: BTreeMap<String, ProjectEntry>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of devices accepted so far.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn ingest(
        &mut self,
        record: DeviceRecord,
        element: &Element,
    ) -> Result<(), DuplicateLabelError> {
        if !self.labels.insert(record.label.clone()) {
            return Err(DuplicateLabelError {
                label: record.label,
            });
        }

        let group = record.group;
        self.groups.entry(group).or_insert_with(|| GroupEntry {
            group,
            modbus_id: property_or(element, PropertyScope::Any, GROUP_ADDRESS_PROPERTY, group),
        });

        if !self.models.contains_key(&record.model_name) {
            let entry = catalog_entry(&record, element);
            self.models.insert(record.model_name.clone(), entry);
        }

        self.projects
            .insert(record.label.clone(), project_entry(&record));

        self.buckets
            .entry(record.category)
            .or_default()
            .insert(record.label.clone(), record);
        Ok(())
    }

    pub fn finish(self) -> ConfigurationDocument {
        assemble(self.groups, self.buckets, self.models, self.projects)
    }
}

fn catalog_entry(record: &DeviceRecord, element: &Element) -> ModelCatalogEntry {
    let scope = PropertyScope::Any;
    ModelCatalogEntry {
        vendor: first_property_or(element, scope, VENDOR_PROPERTIES, String::new()),
        name: record.model_name.clone(),
        url: first_property_or(element, scope, URL_PROPERTIES, String::new()),
        production_year: property_or(element, scope, PRODUCTION_YEAR_PROPERTY, String::new()),
        device_type: record.category,
    }
}

fn project_entry(record: &DeviceRecord) -> ProjectEntry {
    let address = |field: Option<&str>| field.map(|name| record.integer(name).unwrap_or(0));
    let addressing = record.category.addressing();
    let (modbus_id, slave_id) = match addressing {
        Addressing::ModbusId => (address(addressing.field()), None),
        Addressing::SlaveId => (None, address(addressing.field())),
        Addressing::None => (None, None),
    };
    ProjectEntry {
        label: record.label.clone(),
        model_name: record.model_name.clone(),
        modbus_id,
        slave_id,
        commissioning_date: String::new(),
    }
}
