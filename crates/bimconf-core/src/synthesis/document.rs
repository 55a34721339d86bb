use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::synthesis::aggregator::DuplicateLabelError;
use crate::synthesis::record::DeviceRecord;
use crate::synthesis::schema::DeviceCategory;

/// Devices of one category, keyed by label
pub type DeviceBucket = BTreeMap<String, DeviceRecord>;

/// Zone group referenced by devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub group: i64,
    #[serde(rename = "modbusID")]
    pub modbus_id: i64,
}

/// Physical device model, keyed by model name in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCatalogEntry {
    pub vendor: String,
    pub name: String,
    pub url: String,
    pub production_year: String,
    pub device_type: DeviceCategory,
}

/// Per-device provisioning entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub label: String,
    pub model_name: String,
    #[serde(rename = "modbusID", default, skip_serializing_if = "Option::is_none")]
    pub modbus_id: Option<i64>,
    #[serde(rename = "slaveID", default, skip_serializing_if = "Option::is_none")]
    pub slave_id: Option<i64>,
    /// Filled in at commissioning; always empty here
    #[serde(default)]
    pub commissioning_date: String,
}

/// Root configuration document. Field order is the emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigurationDocument {
    pub groups: BTreeMap<i64, GroupEntry>,
    pub leds: DeviceBucket,
    pub blinds: DeviceBucket,
    pub sensors: DeviceBucket,
    pub hvacs: DeviceBucket,
    pub frames: DeviceBucket,
    pub models: BTreeMap<String, ModelCatalogEntry>,
    pub switchs: DeviceBucket,
    pub wagos: DeviceBucket,
    pub nanosenses: DeviceBucket,
    pub projects: BTreeMap<String, ProjectEntry>,
}

/// Label handed to the sticker renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelTicket {
    pub label: String,
    pub category: DeviceCategory,
}

/// Project entry joined with its model catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub label: String,
    pub model_name: String,
    pub vendor: String,
    pub url: String,
    pub production_year: String,
    pub device_type: DeviceCategory,
    #[serde(rename = "modbusID", skip_serializing_if = "Option::is_none")]
    pub modbus_id: Option<i64>,
    #[serde(rename = "slaveID", skip_serializing_if = "Option::is_none")]
    pub slave_id: Option<i64>,
}

/// Merges the accumulated tables into the final document.
/// Categories without devices still get an (empty) bucket.
pub fn assemble(
    groups: BTreeMap<i64, GroupEntry>,
    mut buckets: BTreeMap<DeviceCategory, DeviceBucket>,
    models: BTreeMap<String, ModelCatalogEntry>,
    projects: BTreeMap<String, ProjectEntry>,
) -> ConfigurationDocument {
    let mut take = |category| buckets.remove(&category).unwrap_or_default();
    ConfigurationDocument {
        groups,
        leds: take(DeviceCategory::Led),
        blinds: take(DeviceCategory::Blind),
        sensors: take(DeviceCategory::Sensor),
        hvacs: take(DeviceCategory::Hvac),
        frames: take(DeviceCategory::Frame),
        models,
        switchs: take(DeviceCategory::Switch),
        wagos: take(DeviceCategory::Wago),
        nanosenses: take(DeviceCategory::Nanosense),
        projects,
    }
}

impl ConfigurationDocument {
    pub fn bucket(&self, category: DeviceCategory) -> &DeviceBucket {
        match category {
            DeviceCategory::Led => &self.leds,
            DeviceCategory::Blind => &self.blinds,
            DeviceCategory::Sensor => &self.sensors,
            DeviceCategory::Hvac => &self.hvacs,
            DeviceCategory::Frame => &self.frames,
            DeviceCategory::Switch => &self.switchs,
            DeviceCategory::Wago => &self.wagos,
            DeviceCategory::Nanosense => &self.nanosenses,
        }
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceRecord> {
        DeviceCategory::ALL
            .into_iter()
            .flat_map(move |category| self.bucket(category).values())
    }

    pub fn device_count(&self) -> usize {
        DeviceCategory::ALL
            .iter()
            .map(|category| self.bucket(*category).len())
            .sum()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// `(label, category)` pairs sorted by label, with labels made safe for printing.
    pub fn label_handoff(&self) -> Result<Vec<LabelTicket>, DuplicateLabelError> {
        let mut seen = HashSet::new();
        let mut tickets = Vec::with_capacity(self.device_count());
        for record in self.devices() {
            let label = printable_label(&record.label);
            if !seen.insert(label.clone()) {
                return Err(DuplicateLabelError { label });
            }
            tickets.push(LabelTicket {
                label,
                category: record.category,
            });
        }
        tickets.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(tickets)
    }

    /// Installation listing: every project whose model is in the catalog.
    pub fn inventory(&self) -> Vec<InventoryEntry> {
        self.projects
            .values()
            .filter_map(|project| {
                let model = self.models.get(&project.model_name)?;
                Some(InventoryEntry {
                    label: project.label.clone(),
                    model_name: model.name.clone(),
                    vendor: model.vendor.clone(),
                    url: model.url.clone(),
                    production_year: model.production_year.clone(),
                    device_type: model.device_type,
                    modbus_id: project.modbus_id,
                    slave_id: project.slave_id,
                })
            })
            .collect()
    }
}

/// Replaces underscores and whitespace runs with hyphens.
pub fn printable_label(label: &str) -> String {
    label
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
