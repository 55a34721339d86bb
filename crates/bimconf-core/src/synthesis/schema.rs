use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::bim::{first_property_or, property, Element, PropertyScope};
use crate::synthesis::categories;
use crate::synthesis::record::DeviceRecord;

/// Device category; the set is closed and extended by registering a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Led,
    Blind,
    Hvac,
    Sensor,
    Switch,
    Wago,
    Nanosense,
    Frame,
}

impl DeviceCategory {
    pub const ALL: [DeviceCategory; 8] = [
        DeviceCategory::Led,
        DeviceCategory::Blind,
        DeviceCategory::Hvac,
        DeviceCategory::Sensor,
        DeviceCategory::Switch,
        DeviceCategory::Wago,
        DeviceCategory::Nanosense,
        DeviceCategory::Frame,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            DeviceCategory::Led => "led",
            DeviceCategory::Blind => "blind",
            DeviceCategory::Hvac => "hvac",
            DeviceCategory::Sensor => "sensor",
            DeviceCategory::Switch => "switch",
            DeviceCategory::Wago => "wago",
            DeviceCategory::Nanosense => "nanosense",
            DeviceCategory::Frame => "frame",
        }
    }

    /// Identifier copied into the project table for provisioning.
    pub fn addressing(self) -> Addressing {
        match self {
            DeviceCategory::Wago => Addressing::SlaveId,
            DeviceCategory::Nanosense => Addressing::None,
            _ => Addressing::ModbusId,
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    ModbusId,
    SlaveId,
    None,
}

impl Addressing {
    /// Record field holding the identifier.
    pub fn field(self) -> Option<&'static str> {
        match self {
            Addressing::ModbusId => Some("modbusID"),
            Addressing::SlaveId => Some("slaveID"),
            Addressing::None => None,
        }
    }
}

/// Record layout of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Shared driver base fields, plus beacon fields when `beacon` is set
    Driver { beacon: bool },
    /// Only the category's own fields
    Bespoke,
}

/// Default of a field; its variant also fixes how the source value is coerced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Integer(i64),
    Real(f64),
    Bool(bool),
    Text(&'static str),
    /// The device label
    Label,
    /// Integer bus address, falling back to the element tag, then 0
    BusAddress,
    /// Table property rendered as a text to text object, `{}` when absent
    Table,
    /// Any property shape passed through as JSON, `{}` when absent
    Descriptor,
}

/// One `(outputField, sourceProperties, default)` extraction rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub output: &'static str,
    /// Source property names, tried in order
    pub sources: &'static [&'static str],
    pub default: FieldDefault,
}

impl FieldSpec {
    pub const fn new(
        output: &'static str,
        sources: &'static [&'static str],
        default: FieldDefault,
    ) -> Self {
        Self {
            output,
            sources,
            default,
        }
    }

    /// Resolves the field for `element`. Never fails.
    pub fn resolve(&self, element: &Element, label: &str) -> Value {
        let scope = PropertyScope::Any;
        match self.default {
            FieldDefault::Integer(default) => {
                Value::from(first_property_or(element, scope, self.sources, default))
            }
            FieldDefault::Real(default) => {
                Value::from(first_property_or(element, scope, self.sources, default))
            }
            FieldDefault::Bool(default) => {
                Value::from(first_property_or(element, scope, self.sources, default))
            }
            FieldDefault::Text(default) => Value::from(first_property_or(
                element,
                scope,
                self.sources,
                default.to_string(),
            )),
            FieldDefault::Label => Value::from(first_property_or(
                element,
                scope,
                self.sources,
                label.to_string(),
            )),
            FieldDefault::BusAddress => {
                let address = self
                    .sources
                    .iter()
                    .find_map(|name| property::<i64>(element, scope, name))
                    .or_else(|| tag_address(element))
                    .unwrap_or(0);
                Value::from(address)
            }
            FieldDefault::Table => {
                let table: BTreeMap<String, String> =
                    first_property_or(element, scope, self.sources, BTreeMap::new());
                Value::Object(
                    table
                        .into_iter()
                        .map(|(key, value)| (key, Value::String(value)))
                        .collect(),
                )
            }
            FieldDefault::Descriptor => {
                first_property_or(element, scope, self.sources, Value::Object(Map::new()))
            }
        }
    }
}

fn tag_address(element: &Element) -> Option<i64> {
    element.tag.as_deref()?.trim().parse::<i64>().ok()
}

/// Per-category extraction schema and builder
pub trait DeviceSchema: Send + Sync {
    fn category(&self) -> DeviceCategory;

    /// Extra type tags mapping to this category.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn shape(&self) -> Shape;

    /// Protocol used when the element carries none.
    fn default_protocol(&self) -> &'static str;

    /// Category fields, applied after the shared driver fields.
    fn fields(&self) -> &'static [FieldSpec];

    /// Appends or adjusts fields that a plain extraction rule cannot express.
    fn extend(&self, _element: &Element, _record: &mut DeviceRecord) {}

    /// Every extraction rule in output order.
    fn all_fields(&self) -> Vec<FieldSpec> {
        let mut specs = Vec::new();
        if let Shape::Driver { beacon } = self.shape() {
            specs.extend_from_slice(categories::DRIVER_BASE);
            if beacon {
                specs.extend_from_slice(categories::BEACON);
            }
        }
        specs.extend_from_slice(self.fields());
        specs
    }
}

/// Schemas keyed by lower-cased category tag
pub struct SchemaRegistry {
    schemas: Vec<&'static dyn DeviceSchema>,
}

impl SchemaRegistry {
    /// Registry with every built-in category.
    pub fn standard() -> Self {
        Self {
            schemas: categories::ALL.to_vec(),
        }
    }

    pub fn with_schemas(schemas: Vec<&'static dyn DeviceSchema>) -> Self {
        Self { schemas }
    }

    /// Looks up a type tag, case-insensitively; unknown tags yield `None`.
    pub fn schema_for(&self, tag: &str) -> Option<&'static dyn DeviceSchema> {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return None;
        }
        self.schemas.iter().copied().find(|schema| {
            schema.category().tag() == tag || schema.aliases().iter().any(|alias| *alias == tag)
        })
    }

    pub fn schema_of(&self, category: DeviceCategory) -> Option<&'static dyn DeviceSchema> {
        self.schemas
            .iter()
            .copied()
            .find(|schema| schema.category() == category)
    }

    pub fn categories(&self) -> impl Iterator<Item = DeviceCategory> + '_ {
        self.schemas.iter().map(|schema| schema.category())
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bim::TableValue;
    use serde_json::json;

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = SchemaRegistry::standard();
        for category in DeviceCategory::ALL {
            let upper = category.tag().to_uppercase();
            let schema = registry.schema_for(&upper).expect("registered category");
            assert_eq!(schema.category(), category);
        }
        assert_eq!(
            registry.schema_for(" Hvac ").map(|s| s.category()),
            Some(DeviceCategory::Hvac)
        );
    }

    #[test]
    fn legacy_prefixes_are_aliases() {
        let registry = SchemaRegistry::standard();
        assert_eq!(registry.schema_for("BLD").map(|s| s.category()), Some(DeviceCategory::Blind));
        assert_eq!(registry.schema_for("mca").map(|s| s.category()), Some(DeviceCategory::Sensor));
        assert_eq!(registry.schema_for("swh").map(|s| s.category()), Some(DeviceCategory::Switch));
        assert_eq!(registry.schema_for("fra").map(|s| s.category()), Some(DeviceCategory::Frame));
    }

    #[test]
    fn unknown_and_blank_tags_have_no_schema() {
        let registry = SchemaRegistry::standard();
        assert!(registry.schema_for("Chair").is_none());
        assert!(registry.schema_for("").is_none());
        assert!(registry.schema_for("   ").is_none());
    }

    #[test]
    fn addressing_follows_category() {
        assert_eq!(DeviceCategory::Led.addressing().field(), Some("modbusID"));
        assert_eq!(DeviceCategory::Frame.addressing().field(), Some("modbusID"));
        assert_eq!(DeviceCategory::Wago.addressing().field(), Some("slaveID"));
        assert_eq!(DeviceCategory::Nanosense.addressing().field(), None);
    }

    #[test]
    fn driver_shapes_share_the_base_fields() {
        let registry = SchemaRegistry::standard();
        let outputs = |category| -> Vec<&'static str> {
            registry
                .schema_of(category)
                .unwrap()
                .all_fields()
                .iter()
                .map(|spec| spec.output)
                .collect()
        };

        let led = outputs(DeviceCategory::Led);
        assert!(led.contains(&"dumpFrequency"));
        assert!(led.contains(&"iBeaconUUID"));

        let hvac = outputs(DeviceCategory::Hvac);
        assert!(hvac.contains(&"dumpFrequency"));
        assert!(!hvac.contains(&"iBeaconUUID"));

        let frame = outputs(DeviceCategory::Frame);
        assert!(!frame.contains(&"dumpFrequency"));
        assert!(!frame.contains(&"group"));
    }

    #[test]
    fn bus_address_falls_back_to_tag() {
        let spec = FieldSpec::new("modbusID", &["ModbusID"], FieldDefault::BusAddress);

        let tagged = Element::new("a").with_tag(" 17 ");
        assert_eq!(spec.resolve(&tagged, "a"), json!(17));

        let both = Element::new("a").with_tag("17").with_property("P", "ModbusID", "4");
        assert_eq!(spec.resolve(&both, "a"), json!(4));

        let neither = Element::new("a").with_tag("not a number");
        assert_eq!(spec.resolve(&neither, "a"), json!(0));
    }

    #[test]
    fn table_and_descriptor_defaults_are_empty_objects() {
        let element = Element::new("a");
        let table = FieldSpec::new("ioMapping", &["IOMapping"], FieldDefault::Table);
        let descriptor = FieldSpec::new("api", &["API"], FieldDefault::Descriptor);
        assert_eq!(table.resolve(&element, "a"), json!({}));
        assert_eq!(descriptor.resolve(&element, "a"), json!({}));

        let element = Element::new("a")
            .with_property("P", "IOMapping", TableValue::from_pairs([("DO1", "fan")]))
            .with_property("P", "API", "http://10.0.0.2/api");
        assert_eq!(table.resolve(&element, "a"), json!({ "DO1": "fan" }));
        assert_eq!(descriptor.resolve(&element, "a"), json!("http://10.0.0.2/api"));
    }
}
