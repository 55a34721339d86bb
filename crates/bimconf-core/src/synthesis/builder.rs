use crate::bim::{first_property_or, property_or, Element, PropertyScope};
use crate::synthesis::filter::{LabelBlock, LabelFilter};
use crate::synthesis::record::DeviceRecord;
use crate::synthesis::schema::{DeviceSchema, FieldDefault, FieldSpec, SchemaRegistry};

/// Property carrying the category tag
pub const TYPE_PROPERTY: &str = "Type";
/// Properties naming the device model, in priority order
pub const MODEL_NAME_PROPERTIES: &[&str] = &["ModelLabel", "SKU (BO_prodsku)"];
pub const GROUP_PROPERTY: &str = "Group";

/// Why an element did not produce a device record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ExcludedClass(String),
    EmptyLabel,
    BlockedLabel(LabelBlock),
    MissingType,
    UnknownCategory(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Device(DeviceRecord),
    Skipped(SkipReason),
}

/// Classifies elements and builds their canonical records
pub struct DeviceBuilder<'a> {
    registry: &'a SchemaRegistry,
    label_filter: &'a LabelFilter,
    element_classes: &'a [String],
}

impl<'a> DeviceBuilder<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        label_filter: &'a LabelFilter,
        element_classes: &'a [String],
    ) -> Self {
        Self {
            registry,
            label_filter,
            element_classes,
        }
    }

    /// Builds the record for `element`, or reports why it is not a device.
    pub fn build(&self, element: &Element) -> BuildOutcome {
        match self.classify(element) {
            Ok((label, schema)) => BuildOutcome::Device(self.assemble(element, label, schema)),
            Err(reason) => BuildOutcome::Skipped(reason),
        }
    }

    fn classify(
        &self,
        element: &Element,
    ) -> Result<(String, &'static dyn DeviceSchema), SkipReason> {
        if !self.class_accepted(element) {
            let class = element.ifc_class.clone().unwrap_or_default();
            return Err(SkipReason::ExcludedClass(class));
        }

        let label = element.label();
        if label.is_empty() {
            return Err(SkipReason::EmptyLabel);
        }
        if let Some(block) = self.label_filter.check(label) {
            return Err(SkipReason::BlockedLabel(block));
        }

        let tag = property_or(element, PropertyScope::Any, TYPE_PROPERTY, String::new());
        if tag.trim().is_empty() {
            return Err(SkipReason::MissingType);
        }
        let schema = self
            .registry
            .schema_for(&tag)
            .ok_or_else(|| SkipReason::UnknownCategory(tag.trim().to_lowercase()))?;

        Ok((label.to_string(), schema))
    }

    fn class_accepted(&self, element: &Element) -> bool {
        if self.element_classes.is_empty() {
            return true;
        }
        match element.ifc_class.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(class) => self
                .element_classes
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(class)),
        }
    }

    fn assemble(
        &self,
        element: &Element,
        label: String,
        schema: &'static dyn DeviceSchema,
    ) -> DeviceRecord {
        let category = schema.category();
        let mut record = DeviceRecord::new(label, category);
        record.model_name = first_property_or(
            element,
            PropertyScope::Any,
            MODEL_NAME_PROPERTIES,
            category.tag().to_string(),
        );
        record.group = property_or(element, PropertyScope::Any, GROUP_PROPERTY, 0_i64);

        for spec in schema.all_fields() {
            let value = spec.resolve(element, &record.label);
            record.fields.insert(spec.output.to_string(), value);
        }
        let protocol = FieldSpec::new(
            "protocol",
            &["Protocol"],
            FieldDefault::Text(schema.default_protocol()),
        );
        let value = protocol.resolve(element, &record.label);
        record.fields.insert(protocol.output.to_string(), value);

        schema.extend(element, &mut record);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bim::{Scalar, TableValue};
    use crate::synthesis::schema::DeviceCategory;
    use serde_json::json;

    const PSET: &str = "Pset_Device";

    fn build(element: &Element) -> BuildOutcome {
        let registry = SchemaRegistry::standard();
        let filter = LabelFilter::default();
        DeviceBuilder::new(&registry, &filter, &[]).build(element)
    }

    fn device(element: &Element) -> DeviceRecord {
        match build(element) {
            BuildOutcome::Device(record) => record,
            BuildOutcome::Skipped(reason) => panic!("element skipped: {:?}", reason),
        }
    }

    #[test]
    fn led_gets_driver_beacon_and_led_fields() {
        let element = Element::new("X")
            .with_property(PSET, "Type", "LED")
            .with_property(PSET, "Power", 40);
        let record = device(&element);

        assert_eq!(record.category, DeviceCategory::Led);
        assert_eq!(record.model_name, "led");
        assert_eq!(record.group, 0);
        assert_eq!(record.integer("pMax"), Some(40));
        assert_eq!(record.integer("defaultSetpoint"), Some(5));
        assert_eq!(record.integer("dumpFrequency"), Some(1000));
        assert_eq!(record.integer("group"), Some(0));
        assert_eq!(record.text("friendlyName"), Some("X"));
        assert_eq!(record.text("protocol"), Some("mqtts"));
        assert_eq!(record.text("bleMode"), Some("service"));
        assert_eq!(record.get("firstDay"), Some(&json!(false)));
    }

    #[test]
    fn hvac_defaults_match_the_setpoint_table() {
        let element = Element::new("Y").with_property(PSET, "Type", "hvac");
        let record = device(&element);

        assert_eq!(record.integer("setpointCoolOccupied"), Some(190));
        assert_eq!(record.integer("setpointHeatOccupied"), Some(260));
        assert_eq!(record.integer("setpointCoolUnoccupied"), Some(300));
        assert_eq!(record.integer("setpointHeatUnoccupied"), Some(150));
        assert_eq!(record.integer("setpointCoolStandby"), Some(300));
        assert_eq!(record.integer("setpointHeatStandby"), Some(170));
        assert_eq!(record.get("ioMapping"), Some(&json!({})));
        assert!(record.get("bleMode").is_none());
        assert_eq!(record.text("protocol"), Some("mqtts"));
    }

    #[test]
    fn hvac_reads_io_mapping_table() {
        let element = Element::new("Y")
            .with_property(PSET, "Type", "HVAC")
            .with_type_property(
                "Pset_Type",
                "IOMapping",
                TableValue::from_pairs([("AI1", "temperature"), ("DO1", "fan")]),
            )
            .with_property(PSET, "SetpointCoolOccupied", "210");
        let record = device(&element);

        assert_eq!(record.integer("setpointCoolOccupied"), Some(210));
        assert_eq!(
            record.get("ioMapping"),
            Some(&json!({ "AI1": "temperature", "DO1": "fan" }))
        );
    }

    #[test]
    fn sensor_threshold_defaults_to_ten() {
        let element = Element::new("S").with_property(PSET, "Type", "Sensor");
        assert_eq!(device(&element).integer("thresoldPresence"), Some(10));
    }

    #[test]
    fn bespoke_categories_use_their_protocol_defaults() {
        let protocol = |tag: &str| -> String {
            let element = Element::new("D").with_property(PSET, "Type", tag);
            device(&element).text("protocol").unwrap_or_default().to_string()
        };
        assert_eq!(protocol("switch"), "rest");
        assert_eq!(protocol("frame"), "rest");
        assert_eq!(protocol("wago"), "modbus");
        assert_eq!(protocol("nanosense"), "modbus");
        assert_eq!(protocol("blind"), "mqtts");
    }

    #[test]
    fn explicit_protocol_wins() {
        let element = Element::new("D")
            .with_property(PSET, "Type", "wago")
            .with_property(PSET, "Protocol", "bacnet");
        assert_eq!(device(&element).text("protocol"), Some("bacnet"));
    }

    #[test]
    fn switch_carries_network_fields() {
        let element = Element::new("SW1")
            .with_property(PSET, "Type", "Switch")
            .with_property(PSET, "IP", "10.0.0.2")
            .with_property(PSET, "Cluster", 3)
            .with_property(PSET, "API", vec![Scalar::from("status"), Scalar::from("setup")])
            .with_tag("9");
        let record = device(&element);

        assert_eq!(record.text("ip"), Some("10.0.0.2"));
        assert_eq!(record.integer("cluster"), Some(3));
        assert_eq!(record.integer("modbusID"), Some(9));
        assert_eq!(record.get("api"), Some(&json!(["status", "setup"])));
        assert!(record.get("group").is_none());
    }

    #[test]
    fn wago_uses_slave_id() {
        let element = Element::new("W1")
            .with_property(PSET, "Type", "WAGO")
            .with_property(PSET, "SlaveID", 12);
        let record = device(&element);
        assert_eq!(record.integer("slaveID"), Some(12));
        assert!(record.get("modbusID").is_none());
    }

    #[test]
    fn model_name_and_group_come_from_properties() {
        let element = Element::new("L1")
            .with_property(PSET, "Type", "led")
            .with_property(PSET, "Group", "7")
            .with_type_property("Pset_Type", "SKU (BO_prodsku)", "LED-200");
        let record = device(&element);
        assert_eq!(record.model_name, "LED-200");
        assert_eq!(record.group, 7);
        assert_eq!(record.integer("group"), Some(7));
    }

    #[test]
    fn non_devices_are_skipped() {
        assert_eq!(
            build(&Element::new("Desk").with_property(PSET, "Type", "Chair")),
            BuildOutcome::Skipped(SkipReason::UnknownCategory("chair".to_string()))
        );
        assert_eq!(
            build(&Element::new("Desk").with_property(PSET, "Type", "  ")),
            BuildOutcome::Skipped(SkipReason::MissingType)
        );
        assert_eq!(
            build(&Element::new("  ").with_property(PSET, "Type", "led")),
            BuildOutcome::Skipped(SkipReason::EmptyLabel)
        );
        assert!(matches!(
            build(&Element::new("Mobilier_LED").with_property(PSET, "Type", "led")),
            BuildOutcome::Skipped(SkipReason::BlockedLabel(LabelBlock::Furniture(_)))
        ));
    }

    #[test]
    fn class_allowlist_only_applies_to_classified_elements() {
        let registry = SchemaRegistry::standard();
        let filter = LabelFilter::default();
        let classes = vec!["IfcBuildingElementProxy".to_string()];
        let builder = DeviceBuilder::new(&registry, &filter, &classes);

        let wall = Element::new("L1")
            .with_class("IfcWall")
            .with_property(PSET, "Type", "led");
        assert_eq!(
            builder.build(&wall),
            BuildOutcome::Skipped(SkipReason::ExcludedClass("IfcWall".to_string()))
        );

        let proxy = wall.clone().with_class("ifcbuildingelementproxy");
        assert!(matches!(builder.build(&proxy), BuildOutcome::Device(_)));

        let unclassed = Element::new("L2").with_property(PSET, "Type", "led");
        assert!(matches!(builder.build(&unclassed), BuildOutcome::Device(_)));
    }
}
