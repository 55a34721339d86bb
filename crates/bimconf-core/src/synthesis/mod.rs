pub mod aggregator;
pub mod builder;
pub mod categories;
pub mod document;
pub mod filter;
pub mod record;
pub mod schema;

pub use aggregator::{Aggregator, DuplicateLabelError};
pub use builder::{BuildOutcome, DeviceBuilder, SkipReason};
pub use document::{
    assemble, ConfigurationDocument, DeviceBucket, GroupEntry, InventoryEntry, LabelTicket,
    ModelCatalogEntry, ProjectEntry,
};
pub use filter::{LabelBlock, LabelFilter};
pub use record::DeviceRecord;
pub use schema::{
    Addressing, DeviceCategory, DeviceSchema, FieldDefault, FieldSpec, SchemaRegistry, Shape,
};

use crate::bim::Element;

/// Tunables of a synthesis run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisOptions {
    pub label_filter: LabelFilter,
    /// Accepted element classes; empty accepts every class
    pub element_classes: Vec<String>,
}

/// Runs one synthesis pass with the built-in schemas.
pub fn synthesize<'e, I>(
    elements: I,
    options: &SynthesisOptions,
) -> Result<ConfigurationDocument, DuplicateLabelError>
where
    I: IntoIterator<Item = &'e Element>,
{
    synthesize_with(&SchemaRegistry::standard(), elements, options)
}

/// Runs one synthesis pass. Stops at the first duplicate label; no document is
/// produced in that case.
pub fn synthesize_with<'e, I>(
    registry: &SchemaRegistry,
    elements: I,
    options: &SynthesisOptions,
) -> Result<ConfigurationDocument, DuplicateLabelError>
where
    I: IntoIterator<Item = &'e Element>,
{
    let builder = DeviceBuilder::new(registry, &options.label_filter, &options.element_classes);
    let mut aggregator = Aggregator::new();
    let mut skipped = 0usize;

    for element in elements {
        match builder.build(element) {
            BuildOutcome::Device(record) => {
                if let Err(error) = aggregator.ingest(record, element) {
                    log::warn!("Aborting synthesis: {}", error);
                    return Err(error);
                }
            }
            BuildOutcome::Skipped(reason) => {
                log::debug!("Skipping element '{}': {:?}", element.label(), reason);
                skipped += 1;
            }
        }
    }

    log::info!(
        "Synthesized {} devices ({} elements skipped)",
        aggregator.len(),
        skipped
    );
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// DALI-driven luminaire filed under the led bucket
    struct DaliSchema;

    impl DeviceSchema for DaliSchema {
        fn category(&self) -> DeviceCategory {
            DeviceCategory::Led
        }

        fn aliases(&self) -> &'static [&'static str] {
            &["dali"]
        }

        fn shape(&self) -> Shape {
            Shape::Bespoke
        }

        fn default_protocol(&self) -> &'static str {
            "dali"
        }

        fn fields(&self) -> &'static [FieldSpec] {
            const FIELDS: &[FieldSpec] = &[
                FieldSpec::new("friendlyName", &["FriendlyName"], FieldDefault::Label),
                FieldSpec::new("shortAddress", &["ShortAddress"], FieldDefault::Integer(0)),
            ];
            FIELDS
        }
    }

    static DALI: DaliSchema = DaliSchema;

    #[test]
    fn custom_registry_drives_classification() {
        let registry = SchemaRegistry::with_schemas(vec![&DALI as &dyn DeviceSchema]);
        assert_eq!(registry.categories().collect::<Vec<_>>(), vec![DeviceCategory::Led]);

        let elements = vec![
            Element::new("Dali_1")
                .with_property("P", "Type", "DALI")
                .with_property("P", "ShortAddress", 12),
            Element::new("Zone1_Driver").with_property("P", "Type", "led"),
        ];
        let document =
            synthesize_with(&registry, &elements, &SynthesisOptions::default()).unwrap();

        assert_eq!(document.device_count(), 1);
        let dali = &document.leds["Dali_1"];
        assert_eq!(dali.integer("shortAddress"), Some(12));
        assert_eq!(dali.text("protocol"), Some("dali"));
        assert_eq!(dali.get("friendlyName"), Some(&json!("Dali_1")));
        assert!(dali.get("dumpFrequency").is_none());
        assert_eq!(document.projects["Dali_1"].modbus_id, Some(0));
    }
}
