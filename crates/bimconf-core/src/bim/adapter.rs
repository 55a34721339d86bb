use super::model::Element;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug)]
pub struct MissingInputError {
    pub path: String,
}

impl std::fmt::Display for MissingInputError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "Building model export not found: {}", self.path)
    }
}

impl std::error::Error for MissingInputError {}

#[derive(Deserialize)]
#[serde(untagged)]
enum ElementExport {
    Wrapped { elements: Vec<Element> },
    Bare(Vec<Element>),
}

pub fn load_elements(path: &str) -> Result<Vec<Element>> {
    log::info!("Loading building model export from: {}", path);
    if !Path::new(path).exists() {
        return Err(MissingInputError {
            path: path.to_string(),
        }
        .into());
    }
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
    load_elements_bytes(&data)
}

pub fn load_elements_bytes(data: &[u8]) -> Result<Vec<Element>> {
    log::debug!("Parsing element export ({} bytes)", data.len());
    let text = std::str::from_utf8(data).context("Element export is not valid UTF-8")?;
    let export: ElementExport = serde_json::from_str(strip_bom(text))
        .context("Failed to parse element export")?;
    let elements = match export {
        ElementExport::Wrapped { elements } => elements,
        ElementExport::Bare(elements) => elements,
    };
    log::info!("Element export contains {} elements", elements.len());
    Ok(elements)
}

pub(crate) fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{feff}').unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bim::model::PropertyValue;
    use std::io::Write;

    #[test]
    fn missing_file_is_reported_as_missing_input() {
        let err = load_elements("does/not/exist.json").unwrap_err();
        let missing = err
            .downcast_ref::<MissingInputError>()
            .expect("missing input error");
        assert_eq!(missing.path, "does/not/exist.json");
    }

    #[test]
    fn loads_wrapped_export_from_disk() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            "\u{feff}{}",
            r#"{"elements": [{"name": "Zone1_Driver", "propertySets": {"P": {"Type": "led"}}}]}"#
        )?;
        let path = file.path().to_string_lossy().to_string();

        let elements = load_elements(&path)?;
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].label(), "Zone1_Driver");
        Ok(())
    }

    #[test]
    fn loads_bare_array() -> anyhow::Result<()> {
        let elements = load_elements_bytes(br#"[{"name": "a"}, {"name": "b", "tag": "3"}]"#)?;
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[1].tag.as_deref(), Some("3"));
        Ok(())
    }

    #[test]
    fn odd_property_values_do_not_fail_the_export() -> anyhow::Result<()> {
        let elements = load_elements_bytes(
            br#"[
                {"name": "L1", "propertySets": {"P": {"Type": "led"}}},
                {"name": "L2", "propertySets": {"P": {"Type": "led", "Tags": ["a", null]}}},
                {"name": "T1", "propertySets": {"P": {"Map": {"definingValues": [{"x": 1}]}}}}
            ]"#,
        )?;
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[1].label(), "L2");
        assert!(matches!(
            elements[1].property_sets["P"]["Tags"],
            PropertyValue::Other(_)
        ));
        Ok(())
    }

    #[test]
    fn malformed_export_is_an_error() {
        let err = load_elements_bytes(b"{\"elements\": 3}").unwrap_err();
        assert!(err.to_string().contains("Failed to parse element export"));
        assert!(err.downcast_ref::<MissingInputError>().is_none());
    }
}
