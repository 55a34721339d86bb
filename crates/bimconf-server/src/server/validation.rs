use std::fmt;

pub struct FileValidator {
    max_size_bytes: usize,
}

impl FileValidator {
    pub fn new(max_size_bytes: usize) -> Self {
        Self { max_size_bytes }
    }

    pub fn validate_upload(&self, filename: &str, data: &[u8]) -> Result<(), ValidationError> {
        if data.len() > self.max_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size: data.len(),
                max: self.max_size_bytes,
            });
        }

        if !is_export_filename(filename) {
            return Err(ValidationError::InvalidFileFormat {
                expected: "*.json",
                got: filename.to_string(),
            });
        }

        if !has_json_root(data) {
            return Err(ValidationError::InvalidDocument);
        }

        Ok(())
    }
}

#[derive(Debug)]
pub enum ValidationError {
    FileTooLarge { size: usize, max: usize },
    InvalidFileFormat { expected: &'static str, got: String },
    InvalidDocument,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FileTooLarge { size, max } => {
                write!(f, "File too large ({} bytes, max {} bytes)", size, max)
            }
            ValidationError::InvalidFileFormat { expected, got } => {
                write!(f, "Invalid file format (expected {}, got {})", expected, got)
            }
            ValidationError::InvalidDocument => {
                write!(f, "Element export must be a JSON object or array")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn is_export_filename(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".json")
}

fn has_json_root(data: &[u8]) -> bool {
    let data = data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(data);
    matches!(
        data.iter().copied().find(|byte| !byte.is_ascii_whitespace()),
        Some(b'{') | Some(b'[')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_json_exports() {
        let validator = FileValidator::new(1024);
        assert!(validator.validate_upload("Model.JSON", b"  {\"elements\": []}").is_ok());
        assert!(validator.validate_upload("model.json", b"\xef\xbb\xbf[]").is_ok());
    }

    #[test]
    fn rejects_oversized_uploads() {
        let validator = FileValidator::new(4);
        assert!(matches!(
            validator.validate_upload("model.json", b"[1, 2, 3]"),
            Err(ValidationError::FileTooLarge { size: 9, max: 4 })
        ));
    }

    #[test]
    fn rejects_other_formats() {
        let validator = FileValidator::new(1024);
        assert!(matches!(
            validator.validate_upload("model.ifc", b"ISO-10303-21;"),
            Err(ValidationError::InvalidFileFormat { .. })
        ));
        assert!(matches!(
            validator.validate_upload("model.json", b"ISO-10303-21;"),
            Err(ValidationError::InvalidDocument)
        ));
    }
}
