use axum::{extract::{Multipart, State}, http::StatusCode, Json};

use bimconf_core::{synthesize_bytes, ConfigurationDocument, DuplicateLabelError};
use crate::server::config::ServerConfig;
use crate::server::validation::{FileValidator, ValidationError};

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn handle_upload(
    State(config): State<ServerConfig>,
    mut multipart: Multipart,
) -> Result<Json<ConfigurationDocument>, (StatusCode, String)> {
    log::info!("Received element export upload");

    let mut filename = None;
    let mut data = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read form data: {}", e),
        )
    })? {
        if field.name().unwrap_or("") == "file" {
            filename = Some(field.file_name().unwrap_or("upload.json").to_string());
            data = Some(field.bytes().await.map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file data: {}", e),
                )
            })?);
        }
    }

    let filename = filename.ok_or((StatusCode::BAD_REQUEST, "No file in request".to_string()))?;
    let data = data.ok_or((
        StatusCode::BAD_REQUEST,
        "No file content in request".to_string(),
    ))?;

    synthesize_upload(&config, &filename, data.as_ref()).map(Json)
}

pub fn synthesize_upload(
    config: &ServerConfig,
    filename: &str,
    data: &[u8],
) -> Result<ConfigurationDocument, (StatusCode, String)> {
    log::info!("Synthesizing {} ({} bytes)", filename, data.len());

    let validator = FileValidator::new(config.max_upload_size_bytes);
    if let Err(error) = validator.validate_upload(filename, data) {
        let status = match error {
            ValidationError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ValidationError::InvalidFileFormat { .. } => StatusCode::BAD_REQUEST,
            ValidationError::InvalidDocument => StatusCode::BAD_REQUEST,
        };
        log::warn!("Upload validation failed: {}", error);
        return Err((status, error.to_string()));
    }

    let document = synthesize_bytes(data, &config.synthesis).map_err(|e| {
        log::warn!("Synthesis failed: {:?}", e);
        if let Some(duplicate) = e.downcast_ref::<DuplicateLabelError>() {
            (StatusCode::UNPROCESSABLE_ENTITY, duplicate.to_string())
        } else {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read element export: {:#}", e),
            )
        }
    })?;

    log::info!("Document synthesized ({} devices)", document.device_count());
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bimconf_core::SynthesisOptions;

    fn config() -> ServerConfig {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            enable_cors: false,
            max_upload_size_bytes: 1024 * 1024,
            synthesis: SynthesisOptions::default(),
        }
    }

    #[test]
    fn synthesizes_valid_upload() {
        let body = br#"[{ "name": "L1", "propertySets": { "P": { "Type": "led" } } }]"#;
        let document = synthesize_upload(&config(), "model.json", body).unwrap();
        assert_eq!(document.leds.len(), 1);
    }

    #[test]
    fn duplicate_labels_are_unprocessable() {
        let body = br#"[
            { "name": "L1", "propertySets": { "P": { "Type": "led" } } },
            { "name": "L1", "propertySets": { "P": { "Type": "hvac" } } }
        ]"#;
        let (status, message) = synthesize_upload(&config(), "model.json", body).unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(message, "Duplicate device label: L1");
    }

    #[test]
    fn malformed_upload_is_a_bad_request() {
        let (status, _) =
            synthesize_upload(&config(), "model.json", b"{\"elements\": 1}").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = synthesize_upload(&config(), "model.ifc", b"[]").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
