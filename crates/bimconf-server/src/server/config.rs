use bimconf_core::synthesis::filter::{DEFAULT_EXCLUDED_TOKENS, DEFAULT_FURNITURE_MARKERS};
use bimconf_core::{LabelFilter, SynthesisOptions};

use crate::cli::{FilterArgs, ServeArgs};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub enable_cors: bool,
    pub max_upload_size_bytes: usize,
    pub synthesis: SynthesisOptions,
}

impl ServerConfig {
    pub fn from_args(args: &ServeArgs, synthesis: SynthesisOptions) -> Self {
        let bind_address =
            std::env::var("BIMCONF_BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("BIMCONF_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(args.port);
        let enable_cors = std::env::var("BIMCONF_ENABLE_CORS")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        let max_upload_size_bytes = read_mb_env("BIMCONF_MAX_UPLOAD_MB", 50);

        Self {
            bind_address,
            port,
            enable_cors,
            max_upload_size_bytes,
            synthesis,
        }
    }
}

/// Command line values win, then `BIMCONF_*` lists, then built-in defaults.
pub fn synthesis_options(filters: &FilterArgs) -> SynthesisOptions {
    let furniture_markers = pick_list(
        &filters.furniture_markers,
        std::env::var("BIMCONF_FURNITURE_MARKERS").ok(),
        DEFAULT_FURNITURE_MARKERS,
    );
    let excluded_tokens = pick_list(
        &filters.excluded_tokens,
        std::env::var("BIMCONF_EXCLUDED_TOKENS").ok(),
        DEFAULT_EXCLUDED_TOKENS,
    );
    let element_classes = pick_list(
        &filters.element_classes,
        std::env::var("BIMCONF_ELEMENT_CLASSES").ok(),
        &[],
    );

    log::debug!(
        "Label blocklist: furniture={:?} excluded={:?} classes={:?}",
        furniture_markers,
        excluded_tokens,
        element_classes
    );
    SynthesisOptions {
        label_filter: LabelFilter::new(furniture_markers, excluded_tokens),
        element_classes,
    }
}

fn pick_list(cli: &[String], env: Option<String>, defaults: &[&str]) -> Vec<String> {
    if !cli.is_empty() {
        return cli.to_vec();
    }
    match env {
        Some(raw) => parse_list(&raw),
        None => defaults.iter().map(|item| item.to_string()).collect(),
    }
}

/// Splits a comma separated list, dropping blank items.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_mb_env(key: &str, fallback_mb: usize) -> usize {
    let value = std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(fallback_mb);
    value.saturating_mul(1024 * 1024)
}
