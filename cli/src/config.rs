//! Resolves the core's configuration from `SNAPPRICE_*` environment variables.

use anyhow::{Context, Result};
use shared::config::{ApiConfig, Endpoint};
use shared::AppConfig;

pub const BASE_URL_VAR: &str = "SNAPPRICE_BASE_URL";
pub const ANALYZE_PATH_VAR: &str = "SNAPPRICE_ANALYZE_PATH";
pub const REANALYZE_PATH_VAR: &str = "SNAPPRICE_REANALYZE_PATH";
pub const POST_PATH_VAR: &str = "SNAPPRICE_POST_PATH";
pub const TIMEOUT_MS_VAR: &str = "SNAPPRICE_TIMEOUT_MS";

pub fn from_env() -> Result<AppConfig> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Unset and blank variables fall back to the defaults.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let mut api = match get(BASE_URL_VAR) {
        Some(base_url) => ApiConfig::new(base_url),
        None => ApiConfig::default(),
    };
    for (var, endpoint) in [
        (ANALYZE_PATH_VAR, Endpoint::Analyze),
        (REANALYZE_PATH_VAR, Endpoint::Reanalyze),
        (POST_PATH_VAR, Endpoint::Post),
    ] {
        if let Some(path) = get(var) {
            api = api.with_path(endpoint, path);
        }
    }
    if let Some(raw) = get(TIMEOUT_MS_VAR) {
        let timeout_ms = raw
            .parse::<u64>()
            .with_context(|| format!("{TIMEOUT_MS_VAR} must be a whole number of milliseconds, got '{raw}'"))?;
        api = api.with_timeout_ms(Some(timeout_ms));
    }

    api.validate().context("invalid API configuration")?;
    Ok(AppConfig {
        api,
        ..AppConfig::default()
    })
}
