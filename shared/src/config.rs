//! Configuration the shell resolves at startup and hands to the core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{
    CaptureConfig, HttpError, ValidatedUrl, DEFAULT_QUALITY, MAX_TIMEOUT_MS,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ANALYZE_PATH: &str = "/analyze-image/";
pub const DEFAULT_REANALYZE_PATH: &str = "/reanalyze/";
pub const DEFAULT_POST_PATH: &str = "/post/";
pub const DEFAULT_HEALTH_PATH: &str = "/";

/// Slider granularity, in currency units.
pub const PRICE_STEP: f64 = 0.05;

pub const CAPTURE_TITLE: &str = "Image Upload";
pub const RESULTS_TITLE: &str = "Results";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    Analyze,
    Reanalyze,
    Post,
    Health,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Analyze,
        Endpoint::Reanalyze,
        Endpoint::Post,
        Endpoint::Health,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Analyze => "analyze",
            Endpoint::Reanalyze => "reanalyze",
            Endpoint::Post => "post",
            Endpoint::Health => "health",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[source] HttpError),

    #[error("invalid {endpoint} path '{path}': {source}")]
    InvalidPath {
        endpoint: &'static str,
        path: String,
        #[source]
        source: HttpError,
    },

    #[error("request timeout must be between 1 and {max} ms, got {value}")]
    InvalidTimeout { value: u64, max: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub analyze_path: String,
    pub reanalyze_path: String,
    pub post_path: String,
    pub health_path: String,
    /// `None` defers to the transport's own timeout.
    pub request_timeout_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            analyze_path: DEFAULT_ANALYZE_PATH.into(),
            reanalyze_path: DEFAULT_REANALYZE_PATH.into(),
            post_path: DEFAULT_POST_PATH.into(),
            health_path: DEFAULT_HEALTH_PATH.into(),
            request_timeout_ms: None,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_path(mut self, endpoint: Endpoint, path: impl Into<String>) -> Self {
        let path = path.into();
        match endpoint {
            Endpoint::Analyze => self.analyze_path = path,
            Endpoint::Reanalyze => self.reanalyze_path = path,
            Endpoint::Post => self.post_path = path,
            Endpoint::Health => self.health_path = path,
        }
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Analyze => &self.analyze_path,
            Endpoint::Reanalyze => &self.reanalyze_path,
            Endpoint::Post => &self.post_path,
            Endpoint::Health => &self.health_path,
        }
    }

    pub fn base(&self) -> Result<ValidatedUrl, ConfigError> {
        ValidatedUrl::new(self.base_url.as_str()).map_err(ConfigError::InvalidBaseUrl)
    }

    pub fn endpoint(&self, endpoint: Endpoint) -> Result<ValidatedUrl, ConfigError> {
        let path = self.path(endpoint);
        self.base()?
            .join(path)
            .map_err(|source| ConfigError::InvalidPath {
                endpoint: endpoint.name(),
                path: path.to_string(),
                source,
            })
    }

    /// Checks every endpoint up front so a bad override fails at startup, not mid-flow.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for endpoint in Endpoint::ALL {
            self.endpoint(endpoint)?;
        }
        match self.request_timeout_ms {
            Some(value) if value == 0 || value > MAX_TIMEOUT_MS => Err(ConfigError::InvalidTimeout {
                value,
                max: MAX_TIMEOUT_MS,
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub allows_editing: bool,
    pub quality: f32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            allows_editing: true,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl CaptureSettings {
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig::default()
            .with_editing(self.allows_editing)
            .with_quality(self.quality)
            .validated()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub capture: CaptureSettings,
}
