use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::capabilities::{BrowserError, CameraError, HttpError};
use crate::config::ConfigError;
use crate::model::Alert;
use crate::navigation::NavigationError;

pub const UPLOAD_FAILED_TITLE: &str = "Upload Failed";
pub const REANALYZE_FAILED_TITLE: &str = "Reanalysis Failed";
pub const POST_FAILED_TITLE: &str = "Posting Failed";
pub const GENERIC_ERROR_TITLE: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Cancelled,
    PermissionDenied,
    Network,
    Server,
    Deserialization,
    InvalidState,
    MissingParameters,
    Configuration,
    Platform,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Network => "NETWORK_ERROR",
            Self::Server => "SERVER_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::MissingParameters => "MISSING_PARAMETERS",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Platform => "PLATFORM_ERROR",
        }
    }

    /// Whether the user can sensibly try the same action again. Nothing retries on its own.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Server | Self::Platform)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub title: String,
    pub context: BTreeMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            title: GENERIC_ERROR_TITLE.into(),
            context: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Server-side failure whose message was already extracted from the response body.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Server, message).with_context("http_status", status.to_string())
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Server messages are shown verbatim; everything else gets fixed copy.
    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Server => self.message.clone(),
            ErrorKind::Network => {
                "Unable to reach the server. Please check your connection and try again.".into()
            }
            ErrorKind::Cancelled => "The action was cancelled.".into(),
            ErrorKind::PermissionDenied => {
                "Access was denied. Please enable the permission in Settings.".into()
            }
            ErrorKind::Deserialization => "The server returned data the app could not read.".into(),
            ErrorKind::InvalidState => "That action is not available right now.".into(),
            ErrorKind::MissingParameters => crate::results::MISSING_DATA_MESSAGE.into(),
            ErrorKind::Configuration => {
                format!("The app is misconfigured: {}", self.message)
            }
            ErrorKind::Platform => {
                "Something went wrong on this device. Please try again.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if !self.context.is_empty() {
            let pairs: Vec<String> = self.context.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, " ({})", pairs.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<&AppError> for Alert {
    fn from(e: &AppError) -> Self {
        Alert::error(e.title.clone(), e.user_facing_message()).retryable(e.is_retryable())
    }
}

impl From<HttpError> for AppError {
    fn from(e: HttpError) -> Self {
        let kind = match &e {
            HttpError::ConnectionError { .. } | HttpError::Timeout { .. } => ErrorKind::Network,
            HttpError::Cancelled { .. } => ErrorKind::Cancelled,
            HttpError::InvalidResponse { .. } => ErrorKind::Deserialization,
            HttpError::FileUnavailable { .. } => ErrorKind::Platform,
            HttpError::InvalidUrl { .. } => ErrorKind::Configuration,
            HttpError::InvalidHeader { .. }
            | HttpError::TooManyHeaders { .. }
            | HttpError::BodyTooLarge { .. }
            | HttpError::InvalidRequest { .. }
            | HttpError::SerializationError { .. } => ErrorKind::InvalidState,
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<CameraError> for AppError {
    fn from(e: CameraError) -> Self {
        let kind = if e.is_permission_error() {
            ErrorKind::PermissionDenied
        } else {
            ErrorKind::Platform
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<BrowserError> for AppError {
    fn from(e: BrowserError) -> Self {
        AppError::new(ErrorKind::Platform, e.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Configuration, e.to_string())
    }
}

impl From<NavigationError> for AppError {
    fn from(e: NavigationError) -> Self {
        let kind = match e {
            NavigationError::MissingImage | NavigationError::MissingAnalysis => {
                ErrorKind::MissingParameters
            }
            NavigationError::MalformedAnalysis { .. } => ErrorKind::Deserialization,
        };
        AppError::new(kind, e.to_string())
    }
}
