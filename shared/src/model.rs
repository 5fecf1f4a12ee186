use serde::{Deserialize, Deserializer, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

use crate::capture::CaptureState;
use crate::config::AppConfig;
use crate::navigation::Screen;
use crate::results::ListingReceipt;

pub const FALLBACK_FILE_NAME: &str = "image.jpg";
pub const MAX_PENDING_ALERTS: usize = 8;

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `$40.00`
pub fn format_price(value: f64) -> String {
    format!("${value:.2}")
}

/// Opaque reference to an image the shell owns. Never the bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment of the URI, or `image.jpg` when there is none.
    pub fn file_name(&self) -> &str {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        match path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => FALLBACK_FILE_NAME,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        let is_png = self
            .file_name()
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("png"));
        if is_png {
            "image/png"
        } else {
            "image/jpeg"
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Older backends omit the grade entirely; that reads as `Unknown`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ImageQuality {
    pub fn is_acceptable(self) -> bool {
        matches!(self, ImageQuality::Excellent | ImageQuality::Good)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageQuality::Excellent => "Excellent",
            ImageQuality::Good => "Good",
            ImageQuality::Fair => "Fair",
            ImageQuality::Poor => "Poor",
            ImageQuality::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum PriceError {
    #[error("price values must be finite")]
    NonFinite,
    #[error("price values must not be negative")]
    Negative,
    #[error("price range is inverted: min {min} > max {max}")]
    InvertedRange { min: f64, max: f64 },
    #[error("suggested price {suggested} lies outside {min}..={max}")]
    SuggestedOutOfRange { min: f64, max: f64, suggested: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimatedPrice {
    pub min: f64,
    pub max: f64,
    pub suggested: f64,
}

impl EstimatedPrice {
    pub fn validate(&self) -> Result<(), PriceError> {
        let Self { min, max, suggested } = *self;
        if !(min.is_finite() && max.is_finite() && suggested.is_finite()) {
            return Err(PriceError::NonFinite);
        }
        if min < 0.0 || max < 0.0 || suggested < 0.0 {
            return Err(PriceError::Negative);
        }
        if min > max {
            return Err(PriceError::InvertedRange { min, max });
        }
        if suggested < min || suggested > max {
            return Err(PriceError::SuggestedOutOfRange { min, max, suggested });
        }
        Ok(())
    }

    /// Never panics, unlike `f64::clamp` on an inverted range.
    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

/// The analysis backend's assessment. Read-only once received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub item: String,
    pub brand: String,
    pub description: String,
    pub condition: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_quality: ImageQuality,
    pub estimated_price: EstimatedPrice,
    #[serde(default, deserialize_with = "null_as_default")]
    pub search_keywords: Vec<String>,
}

impl AnalysisResult {
    pub fn needs_retake_advisory(&self) -> bool {
        !self.image_quality.is_acceptable()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DraftField {
    Item,
    Brand,
    Description,
    Condition,
}

/// The user's working copy of the analysis. Discarded when the results screen goes away.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditableListingDraft {
    pub item: String,
    pub brand: String,
    pub description: String,
    pub condition: String,
    pub selected_price: f64,
    /// Slider bounds. Start as the analysis range and follow later reanalyses.
    pub price_range: EstimatedPrice,
}

impl EditableListingDraft {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let price = &result.estimated_price;
        Self {
            item: result.item.clone(),
            brand: result.brand.clone(),
            description: result.description.clone(),
            condition: result.condition.clone(),
            selected_price: price.clamp(price.suggested),
            price_range: *price,
        }
    }

    pub fn set_field(&mut self, field: DraftField, value: String) {
        let slot = match field {
            DraftField::Item => &mut self.item,
            DraftField::Brand => &mut self.brand,
            DraftField::Description => &mut self.description,
            DraftField::Condition => &mut self.condition,
        };
        *slot = value;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Ios,
    Android,
    Web,
    #[default]
    Desktop,
}

impl Platform {
    /// Browsers have no separate media-library permission.
    pub fn requires_media_permission(self) -> bool {
        !matches!(self, Platform::Web)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    Advisory,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertAction {
    OpenListing { url: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub action: Option<AlertAction>,
    /// Repeating the gesture that raised this alert may succeed.
    pub retryable: bool,
}

impl Alert {
    pub fn advisory(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertKind::Advisory, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertKind::Error, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertKind::Info, title, message)
    }

    fn new(kind: AlertKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            action: None,
            retryable: false,
        }
    }

    #[must_use]
    pub fn with_action(mut self, action: AlertAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct Model {
    pub config: AppConfig,
    pub platform: Platform,
    pub screen: Screen,
    pub capture: CaptureState,
    pub alerts: VecDeque<Alert>,
    /// Listing the user may still open from the confirmation alert.
    pub pending_confirmation: Option<ListingReceipt>,
    pub backend_reachable: Option<bool>,
}

impl Model {
    pub fn push_alert(&mut self, alert: Alert) {
        if self.alerts.len() >= MAX_PENDING_ALERTS {
            self.alerts.pop_front();
        }
        self.alerts.push_back(alert);
    }

    pub fn dismiss_alert(&mut self) -> Option<Alert> {
        self.alerts.pop_front()
    }
}
