use serde::{Deserialize, Serialize};

use crate::capabilities::{BrowserResult, CameraResult, HttpResult, ShareOutcome};
use crate::config::AppConfig;
use crate::flight::FlightToken;
use crate::model::{DraftField, Platform};

// --- Event enum: shell-facing events first, capability completions are #[serde(skip)] ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Lifecycle
    Started {
        platform: Platform,
    },
    Configure(Box<AppConfig>),
    HealthCheckRequested,

    // Capture screen
    TakePictureRequested,
    PickFromLibraryRequested,
    RetakeRequested,
    ConfirmRequested,

    // Results screen
    NavigateBack,
    DraftEdited {
        field: DraftField,
        value: String,
    },
    PriceAdjusted(f64),
    ReanalyzeRequested,
    PostListingRequested,
    OpenListingRequested,
    ShareRequested,

    AlertDismissed,

    // Capability completions
    #[serde(skip)]
    CameraPermissionResolved(CameraResult),
    #[serde(skip)]
    MediaPermissionResolved(CameraResult),
    #[serde(skip)]
    ImageAcquired(CameraResult),
    #[serde(skip)]
    UploadCompleted {
        token: FlightToken,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    ReanalyzeCompleted {
        token: FlightToken,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    PostListingCompleted {
        token: FlightToken,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    ListingOpened(BrowserResult),
    #[serde(skip)]
    ShareCompleted(ShareOutcome),
    #[serde(skip)]
    HealthCheckCompleted(Box<HttpResult>),
}

impl Event {
    /// Short name for logs. Payloads can carry user text and are left out.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Started { .. } => "started",
            Event::Configure(_) => "configure",
            Event::HealthCheckRequested => "health_check_requested",
            Event::TakePictureRequested => "take_picture_requested",
            Event::PickFromLibraryRequested => "pick_from_library_requested",
            Event::RetakeRequested => "retake_requested",
            Event::ConfirmRequested => "confirm_requested",
            Event::NavigateBack => "navigate_back",
            Event::DraftEdited { .. } => "draft_edited",
            Event::PriceAdjusted(_) => "price_adjusted",
            Event::ReanalyzeRequested => "reanalyze_requested",
            Event::PostListingRequested => "post_listing_requested",
            Event::OpenListingRequested => "open_listing_requested",
            Event::ShareRequested => "share_requested",
            Event::AlertDismissed => "alert_dismissed",
            Event::CameraPermissionResolved(_) => "camera_permission_resolved",
            Event::MediaPermissionResolved(_) => "media_permission_resolved",
            Event::ImageAcquired(_) => "image_acquired",
            Event::UploadCompleted { .. } => "upload_completed",
            Event::ReanalyzeCompleted { .. } => "reanalyze_completed",
            Event::PostListingCompleted { .. } => "post_listing_completed",
            Event::ListingOpened(_) => "listing_opened",
            Event::ShareCompleted(_) => "share_completed",
            Event::HealthCheckCompleted(_) => "health_check_completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_events_deserialize() {
        let event: Event = serde_json::from_str(r#"{"Started":{"platform":"Ios"}}"#).unwrap();
        assert_eq!(
            event,
            Event::Started {
                platform: Platform::Ios
            }
        );

        let event: Event =
            serde_json::from_str(r#"{"DraftEdited":{"field":"Brand","value":"Acme"}}"#).unwrap();
        assert_eq!(event.name(), "draft_edited");

        let event: Event = serde_json::from_str(r#""ConfirmRequested""#).unwrap();
        assert_eq!(event, Event::ConfirmRequested);
    }

    #[test]
    fn test_completion_events_are_not_shell_facing() {
        assert!(serde_json::from_str::<Event>(r#"{"ShareCompleted":"Shared"}"#).is_err());
    }
}
