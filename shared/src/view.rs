use serde::{Deserialize, Serialize};

use crate::capture::{CaptureMode, CaptureState, PermissionSummary};
use crate::config::{CAPTURE_TITLE, PRICE_STEP, RESULTS_TITLE};
use crate::model::{format_price, Alert, AlertAction, AlertKind, Model};
use crate::navigation::Screen;
use crate::results::{ResultsScreen, ResultsState};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub title: String,
    pub screen: ScreenView,
    pub alert: Option<AlertView>,
    pub pending_alerts: usize,
    pub backend_reachable: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenView {
    Capture(CaptureView),
    Results(Box<ResultsView>),
    /// Results screen opened without usable parameters. Nothing else is rendered.
    ResultsError { message: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CaptureView {
    pub mode: CaptureMode,
    pub image_uri: Option<String>,
    pub controls_enabled: bool,
    pub can_confirm: bool,
    pub can_retake: bool,
    pub is_uploading: bool,
    pub permissions: PermissionSummary,
    pub all_permissions_granted: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResultsView {
    pub image_uri: String,
    pub item: String,
    pub brand: String,
    pub description: String,
    pub condition: String,
    pub image_quality: String,
    pub keywords: Vec<String>,
    pub selected_price: f64,
    pub price_label: String,
    pub price_min: f64,
    pub price_max: f64,
    pub price_step: f64,
    pub min_label: String,
    pub max_label: String,
    pub range_label: String,
    pub is_reanalyzing: bool,
    pub is_posting: bool,
    pub listing_message: Option<String>,
    pub can_open_listing: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AlertView {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub action_label: Option<String>,
    pub can_retry: bool,
}

impl From<&Alert> for AlertView {
    fn from(alert: &Alert) -> Self {
        Self {
            kind: alert.kind,
            title: alert.title.clone(),
            message: alert.message.clone(),
            action_label: alert.action.as_ref().map(|action| match action {
                AlertAction::OpenListing { .. } => "Open listing".to_string(),
            }),
            can_retry: alert.retryable,
        }
    }
}

impl From<&CaptureState> for CaptureView {
    fn from(state: &CaptureState) -> Self {
        let previewing = state.mode == CaptureMode::Previewing;
        Self {
            mode: state.mode,
            image_uri: state.image.as_ref().map(|i| i.as_str().to_string()),
            controls_enabled: state.can_acquire(),
            can_confirm: previewing && state.image.is_some(),
            can_retake: previewing,
            is_uploading: state.is_uploading(),
            permissions: state.permissions,
            all_permissions_granted: state.permissions.all_granted(),
        }
    }
}

impl From<&ResultsState> for ResultsView {
    fn from(state: &ResultsState) -> Self {
        let range = state.price_range();
        let draft = &state.draft;
        Self {
            image_uri: state.image.as_str().to_string(),
            item: draft.item.clone(),
            brand: draft.brand.clone(),
            description: draft.description.clone(),
            condition: draft.condition.clone(),
            image_quality: state.original.image_quality.as_str().to_string(),
            keywords: state.original.search_keywords.clone(),
            selected_price: draft.selected_price,
            price_label: format_price(draft.selected_price),
            price_min: range.min,
            price_max: range.max,
            price_step: PRICE_STEP,
            min_label: format_price(range.min),
            max_label: format_price(range.max),
            range_label: format!("{} - {}", format_price(range.min), format_price(range.max)),
            is_reanalyzing: state.reanalyze.is_busy(),
            is_posting: state.post.is_busy(),
            listing_message: state.last_listing.as_ref().map(|r| r.confirmation_message()),
            can_open_listing: state
                .last_listing
                .as_ref()
                .is_some_and(|r| r.listing_url.is_some()),
        }
    }
}

pub fn build(model: &Model) -> ViewModel {
    let (title, screen) = match &model.screen {
        Screen::Capture => (CAPTURE_TITLE, ScreenView::Capture(CaptureView::from(&model.capture))),
        Screen::Results(results) => {
            let screen = match results.as_ref() {
                ResultsScreen::Ready(state) => ScreenView::Results(Box::new(ResultsView::from(state))),
                ResultsScreen::Failed { message } => ScreenView::ResultsError {
                    message: message.clone(),
                },
            };
            (RESULTS_TITLE, screen)
        }
    };

    ViewModel {
        title: title.to_string(),
        screen,
        alert: model.alerts.front().map(AlertView::from),
        pending_alerts: model.alerts.len(),
        backend_reachable: model.backend_reachable,
    }
}
