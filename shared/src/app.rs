use tracing::{debug, info, warn};

use crate::api;
use crate::capabilities::{
    CameraError, CameraOutput, CameraResult, Capabilities, HttpResult, PermissionStatus,
    ShareOutcome,
};
use crate::capture::CaptureEvent;
use crate::error::{AppError, POST_FAILED_TITLE, REANALYZE_FAILED_TITLE, UPLOAD_FAILED_TITLE};
use crate::event::Event;
use crate::flight::FlightToken;
use crate::model::{Alert, AlertAction, ImageRef, Model};
use crate::navigation::{ResultsParams, Screen};
use crate::results::{ResultsScreen, ResultsState, LISTING_CREATED_TITLE};
use crate::view::{self, ViewModel};

pub const CAPTURE_FAILED_TITLE: &str = "Capture Failed";
pub const BROWSER_FAILED_TITLE: &str = "Could Not Open Listing";

#[derive(Default)]
pub struct App;

impl App {
    /// Applies a capture transition, logging and discarding it if the state rejects it.
    fn transition_capture(model: &mut Model, event: CaptureEvent) -> bool {
        match model.capture.apply(event) {
            Ok(next) => {
                model.capture = next;
                true
            }
            Err(e) => {
                debug!(error = %e, mode = model.capture.mode.name(), "capture transition rejected");
                false
            }
        }
    }

    fn permission_status(result: CameraResult) -> PermissionStatus {
        match result {
            Ok(CameraOutput::Permission(status)) => status,
            Ok(other) => {
                warn!(?other, "unexpected camera output for a permission request");
                PermissionStatus::NotDetermined
            }
            Err(CameraError::PermissionDenied) => PermissionStatus::Denied,
            Err(e) => {
                warn!(error = %e, "permission request failed");
                PermissionStatus::NotDetermined
            }
        }
    }

    fn ready_state(model: &mut Model) -> Option<&mut ResultsState> {
        model.screen.results_mut().and_then(ResultsScreen::ready_mut)
    }

    fn acquire_image(model: &Model, caps: &Capabilities, from_library: bool) {
        if !matches!(model.screen, Screen::Capture) || !model.capture.can_acquire() {
            debug!(
                unlocked = model.capture.controls_unlocked,
                mode = model.capture.mode.name(),
                "image acquisition ignored"
            );
            return;
        }
        let config = model.config.capture.capture_config();
        if from_library {
            caps.camera.pick_from_library(config, Event::ImageAcquired);
        } else {
            caps.camera.capture(config, Event::ImageAcquired);
        }
    }

    fn image_acquired(model: &mut Model, result: CameraResult) {
        match result {
            Ok(CameraOutput::Image(asset)) => {
                debug!(width = ?asset.width, height = ?asset.height, "image acquired");
                Self::transition_capture(model, CaptureEvent::ImageAcquired(ImageRef::new(asset.uri)));
            }
            Ok(CameraOutput::Cancelled) => {
                Self::transition_capture(model, CaptureEvent::AcquireCancelled);
            }
            Ok(CameraOutput::Permission(status)) => {
                warn!(?status, "permission result delivered for an image request");
            }
            Err(e) => {
                warn!(error = %e, "image acquisition failed");
                let err = AppError::from(e).with_title(CAPTURE_FAILED_TITLE);
                model.push_alert(Alert::from(&err));
            }
        }
    }

    fn start_upload(model: &mut Model, caps: &Capabilities) {
        if !matches!(model.screen, Screen::Capture) {
            return;
        }
        let Some(image) = model.capture.image.clone() else {
            debug!("confirm ignored without a held image");
            return;
        };
        let request = match api::analyze_request(&model.config.api, &image) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "could not build upload request");
                model.push_alert(Alert::from(&e.with_title(UPLOAD_FAILED_TITLE)));
                return;
            }
        };
        if !Self::transition_capture(model, CaptureEvent::UploadStarted) {
            return;
        }
        let Some(token) = model.capture.upload.current() else {
            return;
        };

        info!(
            request_id = request.request_id(),
            file_name = image.file_name(),
            "uploading image for analysis"
        );
        caps.http.execute(request, move |result| Event::UploadCompleted {
            token,
            result: Box::new(result),
        });
    }

    /// Upload success and the move to the results screen happen in one model update.
    fn finish_upload(model: &mut Model, token: FlightToken, result: HttpResult) {
        if model.capture.upload.current() != Some(token) {
            debug!(%token, "dropping stale upload completion");
            return;
        }

        let outcome = result
            .map_err(|e| AppError::from(e).with_title(UPLOAD_FAILED_TITLE))
            .and_then(|response| api::read_analysis(&response))
            .and_then(|analysis| {
                let image = model.capture.image.clone().ok_or_else(|| {
                    AppError::new(crate::error::ErrorKind::InvalidState, "image released mid-upload")
                        .with_title(UPLOAD_FAILED_TITLE)
                })?;
                ResultsParams::from_upload(&image, &analysis)
                    .map_err(|e| AppError::from(e).with_title(UPLOAD_FAILED_TITLE))
            });

        match outcome {
            Ok(params) => {
                if !Self::transition_capture(model, CaptureEvent::UploadSucceeded(token)) {
                    return;
                }
                let (screen, advisory) = ResultsScreen::mount(&params);
                info!("analysis received, showing results");
                model.screen = Screen::Results(Box::new(screen));
                if let Some(advisory) = advisory {
                    model.push_alert(advisory);
                }
            }
            Err(err) => {
                warn!(error = %err, "upload failed");
                if Self::transition_capture(model, CaptureEvent::UploadFailed(token)) {
                    model.push_alert(Alert::from(&err));
                }
            }
        }
    }

    fn start_reanalyze(model: &mut Model, caps: &Capabilities) {
        let config = model.config.api.clone();
        let Some(state) = Self::ready_state(model) else {
            return;
        };
        let (token, body) = match state.begin_reanalyze() {
            Ok(started) => started,
            Err(e) => {
                debug!(error = %e, "reanalyze ignored");
                return;
            }
        };
        match api::reanalyze_request(&config, &body) {
            Ok(request) => {
                info!(request_id = request.request_id(), "requesting revised price");
                caps.http.execute(request, move |result| Event::ReanalyzeCompleted {
                    token,
                    result: Box::new(result),
                });
            }
            Err(e) => {
                state.reanalyze.abandon();
                warn!(error = %e, "could not build reanalyze request");
                model.push_alert(Alert::from(&e.with_title(REANALYZE_FAILED_TITLE)));
            }
        }
    }

    fn finish_reanalyze(model: &mut Model, token: FlightToken, result: HttpResult) {
        let Some(state) = Self::ready_state(model) else {
            debug!(%token, "dropping reanalyze completion for a closed screen");
            return;
        };
        if !state.reanalyze.finish(token) {
            debug!(%token, "dropping stale reanalyze completion");
            return;
        }

        let outcome = result
            .map_err(|e| AppError::from(e).with_title(REANALYZE_FAILED_TITLE))
            .and_then(|response| api::read_reanalysis(&response));
        let alert = match outcome {
            Ok(revised) => {
                let selected = state.apply_revised_price(revised);
                info!(selected, "revised price applied");
                state.price_updated_alert()
            }
            Err(err) => {
                warn!(error = %err, "reanalyze failed");
                Alert::from(&err)
            }
        };
        model.push_alert(alert);
    }

    fn start_post(model: &mut Model, caps: &Capabilities) {
        let config = model.config.api.clone();
        let Some(state) = Self::ready_state(model) else {
            return;
        };
        let (token, form) = match state.begin_post() {
            Ok(started) => started,
            Err(e) => {
                debug!(error = %e, "post ignored");
                return;
            }
        };
        match api::post_listing_request(&config, form) {
            Ok(request) => {
                info!(request_id = request.request_id(), "posting listing");
                caps.http.execute(request, move |result| Event::PostListingCompleted {
                    token,
                    result: Box::new(result),
                });
            }
            Err(e) => {
                state.post.abandon();
                warn!(error = %e, "could not build listing request");
                model.push_alert(Alert::from(&e.with_title(POST_FAILED_TITLE)));
            }
        }
    }

    fn finish_post(model: &mut Model, token: FlightToken, result: HttpResult) {
        let Some(state) = Self::ready_state(model) else {
            debug!(%token, "dropping listing completion for a closed screen");
            return;
        };
        if !state.post.finish(token) {
            debug!(%token, "dropping stale listing completion");
            return;
        }

        let outcome = result
            .map_err(|e| AppError::from(e).with_title(POST_FAILED_TITLE))
            .and_then(|response| api::read_listing(&response));
        match outcome {
            Ok(listing) => {
                let receipt = state.record_listing(listing).clone();
                info!(item_id = ?receipt.item_id, status = ?receipt.status, "listing created");
                let mut alert = Alert::info(LISTING_CREATED_TITLE, receipt.confirmation_message());
                if let Some(url) = &receipt.listing_url {
                    alert = alert.with_action(AlertAction::OpenListing { url: url.clone() });
                }
                model.pending_confirmation = Some(receipt);
                model.push_alert(alert);
            }
            Err(err) => {
                warn!(error = %err, "listing failed");
                model.push_alert(Alert::from(&err));
            }
        }
    }

    fn open_listing(model: &mut Model, caps: &Capabilities) {
        let Some(url) = model
            .pending_confirmation
            .take()
            .and_then(|receipt| receipt.listing_url)
        else {
            debug!("no listing to open");
            return;
        };
        model
            .alerts
            .retain(|alert| !matches!(alert.action, Some(AlertAction::OpenListing { .. })));
        caps.browser.open(url, Event::ListingOpened);
    }

    fn share(model: &Model, caps: &Capabilities) {
        let Some(state) = model.screen.results().and_then(ResultsScreen::ready) else {
            return;
        };
        caps.share
            .share(state.share_title(), state.share_message(), Event::ShareCompleted);
    }

    fn check_health(model: &mut Model, caps: &Capabilities) {
        match api::health_request(&model.config.api) {
            Ok(request) => {
                caps.http.execute(request, |result| {
                    Event::HealthCheckCompleted(Box::new(result))
                });
            }
            Err(e) => {
                warn!(error = %e, "could not build health request");
                model.backend_reachable = Some(false);
            }
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let _span = tracing::debug_span!("update", event = event.name()).entered();

        match event {
            Event::Started { platform } => {
                info!(?platform, "app started");
                model.platform = platform;
                caps.camera
                    .request_camera_permission(Event::CameraPermissionResolved);
            }

            Event::Configure(config) => match config.api.validate() {
                Ok(()) => {
                    info!(base_url = %config.api.base_url, "configuration applied");
                    model.config = *config;
                    model.backend_reachable = None;
                }
                Err(e) => {
                    warn!(error = %e, "configuration rejected");
                    model.push_alert(Alert::from(&AppError::from(e)));
                }
            },

            Event::CameraPermissionResolved(result) => {
                let status = Self::permission_status(result);
                debug!(?status, "camera permission resolved");
                Self::transition_capture(model, CaptureEvent::CameraPermissionRecorded(status));
                if model.platform.requires_media_permission() {
                    caps.camera
                        .request_media_library_permission(Event::MediaPermissionResolved);
                } else {
                    Self::transition_capture(model, CaptureEvent::PermissionsResolved(None));
                }
            }

            Event::MediaPermissionResolved(result) => {
                let status = Self::permission_status(result);
                debug!(?status, "media library permission resolved");
                Self::transition_capture(model, CaptureEvent::PermissionsResolved(Some(status)));
            }

            Event::TakePictureRequested => Self::acquire_image(model, caps, false),
            Event::PickFromLibraryRequested => Self::acquire_image(model, caps, true),
            Event::ImageAcquired(result) => Self::image_acquired(model, result),

            Event::RetakeRequested => {
                Self::transition_capture(model, CaptureEvent::Retake);
            }

            Event::ConfirmRequested => Self::start_upload(model, caps),
            Event::UploadCompleted { token, result } => Self::finish_upload(model, token, *result),

            Event::NavigateBack => {
                if matches!(model.screen, Screen::Results(_)) {
                    debug!("leaving results, draft discarded");
                    model.screen = Screen::Capture;
                    model.pending_confirmation = None;
                }
            }

            Event::DraftEdited { field, value } => {
                if let Some(state) = Self::ready_state(model) {
                    state.edit(field, value);
                }
            }

            Event::PriceAdjusted(value) => {
                if let Some(state) = Self::ready_state(model) {
                    let selected = state.adjust_price(value);
                    debug!(requested = value, selected, "price adjusted");
                }
            }

            Event::ReanalyzeRequested => Self::start_reanalyze(model, caps),
            Event::ReanalyzeCompleted { token, result } => {
                Self::finish_reanalyze(model, token, *result);
            }

            Event::PostListingRequested => Self::start_post(model, caps),
            Event::PostListingCompleted { token, result } => {
                Self::finish_post(model, token, *result);
            }

            Event::OpenListingRequested => Self::open_listing(model, caps),
            Event::ListingOpened(result) => {
                if let Err(e) = result {
                    warn!(error = %e, "listing url could not be opened");
                    let err = AppError::from(e).with_title(BROWSER_FAILED_TITLE);
                    model.push_alert(Alert::from(&err));
                }
            }

            Event::ShareRequested => Self::share(model, caps),
            Event::ShareCompleted(outcome) => {
                debug!(shared = outcome == ShareOutcome::Shared, "share sheet closed");
            }

            Event::AlertDismissed => {
                if let Some(alert) = model.dismiss_alert() {
                    if matches!(alert.action, Some(AlertAction::OpenListing { .. })) {
                        model.pending_confirmation = None;
                    }
                }
            }

            Event::HealthCheckRequested => Self::check_health(model, caps),
            Event::HealthCheckCompleted(result) => {
                let reachable = match *result {
                    Ok(response) => response.is_success(),
                    Err(e) => {
                        debug!(error = %e, "health check failed");
                        false
                    }
                };
                info!(reachable, "backend health checked");
                model.backend_reachable = Some(reachable);
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        view::build(model)
    }
}
