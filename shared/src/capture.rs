//! Capture screen state: permissions, the held image and the upload slot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::PermissionStatus;
use crate::flight::{FlightError, FlightToken, InFlight};
use crate::model::ImageRef;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureMode {
    #[default]
    Initial,
    Previewing,
    Uploading,
}

impl CaptureMode {
    pub fn name(self) -> &'static str {
        match self {
            CaptureMode::Initial => "initial",
            CaptureMode::Previewing => "previewing",
            CaptureMode::Uploading => "uploading",
        }
    }
}

/// Grant outcomes are kept for display only. A denial never blocks capture; the
/// platform reports it when the camera or picker is actually opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSummary {
    pub camera: Option<PermissionStatus>,
    pub media_library: Option<PermissionStatus>,
}

impl PermissionSummary {
    pub fn all_granted(&self) -> bool {
        let media_ok = self.media_library.map_or(true, |s| s.is_granted());
        self.camera.is_some_and(|s| s.is_granted()) && media_ok
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureEvent {
    CameraPermissionRecorded(PermissionStatus),
    /// `None` on platforms without a separate media-library prompt.
    PermissionsResolved(Option<PermissionStatus>),
    ImageAcquired(ImageRef),
    AcquireCancelled,
    Retake,
    UploadStarted,
    UploadFailed(FlightToken),
    UploadSucceeded(FlightToken),
}

impl CaptureEvent {
    fn name(&self) -> &'static str {
        match self {
            CaptureEvent::CameraPermissionRecorded(_) => "record camera permission",
            CaptureEvent::PermissionsResolved(_) => "resolve permissions",
            CaptureEvent::ImageAcquired(_) => "acquire image",
            CaptureEvent::AcquireCancelled => "cancel acquisition",
            CaptureEvent::Retake => "retake",
            CaptureEvent::UploadStarted => "start upload",
            CaptureEvent::UploadFailed(_) => "fail upload",
            CaptureEvent::UploadSucceeded(_) => "finish upload",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {action} while {mode}")]
    NotAllowed {
        action: &'static str,
        mode: &'static str,
    },

    #[error("no image is held")]
    NoImage,

    #[error("upload completion {0} does not match the request in flight")]
    StaleUpload(FlightToken),

    #[error(transparent)]
    Busy(#[from] FlightError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureState {
    pub mode: CaptureMode,
    pub image: Option<ImageRef>,
    pub permissions: PermissionSummary,
    pub controls_unlocked: bool,
    pub upload: InFlight,
}

impl CaptureState {
    /// Returns the next state, or an error with `self` left untouched.
    pub fn apply(&self, event: CaptureEvent) -> Result<CaptureState, TransitionError> {
        let mut next = self.clone();
        let refuse = || TransitionError::NotAllowed {
            action: event.name(),
            mode: self.mode.name(),
        };

        match (&event, self.mode) {
            (CaptureEvent::CameraPermissionRecorded(status), _) => {
                next.permissions.camera = Some(*status);
            }
            (CaptureEvent::PermissionsResolved(media), _) => {
                next.permissions.media_library = *media;
                next.controls_unlocked = true;
            }
            (CaptureEvent::ImageAcquired(_), CaptureMode::Uploading)
            | (CaptureEvent::AcquireCancelled, CaptureMode::Uploading)
            | (CaptureEvent::Retake, CaptureMode::Uploading) => return Err(refuse()),
            (CaptureEvent::ImageAcquired(image), _) => {
                next.image = Some(image.clone());
                next.mode = CaptureMode::Previewing;
            }
            (CaptureEvent::AcquireCancelled, _) => {}
            (CaptureEvent::Retake, _) => {
                next.image = None;
                next.mode = CaptureMode::Initial;
            }
            (CaptureEvent::UploadStarted, CaptureMode::Previewing) => {
                if next.image.is_none() {
                    return Err(TransitionError::NoImage);
                }
                next.upload.begin()?;
                next.mode = CaptureMode::Uploading;
            }
            (CaptureEvent::UploadStarted, _) => return Err(refuse()),
            (CaptureEvent::UploadFailed(token), CaptureMode::Uploading) => {
                if !next.upload.finish(*token) {
                    return Err(TransitionError::StaleUpload(*token));
                }
                next.mode = CaptureMode::Previewing;
            }
            (CaptureEvent::UploadSucceeded(token), CaptureMode::Uploading) => {
                if !next.upload.finish(*token) {
                    return Err(TransitionError::StaleUpload(*token));
                }
                next.image = None;
                next.mode = CaptureMode::Initial;
            }
            (CaptureEvent::UploadFailed(token), _) | (CaptureEvent::UploadSucceeded(token), _) => {
                return Err(TransitionError::StaleUpload(*token));
            }
        }

        Ok(next)
    }

    /// Whether the camera or picker may be opened right now.
    pub fn can_acquire(&self) -> bool {
        self.controls_unlocked && self.mode != CaptureMode::Uploading
    }

    pub fn is_uploading(&self) -> bool {
        self.mode == CaptureMode::Uploading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn previewing() -> CaptureState {
        CaptureState::default()
            .apply(CaptureEvent::ImageAcquired(ImageRef::new("file:///tmp/a.jpg")))
            .unwrap()
    }

    #[test]
    fn test_permissions_unlock_regardless_of_grant() {
        let state = CaptureState::default()
            .apply(CaptureEvent::CameraPermissionRecorded(PermissionStatus::Denied))
            .unwrap();
        assert!(!state.controls_unlocked);

        let state = state
            .apply(CaptureEvent::PermissionsResolved(Some(PermissionStatus::Denied)))
            .unwrap();
        assert!(state.controls_unlocked);
        assert!(state.can_acquire());
        assert!(!state.permissions.all_granted());
    }

    #[test]
    fn test_web_has_no_media_permission() {
        let state = CaptureState::default()
            .apply(CaptureEvent::CameraPermissionRecorded(PermissionStatus::Granted))
            .unwrap()
            .apply(CaptureEvent::PermissionsResolved(None))
            .unwrap();
        assert!(state.permissions.all_granted());
    }

    #[test]
    fn test_acquire_enters_preview() {
        let state = previewing();
        assert_eq!(state.mode, CaptureMode::Previewing);
        assert_eq!(state.image.as_ref().map(ImageRef::as_str), Some("file:///tmp/a.jpg"));
    }

    #[test]
    fn test_cancel_leaves_state_unchanged() {
        let state = previewing();
        assert_eq!(state.apply(CaptureEvent::AcquireCancelled).unwrap(), state);

        let initial = CaptureState::default();
        assert_eq!(initial.apply(CaptureEvent::AcquireCancelled).unwrap(), initial);
    }

    #[test]
    fn test_retake_is_idempotent() {
        let once = previewing().apply(CaptureEvent::Retake).unwrap();
        let twice = once.apply(CaptureEvent::Retake).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.mode, CaptureMode::Initial);
        assert!(twice.image.is_none());
    }

    #[test]
    fn test_upload_failure_returns_to_preview_with_image() {
        let uploading = previewing().apply(CaptureEvent::UploadStarted).unwrap();
        assert!(uploading.is_uploading());
        let token = uploading.upload.current().unwrap();

        let failed = uploading.apply(CaptureEvent::UploadFailed(token)).unwrap();
        assert_eq!(failed.mode, CaptureMode::Previewing);
        assert!(failed.image.is_some());
        assert!(!failed.upload.is_busy());
    }

    #[test]
    fn test_upload_success_clears_image() {
        let uploading = previewing().apply(CaptureEvent::UploadStarted).unwrap();
        let token = uploading.upload.current().unwrap();

        let done = uploading.apply(CaptureEvent::UploadSucceeded(token)).unwrap();
        assert_eq!(done.mode, CaptureMode::Initial);
        assert!(done.image.is_none());
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        assert!(matches!(
            CaptureState::default().apply(CaptureEvent::UploadStarted),
            Err(TransitionError::NotAllowed { .. })
        ));

        let uploading = previewing().apply(CaptureEvent::UploadStarted).unwrap();
        assert!(matches!(
            uploading.apply(CaptureEvent::Retake),
            Err(TransitionError::NotAllowed { mode: "uploading", .. })
        ));
        assert!(matches!(
            uploading.apply(CaptureEvent::UploadFailed(FlightToken::new())),
            Err(TransitionError::StaleUpload(_))
        ));
        assert!(!uploading.can_acquire());
    }

    #[test]
    fn test_late_completion_after_retake_is_stale() {
        let uploading = previewing().apply(CaptureEvent::UploadStarted).unwrap();
        let token = uploading.upload.current().unwrap();
        let idle = CaptureState::default();
        assert!(matches!(
            idle.apply(CaptureEvent::UploadSucceeded(token)),
            Err(TransitionError::StaleUpload(t)) if t == token
        ));
    }
}
