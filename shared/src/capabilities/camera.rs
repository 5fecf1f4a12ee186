use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_QUALITY: f32 = 0.5;

/// Camera, photo library and their runtime permission prompts.
#[derive(crux_core::macros::Capability)]
pub struct Camera<Ev> {
    context: CapabilityContext<CameraOperation, Ev>,
}

impl<Ev> Camera<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<CameraOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn request_camera_permission<F>(&self, make_event: F)
    where
        F: FnOnce(CameraResult) -> Ev + Send + 'static,
    {
        self.request(CameraOperation::RequestCameraPermission, make_event);
    }

    pub fn request_media_library_permission<F>(&self, make_event: F)
    where
        F: FnOnce(CameraResult) -> Ev + Send + 'static,
    {
        self.request(CameraOperation::RequestMediaLibraryPermission, make_event);
    }

    pub fn capture<F>(&self, config: CaptureConfig, make_event: F)
    where
        F: FnOnce(CameraResult) -> Ev + Send + 'static,
    {
        self.request(CameraOperation::Capture(config.validated()), make_event);
    }

    pub fn pick_from_library<F>(&self, config: CaptureConfig, make_event: F)
    where
        F: FnOnce(CameraResult) -> Ev + Send + 'static,
    {
        self.request(CameraOperation::PickFromLibrary(config.validated()), make_event);
    }

    fn request<F>(&self, operation: CameraOperation, make_event: F)
    where
        F: FnOnce(CameraResult) -> Ev + Send + 'static,
    {
        self.context.spawn({
            let context = self.context.clone();
            async move {
                let result = context.request_from_shell(operation).await;
                context.update_app(make_event(result));
            }
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CameraOperation {
    RequestCameraPermission,
    RequestMediaLibraryPermission,
    Capture(CaptureConfig),
    PickFromLibrary(CaptureConfig),
}

impl Operation for CameraOperation {
    type Output = CameraResult;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Let the user crop before the image is returned.
    pub allows_editing: bool,
    /// Compression factor in `0.0..=1.0`.
    pub quality: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            allows_editing: true,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl CaptureConfig {
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_editing(mut self, allows_editing: bool) -> Self {
        self.allows_editing = allows_editing;
        self
    }

    pub fn validated(mut self) -> Self {
        self.quality = if self.quality.is_finite() {
            self.quality.clamp(0.0, 1.0)
        } else {
            DEFAULT_QUALITY
        };
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Restricted,
    NotDetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub uri: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraOutput {
    Permission(PermissionStatus),
    Image(ImageAsset),
    Cancelled,
}

impl CameraOutput {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CameraOutput::Cancelled)
    }

    pub fn permission(&self) -> Option<PermissionStatus> {
        match self {
            CameraOutput::Permission(status) => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("camera unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("capture failed: {reason}")]
    CaptureFailed { reason: String },

    #[error("another capture is already in progress")]
    Busy,

    #[error("not supported on this platform")]
    NotSupported,

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CameraError {
    pub fn is_permission_error(&self) -> bool {
        matches!(self, CameraError::PermissionDenied)
    }
}

pub type CameraResult = Result<CameraOutput, CameraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_config_defaults() {
        let config = CaptureConfig::default();
        assert!(config.allows_editing);
        assert!((config.quality - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_capture_config_validation() {
        assert_eq!(CaptureConfig::default().with_quality(3.0).validated().quality, 1.0);
        assert_eq!(CaptureConfig::default().with_quality(-1.0).validated().quality, 0.0);
        assert_eq!(
            CaptureConfig::default().with_quality(f32::NAN).validated().quality,
            DEFAULT_QUALITY
        );
    }

    #[test]
    fn test_camera_output_helpers() {
        assert!(CameraOutput::Cancelled.is_cancelled());
        assert_eq!(
            CameraOutput::Permission(PermissionStatus::Denied).permission(),
            Some(PermissionStatus::Denied)
        );
        let image = CameraOutput::Image(ImageAsset {
            uri: "file:///tmp/a.jpg".into(),
            width: None,
            height: None,
        });
        assert!(!image.is_cancelled());
        assert_eq!(image.permission(), None);
    }

    #[test]
    fn test_permission_helpers() {
        assert!(PermissionStatus::Granted.is_granted());
        assert!(!PermissionStatus::Restricted.is_granted());
        assert!(CameraError::PermissionDenied.is_permission_error());
        assert!(!CameraError::Busy.is_permission_error());
    }
}
