mod browser;
mod camera;
mod http;
mod share;

pub use self::browser::{Browser, BrowserError, BrowserOperation, BrowserResult};
pub use self::camera::{
    Camera, CameraError, CameraOperation, CameraOutput, CameraResult, CaptureConfig, ImageAsset,
    PermissionStatus, DEFAULT_QUALITY,
};
pub use self::http::{
    FormPart, Http, HttpBody, HttpError, HttpHeaders, HttpMethod, HttpOperation, HttpRequest,
    HttpResponse, HttpResult, ValidatedUrl, MAX_TIMEOUT_MS,
};
pub use self::share::{Share, ShareOperation, ShareOutcome};

// Crux's built-in Render capability covers view updates.
pub use crux_core::render::Render;

// The `Effect` derive names the app type `App` in the code it generates.
#[allow(unused_imports)]
use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub camera: Camera<Event>,
    pub share: Share<Event>,
    pub browser: Browser<Event>,
}
