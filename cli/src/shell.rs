//! A headless shell: drives the core and answers every effect it emits.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crux_core::Core;
use shared::capabilities::{
    BrowserOperation, CameraOperation, CameraOutput, HttpOperation, ImageAsset, PermissionStatus,
    ShareOperation, ShareOutcome,
};
use shared::{App, Capabilities, Effect, Event, ViewModel};
use tracing::{debug, info};
use url::Url;

use crate::http::HttpClient;
use crate::render;

/// Something the shell did on the core's behalf that the user should see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Shared { title: String, message: String },
    OpenedUrl(String),
}

pub struct Shell {
    core: Core<Effect, App>,
    http: HttpClient,
    /// What the "camera" returns. `None` behaves like a dismissed picker.
    image: Option<PathBuf>,
    json: bool,
    last_printed: Option<ViewModel>,
    outputs: Vec<Output>,
}

impl Shell {
    pub fn new(http: HttpClient, image: Option<&Path>, json: bool) -> Result<Self> {
        let image = image
            .map(|path| {
                path.canonicalize()
                    .with_context(|| format!("cannot read image {}", path.display()))
            })
            .transpose()?;
        Ok(Self {
            core: Core::new::<Capabilities>(),
            http,
            image,
            json,
            last_printed: None,
            outputs: Vec::new(),
        })
    }

    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Sends `event` and keeps answering effects until the core has nothing left to ask.
    pub async fn dispatch(&mut self, event: Event) -> Result<()> {
        debug!(event = event.name(), "dispatching");
        let mut queue: VecDeque<Effect> = self.core.process_event(event).into();

        while let Some(effect) = queue.pop_front() {
            let next = match effect {
                Effect::Render(_) => {
                    self.print_view()?;
                    Vec::new()
                }
                Effect::Http(mut request) => {
                    let HttpOperation::Execute(http_request) = &request.operation;
                    let result = self.http.execute(http_request).await;
                    self.core.resolve(&mut request, result)
                }
                Effect::Camera(mut request) => {
                    let output = self.camera(&request.operation)?;
                    self.core.resolve(&mut request, Ok(output))
                }
                Effect::Share(mut request) => {
                    let ShareOperation::Share { title, message } = &request.operation;
                    println!("--- share: {title} ---\n{message}\n---");
                    self.outputs.push(Output::Shared {
                        title: title.clone(),
                        message: message.clone(),
                    });
                    self.core.resolve(&mut request, ShareOutcome::Shared)
                }
                Effect::Browser(mut request) => {
                    let BrowserOperation::OpenUrl { url } = &request.operation;
                    println!("open in browser: {url}");
                    self.outputs.push(Output::OpenedUrl(url.clone()));
                    self.core.resolve(&mut request, Ok(()))
                }
            };
            queue.extend(next);
        }
        Ok(())
    }

    /// Permissions are always granted on a desktop; the camera hands back the configured file.
    fn camera(&self, operation: &CameraOperation) -> Result<CameraOutput> {
        let output = match operation {
            CameraOperation::RequestCameraPermission
            | CameraOperation::RequestMediaLibraryPermission => {
                CameraOutput::Permission(PermissionStatus::Granted)
            }
            CameraOperation::Capture(_) | CameraOperation::PickFromLibrary(_) => {
                match &self.image {
                    Some(path) => {
                        let uri = Url::from_file_path(path)
                            .map_err(|()| anyhow::anyhow!("not an absolute path: {}", path.display()))?;
                        info!(%uri, "image selected");
                        CameraOutput::Image(ImageAsset {
                            uri: uri.to_string(),
                            width: None,
                            height: None,
                        })
                    }
                    None => CameraOutput::Cancelled,
                }
            }
        };
        Ok(output)
    }

    /// Renders are frequent; only changed views are printed.
    fn print_view(&mut self) -> Result<()> {
        let view = self.core.view();
        if self.last_printed.as_ref() == Some(&view) {
            return Ok(());
        }
        if self.json {
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            println!("{}", render::render(&view));
        }
        self.last_printed = Some(view);
        Ok(())
    }
}
