use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opens URLs in the external browser.
#[derive(crux_core::macros::Capability)]
pub struct Browser<Ev> {
    context: CapabilityContext<BrowserOperation, Ev>,
}

impl<Ev> Browser<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<BrowserOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn open<F>(&self, url: impl Into<String>, make_event: F)
    where
        F: FnOnce(BrowserResult) -> Ev + Send + 'static,
    {
        let operation = BrowserOperation::OpenUrl { url: url.into() };
        self.context.spawn({
            let context = self.context.clone();
            async move {
                let result = context.request_from_shell(operation).await;
                context.update_app(make_event(result));
            }
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrowserOperation {
    OpenUrl { url: String },
}

impl Operation for BrowserOperation {
    type Output = BrowserResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum BrowserError {
    #[error("no application can open {url}")]
    NoHandler { url: String },

    #[error("failed to open url: {message}")]
    Failed { message: String },
}

pub type BrowserResult = Result<(), BrowserError>;
