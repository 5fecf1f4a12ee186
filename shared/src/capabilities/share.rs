use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

/// The platform's native share sheet.
#[derive(crux_core::macros::Capability)]
pub struct Share<Ev> {
    context: CapabilityContext<ShareOperation, Ev>,
}

impl<Ev> Share<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<ShareOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn share<F>(&self, title: impl Into<String>, message: impl Into<String>, make_event: F)
    where
        F: FnOnce(ShareOutcome) -> Ev + Send + 'static,
    {
        let operation = ShareOperation::Share {
            title: title.into(),
            message: message.into(),
        };
        self.context.spawn({
            let context = self.context.clone();
            async move {
                let outcome = context.request_from_shell(operation).await;
                context.update_app(make_event(outcome));
            }
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareOperation {
    Share { title: String, message: String },
}

impl Operation for ShareOperation {
    type Output = ShareOutcome;
}

/// Share sheets never fail in a way the user sees; they are either used or dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareOutcome {
    Shared,
    Dismissed,
}
