//! Scripts the user's taps: the same events a mobile shell would send, in order.

use anyhow::{bail, Result};
use shared::model::{AlertKind, Platform};
use shared::view::{AlertView, ScreenView};
use shared::{AppConfig, Event};
use tracing::info;

use crate::args::AnalyzeArgs;
use crate::shell::Shell;

/// Dismisses every queued alert, returning them in the order they were shown.
async fn drain_alerts(shell: &mut Shell) -> Result<Vec<AlertView>> {
    let mut seen = Vec::new();
    while let Some(alert) = shell.view().alert {
        seen.push(alert);
        shell.dispatch(Event::AlertDismissed).await?;
    }
    Ok(seen)
}

fn first_error(alerts: &[AlertView]) -> Option<&AlertView> {
    alerts.iter().find(|a| a.kind == AlertKind::Error)
}

pub async fn start(shell: &mut Shell, config: AppConfig) -> Result<()> {
    shell.dispatch(Event::Configure(Box::new(config))).await?;
    shell
        .dispatch(Event::Started {
            platform: Platform::Desktop,
        })
        .await?;
    if let Some(error) = first_error(&drain_alerts(shell).await?) {
        bail!("{}: {}", error.title, error.message);
    }
    Ok(())
}

pub async fn health(shell: &mut Shell) -> Result<bool> {
    shell.dispatch(Event::HealthCheckRequested).await?;
    Ok(shell.view().backend_reachable.unwrap_or(false))
}

/// Runs capture, upload and the requested results-screen actions. Stops at the first failure.
pub async fn analyze(shell: &mut Shell, args: &AnalyzeArgs) -> Result<()> {
    shell.dispatch(Event::TakePictureRequested).await?;
    if let Some(error) = first_error(&drain_alerts(shell).await?) {
        bail!("{}: {}", error.title, error.message);
    }
    shell.dispatch(Event::ConfirmRequested).await?;

    let alerts = drain_alerts(shell).await?;
    if let Some(error) = first_error(&alerts) {
        bail!("{}: {}", error.title, error.message);
    }
    match shell.view().screen {
        ScreenView::Results(_) => info!("analysis complete"),
        ScreenView::ResultsError { message } => bail!(message),
        ScreenView::Capture(_) => bail!("no image was analyzed"),
    }

    for (field, value) in &args.edits {
        shell
            .dispatch(Event::DraftEdited {
                field: *field,
                value: value.clone(),
            })
            .await?;
    }
    if let Some(price) = args.price {
        shell.dispatch(Event::PriceAdjusted(price)).await?;
    }

    if args.reanalyze {
        shell.dispatch(Event::ReanalyzeRequested).await?;
        if let Some(error) = first_error(&drain_alerts(shell).await?) {
            bail!("{}: {}", error.title, error.message);
        }
    }

    if args.post {
        shell.dispatch(Event::PostListingRequested).await?;
        let confirmation = shell.view().alert;
        match confirmation {
            Some(alert) if alert.kind == AlertKind::Error => {
                bail!("{}: {}", alert.title, alert.message);
            }
            Some(alert) if args.open && alert.action_label.is_some() => {
                shell.dispatch(Event::OpenListingRequested).await?;
            }
            _ => {}
        }
        drain_alerts(shell).await?;
    }

    if args.share {
        shell.dispatch(Event::ShareRequested).await?;
    }
    Ok(())
}
