use std::fmt::Write;

use shared::model::AlertKind;
use shared::view::{CaptureView, ResultsView, ScreenView};
use shared::ViewModel;

pub fn render(view: &ViewModel) -> String {
    let mut out = format!("== {} ==\n", view.title);
    match &view.screen {
        ScreenView::Capture(capture) => render_capture(&mut out, capture),
        ScreenView::Results(results) => render_results(&mut out, results),
        ScreenView::ResultsError { message } => {
            let _ = writeln!(out, "{message}");
        }
    }
    if let Some(reachable) = view.backend_reachable {
        let _ = writeln!(
            out,
            "backend: {}",
            if reachable { "reachable" } else { "unreachable" }
        );
    }
    if let Some(alert) = &view.alert {
        let marker = match alert.kind {
            AlertKind::Advisory => "note",
            AlertKind::Error => "error",
            AlertKind::Info => "info",
        };
        let _ = writeln!(out, "[{marker}] {}: {}", alert.title, alert.message);
        if let Some(label) = &alert.action_label {
            let _ = writeln!(out, "       ({label} available)");
        }
        if alert.can_retry {
            let _ = writeln!(out, "       (try again)");
        }
    }
    out.trim_end().to_string()
}

fn render_capture(out: &mut String, capture: &CaptureView) {
    let state = if capture.is_uploading {
        "uploading..."
    } else if !capture.controls_enabled {
        "waiting for permissions"
    } else {
        match &capture.image_uri {
            Some(_) => "preview",
            None => "ready to capture",
        }
    };
    let _ = writeln!(out, "status: {state}");
    if let Some(uri) = &capture.image_uri {
        let _ = writeln!(out, "image: {uri}");
    }
    if capture.controls_enabled && !capture.all_permissions_granted {
        let _ = writeln!(out, "permissions: limited");
    }
}

fn render_results(out: &mut String, results: &ResultsView) {
    let _ = writeln!(out, "item:        {}", results.item);
    let _ = writeln!(out, "brand:       {}", results.brand);
    let _ = writeln!(out, "condition:   {}", results.condition);
    let _ = writeln!(out, "description: {}", results.description);
    let _ = writeln!(out, "quality:     {}", results.image_quality);
    let _ = writeln!(
        out,
        "price:       {} (range {})",
        results.price_label, results.range_label
    );
    if !results.keywords.is_empty() {
        let _ = writeln!(out, "keywords:    {}", results.keywords.join(", "));
    }
    if results.is_reanalyzing {
        let _ = writeln!(out, "reanalyzing...");
    }
    if results.is_posting {
        let _ = writeln!(out, "posting...");
    }
    if let Some(message) = &results.listing_message {
        let _ = writeln!(out, "{message}");
    }
}
