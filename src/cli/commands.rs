use crate::capture::pipeline::{CaptureOutcome, capture_interaction};
use crate::chain::descriptor::Properties;
use crate::chain::render::{chain_fingerprint, elements_chain_string};
use crate::dom::memory::PageSnapshot;
use crate::dom::node::DomNode;
use crate::eligibility::config::CaptureOptions;
use crate::eligibility::filter::{DomEvent, is_capture_eligible};
use crate::error::CaptureError;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::CaptureTraceEvent;

// ============================================================================
// check subcommand
// ============================================================================

pub fn cmd_check(
    snapshot_path: &str,
    target: &str,
    event: &str,
    url: Option<&str>,
    options: &CaptureOptions,
) -> Result<String, CaptureError> {
    let snapshot = load_snapshot(snapshot_path)?;
    let (dom, mut window) = snapshot.build();
    if let Some(url) = url {
        window.href = url.to_string();
    }
    let el = dom.resolve(target)?;

    let eligible = is_capture_eligible(
        Some(&window),
        &DomEvent::new(event),
        Some(&el),
        Some(&options.autocapture),
    );

    Ok(if eligible { "eligible" } else { "ineligible" }.to_string())
}

// ============================================================================
// capture subcommand
// ============================================================================

pub fn cmd_capture(
    snapshot_path: &str,
    target: &str,
    event: &str,
    chain_only: bool,
    options: &CaptureOptions,
    tracer: &TraceLogger,
) -> Result<String, CaptureError> {
    let snapshot = load_snapshot(snapshot_path)?;
    let (dom, window) = snapshot.build();
    let el = dom.resolve(target)?;
    let event = DomEvent::new(event);

    let outcome = capture_interaction(Some(&window), &event, Some(&el), options);
    tracer.log(&CaptureTraceEvent::now(&event, el.tag_name().map(|t| t.to_lowercase())).with_outcome(&outcome));

    match outcome {
        CaptureOutcome::Captured(props) if chain_only => Ok(props
            .get("$elements_chain")
            .and_then(|c| c.as_str())
            .unwrap_or_default()
            .to_string()),
        CaptureOutcome::Captured(props) => serde_json::to_string_pretty(&props).map_err(|source| {
            CaptureError::JsonParse {
                context: "captured properties".into(),
                source,
            }
        }),
        other => Ok(format!("not captured ({})", other.label())),
    }
}

// ============================================================================
// render subcommand
// ============================================================================

pub fn cmd_render(bags_path: &str, fingerprint: bool) -> Result<String, CaptureError> {
    let bags = load_bags(bags_path)?;
    let chain = elements_chain_string(&bags);

    if fingerprint {
        Ok(format!("{}\n{}", chain, chain_fingerprint(&chain)))
    } else {
        Ok(chain)
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn load_snapshot(path: &str) -> Result<PageSnapshot, CaptureError> {
    let content = read_file(path)?;
    PageSnapshot::from_json(&content)
}

/// Load a JSON array of property bags.
pub fn load_bags(path: &str) -> Result<Vec<Properties>, CaptureError> {
    let content = read_file(path)?;
    serde_json::from_str(&content).map_err(|source| CaptureError::JsonParse {
        context: format!("property bags in {}", path),
        source,
    })
}

fn read_file(path: &str) -> Result<String, CaptureError> {
    std::fs::read_to_string(path).map_err(|source| CaptureError::Io {
        path: path.to_string(),
        source,
    })
}
