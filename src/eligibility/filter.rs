use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::node::{DomNode, HostWindow, is_document_fragment, is_element_node, is_tag, lower_tag};
use crate::eligibility::config::AutocaptureConfig;

/// Tags that are interactive controls on their own.
pub const AUTOCAPTURE_COMPATIBLE_ELEMENTS: [&str; 7] =
    ["a", "button", "form", "input", "select", "textarea", "label"];

/// The interaction being considered for capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomEvent {
    #[serde(rename = "type")]
    pub event_type: String,
}

impl DomEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
        }
    }

    fn is(&self, kind: &str) -> bool {
        self.event_type == kind
    }
}

pub fn is_compatible_tag(tag: &str) -> bool {
    AUTOCAPTURE_COMPATIBLE_ELEMENTS.contains(&tag)
}

fn has_pointer_cursor<N: DomNode, W: HostWindow<N>>(window: &W, el: &N) -> bool {
    window.computed_style(el, "cursor").as_deref() == Some("pointer")
}

/// Decide whether an interaction on `target` qualifies for autocapture.
///
/// Reads computed styles of the target and its ancestors, so call it once
/// per interaction.
pub fn is_capture_eligible<N, W>(
    window: Option<&W>,
    event: &DomEvent,
    target: Option<&N>,
    config: Option<&AutocaptureConfig>,
) -> bool
where
    N: DomNode,
    W: HostWindow<N>,
{
    let (window, el) = match (window, target) {
        (Some(w), Some(el)) if w.has_document() => (w, el),
        _ => return false,
    };

    if is_tag(el, "html") || !is_element_node(el) {
        return false;
    }

    if let Some(config) = config {
        if !passes_allowlists(window, event, el, config) {
            return false;
        }
    }

    let parent_is_useful = has_useful_ancestor(window, el);

    if has_pointer_cursor(window, el) && event.is("click") {
        return true;
    }

    let tag = lower_tag(el);
    match tag.as_str() {
        "html" => false,
        "form" => event.is("submit"),
        "input" | "select" | "textarea" => event.is("change") || event.is("click"),
        _ => {
            if parent_is_useful {
                return event.is("click");
            }
            event.is("click")
                && (is_compatible_tag(&tag)
                    || el.get_attribute("contenteditable").as_deref() == Some("true"))
        }
    }
}

fn passes_allowlists<N, W>(window: &W, event: &DomEvent, el: &N, config: &AutocaptureConfig) -> bool
where
    N: DomNode,
    W: HostWindow<N>,
{
    if let Some(patterns) = &config.url_allowlist {
        let url = window.location_href();
        if !patterns.iter().any(|p| p.matches(url)) {
            debug!(url, "rejected by url allowlist");
            return false;
        }
    }

    if let Some(events) = &config.dom_event_allowlist {
        if !events.iter().any(|e| *e == event.event_type) {
            debug!(event = %event.event_type, "rejected by event allowlist");
            return false;
        }
    }

    if let Some(tags) = &config.element_allowlist {
        let tag = lower_tag(el);
        if !tags.iter().any(|t| *t == tag) {
            debug!(tag = %tag, "rejected by element allowlist");
            return false;
        }
    }

    if let Some(selectors) = &config.css_selector_allowlist {
        if !selectors.iter().any(|s| el.matches_selector(s)) {
            debug!("rejected by css selector allowlist");
            return false;
        }
    }

    true
}

/// Walk up to `<body>` looking for a control or a pointer cursor on any
/// ancestor. A shadow host reached from its shadow root is stepped over
/// without being tested.
fn has_useful_ancestor<N, W>(window: &W, el: &N) -> bool
where
    N: DomNode,
    W: HostWindow<N>,
{
    let mut useful = false;
    let mut current = el.clone();

    while let Some(parent) = current.parent_node() {
        if is_tag(&current, "body") {
            break;
        }
        if is_document_fragment(&parent) {
            match parent.host() {
                Some(host) => {
                    current = host;
                    continue;
                }
                None => break,
            }
        }
        if !is_element_node(&parent) {
            break;
        }

        if is_compatible_tag(&lower_tag(&parent)) || has_pointer_cursor(window, &parent) {
            useful = true;
        }

        current = parent;
    }

    useful
}
