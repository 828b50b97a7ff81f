use serde_json::Value;
use tracing::debug;

use crate::capture::properties::{element_properties, element_text};
use crate::chain::descriptor::Properties;
use crate::chain::render::elements_chain_string;
use crate::dom::node::{DomNode, HostWindow, has_class, is_element_node, is_tag, logical_parent};
use crate::eligibility::config::CaptureOptions;
use crate::eligibility::filter::{DomEvent, is_capture_eligible};
use crate::privacy::scrubber::is_text_safe;
use crate::privacy::sensitivity::{NO_CAPTURE_CLASS, should_capture_element};

pub const CE_VERSION: i64 = 1;

/// Result of running one interaction through the capture pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// Rejected by the eligibility gate
    Ineligible,
    /// Something on the path carries `ph-no-capture`
    Excluded,
    Captured(Properties),
}

impl CaptureOutcome {
    pub fn into_properties(self) -> Option<Properties> {
        match self {
            CaptureOutcome::Captured(props) => Some(props),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaptureOutcome::Ineligible => "ineligible",
            CaptureOutcome::Excluded => "excluded",
            CaptureOutcome::Captured(_) => "captured",
        }
    }
}

/// Target first, then each logical ancestor up to but not including `<body>`.
pub fn element_path<N: DomNode>(target: &N) -> Vec<N> {
    let mut path = vec![target.clone()];
    let mut current = target.clone();

    while let Some(parent) = logical_parent(&current) {
        if !is_element_node(&parent) || is_tag(&parent, "body") {
            break;
        }
        path.push(parent.clone());
        current = parent;
    }

    path
}

/// Gate, describe and serialize one interaction in a single synchronous pass.
pub fn capture_interaction<N, W>(
    window: Option<&W>,
    event: &DomEvent,
    target: Option<&N>,
    options: &CaptureOptions,
) -> CaptureOutcome
where
    N: DomNode,
    W: HostWindow<N>,
{
    if !is_capture_eligible(window, event, target, Some(&options.autocapture)) {
        return CaptureOutcome::Ineligible;
    }
    let Some(target) = target else {
        return CaptureOutcome::Ineligible;
    };

    let path = element_path(target);
    let mut href: Option<String> = None;
    let mut explicit_no_capture = false;
    let mut bags: Vec<Properties> = Vec::with_capacity(path.len());

    for el in &path {
        if is_tag(el, "a") {
            // Outermost anchor wins.
            href = el
                .get_attribute("href")
                .filter(|h| should_capture_element(el) && is_text_safe(h));
        }
        if has_class(el, NO_CAPTURE_CLASS) {
            explicit_no_capture = true;
        }
        bags.push(element_properties(el, options));
    }

    if explicit_no_capture {
        debug!("interaction path carries {}", NO_CAPTURE_CLASS);
        return CaptureOutcome::Excluded;
    }

    if let Some(first) = bags.first_mut() {
        if !options.mask_all_text {
            let text = element_text(target);
            if !text.is_empty() {
                first.insert("$el_text".into(), Value::from(text));
            }
        }
        if let Some(href) = href {
            first.insert("attr__href".into(), Value::from(href));
        }
    }

    let chain = elements_chain_string(&bags);

    let mut props = Properties::new();
    props.insert("$event_type".into(), Value::from(event.event_type.clone()));
    props.insert("$ce_version".into(), Value::from(CE_VERSION));
    props.insert("$elements_chain".into(), Value::from(chain));
    props.insert(
        "$elements".into(),
        Value::Array(bags.into_iter().map(Value::Object).collect()),
    );

    CaptureOutcome::Captured(props)
}
