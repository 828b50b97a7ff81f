use std::sync::LazyLock;

use regex::Regex;

use crate::dom::node::{DomNode, PropertyValue, class_names, has_class, is_tag, logical_parent};

pub const SENSITIVE_CLASS: &str = "ph-sensitive";
pub const NO_CAPTURE_CLASS: &str = "ph-no-capture";
pub const INCLUDE_CLASS: &str = "ph-include";

/// Input types whose value is never typed by the user.
const SAFE_INPUT_TYPES: [&str; 4] = ["button", "checkbox", "submit", "reset"];

// `^` only anchors the first alternative; the rest match anywhere.
static SENSITIVE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^cc|cardnum|ccnum|creditcard|csc|cvc|cvv|exp|pass|pwd|routing|seccode|securitycode|securitynum|socialsec|socsec|ssn",
    )
    .expect("sensitive name regex")
});

/// Whether the element or any ancestor below `<body>` opted out of capture.
pub fn is_element_excluded<N: DomNode>(el: &N) -> bool {
    let mut current = Some(el.clone());

    while let Some(node) = current {
        if node.parent_node().is_none() || is_tag(&node, "body") {
            break;
        }

        let classes = class_names(&node);
        if classes
            .iter()
            .any(|c| c == SENSITIVE_CLASS || c == NO_CAPTURE_CLASS)
        {
            return true;
        }

        current = logical_parent(&node);
    }

    false
}

/// Full element gate: ancestor exclusion, `ph-include` override, then
/// type and name heuristics.
pub fn should_capture_element<N: DomNode>(el: &N) -> bool {
    if is_element_excluded(el) {
        return false;
    }

    if has_class(el, INCLUDE_CLASS) {
        return true;
    }

    if let Some(kind) = el.property("type") {
        if let Some(kind) = kind.as_text() {
            let kind = kind.to_lowercase();
            if kind == "hidden" || kind == "password" {
                return false;
            }
        }
    }

    // Payment and identity field names, checked on `name` then `id`.
    if let Some(name) = field_name(el) {
        let stripped: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if SENSITIVE_NAME_RE.is_match(&stripped) {
            return false;
        }
    }

    true
}

fn field_name<N: DomNode>(el: &N) -> Option<String> {
    let pick = |prop: &str| -> Option<Option<String>> {
        match el.property(prop)? {
            PropertyValue::Text(s) if s.is_empty() => None,
            PropertyValue::Text(s) => Some(Some(s)),
            PropertyValue::Shadowed => Some(None),
        }
    };

    // A shadowed property is truthy in the host runtime, so it still stops
    // the fallback chain while yielding no usable string.
    pick("name").or_else(|| pick("id")).flatten()
}

/// Elements whose content is withheld even when the element is captured.
pub fn is_sensitive_element<N: DomNode>(el: &N) -> bool {
    if is_tag(el, "input") {
        let kind = el
            .property("type")
            .and_then(|p| p.as_text().map(str::to_string))
            .unwrap_or_default();
        if !SAFE_INPUT_TYPES.contains(&kind.as_str()) {
            return true;
        }
    }

    is_tag(el, "select")
        || is_tag(el, "textarea")
        || el.get_attribute("contenteditable").as_deref() == Some("true")
}

/// Angular view-encapsulation attributes change on every build.
pub fn is_angular_style_attr(name: &str) -> bool {
    name.starts_with("_ngcontent") || name.starts_with("_nghost")
}
