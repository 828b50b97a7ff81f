use serde_json::{Map, Value};

use crate::chain::descriptor::{ElementDescriptor, Properties, to_descriptors};

/// Render descriptors into the canonical element chain string.
///
/// Segments are `tag.class1.class2:key="value"...`, joined with `;`, target
/// first. Classes are sorted so class order never changes the output.
///
/// Attribute pairs are emitted in insertion order (`text`, `nth-child`,
/// `nth-of-type`, `href`, `attr_id`, then the element's own attributes).
/// Known discrepancy: the chain grouping backend historically built a
/// key-sorted copy of this map that was never emitted. The unsorted order
/// is what downstream grouping has seen, so it is kept.
pub fn render(descriptors: &[ElementDescriptor]) -> String {
    descriptors
        .iter()
        .map(render_segment)
        .collect::<Vec<_>>()
        .join(";")
}

/// Chain string straight from the host's per-ancestor property bags.
pub fn elements_chain_string(bags: &[Properties]) -> String {
    render(&to_descriptors(bags))
}

/// Stable grouping key for a rendered chain.
pub fn chain_fingerprint(chain: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(chain.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn render_segment(element: &ElementDescriptor) -> String {
    let mut segment = element.tag_name.clone().unwrap_or_default();

    if let Some(classes) = &element.attr_classes {
        let mut sorted = classes.clone();
        sorted.sort();
        for class in &sorted {
            segment.push('.');
            segment.push_str(&class.replace('"', ""));
        }
    }

    segment.push(':');
    for (key, value) in attribute_map(element) {
        segment.push_str(&format!(
            "{}=\"{}\"",
            escape_quotes(&key),
            escape_quotes(&js_display(&value))
        ));
    }

    segment
}

fn attribute_map(element: &ElementDescriptor) -> Map<String, Value> {
    let mut attrs = Map::new();

    if let Some(text) = element.text.as_ref().filter(|t| !t.is_empty()) {
        attrs.insert("text".into(), Value::from(text.clone()));
    }
    attrs.insert("nth-child".into(), Value::from(element.nth_child.unwrap_or(0)));
    attrs.insert("nth-of-type".into(), Value::from(element.nth_of_type.unwrap_or(0)));
    if let Some(href) = element.href.as_ref().filter(|h| !h.is_empty()) {
        attrs.insert("href".into(), Value::from(href.clone()));
    }
    if let Some(id) = element.attr_id.as_ref().filter(|i| !i.is_empty()) {
        attrs.insert("attr_id".into(), Value::from(id.clone()));
    }

    for (key, value) in &element.attributes {
        attrs.insert(key.clone(), value.clone());
    }

    attrs
}

/// Escape `"` as `\"`, leaving already-escaped quotes as they are.
pub fn escape_quotes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                chars.next();
                out.push_str("\\\"");
            }
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }

    out
}

/// String form of a bag value as the capturing page would print it.
fn js_display(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.is_finite() && f.fract() == 0.0 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                other => js_display(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".into(),
    }
}
