use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::text::extract::truncate_chars;

/// Property bag collected for one element (insertion-ordered).
pub type Properties = Map<String, Value>;

/// Prefix marking a bag key as a captured DOM attribute.
pub const ATTRIBUTE_PREFIX: &str = "attr__";

pub const MAX_DESCRIPTOR_TEXT_CHARS: usize = 400;
pub const MAX_HREF_CHARS: usize = 2048;

/// Bag keys promoted to named descriptor fields.
const PROMOTED_ATTRIBUTES: [&str; 3] = ["attr__class", "attr__href", "attr__id"];

/// Normalized record of one element of a chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr_classes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nth_child: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nth_of_type: Option<i64>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ElementDescriptor {
    pub fn tag(tag_name: &str) -> Self {
        Self {
            tag_name: Some(tag_name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_classes(mut self, classes: &[&str]) -> Self {
        self.attr_classes = Some(classes.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }
}

/// One descriptor per ancestor bag, in the same (target-first) order.
pub fn to_descriptors(bags: &[Properties]) -> Vec<ElementDescriptor> {
    bags.iter().map(to_descriptor).collect()
}

pub fn to_descriptor(bag: &Properties) -> ElementDescriptor {
    let string_at = |key: &str| bag.get(key).and_then(Value::as_str).map(str::to_string);

    let attributes = bag
        .iter()
        .filter(|(key, _)| {
            key.starts_with(ATTRIBUTE_PREFIX) && !PROMOTED_ATTRIBUTES.contains(&key.as_str())
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    ElementDescriptor {
        text: string_at("$el_text").map(|t| truncate_chars(&t, MAX_DESCRIPTOR_TEXT_CHARS).to_string()),
        tag_name: string_at("tag_name"),
        href: string_at("attr__href").map(|h| truncate_chars(&h, MAX_HREF_CHARS).to_string()),
        attr_id: string_at("attr__id"),
        attr_classes: extract_attr_classes(bag),
        nth_child: bag.get("nth_child").and_then(as_index),
        nth_of_type: bag.get("nth_of_type").and_then(as_index),
        attributes,
    }
}

fn extract_attr_classes(bag: &Properties) -> Option<Vec<String>> {
    match bag.get("attr__class")? {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect(),
        ),
        Value::String(s) if s.trim().is_empty() => None,
        // Repeated separators would otherwise render as an empty `.` class.
        Value::String(s) => Some(
            s.split(' ')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

/// Sibling index from a bag value. Hosts that stringify positions send
/// `"2"` rather than `2`; both read as 2.
fn as_index(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        _ => value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
    }
}
