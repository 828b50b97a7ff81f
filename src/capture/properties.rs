use serde_json::Value;

use crate::chain::descriptor::{ATTRIBUTE_PREFIX, Properties};
use crate::dom::node::{DomNode, class_names, lower_tag};
use crate::eligibility::config::CaptureOptions;
use crate::eligibility::filter::is_compatible_tag;
use crate::privacy::scrubber::is_text_safe;
use crate::privacy::sensitivity::{is_angular_style_attr, is_sensitive_element};
use crate::text::extract::{extract_direct_and_nested_text, extract_safe_text};

/// Attributes still recorded on sensitive elements.
const SENSITIVE_ELEMENT_ATTRIBUTES: [&str; 3] = ["name", "id", "class"];

/// Text for a captured element: anchors and buttons include their span text.
pub fn element_text<N: DomNode>(el: &N) -> String {
    match lower_tag(el).as_str() {
        "a" | "button" => extract_direct_and_nested_text(el),
        _ => extract_safe_text(el),
    }
}

/// Property bag describing one element of an interaction's ancestry.
pub fn element_properties<N: DomNode>(el: &N, options: &CaptureOptions) -> Properties {
    let tag_name = lower_tag(el);
    let mut props = Properties::new();
    props.insert("tag_name".into(), Value::from(tag_name.clone()));

    if is_compatible_tag(&tag_name) && !options.mask_all_text {
        let text = element_text(el);
        if !text.is_empty() {
            props.insert("$el_text".into(), Value::from(text));
        }
    }

    let classes: Vec<Value> = class_names(el)
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(Value::from)
        .collect();
    if !classes.is_empty() {
        props.insert("classes".into(), Value::Array(classes));
    }

    if !options.mask_all_element_attributes {
        let sensitive = is_sensitive_element(el);
        let ignored = options
            .autocapture
            .element_attribute_ignorelist
            .as_deref()
            .unwrap_or_default();

        for (name, value) in el.attributes() {
            if sensitive && !SENSITIVE_ELEMENT_ATTRIBUTES.contains(&name.as_str()) {
                continue;
            }
            if !is_text_safe(&value) || is_angular_style_attr(&name) || ignored.contains(&name) {
                continue;
            }
            props.insert(format!("{}{}", ATTRIBUTE_PREFIX, name), Value::from(value));
        }
    }

    let (nth_child, nth_of_type) = sibling_position(el);
    props.insert("nth_child".into(), Value::from(nth_child));
    props.insert("nth_of_type".into(), Value::from(nth_of_type));

    props
}

/// 1-based position among element siblings, overall and per tag.
pub fn sibling_position<N: DomNode>(el: &N) -> (i64, i64) {
    let tag = el.tag_name();
    let mut nth_child = 1;
    let mut nth_of_type = 1;
    let mut current = el.previous_element_sibling();

    while let Some(sibling) = current {
        nth_child += 1;
        if sibling.tag_name() == tag {
            nth_of_type += 1;
        }
        current = sibling.previous_element_sibling();
    }

    (nth_child, nth_of_type)
}
