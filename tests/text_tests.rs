use autocapture_chain::text::extract::{
    MAX_SAFE_TEXT_CHARS, MAX_SPAN_DEPTH, MAX_SPAN_NODES, extract_direct_and_nested_text, extract_nested_span_text,
    extract_safe_text,
};
use serde_json::{Value, json};

use crate::common::utils::{load_fixture, page};

mod common;

// =========================================================================
// Direct text
// =========================================================================

#[test]
fn direct_text_ignores_descendant_elements() {
    let snap = page(json!([
        { "tag": "div", "attrs": { "id": "t" }, "children": [
            { "text": "Hello " },
            { "tag": "b", "children": [ { "text": "bold" } ] },
            { "text": " world" }
        ] }
    ]));
    let (dom, _) = snap.build();

    assert_eq!(extract_safe_text(&dom.by_id("t").unwrap()), "Helloworld");
}

#[test]
fn direct_text_normalizes_whitespace() {
    let snap = page(json!([
        { "tag": "button", "attrs": { "id": "t" }, "children": [
            { "text": "\n   Save \r\n  changes\n\n   now   " }
        ] }
    ]));
    let (dom, _) = snap.build();

    assert_eq!(extract_safe_text(&dom.by_id("t").unwrap()), "Save changes now");
}

#[test]
fn direct_text_drops_sensitive_tokens() {
    let snap = page(json!([
        { "tag": "div", "attrs": { "id": "t" }, "children": [
            { "text": "Card 4111111111111111 ssn 123-45-6789 thanks" }
        ] }
    ]));
    let (dom, _) = snap.build();

    assert_eq!(extract_safe_text(&dom.by_id("t").unwrap()), "Card ssn thanks");
}

#[test]
fn direct_text_is_truncated() {
    let long = "a".repeat(300);
    let snap = page(json!([
        { "tag": "div", "attrs": { "id": "one" }, "children": [ { "text": long } ] },
        { "tag": "div", "attrs": { "id": "many" }, "children": [
            { "text": "b".repeat(200) }, { "text": "c".repeat(200) }
        ] }
    ]));
    let (dom, _) = snap.build();

    let one = extract_safe_text(&dom.by_id("one").unwrap());
    assert_eq!(one.chars().count(), MAX_SAFE_TEXT_CHARS);

    let many = extract_safe_text(&dom.by_id("many").unwrap());
    assert!(many.chars().count() <= MAX_SAFE_TEXT_CHARS, "Bound holds across text nodes");
}

#[test]
fn truncation_respects_multibyte_characters() {
    let snap = page(json!([
        { "tag": "div", "attrs": { "id": "t" }, "children": [ { "text": "é".repeat(400) } ] }
    ]));
    let (dom, _) = snap.build();

    let text = extract_safe_text(&dom.by_id("t").unwrap());
    assert_eq!(text.chars().count(), MAX_SAFE_TEXT_CHARS);
}

#[test]
fn sensitive_ancestor_withholds_text() {
    let snap = load_fixture("checkout.json");
    let (dom, _) = snap.build();

    assert_eq!(extract_safe_text(&dom.by_id("secret-note").unwrap()), "");
}

#[test]
fn sensitive_elements_withhold_text() {
    let snap = page(json!([
        { "tag": "textarea", "attrs": { "id": "ta" }, "children": [ { "text": "draft" } ] },
        { "tag": "div", "attrs": { "id": "ed", "contenteditable": "true" }, "children": [ { "text": "notes" } ] },
        { "tag": "label", "attrs": { "id": "lb" }, "children": [ { "text": "Email" } ] }
    ]));
    let (dom, _) = snap.build();

    assert_eq!(extract_safe_text(&dom.by_id("ta").unwrap()), "");
    assert_eq!(extract_safe_text(&dom.by_id("ed").unwrap()), "");
    assert_eq!(extract_safe_text(&dom.by_id("lb").unwrap()), "Email");
}

#[test]
fn element_without_children_has_no_text() {
    let snap = page(json!([ { "tag": "div", "attrs": { "id": "empty" } } ]));
    let (dom, _) = snap.build();

    assert_eq!(extract_safe_text(&dom.by_id("empty").unwrap()), "");
}

#[test]
fn unreadable_element_has_no_text() {
    let snap = page(json!([
        { "tag": "div", "attrs": { "id": "t" }, "unreadable": true, "children": [ { "text": "hi" } ] }
    ]));
    let (dom, _) = snap.build();

    assert_eq!(extract_safe_text(&dom.by_id("t").unwrap()), "");
}

// =========================================================================
// Nested span text
// =========================================================================

#[test]
fn nested_spans_are_collected_in_document_order() {
    let snap = page(json!([
        { "tag": "button", "attrs": { "id": "b" }, "children": [
            { "text": "Buy" },
            { "tag": "span", "children": [
                { "text": "two" },
                { "tag": "span", "children": [ { "text": "get" } ] }
            ] },
            { "tag": "div", "children": [
                { "tag": "span", "children": [ { "text": "hidden behind div" } ] }
            ] },
            { "tag": "span", "children": [ { "text": "one free" } ] }
        ] }
    ]));
    let (dom, _) = snap.build();
    let button = dom.by_id("b").unwrap();

    assert_eq!(extract_nested_span_text(&button), "two get one free");
    assert_eq!(extract_direct_and_nested_text(&button), "Buy two get one free");
}

#[test]
fn sensitive_span_is_skipped_but_its_children_are_walked() {
    let snap = page(json!([
        { "tag": "a", "attrs": { "id": "a" }, "children": [
            { "tag": "span", "attrs": { "id": "pwd-hint" }, "children": [
                { "text": "hint" },
                { "tag": "span", "children": [ { "text": "inner" } ] }
            ] }
        ] }
    ]));
    let (dom, _) = snap.build();

    assert_eq!(extract_nested_span_text(&dom.by_id("a").unwrap()), "inner");
}

#[test]
fn unreadable_span_is_skipped_and_siblings_survive() {
    let snap = page(json!([
        { "tag": "button", "attrs": { "id": "b" }, "children": [
            { "tag": "span", "children": [ { "text": "first" } ] },
            { "tag": "span", "unreadable": true, "children": [ { "text": "broken" } ] },
            { "tag": "span", "children": [ { "text": "last" } ] }
        ] }
    ]));
    let (dom, _) = snap.build();

    assert_eq!(extract_nested_span_text(&dom.by_id("b").unwrap()), "first last");
}

#[test]
fn deep_span_nesting_is_bounded() {
    let mut node: Value = json!({ "tag": "span", "children": [ { "text": "deep" } ] });
    for _ in 0..(MAX_SPAN_DEPTH * 4) {
        node = json!({ "tag": "span", "children": [ { "text": "x" }, node ] });
    }
    let snap = page(json!([ { "tag": "a", "attrs": { "id": "a" }, "children": [ node ] } ]));
    let (dom, _) = snap.build();

    let text = extract_nested_span_text(&dom.by_id("a").unwrap());
    let words: Vec<&str> = text.split(' ').collect();
    assert_eq!(words.len(), MAX_SPAN_DEPTH, "Walk stops at the depth ceiling");
    assert!(words.iter().all(|w| *w == "x"));
}

#[test]
fn wide_span_fanout_is_bounded() {
    let spans: Vec<Value> = (0..3000)
        .map(|i| json!({ "tag": "span", "children": [ { "text": format!("w{}", i) } ] }))
        .collect();
    let snap = page(json!([ { "tag": "button", "attrs": { "id": "b" }, "children": spans } ]));
    let (dom, _) = snap.build();

    let text = extract_nested_span_text(&dom.by_id("b").unwrap());
    let words: Vec<&str> = text.split(' ').collect();
    assert_eq!(words.len(), MAX_SPAN_NODES, "Walk stops at the node ceiling");
    assert_eq!(words[0], "w0");
    assert_eq!(words[MAX_SPAN_NODES - 1], format!("w{}", MAX_SPAN_NODES - 1));
}

#[test]
fn combined_text_that_forms_a_card_number_is_suppressed() {
    let snap = page(json!([
        { "tag": "button", "attrs": { "id": "b" }, "children": [
            { "text": "4111" },
            { "tag": "span", "children": [ { "text": "1111" } ] },
            { "tag": "span", "children": [ { "text": "1111" } ] },
            { "tag": "span", "children": [ { "text": "1111" } ] }
        ] }
    ]));
    let (dom, _) = snap.build();
    let button = dom.by_id("b").unwrap();

    assert_eq!(extract_nested_span_text(&button), "1111 1111 1111");
    assert_eq!(extract_direct_and_nested_text(&button), "");
}
