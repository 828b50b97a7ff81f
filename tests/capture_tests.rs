use autocapture_chain::capture::pipeline::{CaptureOutcome, capture_interaction, element_path};
use autocapture_chain::capture::properties::{element_properties, sibling_position};
use autocapture_chain::dom::memory::{MemoryWindow, NodeRef};
use autocapture_chain::dom::node::DomNode;
use autocapture_chain::eligibility::config::{AutocaptureConfig, CaptureOptions};
use autocapture_chain::eligibility::filter::DomEvent;
use autocapture_chain::trace::logger::TraceLogger;
use autocapture_chain::trace::trace::CaptureTraceEvent;
use serde_json::{Value, json};

use crate::common::utils::{load_fixture, page};

mod common;

fn capture(window: &MemoryWindow, el: &NodeRef<'_>, event: &str, options: &CaptureOptions) -> CaptureOutcome {
    capture_interaction(Some(window), &DomEvent::new(event), Some(el), options)
}

// =========================================================================
// Element properties
// =========================================================================

#[test]
fn properties_for_a_button() {
    let snap = load_fixture("checkout.json");
    let (dom, _) = snap.build();
    let button = dom.by_id("pay").unwrap();

    let props = element_properties(&button, &CaptureOptions::default());

    assert_eq!(props["tag_name"], json!("button"));
    assert_eq!(props["$el_text"], json!("Pay now"));
    assert_eq!(props["classes"], json!(["btn", "primary"]));
    assert_eq!(props["attr__id"], json!("pay"));
    assert_eq!(props["attr__type"], json!("submit"));
    assert_eq!(props["attr__class"], json!("btn primary"));
    assert_eq!(props["nth_child"], json!(5));
    assert_eq!(props["nth_of_type"], json!(1));
}

#[test]
fn sensitive_element_keeps_only_identifying_attributes() {
    let snap = load_fixture("checkout.json");
    let (dom, _) = snap.build();
    let cc = dom.by_id("cc").unwrap();

    let props = element_properties(&cc, &CaptureOptions::default());

    assert_eq!(props["attr__id"], json!("cc"));
    assert_eq!(props["attr__name"], json!("cc-number"));
    assert!(!props.contains_key("attr__value"), "Typed value never leaves the page");
    assert!(!props.contains_key("attr__type"));
    assert!(!props.contains_key("$el_text"));
}

#[test]
fn framework_and_ignored_attributes_are_dropped() {
    let snap = load_fixture("checkout.json");
    let (dom, _) = snap.build();
    let link = dom.by_id("home-link").unwrap();

    let props = element_properties(&link, &CaptureOptions::default());
    assert!(!props.keys().any(|k| k.starts_with("attr___ngcontent")));
    assert_eq!(props["attr__href"], json!("/home"));

    let options = CaptureOptions::with_config(AutocaptureConfig {
        element_attribute_ignorelist: Some(vec!["href".into()]),
        ..Default::default()
    });
    let props = element_properties(&link, &options);
    assert!(!props.contains_key("attr__href"));
}

#[test]
fn unsafe_attribute_values_are_dropped() {
    let snap = page(json!([
        { "tag": "button", "attrs": { "id": "b", "data-ssn": "123-45-6789", "data-ok": "fine" } }
    ]));
    let (dom, _) = snap.build();

    let props = element_properties(&dom.by_id("b").unwrap(), &CaptureOptions::default());
    assert!(!props.contains_key("attr__data-ssn"));
    assert_eq!(props["attr__data-ok"], json!("fine"));
}

#[test]
fn masking_withholds_text_and_attributes() {
    let snap = load_fixture("checkout.json");
    let (dom, _) = snap.build();
    let button = dom.by_id("pay").unwrap();

    let options = CaptureOptions {
        mask_all_text: true,
        mask_all_element_attributes: true,
        ..Default::default()
    };
    let props = element_properties(&button, &options);

    let keys: Vec<&str> = props.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["tag_name", "classes", "nth_child", "nth_of_type"]);
}

#[test]
fn sibling_positions_count_elements_only() {
    let snap = page(json!([
        { "text": "lead" },
        { "tag": "p", "attrs": { "id": "p1" } },
        { "tag": "div" },
        { "text": "between" },
        { "tag": "p", "attrs": { "id": "p2" } }
    ]));
    let (dom, _) = snap.build();

    assert_eq!(sibling_position(&dom.by_id("p1").unwrap()), (1, 1));
    assert_eq!(sibling_position(&dom.by_id("p2").unwrap()), (3, 2));
}

// =========================================================================
// Pipeline
// =========================================================================

#[test]
fn element_path_stops_below_body_and_crosses_shadow_roots() {
    let snap = load_fixture("checkout.json");
    let (dom, _) = snap.build();
    let label = dom.by_id("shadow-label").unwrap();

    let tags: Vec<String> = element_path(&label)
        .iter()
        .map(|n| n.tag_name().unwrap())
        .collect();
    assert_eq!(tags, vec!["span", "div", "checkout-widget", "div"]);
}

#[test]
fn captured_button_click_produces_chain() {
    let snap = load_fixture("checkout.json");
    let (dom, window) = snap.build();
    let button = dom.by_id("pay").unwrap();

    let props = capture(&window, &button, "click", &CaptureOptions::default())
        .into_properties()
        .unwrap();

    assert_eq!(props["$event_type"], json!("click"));
    assert_eq!(props["$ce_version"], json!(1));
    assert_eq!(props["$elements"].as_array().unwrap().len(), 3);
    assert_eq!(
        props["$elements_chain"],
        json!(concat!(
            r#"button.btn.primary:text="Pay now"nth-child="5"nth-of-type="1"attr_id="pay"attr__type="submit";"#,
            r#"form.checkout-form:nth-child="2"nth-of-type="1"attr_id="checkout";"#,
            r#"div.main.shell:nth-child="1"nth-of-type="1"attr_id="app""#
        ))
    );
}

#[test]
fn span_text_is_only_folded_into_anchors_and_buttons() {
    let snap = page(json!([
        { "tag": "label", "attrs": { "id": "l" }, "children": [
            { "text": "Terms" },
            { "tag": "span", "children": [ { "text": "apply" } ] }
        ] }
    ]));
    let (dom, window) = snap.build();

    let props = capture(&window, &dom.by_id("l").unwrap(), "click", &CaptureOptions::default())
        .into_properties()
        .unwrap();

    assert_eq!(props["$elements"][0]["$el_text"], json!("Terms"));
}

#[test]
fn anchor_href_is_copied_to_the_target() {
    let snap = load_fixture("checkout.json");
    let (dom, window) = snap.build();
    let badge = dom.query("#home-link span").unwrap();

    let props = capture(&window, &badge, "click", &CaptureOptions::default())
        .into_properties()
        .unwrap();
    let first = &props["$elements"][0];

    assert_eq!(first["tag_name"], json!("span"));
    assert_eq!(first["attr__href"], json!("/home"));
    assert_eq!(first["$el_text"], json!("new"));
    assert!(
        props["$elements_chain"]
            .as_str()
            .unwrap()
            .starts_with(r#"span.badge:text="new"nth-child="1"nth-of-type="1"href="/home";a.nav-link:"#)
    );
}

#[test]
fn no_capture_on_path_excludes_interaction() {
    let snap = load_fixture("checkout.json");
    let (dom, window) = snap.build();
    let link = dom.by_id("private-link").unwrap();

    assert_eq!(
        capture(&window, &link, "click", &CaptureOptions::default()),
        CaptureOutcome::Excluded
    );
}

#[test]
fn ineligible_interaction_is_not_captured() {
    let snap = load_fixture("checkout.json");
    let (dom, window) = snap.build();
    let form = dom.by_id("checkout").unwrap();

    let outcome = capture(&window, &form, "click", &CaptureOptions::default());
    assert_eq!(outcome, CaptureOutcome::Ineligible);
    assert_eq!(outcome.into_properties(), None);
}

#[test]
fn text_inside_sensitive_region_is_not_captured() {
    let snap = page(json!([
        { "tag": "div", "attrs": { "class": "ph-sensitive" }, "children": [
            { "tag": "button", "attrs": { "id": "b" }, "children": [ { "text": "Reveal balance" } ] }
        ] }
    ]));
    let (dom, window) = snap.build();

    let props = capture(&window, &dom.by_id("b").unwrap(), "click", &CaptureOptions::default())
        .into_properties()
        .unwrap();

    assert_eq!(props["$elements"][0].get("$el_text"), None::<&Value>);
    assert!(!props["$elements_chain"].as_str().unwrap().contains("Reveal"));
}

// =========================================================================
// Trace
// =========================================================================

#[test]
fn trace_logger_appends_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(path.to_str().unwrap());
    assert!(tracer.is_enabled());

    let snap = load_fixture("checkout.json");
    let (dom, window) = snap.build();
    let event = DomEvent::new("click");

    for id in ["pay", "checkout"] {
        let el = dom.by_id(id).unwrap();
        let outcome = capture_interaction(Some(&window), &event, Some(&el), &CaptureOptions::default());
        tracer.log(&CaptureTraceEvent::now(&event, el.tag_name()).with_outcome(&outcome));
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["decision"], json!("captured"));
    assert_eq!(lines[0]["chain_fingerprint"].as_str().unwrap().len(), 40);
    assert_eq!(lines[1]["decision"], json!("ineligible"));
    assert!(lines[1]["elements_chain"].is_null());
    assert!(lines[1]["suppression_reason"].is_string());
}

#[test]
fn disabled_trace_logger_is_a_no_op() {
    let tracer = TraceLogger::disabled();
    assert!(!tracer.is_enabled());
    tracer.log(&CaptureTraceEvent::now(&DomEvent::new("click"), None));
}
