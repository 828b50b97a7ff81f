#![allow(dead_code)]

use autocapture_chain::dom::memory::PageSnapshot;
use serde_json::{Value, json};

pub fn fixture(name: &str) -> String {
    let base = std::env::current_dir().unwrap();
    let path = base.join("tests").join("fixtures").join(name);

    path.display().to_string()
}

pub fn load_fixture(name: &str) -> PageSnapshot {
    let content = std::fs::read_to_string(fixture(name)).unwrap();
    PageSnapshot::from_json(&content).unwrap()
}

/// Page at `url` whose `<body>` holds `children`.
pub fn page_at(url: &str, children: Value) -> PageSnapshot {
    PageSnapshot::from_value(json!({
        "url": url,
        "root": {
            "tag": "html",
            "children": [ { "tag": "body", "children": children } ]
        }
    }))
    .unwrap()
}

pub fn page(children: Value) -> PageSnapshot {
    page_at("https://example.com/", children)
}
