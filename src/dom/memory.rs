use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::dom::node::{
    ClassName, DOCUMENT_FRAGMENT_NODE, DOCUMENT_NODE, DomNode, ELEMENT_NODE, HostWindow,
    PropertyValue, TEXT_NODE, is_element_node, logical_parent,
};
use crate::dom::selector;
use crate::error::{CaptureError, DomError};

/// CSS properties that inherit when a node does not set them.
const INHERITED_STYLES: [&str; 3] = ["cursor", "visibility", "color"];

// ============================================================================
// Snapshot model (JSON fixtures)
// ============================================================================

/// Serialized page: the URL it was captured on plus its element tree.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSnapshot {
    pub url: String,

    #[serde(default = "default_true")]
    pub has_document: bool,

    pub root: NodeSnapshot,
}

/// One node. A node with `tag` is an element, otherwise a text node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeSnapshot {
    pub tag: Option<String>,
    pub text: Option<String>,

    /// Attributes in document order.
    #[serde(default)]
    pub attrs: Map<String, Value>,

    /// Styles set directly on the element.
    #[serde(default)]
    pub style: HashMap<String, String>,

    #[serde(default)]
    pub children: Vec<NodeSnapshot>,

    /// Children of an attached open shadow root.
    #[serde(default)]
    pub shadow: Option<Vec<NodeSnapshot>>,

    /// DOM properties shadowed by same-named form fields (`type`, `name`, `id`).
    #[serde(default)]
    pub shadowed: Vec<String>,

    /// Child enumeration fails on this node.
    #[serde(default)]
    pub unreadable: bool,

    /// `className` is exposed as an animated string.
    #[serde(default)]
    pub svg: bool,
}

fn default_true() -> bool {
    true
}

impl PageSnapshot {
    pub fn from_json(content: &str) -> Result<Self, CaptureError> {
        serde_json::from_str(content).map_err(|source| CaptureError::JsonParse {
            context: "page snapshot".into(),
            source,
        })
    }

    pub fn from_value(value: Value) -> Result<Self, CaptureError> {
        serde_json::from_value(value).map_err(|source| CaptureError::JsonParse {
            context: "page snapshot".into(),
            source,
        })
    }

    pub fn build(&self) -> (MemoryDom, MemoryWindow) {
        let dom = MemoryDom::from_root(&self.root);
        let window = MemoryWindow {
            href: self.url.clone(),
            has_document: self.has_document,
        };
        (dom, window)
    }
}

// ============================================================================
// Arena-backed tree
// ============================================================================

#[derive(Debug, Clone)]
struct NodeData {
    node_type: u16,
    tag: Option<String>,
    text: Option<String>,
    attributes: Vec<(String, String)>,
    style: HashMap<String, String>,
    parent: Option<usize>,
    children: Vec<usize>,
    host: Option<usize>,
    shadowed: Vec<String>,
    unreadable: bool,
    svg: bool,
}

impl NodeData {
    fn bare(node_type: u16) -> Self {
        Self {
            node_type,
            tag: None,
            text: None,
            attributes: Vec::new(),
            style: HashMap::new(),
            parent: None,
            children: Vec::new(),
            host: None,
            shadowed: Vec::new(),
            unreadable: false,
            svg: false,
        }
    }
}

/// In-memory element tree; node 0 is the document.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
}

impl MemoryDom {
    pub fn from_root(root: &NodeSnapshot) -> Self {
        let mut dom = MemoryDom {
            nodes: vec![NodeData::bare(DOCUMENT_NODE)],
        };
        let root_id = dom.insert(root, Some(0));
        dom.nodes[0].children.push(root_id);
        dom
    }

    fn insert(&mut self, snap: &NodeSnapshot, parent: Option<usize>) -> usize {
        let mut data = match &snap.tag {
            Some(tag) => {
                let mut d = NodeData::bare(ELEMENT_NODE);
                d.tag = Some(tag.clone());
                d.attributes = snap
                    .attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), attr_string(v)))
                    .collect();
                d.style = snap.style.clone();
                d.shadowed = snap.shadowed.clone();
                d.svg = snap.svg;
                d
            }
            None => {
                let mut d = NodeData::bare(TEXT_NODE);
                d.text = Some(snap.text.clone().unwrap_or_default());
                d
            }
        };
        data.parent = parent;
        data.unreadable = snap.unreadable;

        let id = self.nodes.len();
        self.nodes.push(data);

        for child in &snap.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id].children.push(child_id);
        }

        if let Some(shadow_children) = &snap.shadow {
            let mut fragment = NodeData::bare(DOCUMENT_FRAGMENT_NODE);
            fragment.host = Some(id);
            let fragment_id = self.nodes.len();
            self.nodes.push(fragment);
            for child in shadow_children {
                let child_id = self.insert(child, Some(fragment_id));
                self.nodes[fragment_id].children.push(child_id);
            }
        }

        id
    }

    pub fn node(&self, id: usize) -> Option<NodeRef<'_>> {
        (id < self.nodes.len()).then_some(NodeRef { dom: self, id })
    }

    pub fn document(&self) -> NodeRef<'_> {
        NodeRef { dom: self, id: 0 }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn elements(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len())
            .map(move |id| NodeRef { dom: self, id })
            .filter(is_element_node)
    }

    /// First element (shadow trees included) whose `id` attribute matches.
    pub fn by_id(&self, id: &str) -> Option<NodeRef<'_>> {
        self.elements()
            .find(|n| n.get_attribute("id").as_deref() == Some(id))
    }

    /// First element matching a selector, in insertion order.
    pub fn query(&self, selector: &str) -> Option<NodeRef<'_>> {
        self.elements().find(|n| n.matches_selector(selector))
    }

    /// Resolve `#<index>` to a node index, anything else as a selector.
    pub fn resolve(&self, target: &str) -> Result<NodeRef<'_>, CaptureError> {
        let found = match target.strip_prefix('#').and_then(|n| n.parse::<usize>().ok()) {
            Some(index) => self.node(index),
            None => self.query(target),
        };
        found.ok_or_else(|| CaptureError::NodeNotFound(target.to_string()))
    }
}

fn attr_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Handle to one node of a [`MemoryDom`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    dom: &'a MemoryDom,
    id: usize,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> usize {
        self.id
    }

    fn data(&self) -> &'a NodeData {
        &self.dom.nodes[self.id]
    }

    fn at(&self, id: usize) -> NodeRef<'a> {
        NodeRef { dom: self.dom, id }
    }

    fn own_style(&self, property: &str) -> Option<String> {
        self.data().style.get(property).cloned()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dom, other.dom) && self.id == other.id
    }
}

impl DomNode for NodeRef<'_> {
    fn node_type(&self) -> u16 {
        self.data().node_type
    }

    fn tag_name(&self) -> Option<String> {
        self.data().tag.clone()
    }

    fn parent_node(&self) -> Option<Self> {
        self.data().parent.map(|p| self.at(p))
    }

    fn host(&self) -> Option<Self> {
        self.data().host.map(|h| self.at(h))
    }

    fn child_nodes(&self) -> Result<Vec<Self>, DomError> {
        let data = self.data();
        if data.unreadable {
            return Err(DomError::Unreadable {
                tag: data.tag.clone().unwrap_or_default().to_lowercase(),
                reason: "node is not readable".into(),
            });
        }
        Ok(data.children.iter().map(|c| self.at(*c)).collect())
    }

    fn text_content(&self) -> Option<String> {
        let data = self.data();
        match data.node_type {
            TEXT_NODE => data.text.clone(),
            DOCUMENT_NODE => None,
            _ => {
                let mut out = String::new();
                let mut stack: Vec<usize> = data.children.iter().rev().copied().collect();
                while let Some(id) = stack.pop() {
                    let node = &self.dom.nodes[id];
                    if let Some(t) = &node.text {
                        out.push_str(t);
                    }
                    stack.extend(node.children.iter().rev().copied());
                }
                Some(out)
            }
        }
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.data()
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.data().attributes.clone()
    }

    fn class_name(&self) -> ClassName {
        let data = self.data();
        if data.node_type != ELEMENT_NODE {
            return ClassName::Missing;
        }
        let class = self.get_attribute("class");
        if data.svg {
            ClassName::Animated { base_val: class }
        } else {
            ClassName::Text(class.unwrap_or_default())
        }
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        let data = self.data();
        if data.node_type != ELEMENT_NODE {
            return None;
        }
        if data.shadowed.iter().any(|s| s == name) {
            return Some(PropertyValue::Shadowed);
        }

        let tag = data.tag.clone().unwrap_or_default().to_lowercase();
        let attr = self.get_attribute(name);
        let value = match name {
            "id" => Some(attr.unwrap_or_default()),
            "type" => match tag.as_str() {
                "input" => Some(attr.map(|t| t.to_lowercase()).unwrap_or_else(|| "text".into())),
                "button" => Some(attr.map(|t| t.to_lowercase()).unwrap_or_else(|| "submit".into())),
                "select" => Some(if self.get_attribute("multiple").is_some() {
                    "select-multiple".into()
                } else {
                    "select-one".into()
                }),
                "textarea" => Some("textarea".into()),
                _ => None,
            },
            "name" => match tag.as_str() {
                "input" | "select" | "textarea" | "button" | "form" | "iframe" | "object"
                | "output" | "fieldset" => Some(attr.unwrap_or_default()),
                _ => None,
            },
            _ => attr,
        };
        value.map(PropertyValue::Text)
    }

    fn matches_selector(&self, selector: &str) -> bool {
        selector::matches_selector(self, selector)
    }

    fn previous_element_sibling(&self) -> Option<Self> {
        let parent = self.data().parent?;
        let siblings = &self.dom.nodes[parent].children;
        let pos = siblings.iter().position(|c| *c == self.id)?;
        siblings[..pos]
            .iter()
            .rev()
            .map(|c| self.at(*c))
            .find(is_element_node)
    }
}

// ============================================================================
// Window
// ============================================================================

/// Page context for a [`MemoryDom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryWindow {
    pub href: String,
    pub has_document: bool,
}

impl MemoryWindow {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            has_document: true,
        }
    }
}

impl<'a> HostWindow<NodeRef<'a>> for MemoryWindow {
    fn has_document(&self) -> bool {
        self.has_document
    }

    fn location_href(&self) -> &str {
        &self.href
    }

    fn computed_style(&self, element: &NodeRef<'a>, property: &str) -> Option<String> {
        if !is_element_node(element) {
            return None;
        }
        if let Some(value) = element.own_style(property) {
            return Some(value);
        }
        if !INHERITED_STYLES.contains(&property) {
            return None;
        }

        let mut current = logical_parent(element);
        while let Some(node) = current {
            if !is_element_node(&node) {
                break;
            }
            if let Some(value) = node.own_style(property) {
                return Some(value);
            }
            current = logical_parent(&node);
        }

        (property == "cursor").then(|| "auto".to_string())
    }
}
