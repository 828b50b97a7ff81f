use crate::error::DomError;

// ============================================================================
// Node type constants (integer checks, never identity comparison)
// ============================================================================

pub const ELEMENT_NODE: u16 = 1;
pub const TEXT_NODE: u16 = 3;
pub const DOCUMENT_NODE: u16 = 9;
pub const DOCUMENT_FRAGMENT_NODE: u16 = 11;

/// A DOM property read that may have been shadowed.
///
/// A `<form>` with a child `<input name="type">` exposes that input through
/// `form.type`, so reads of `type`, `name` and `id` can yield an element
/// instead of a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Shadowed,
}

impl PropertyValue {
    /// The string value, or `None` when the property carries no usable signal.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s.as_str()),
            PropertyValue::Shadowed => None,
        }
    }
}

/// Raw `className` of an element. SVG elements expose an animated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassName {
    Text(String),
    Animated { base_val: Option<String> },
    Missing,
}

// ============================================================================
// Capability interfaces
// ============================================================================

/// Read-only view of one node of a live element tree.
///
/// Implementations are cheap handles; the tree itself is owned by the host.
pub trait DomNode: Clone {
    fn node_type(&self) -> u16;

    /// Tag name as reported by the host (case not normalized).
    fn tag_name(&self) -> Option<String>;

    /// Raw parent, which may be a document fragment (shadow root).
    fn parent_node(&self) -> Option<Self>;

    /// Host element of a shadow root. `None` for every other node.
    fn host(&self) -> Option<Self>;

    fn child_nodes(&self) -> Result<Vec<Self>, DomError>;

    fn text_content(&self) -> Option<String>;

    fn get_attribute(&self, name: &str) -> Option<String>;

    /// All attributes in document order.
    fn attributes(&self) -> Vec<(String, String)>;

    fn class_name(&self) -> ClassName;

    /// DOM property lookup (`type`, `name`, `id`). `None` when unset.
    fn property(&self, name: &str) -> Option<PropertyValue>;

    fn matches_selector(&self, selector: &str) -> bool;

    fn previous_element_sibling(&self) -> Option<Self>;
}

/// The page the interaction happened on.
pub trait HostWindow<N: DomNode> {
    fn has_document(&self) -> bool;

    fn location_href(&self) -> &str;

    fn computed_style(&self, element: &N, property: &str) -> Option<String>;
}

// ============================================================================
// Helpers shared by every component
// ============================================================================

pub fn is_element_node<N: DomNode>(node: &N) -> bool {
    node.node_type() == ELEMENT_NODE
}

pub fn is_text_node<N: DomNode>(node: &N) -> bool {
    node.node_type() == TEXT_NODE
}

pub fn is_document_fragment<N: DomNode>(node: &N) -> bool {
    node.node_type() == DOCUMENT_FRAGMENT_NODE
}

/// Compare tag names instead of references; polyfilled elements are not
/// identical to their native counterparts.
pub fn is_tag<N: DomNode>(node: &N, tag: &str) -> bool {
    node.tag_name()
        .map(|t| t.eq_ignore_ascii_case(tag))
        .unwrap_or(false)
}

pub fn lower_tag<N: DomNode>(node: &N) -> String {
    node.tag_name().unwrap_or_default().to_lowercase()
}

/// Parent in the composed tree: a shadow root is replaced by its host.
pub fn logical_parent<N: DomNode>(node: &N) -> Option<N> {
    let parent = node.parent_node()?;
    if is_document_fragment(&parent) {
        parent.host()
    } else {
        Some(parent)
    }
}

/// Class list of an element, tolerating SVG animated strings.
pub fn class_names<N: DomNode>(el: &N) -> Vec<String> {
    let raw = match el.class_name() {
        ClassName::Text(s) => s,
        ClassName::Animated { base_val } => base_val
            .filter(|v| !v.is_empty())
            .or_else(|| el.get_attribute("class"))
            .unwrap_or_default(),
        ClassName::Missing => String::new(),
    };

    raw.split_whitespace().map(str::to_string).collect()
}

pub fn has_class<N: DomNode>(el: &N, class: &str) -> bool {
    class_names(el).iter().any(|c| c == class)
}
