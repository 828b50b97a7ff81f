use tracing::debug;

use crate::dom::node::{DomNode, class_names, is_element_node, logical_parent};

// ============================================================================
// Selector model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrTest {
    Exists(String),
    Equals(String, String),
}

/// `tag#id.class[attr]` with every part optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrTest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// Compounds right to left: the subject first, each paired with the
/// combinator linking it to the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub parts: Vec<(Compound, Option<Combinator>)>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a comma-separated selector list. Unsupported syntax yields `None`.
pub fn parse_selector_list(input: &str) -> Option<Vec<ComplexSelector>> {
    split_outside_brackets(input, |c| c == ',')
        .iter()
        .map(|s| parse_complex(s.trim()))
        .collect()
}

/// Split on `sep`, ignoring separators inside `[...]` (and quotes within it).
fn split_outside_brackets(input: &str, sep: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut in_bracket = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match (c, quote) {
            (q, Some(open)) if q == open => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) if in_bracket => quote = Some(c),
            ('[', None) => in_bracket = true,
            (']', None) => in_bracket = false,
            (c, None) if !in_bracket && sep(c) => {
                parts.push(String::new());
                continue;
            }
            _ => {}
        }
        if let Some(last) = parts.last_mut() {
            last.push(c);
        }
    }

    parts
}

fn parse_complex(input: &str) -> Option<ComplexSelector> {
    if input.is_empty() {
        return None;
    }

    let mut tokens: Vec<String> = Vec::new();
    for (i, chunk) in split_outside_brackets(input, |c| c == '>').iter().enumerate() {
        if i > 0 {
            tokens.push(">".into());
        }
        tokens.extend(
            split_outside_brackets(chunk, char::is_whitespace)
                .into_iter()
                .filter(|t| !t.is_empty()),
        );
    }

    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut pending = Combinator::Descendant;

    for token in &tokens {
        if token == ">" {
            if compounds.is_empty() {
                return None;
            }
            pending = Combinator::Child;
            continue;
        }
        if !compounds.is_empty() {
            combinators.push(pending);
        }
        compounds.push(parse_compound(token)?);
        pending = Combinator::Descendant;
    }

    if compounds.is_empty() || combinators.len() + 1 != compounds.len() {
        return None;
    }

    let mut parts = Vec::with_capacity(compounds.len());
    for (i, compound) in compounds.into_iter().enumerate().rev() {
        let link = if i == 0 { None } else { Some(combinators[i - 1]) };
        parts.push((compound, link));
    }
    Some(ComplexSelector { parts })
}

fn parse_compound(token: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let chars: Vec<char> = token.chars().collect();
    let mut i = 0;

    let ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && (chars[*i].is_alphanumeric() || matches!(chars[*i], '-' | '_')) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if i < chars.len() && chars[i] == '*' {
        i += 1;
    } else {
        let tag = ident(&mut i);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_lowercase());
        }
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let id = ident(&mut i);
                if id.is_empty() {
                    return None;
                }
                compound.id = Some(id);
            }
            '.' => {
                i += 1;
                let class = ident(&mut i);
                if class.is_empty() {
                    return None;
                }
                compound.classes.push(class);
            }
            '[' => {
                let close = chars[i..].iter().position(|c| *c == ']')? + i;
                let body: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr(&body)?);
                i = close + 1;
            }
            _ => return None,
        }
    }

    Some(compound)
}

fn parse_attr(body: &str) -> Option<AttrTest> {
    match body.split_once('=') {
        None => {
            let name = body.trim();
            (!name.is_empty()).then(|| AttrTest::Exists(name.to_string()))
        }
        Some((name, value)) => {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            Some(AttrTest::Equals(name.trim().to_string(), value.to_string()))
        }
    }
}

// ============================================================================
// Matching
// ============================================================================

/// `Element.matches` over any [`DomNode`], for the supported subset.
pub fn matches_selector<N: DomNode>(el: &N, selector: &str) -> bool {
    match parse_selector_list(selector) {
        Some(list) => list.iter().any(|complex| matches_complex(el, &complex.parts)),
        None => {
            debug!(selector, "unsupported selector");
            false
        }
    }
}

fn matches_complex<N: DomNode>(el: &N, parts: &[(Compound, Option<Combinator>)]) -> bool {
    let Some(((subject, link), rest)) = parts.split_first() else {
        return true;
    };
    if !matches_compound(el, subject) {
        return false;
    }

    match link {
        None => true,
        Some(Combinator::Child) => element_parent(el)
            .map(|p| matches_complex(&p, rest))
            .unwrap_or(false),
        Some(Combinator::Descendant) => {
            let mut ancestor = element_parent(el);
            while let Some(a) = ancestor {
                if matches_complex(&a, rest) {
                    return true;
                }
                ancestor = element_parent(&a);
            }
            false
        }
    }
}

fn element_parent<N: DomNode>(el: &N) -> Option<N> {
    logical_parent(el).filter(is_element_node)
}

fn matches_compound<N: DomNode>(el: &N, compound: &Compound) -> bool {
    if !is_element_node(el) {
        return false;
    }
    if let Some(tag) = &compound.tag {
        if !el.tag_name().is_some_and(|t| t.eq_ignore_ascii_case(tag)) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if el.get_attribute("id").as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let have = class_names(el);
        if !compound.classes.iter().all(|c| have.contains(c)) {
            return false;
        }
    }
    compound.attrs.iter().all(|test| match test {
        AttrTest::Exists(name) => el.get_attribute(name).is_some(),
        AttrTest::Equals(name, value) => el.get_attribute(name).as_deref() == Some(value.as_str()),
    })
}
