use tracing::{error, warn};

use crate::dom::node::{DomNode, is_tag, is_text_node, lower_tag};
use crate::error::DomError;
use crate::privacy::scrubber::is_text_safe;
use crate::privacy::sensitivity::{is_sensitive_element, should_capture_element};

pub const MAX_SAFE_TEXT_CHARS: usize = 255;

/// Upper bound on spans visited by one nested-span walk.
pub const MAX_SPAN_NODES: usize = 1024;

/// Spans nested deeper than this below the target are not read.
pub const MAX_SPAN_DEPTH: usize = 64;

// ============================================================================
// Direct text
// ============================================================================

/// Privacy-safe text of an element's own text-node children.
///
/// Descendant elements are never read, so text inside a sensitive child
/// cannot leak through its parent. Tokens that look like card numbers or
/// SSNs are dropped.
pub fn extract_safe_text<N: DomNode>(el: &N) -> String {
    match try_safe_text(el) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "direct text unavailable");
            String::new()
        }
    }
}

fn try_safe_text<N: DomNode>(el: &N) -> Result<String, DomError> {
    if !should_capture_element(el) || is_sensitive_element(el) {
        return Ok(String::new());
    }

    let mut text = String::new();
    for child in el.child_nodes()? {
        if !is_text_node(&child) {
            continue;
        }
        if let Some(content) = child.text_content().filter(|c| !c.is_empty()) {
            text.push_str(&scrub_text_node(&content));
        }
    }

    Ok(truncate_chars(text.trim(), MAX_SAFE_TEXT_CHARS).trim().to_string())
}

fn scrub_text_node(content: &str) -> String {
    let kept: String = split_keeping_whitespace(content.trim())
        .into_iter()
        .filter(|run| is_text_safe(run))
        .collect();

    let flattened = kept.replace(['\r', '\n'], " ");
    let collapsed = collapse_spaces(&flattened);

    truncate_chars(&collapsed, MAX_SAFE_TEXT_CHARS).to_string()
}

/// Alternating non-whitespace and whitespace runs, in order.
fn split_keeping_whitespace(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                runs.push(&s[start..i]);
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }

    if start < s.len() {
        runs.push(&s[start..]);
    }
    runs
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !prev_space {
                out.push(c);
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    out
}

pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ============================================================================
// Nested span text
// ============================================================================

/// Safe text of every descendant `<span>` reachable through spans, in
/// document order, space-joined.
///
/// Walks with an explicit stack bounded by [`MAX_SPAN_NODES`] and
/// [`MAX_SPAN_DEPTH`]; past either limit the walk stops with what it has.
/// A span whose children cannot be read is logged and skipped.
pub fn extract_nested_span_text<N: DomNode>(target: &N) -> String {
    let roots = match target.child_nodes() {
        Ok(children) => children,
        Err(e) => {
            error!(error = %e, tag = %lower_tag(target), "nested span walk aborted");
            return String::new();
        }
    };

    let mut text = String::new();
    let mut visited = 0usize;
    let mut stack: Vec<(N, usize)> = roots.into_iter().rev().map(|c| (c, 1)).collect();

    while let Some((node, depth)) = stack.pop() {
        if !is_tag(&node, "span") {
            continue;
        }
        if visited >= MAX_SPAN_NODES {
            warn!(limit = MAX_SPAN_NODES, "nested span walk truncated");
            break;
        }
        visited += 1;

        let span_text = match try_safe_text(&node) {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "skipping unreadable span");
                continue;
            }
        };
        text = join_trimmed(&text, &span_text);

        if depth >= MAX_SPAN_DEPTH {
            continue;
        }
        match node.child_nodes() {
            Ok(children) => {
                stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
            }
            Err(e) => error!(error = %e, "skipping children of unreadable span"),
        }
    }

    text
}

/// Direct text followed by nested span text, suppressed wholesale when the
/// combined string itself looks like a card number or SSN.
pub fn extract_direct_and_nested_text<N: DomNode>(target: &N) -> String {
    let text = join_trimmed(&extract_safe_text(target), &extract_nested_span_text(target));

    if is_text_safe(&text) { text } else { String::new() }
}

fn join_trimmed(a: &str, b: &str) -> String {
    format!("{} {}", a, b).trim().to_string()
}
