use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

// Issuer prefix/length families: Visa, Mastercard, Discover, Amex, Diners, JCB.
static CREDIT_CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(4[0-9]{12}(?:[0-9]{3})?)|(5[1-5][0-9]{14})|(6(?:011|5[0-9]{2})[0-9]{12})|(3[47][0-9]{13})|(3(?:0[0-5]|[68][0-9])[0-9]{11})|((?:2131|1800|35[0-9]{3})[0-9]{11}))$",
    )
    .expect("credit card regex")
});

static SSN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}-?[0-9]{2}-?[0-9]{4}$").expect("ssn regex"));

/// Whether a captured value may leave the page.
///
/// `null` is never safe. Strings are rejected when they look like a card
/// number or a social security number. Any other JSON value passes.
pub fn is_value_safe(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => is_text_safe(s),
        _ => true,
    }
}

/// String form of [`is_value_safe`].
pub fn is_text_safe(value: &str) -> bool {
    let value = value.trim();

    let digits: String = value.chars().filter(|c| *c != '-' && *c != ' ').collect();
    if CREDIT_CARD_RE.is_match(&digits) {
        return false;
    }

    !SSN_RE.is_match(value)
}

/// Optional-string form: a missing value is unsafe.
pub fn is_optional_text_safe(value: Option<&str>) -> bool {
    value.map(is_text_safe).unwrap_or(false)
}
