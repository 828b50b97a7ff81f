use regex::Regex;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::error::CaptureError;

// ============================================================================
// URL patterns
// ============================================================================

/// One entry of the URL allowlist.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    Regex(Regex),
    Contains(String),
}

impl UrlPattern {
    /// Compile a pattern string the way the page runtime's `String.match`
    /// does; a string that is not a valid regex matches literally.
    pub fn parse(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => UrlPattern::Regex(re),
            Err(e) => {
                warn!(pattern, error = %e, "URL pattern is not a regex, matching literally");
                UrlPattern::Contains(pattern.to_string())
            }
        }
    }

    /// Strict variant for callers that want invalid regexes reported.
    pub fn regex(pattern: &str) -> Result<Self, CaptureError> {
        Regex::new(pattern)
            .map(UrlPattern::Regex)
            .map_err(|source| CaptureError::UrlPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            UrlPattern::Regex(re) => re.is_match(url),
            UrlPattern::Contains(s) => url.contains(s.as_str()),
        }
    }
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (UrlPattern::Regex(a), UrlPattern::Regex(b)) => a.as_str() == b.as_str(),
            (UrlPattern::Contains(a), UrlPattern::Contains(b)) => a == b,
            _ => false,
        }
    }
}

impl<'de> Deserialize<'de> for UrlPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(UrlPattern::parse(&raw))
    }
}

// ============================================================================
// Autocapture config (optional YAML)
// ============================================================================

/// Allowlists restricting which interactions are captured.
///
/// A missing list imposes no restriction; supplied lists combine
/// conjunctively.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AutocaptureConfig {
    #[serde(default)]
    pub url_allowlist: Option<Vec<UrlPattern>>,

    /// e.g. `[click, change, submit]`
    #[serde(default)]
    pub dom_event_allowlist: Option<Vec<String>>,

    /// Lowercase tag names, e.g. `[a, button]`
    #[serde(default)]
    pub element_allowlist: Option<Vec<String>>,

    #[serde(default)]
    pub css_selector_allowlist: Option<Vec<String>>,

    /// Attribute names never copied into a property bag.
    #[serde(default)]
    pub element_attribute_ignorelist: Option<Vec<String>>,
}

/// Options for building the captured property bag.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CaptureOptions {
    #[serde(default)]
    pub mask_all_element_attributes: bool,

    #[serde(default)]
    pub mask_all_text: bool,

    #[serde(default)]
    pub autocapture: AutocaptureConfig,
}

impl CaptureOptions {
    pub fn with_config(autocapture: AutocaptureConfig) -> Self {
        Self {
            autocapture,
            ..Self::default()
        }
    }
}

// ============================================================================
// Config File Loading
// ============================================================================

pub const DEFAULT_CONFIG_PATH: &str = "autocapture.yaml";

/// Load capture options from a YAML file. A missing file yields defaults.
pub fn load_config(path: Option<&str>) -> Result<CaptureOptions, CaptureError> {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content, config_path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CaptureOptions::default()),
        Err(source) => Err(CaptureError::Io {
            path: config_path.to_string(),
            source,
        }),
    }
}

pub fn parse_config(content: &str, origin: &str) -> Result<CaptureOptions, CaptureError> {
    if content.trim().is_empty() {
        return Ok(CaptureOptions::default());
    }
    serde_yaml::from_str(content).map_err(|source| CaptureError::ConfigParse {
        path: origin.to_string(),
        source,
    })
}
