use thiserror::Error;

/// Fault raised by a host while reading its element tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    /// Child list could not be enumerated (detached or access-restricted node)
    #[error("cannot read children of <{tag}>: {reason}")]
    Unreadable { tag: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML for `AutocaptureConfig`
    #[error("invalid autocapture config ({path}): {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// URL allowlist entry rejected when building a strict regex pattern
    #[error("invalid URL pattern '{pattern}': {source}")]
    UrlPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Snapshot or property bag JSON could not be parsed
    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot does not contain the requested node
    #[error("node '{0}' not found in snapshot")]
    NodeNotFound(String),
}
