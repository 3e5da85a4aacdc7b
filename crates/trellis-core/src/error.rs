//! Error types for screen loading and rendering
//!
//! Two families live here:
//!
//! - [`ScreenError`] (with [`FetchError`]) crosses the interpretation
//!   boundary and is surfaced to the caller as an error or fallback state.
//! - [`Diagnostic`] is absorbed by the binder. The affected fragment renders
//!   empty, literal or with a default style, and the diagnostic is attached to
//!   the render output for inspection.

use serde::Serialize;
use thiserror::Error;

/// Errors that prevent a screen from being interpreted at all.
#[derive(Error, Debug)]
pub enum ScreenError {
    /// The document could not be fetched or decoded.
    #[error("Failed to fetch screen: {0}")]
    Fetch(#[from] FetchError),

    /// The document's version is outside the supported range.
    #[error("Unsupported screen version {version} (supported: {})", supported_range(.min, .max))]
    UnsupportedVersion {
        version: u32,
        min: Option<u32>,
        max: u32,
    },
}

fn supported_range(min: &Option<u32>, max: &u32) -> String {
    match min {
        Some(min) => format!("{min}..={max}"),
        None => format!("<= {max}"),
    }
}

/// Transport and decoding failures while fetching a screen document.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body is not a valid screen document
    #[error("Malformed screen document: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for screen operations
pub type Result<T> = std::result::Result<T, ScreenError>;

/// A malformed color or font token.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "token", rename_all = "camelCase")]
pub enum StyleParseError {
    #[error("malformed hex color '{0}'")]
    MalformedHex(String),

    #[error("unknown color token '{0}'")]
    UnknownColor(String),

    #[error("unknown font token '{0}'")]
    UnknownFont(String),

    #[error("unknown font weight '{0}'")]
    UnknownWeight(String),
}

/// A non-fatal problem found while rendering.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// A `key`, `{{token}}` or collection name had no value in scope.
    #[error("binding '{binding}' on '{component_id}' has no value")]
    #[serde(rename_all = "camelCase")]
    BindingMiss {
        component_id: String,
        binding: String,
    },

    /// A style token failed to parse; a default style was used.
    #[error("style on '{component_id}': {error}")]
    #[serde(rename_all = "camelCase")]
    StyleParse {
        component_id: String,
        error: StyleParseError,
    },

    /// An interactive node names an action with no registered handler.
    #[error("action '{action_id}' on '{component_id}' has no handler")]
    #[serde(rename_all = "camelCase")]
    ActionNotFound {
        component_id: String,
        action_id: String,
    },

    /// The tree is deeper than the configured bound; the subtree was dropped.
    #[error("'{component_id}' exceeds maximum depth {max_depth}")]
    #[serde(rename_all = "camelCase")]
    DepthExceeded {
        component_id: String,
        max_depth: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_version_message_includes_range() {
        let err = ScreenError::UnsupportedVersion {
            version: 3,
            min: Some(1),
            max: 2,
        };
        assert_eq!(
            err.to_string(),
            "Unsupported screen version 3 (supported: 1..=2)"
        );

        let err = ScreenError::UnsupportedVersion {
            version: 3,
            min: None,
            max: 2,
        };
        assert_eq!(err.to_string(), "Unsupported screen version 3 (supported: <= 2)");
    }

    #[test]
    fn diagnostics_serialize_with_kind_tag() {
        let diagnostic = Diagnostic::BindingMiss {
            component_id: "header".to_string(),
            binding: "user.name".to_string(),
        };
        let value = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(value["kind"], "bindingMiss");
        assert_eq!(value["componentId"], "header");
        assert_eq!(value["binding"], "user.name");
    }
}
