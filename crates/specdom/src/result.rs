//! Result and error types for Specdom.

use thiserror::Error;

/// Result type for Specdom operations
pub type SpecdomResult<T> = Result<T, SpecdomError>;

/// Errors that can occur while touching the DOM or loading configuration.
///
/// None of these escape the assertion and interaction surface: they are
/// folded into [`crate::Outcome::Error`] at the boundary of every
/// DOM-touching operation.
#[derive(Debug, Error)]
pub enum SpecdomError {
    /// Selector could not be parsed
    #[error("SyntaxError: '{selector}' is not a valid selector: {message}")]
    InvalidSelector {
        /// The offending selector
        selector: String,
        /// Parser message
        message: String,
    },

    /// Node handle no longer refers to a live element
    #[error("Node is detached from the document: {message}")]
    DetachedNode {
        /// Error message
        message: String,
    },

    /// Tree mutation would put a node inside itself or under a non-element
    #[error("HierarchyRequestError: {message}")]
    HierarchyRequest {
        /// Error message
        message: String,
    },

    /// Any other fault raised by the DOM backend
    #[error("DOM error: {message}")]
    DomFault {
        /// Error message
        message: String,
    },

    /// Sending through an application port failed
    #[error("Port error: {message}")]
    PortFault {
        /// Error message
        message: String,
    },

    /// HTTP method string not recognised
    #[error("Invalid HTTP method: {method}")]
    InvalidMethod {
        /// The method as received
        method: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SpecdomError {
    /// Create an invalid selector error
    #[must_use]
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create a generic DOM fault
    #[must_use]
    pub fn dom(message: impl Into<String>) -> Self {
        Self::DomFault {
            message: message.into(),
        }
    }
}
