//! Result and error types for Comprobar.

use thiserror::Error;

/// Result type for Comprobar operations
pub type ComprobarResult<T> = Result<T, ComprobarError>;

/// Errors that can occur while driving a scenario
#[derive(Debug, Error)]
pub enum ComprobarError {
    /// Selector never satisfied its required condition within the timeout
    #[error("element '{selector}' did not become {condition} within {waited_ms}ms")]
    ElementNotFound {
        /// Selector that was being resolved
        selector: String,
        /// Condition that was required (present, visible, stable)
        condition: String,
        /// Total wait spent before giving up
        waited_ms: u64,
    },

    /// Action was attempted but never took effect
    #[error("{action} on '{selector}' did not register within {waited_ms}ms")]
    ActionBlocked {
        /// Action kind (click, fill, ...)
        action: String,
        /// Selector of the target element
        selector: String,
        /// Total wait spent retrying the action
        waited_ms: u64,
    },

    /// Final scenario check mismatched
    #[error("assertion on '{selector}' failed: expected {expected}, got {actual} after {waited_ms}ms")]
    AssertionFailed {
        /// Selector of the asserted element
        selector: String,
        /// Expected page state
        expected: String,
        /// Last observed page state
        actual: String,
        /// Total wait spent polling before finalizing
        waited_ms: u64,
    },

    /// Base URL unreachable; fatal for the whole test case
    #[error("navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed to load
        url: String,
        /// Error message from the engine
        message: String,
    },

    /// Network never went quiescent within the timeout
    #[error("network did not go idle within {waited_ms}ms")]
    NetworkBusy {
        /// Total wait spent polling for idleness
        waited_ms: u64,
    },

    /// Failure inside the automation engine itself
    #[error("engine error: {message}")]
    Engine {
        /// Error message
        message: String,
    },

    /// Invalid harness configuration
    #[error("invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error (config files)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error (report serialization)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ComprobarError {
    /// Shorthand for an engine-level failure
    #[must_use]
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// True for failures that abort the whole test case immediately
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Navigation { .. })
    }
}
