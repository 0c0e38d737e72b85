//! Error types for uimap.

use thiserror::Error;

use crate::SessionId;

/// Main error type for uimap operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No attribute combination yields a locator; aborts the enclosing container load
    #[error("Unresolvable locator in container '{container}': {detail}")]
    UnresolvableLocator {
        /// Label (or name) of the container being loaded
        container: String,
        /// Which node could not be addressed
        detail: String,
    },

    /// Node shape matches no known classification
    #[error("Unclassified node: control type '{control_type}', name '{name}', automation id '{automation_id}'")]
    Unclassified {
        /// Raw control type string
        control_type: String,
        /// Node name
        name: String,
        /// Node automation id
        automation_id: String,
    },

    /// Opened combo shape matches no known pattern
    #[error("Ambiguous combo shape: {0}")]
    AmbiguousComboShape(String),

    /// A node reference is no longer valid
    #[error("Stale node: {0}")]
    StaleNode(String),

    /// Component not found by label path
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// Session limit reached
    #[error("Session limit reached (max: {0})")]
    SessionLimitReached(usize),

    /// Transport or driver-side failure
    #[error("Driver error: {0}")]
    Driver(String),

    /// Locator text could not be parsed
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid input or parameters (generic)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error must abort the enclosing container load.
    ///
    /// Unclassified nodes, ambiguous combos and stale nodes are recovered
    /// locally (drop the node, or re-resolve it).
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::Unclassified { .. } | Error::AmbiguousComboShape(_) | Error::StaleNode(_)
        )
    }

    /// Whether the error is a classification miss (node dropped, siblings unaffected).
    pub fn is_classification_miss(&self) -> bool {
        matches!(
            self,
            Error::Unclassified { .. } | Error::AmbiguousComboShape(_)
        )
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
