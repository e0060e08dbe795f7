//! Error types for codeflip operations.
//!
//! Only genuine failures live here. Negative search results (already
//! misclassified, nothing to rename, budget exhausted) are ordinary
//! [`AttackOutcome`](crate::attack::AttackOutcome) values, never errors.

use std::fmt;
use thiserror::Error;

/// Which external collaborator misbehaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleKind {
    /// Classification model.
    Classifier,
    /// Masked-language-model suggestion service.
    Suggestion,
    /// Tokenizer / identifier extractor.
    Extractor,
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Classifier => "classifier",
            Self::Suggestion => "suggestion",
            Self::Extractor => "extractor",
        };
        write!(f, "{s}")
    }
}

/// Main error type for codeflip operations.
///
/// # Examples
///
/// ```
/// use codeflip::error::{CodeflipError, OracleKind};
///
/// let err = CodeflipError::oracle(OracleKind::Classifier, "expected 4 predictions, got 3");
/// assert!(err.is_oracle_failure());
/// assert!(err.to_string().contains("classifier oracle failure"));
/// ```
#[derive(Debug, Error)]
pub enum CodeflipError {
    /// An oracle raised an error or returned malformed output.
    ///
    /// Fatal for the current example.
    #[error("{oracle} oracle failure: {reason}")]
    OracleFailure {
        /// Collaborator that failed
        oracle: OracleKind,
        /// What went wrong
        reason: String,
    },

    /// Invalid configuration value.
    #[error("Invalid config: {param} = {value}, expected {constraint}")]
    InvalidConfig {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Token positions out of range or shared between identifiers.
    #[error("Invalid program: {0}")]
    InvalidProgram(String),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CodeflipError {
    /// Create an oracle failure.
    #[must_use]
    pub fn oracle(oracle: OracleKind, reason: impl Into<String>) -> Self {
        Self::OracleFailure {
            oracle,
            reason: reason.into(),
        }
    }

    /// Create an invalid-config error.
    #[must_use]
    pub fn invalid_config(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidConfig {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// True for failures the driver must not confuse with an exhausted search.
    #[must_use]
    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, Self::OracleFailure { .. })
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, CodeflipError>;
