//! Provider error types

use crate::node::NodeId;
use thiserror::Error;

/// Kind of pattern for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Regex,
    Glob,
}

/// Errors produced while compiling file-name patterns
#[derive(Debug, Error)]
pub enum PatternError {
    /// Empty pattern is invalid
    #[error("Empty {kind:?} pattern provided")]
    InvalidEmpty { kind: PatternKind },
    /// Regex failed to compile
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },
    /// Glob failed to parse
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },
}

impl PatternError {
    #[must_use]
    pub fn regex_compile(pattern: &str, reason: &str) -> Self {
        Self::InvalidRegex {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn glob_parse(pattern: &str, reason: &str) -> Self {
        Self::InvalidGlob {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors a node provider can report
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Node exists but cannot be enumerated
    #[error("Cannot read '{id}': {reason}")]
    AccessDenied { id: NodeId, reason: String },

    /// Node id does not resolve, or the node is malformed
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// Provider configuration is unusable
    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// I/O error while loading a source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document failed to parse
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File-name pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),
}

impl ProviderError {
    /// Access-denied error for `id`
    #[must_use]
    pub fn denied(id: &NodeId, reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            id: id.clone(),
            reason: reason.into(),
        }
    }
}
