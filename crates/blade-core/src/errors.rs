//! Structured error types shared across the campaign crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`BladeError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, indices, sizes).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for campaign bookkeeping.
///
/// Configuration errors are fatal and never retried. Missing per-case results
/// are not represented here; aggregation reports them as dropped cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum BladeError {
    /// Invalid or unrecognized configuration.
    #[error("configuration error: {0}")]
    Config(ErrorInfo),
    /// Case, sample or station index outside the valid range.
    #[error("bounds error: {0}")]
    Bounds(ErrorInfo),
    /// Sampling plan or shuffled index file that cannot be trusted.
    #[error("plan error: {0}")]
    Plan(ErrorInfo),
    /// Directory or file lifecycle failures.
    #[error("workspace error: {0}")]
    Workspace(ErrorInfo),
    /// Master dataset assembly failures.
    #[error("aggregate error: {0}")]
    Aggregate(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl BladeError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            BladeError::Config(info)
            | BladeError::Bounds(info)
            | BladeError::Plan(info)
            | BladeError::Workspace(info)
            | BladeError::Aggregate(info)
            | BladeError::Serde(info) => info,
        }
    }

    /// Returns true for errors that must abort the invoking process.
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, BladeError::Config(_))
    }
}
