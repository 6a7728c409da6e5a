//! # Signature Errors

use thiserror::Error;

use crate::schema::{EnforcementError, EnforcementErrorKind};

/// Result type for signature operations
pub type SignatureResult<T> = Result<T, SignatureError>;

/// Signature errors
#[derive(Debug, Clone, Error)]
pub enum SignatureError {
    #[error("Model '{0}' has no registered signature")]
    UnknownModel(String),

    #[error("Model '{model}' version '{version}' has no registered signature")]
    UnknownVersion { model: String, version: String },

    #[error("Model '{model}' version '{version}' declares no output schema")]
    NoOutputSchema { model: String, version: String },

    #[error("Signature for model '{model}' version '{version}' is immutable")]
    Immutable { model: String, version: String },

    #[error("Malformed signature file '{path}': {reason}")]
    Malformed { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Enforcement(#[from] EnforcementError),
}

impl SignatureError {
    /// Returns the enforcement failure kind, if this is a data rejection
    pub fn enforcement_kind(&self) -> Option<EnforcementErrorKind> {
        match self {
            SignatureError::Enforcement(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Lookup failures mean the caller asked for a signature that does not exist
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            SignatureError::UnknownModel(_)
                | SignatureError::UnknownVersion { .. }
                | SignatureError::NoOutputSchema { .. }
        )
    }
}
