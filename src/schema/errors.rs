//! Enforcement error types
//!
//! Error codes:
//! - SCHEMA_TYPE_MISMATCH (container kind differs from the schema node)
//! - SCHEMA_INVALID_ARGUMENT (schema itself is malformed)
//! - SCHEMA_MISSING_PROPERTIES
//! - SCHEMA_UNEXPECTED_PROPERTIES
//! - SCHEMA_TYPE_COERCION (primitive kind not accepted)
//! - SCHEMA_UNSUPPORTED_DATA (input has no runtime representation)
//!
//! Key and index context wrap an inner error without changing its kind.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use super::primitive::PrimitiveKind;
use super::value::Value;

/// Result type for enforcement operations
pub type EnforceResult<T> = Result<T, EnforcementError>;

/// Failure kinds, independent of any context wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnforcementErrorKind {
    TypeMismatch,
    InvalidSchemaArgument,
    MissingRequiredProperties,
    UnexpectedProperties,
    TypeCoercionFailure,
    UnsupportedData,
}

impl EnforcementErrorKind {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            EnforcementErrorKind::TypeMismatch => "SCHEMA_TYPE_MISMATCH",
            EnforcementErrorKind::InvalidSchemaArgument => "SCHEMA_INVALID_ARGUMENT",
            EnforcementErrorKind::MissingRequiredProperties => "SCHEMA_MISSING_PROPERTIES",
            EnforcementErrorKind::UnexpectedProperties => "SCHEMA_UNEXPECTED_PROPERTIES",
            EnforcementErrorKind::TypeCoercionFailure => "SCHEMA_TYPE_COERCION",
            EnforcementErrorKind::UnsupportedData => "SCHEMA_UNSUPPORTED_DATA",
        }
    }

    /// True for errors caused by the schema rather than the data
    pub fn is_schema_error(&self) -> bool {
        matches!(self, EnforcementErrorKind::InvalidSchemaArgument)
    }
}

impl fmt::Display for EnforcementErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Enforcement errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnforcementError {
    #[error("Expected data to be {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{0}")]
    InvalidSchemaArgument(String),

    #[error("Missing required properties: {}", NameSet(.0))]
    MissingRequiredProperties(BTreeSet<String>),

    #[error("Invalid properties not defined in the schema found: {}", NameSet(.0))]
    UnexpectedProperties(BTreeSet<String>),

    #[error("Failed to enforce schema of data `{value}` with dtype `{kind}`")]
    TypeCoercionFailure { value: Value, kind: PrimitiveKind },

    #[error("Unsupported data: {0}")]
    UnsupportedData(String),

    #[error("Failed to enforce schema for key `{key}`: {source}")]
    KeyContext {
        key: String,
        source: Box<EnforcementError>,
    },

    #[error("Failed to enforce schema for element {index}: {source}")]
    IndexContext {
        index: usize,
        source: Box<EnforcementError>,
    },
}

impl EnforcementError {
    pub(crate) fn type_mismatch(expected: &'static str, actual: &Value) -> Self {
        EnforcementError::TypeMismatch {
            expected,
            actual: actual.kind_name(),
        }
    }

    /// Wraps this error with the object key it occurred under
    pub fn at_key(self, key: impl Into<String>) -> Self {
        EnforcementError::KeyContext {
            key: key.into(),
            source: Box::new(self),
        }
    }

    /// Wraps this error with the sequence position it occurred at
    pub fn at_index(self, index: usize) -> Self {
        EnforcementError::IndexContext {
            index,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping context wrappers
    pub fn root_cause(&self) -> &EnforcementError {
        let mut current = self;
        while let EnforcementError::KeyContext { source, .. }
        | EnforcementError::IndexContext { source, .. } = current
        {
            current = &**source;
        }
        current
    }

    /// Returns the failure kind of the root cause
    pub fn kind(&self) -> EnforcementErrorKind {
        match self {
            EnforcementError::TypeMismatch { .. } => EnforcementErrorKind::TypeMismatch,
            EnforcementError::InvalidSchemaArgument(_) => {
                EnforcementErrorKind::InvalidSchemaArgument
            }
            EnforcementError::MissingRequiredProperties(_) => {
                EnforcementErrorKind::MissingRequiredProperties
            }
            EnforcementError::UnexpectedProperties(_) => {
                EnforcementErrorKind::UnexpectedProperties
            }
            EnforcementError::TypeCoercionFailure { .. } => {
                EnforcementErrorKind::TypeCoercionFailure
            }
            EnforcementError::UnsupportedData(_) => EnforcementErrorKind::UnsupportedData,
            EnforcementError::KeyContext { source, .. }
            | EnforcementError::IndexContext { source, .. } => source.kind(),
        }
    }

    /// Returns the location of the failure, e.g. `d.arr[1]`.
    ///
    /// Empty when the failure happened at the root value.
    pub fn path(&self) -> String {
        let mut path = String::new();
        let mut current = self;
        loop {
            match current {
                EnforcementError::KeyContext { key, source } => {
                    if !path.is_empty() {
                        path.push('.');
                    }
                    path.push_str(key);
                    current = &**source;
                }
                EnforcementError::IndexContext { index, source } => {
                    path.push_str(&format!("[{}]", index));
                    current = &**source;
                }
                _ => return path,
            }
        }
    }
}

/// Renders a name set as `{'a', 'b'}`.
struct NameSet<'a>(&'a BTreeSet<String>);

impl fmt::Display for NameSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}'", name)?;
        }
        f.write_str("}")
    }
}
