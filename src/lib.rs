//! modelsig - strict schema enforcement for model signatures
//!
//! Validates data arriving at an inference boundary against a declared
//! schema and hands back a normalized, type-checked copy, or a structured
//! error explaining exactly where and why the data was rejected.

pub mod config;
pub mod observability;
pub mod schema;
pub mod signature;

pub use config::EnforcementConfig;
pub use schema::{
    enforce, ArraySchema, EnforceResult, EnforcementError, EnforcementErrorKind, ObjectSchema,
    PrimitiveKind, Property, SchemaNode, Value,
};
pub use signature::{ModelSignature, SignatureError, SignatureLoader, SignatureValidator};
