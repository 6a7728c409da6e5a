//! Schema enforcement engine
//!
//! Validates runtime data against a declared schema before it reaches a
//! model, producing a fresh, type-checked copy or a structured error.
//!
//! # Design Principles
//!
//! - Closed schema node and value variants, matched exhaustively
//! - Upward numeric widening only, no cross-family coercion
//! - Whole missing/extra name sets reported in one error
//! - Fail fast on the first bad array element
//! - No mutation of caller data, no defaults injected
//! - Schemas are immutable and shareable across threads

mod enforce;
mod errors;
mod primitive;
mod types;
mod value;

pub use enforce::{enforce, enforce_array, enforce_object, enforce_primitive, enforce_property};
pub use errors::{EnforceResult, EnforcementError, EnforcementErrorKind};
pub use primitive::PrimitiveKind;
pub use types::{ArraySchema, ObjectSchema, Property, SchemaNode};
pub use value::{Buffer, Value};
