//! Model signature subsystem
//!
//! A signature declares the schemas a model version accepts and produces.
//! Signatures are loaded once at startup and treated as read-only
//! configuration afterwards.
//!
//! # Design Principles
//!
//! - Explicit (model, version) binding for every payload
//! - Registered signatures are immutable
//! - Payloads are validated before the model is invoked
//! - Violations reject the payload; nothing is partially accepted

mod errors;
mod loader;
mod types;
mod validator;

pub use errors::{SignatureError, SignatureResult};
pub use loader::SignatureLoader;
pub use types::ModelSignature;
pub use validator::SignatureValidator;
