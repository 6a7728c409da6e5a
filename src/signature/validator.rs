//! Signature validator for model inputs and outputs
//!
//! Resolves the signature for a (model, version), then runs the schema
//! enforcer against its input or output schema. Lookup failures are
//! reported before any data is examined. Every enforcement outcome is
//! counted; rejections are logged when configured.

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::errors::{SignatureError, SignatureResult};
use super::loader::SignatureLoader;
use super::types::ModelSignature;
use crate::config::EnforcementConfig;
use crate::observability::EnforcementMetrics;
use crate::schema::{enforce_object, EnforceResult, ObjectSchema, SchemaNode, Value};

/// Which side of the model a payload belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Inputs,
    Outputs,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Inputs => "inputs",
            Direction::Outputs => "outputs",
        }
    }
}

/// Validates model payloads against registered signatures.
///
/// Validation does not mutate payloads and is safe to share across
/// threads as long as the loader is not modified.
pub struct SignatureValidator<'a> {
    loader: &'a SignatureLoader,
    metrics: &'a EnforcementMetrics,
    log_rejections: bool,
}

impl<'a> SignatureValidator<'a> {
    /// Creates a validator backed by the given loader and metrics.
    pub fn new(loader: &'a SignatureLoader, metrics: &'a EnforcementMetrics) -> Self {
        Self {
            loader,
            metrics,
            log_rejections: true,
        }
    }

    /// Creates a validator honoring the logging settings of `config`.
    pub fn with_config(
        loader: &'a SignatureLoader,
        metrics: &'a EnforcementMetrics,
        config: &EnforcementConfig,
    ) -> Self {
        Self {
            loader,
            metrics,
            log_rejections: config.log_rejections,
        }
    }

    /// Validates an inference request against the model's input schema.
    ///
    /// # Errors
    ///
    /// - `UnknownModel` / `UnknownVersion` if no signature is registered
    /// - `Enforcement` if the data violates the input schema
    pub fn validate_inputs(&self, model: &str, version: &str, data: &Value) -> SignatureResult<Value> {
        let signature = self.resolve(model, version)?;
        self.run(signature, Direction::Inputs, &signature.inputs, || {
            enforce_object(data, &signature.inputs)
        })
    }

    /// Decodes a JSON request guided by the input schema, then validates it.
    pub fn validate_inputs_json(
        &self,
        model: &str,
        version: &str,
        json: &JsonValue,
    ) -> SignatureResult<Value> {
        let signature = self.resolve(model, version)?;
        let node = SchemaNode::Object(signature.inputs.clone());
        self.run(signature, Direction::Inputs, &signature.inputs, || {
            let data = Value::from_json_with_schema(json, &node)?;
            enforce_object(&data, &signature.inputs)
        })
    }

    /// Validates model outputs against the declared output schema.
    ///
    /// # Errors
    ///
    /// `NoOutputSchema` if the signature declares no outputs, otherwise as
    /// [`validate_inputs`](Self::validate_inputs).
    pub fn validate_outputs(&self, model: &str, version: &str, data: &Value) -> SignatureResult<Value> {
        let signature = self.resolve(model, version)?;
        let outputs = signature
            .outputs
            .as_ref()
            .ok_or_else(|| SignatureError::NoOutputSchema {
                model: model.to_string(),
                version: version.to_string(),
            })?;
        self.run(signature, Direction::Outputs, outputs, || {
            enforce_object(data, outputs)
        })
    }

    fn resolve(&self, model: &str, version: &str) -> SignatureResult<&'a ModelSignature> {
        if !self.loader.model_exists(model) {
            return Err(SignatureError::UnknownModel(model.to_string()));
        }
        self.loader
            .get(model, version)
            .ok_or_else(|| SignatureError::UnknownVersion {
                model: model.to_string(),
                version: version.to_string(),
            })
    }

    fn run<F>(
        &self,
        signature: &ModelSignature,
        direction: Direction,
        schema: &ObjectSchema,
        enforce: F,
    ) -> SignatureResult<Value>
    where
        F: FnOnce() -> EnforceResult<Value>,
    {
        match enforce() {
            Ok(value) => {
                self.metrics.record_accepted();
                debug!(
                    model = %signature.model,
                    version = %signature.version,
                    direction = direction.as_str(),
                    properties = schema.properties().len(),
                    "payload accepted"
                );
                Ok(value)
            }
            Err(e) => {
                self.metrics.record_rejected(e.kind());
                if self.log_rejections {
                    info!(
                        model = %signature.model,
                        version = %signature.version,
                        direction = direction.as_str(),
                        code = e.kind().code(),
                        path = %e.path(),
                        error = %e,
                        "payload rejected"
                    );
                }
                Err(e.into())
            }
        }
    }
}
