//! Model signature definitions
//!
//! A signature binds a (model, version) pair to the schema its inputs must
//! satisfy and, optionally, the schema of its outputs. On disk both are
//! stored as column lists:
//!
//! ```json
//! {
//!   "model": "chat",
//!   "version": "1",
//!   "inputs": [{"name": "prompt", "type": "string"}],
//!   "outputs": [{"name": "reply", "type": "string"}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::schema::{EnforcementError, ObjectSchema};

/// Input/output schemas declared for one model version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SignatureDocument", into = "SignatureDocument")]
pub struct ModelSignature {
    /// Model name
    pub model: String,
    /// Model version
    pub version: String,
    /// Schema every inference request must satisfy
    pub inputs: ObjectSchema,
    /// Schema of model outputs, when declared
    pub outputs: Option<ObjectSchema>,
}

impl ModelSignature {
    /// Create a signature with inputs only
    pub fn new(model: impl Into<String>, version: impl Into<String>, inputs: ObjectSchema) -> Self {
        Self {
            model: model.into(),
            version: version.into(),
            inputs,
            outputs: None,
        }
    }

    /// Attach an output schema
    pub fn with_outputs(mut self, outputs: ObjectSchema) -> Self {
        self.outputs = Some(outputs);
        self
    }

    /// Returns the unique key for this signature (model, version)
    pub fn key(&self) -> (&str, &str) {
        (&self.model, &self.version)
    }

    /// Returns the file name this signature is stored under
    pub fn file_name(&self) -> String {
        format!("signature_{}_{}.json", self.model, self.version)
    }

    /// Validates the identifying fields (not the schemas, which are
    /// validated at construction)
    pub fn validate_structure(&self) -> Result<(), String> {
        for (field, value) in [("model", &self.model), ("version", &self.version)] {
            if value.is_empty() {
                return Err(format!("Signature '{}' must not be empty", field));
            }
            if value.contains(['/', '\\']) || value == ".." {
                return Err(format!(
                    "Signature '{}' must not contain path separators: '{}'",
                    field, value
                ));
            }
        }
        Ok(())
    }
}

/// Serialized form of a signature
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SignatureDocument {
    model: String,
    version: String,
    inputs: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outputs: Option<JsonValue>,
}

impl TryFrom<SignatureDocument> for ModelSignature {
    type Error = EnforcementError;

    fn try_from(doc: SignatureDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            model: doc.model,
            version: doc.version,
            inputs: ObjectSchema::from_columns(&doc.inputs)?,
            outputs: doc
                .outputs
                .as_ref()
                .map(ObjectSchema::from_columns)
                .transpose()?,
        })
    }
}

impl From<ModelSignature> for SignatureDocument {
    fn from(signature: ModelSignature) -> Self {
        Self {
            inputs: signature.inputs.to_columns(),
            outputs: signature.outputs.as_ref().map(ObjectSchema::to_columns),
            model: signature.model,
            version: signature.version,
        }
    }
}
