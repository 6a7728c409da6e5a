//! Signature loader for loading model signatures from disk at startup
//!
//! - Signatures stored at <signature_dir>/signature_<model>_<version>.json
//! - One file per model version
//! - Malformed or misnamed signature files fail the load
//! - Registered signatures are immutable

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::errors::{SignatureError, SignatureResult};
use super::types::ModelSignature;
use crate::config::EnforcementConfig;

/// Reads signature files from disk and keeps an in-memory registry.
pub struct SignatureLoader {
    /// Directory containing signature files
    signature_dir: PathBuf,
    /// Loaded signatures indexed by (model, version)
    signatures: HashMap<(String, String), ModelSignature>,
}

impl SignatureLoader {
    /// Creates a loader for the given signature directory.
    pub fn new(signature_dir: &Path) -> Self {
        Self {
            signature_dir: signature_dir.to_path_buf(),
            signatures: HashMap::new(),
        }
    }

    /// Creates a loader for the configured signature directory.
    pub fn from_config(config: &EnforcementConfig) -> Self {
        Self::new(&config.signature_dir)
    }

    /// Returns the signature directory path.
    pub fn signature_dir(&self) -> &Path {
        &self.signature_dir
    }

    /// Loads all signature files from the signature directory.
    ///
    /// A missing directory is created and yields an empty registry.
    /// Non-JSON files are skipped.
    pub fn load_all(&mut self) -> SignatureResult<()> {
        if !self.signature_dir.exists() {
            fs::create_dir_all(&self.signature_dir).map_err(|e| {
                malformed(
                    &self.signature_dir,
                    format!("Failed to create signature directory: {}", e),
                )
            })?;
            return Ok(());
        }

        let entries = fs::read_dir(&self.signature_dir).map_err(|e| {
            malformed(
                &self.signature_dir,
                format!("Failed to read signature directory: {}", e),
            )
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                malformed(
                    &self.signature_dir,
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            self.load_signature_file(&path)?;
        }

        Ok(())
    }

    /// Loads a single signature file.
    fn load_signature_file(&mut self, path: &Path) -> SignatureResult<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| malformed(path, format!("Failed to read file: {}", e)))?;

        let signature: ModelSignature = serde_json::from_str(&content)
            .map_err(|e| malformed(path, format!("Invalid signature: {}", e)))?;

        signature
            .validate_structure()
            .map_err(|reason| malformed(path, reason))?;

        let expected_name = signature.file_name();
        if path.file_name().map_or(true, |name| name != expected_name.as_str()) {
            return Err(malformed(
                path,
                format!(
                    "Signature for model '{}' version '{}' must be stored as {}",
                    signature.model, signature.version, expected_name
                ),
            ));
        }

        let key = (signature.model.clone(), signature.version.clone());
        if self.signatures.contains_key(&key) {
            return Err(malformed(
                path,
                format!(
                    "Signature for model '{}' version '{}' is already registered",
                    key.0, key.1
                ),
            ));
        }

        debug!(
            model = %signature.model,
            version = %signature.version,
            path = %path.display(),
            "loaded model signature"
        );

        self.signatures.insert(key, signature);

        Ok(())
    }

    /// Registers a signature directly (for programmatic creation).
    pub fn register(&mut self, signature: ModelSignature) -> SignatureResult<()> {
        signature
            .validate_structure()
            .map_err(|reason| SignatureError::Malformed {
                path: "<in-memory>".into(),
                reason,
            })?;

        let key = (signature.model.clone(), signature.version.clone());
        if self.signatures.contains_key(&key) {
            return Err(SignatureError::Immutable {
                model: key.0,
                version: key.1,
            });
        }

        self.signatures.insert(key, signature);
        Ok(())
    }

    /// Gets a signature by model and version.
    pub fn get(&self, model: &str, version: &str) -> Option<&ModelSignature> {
        self.signatures
            .get(&(model.to_string(), version.to_string()))
    }

    /// Checks if a signature exists.
    pub fn exists(&self, model: &str, version: &str) -> bool {
        self.get(model, version).is_some()
    }

    /// Checks if any version of a model has a signature.
    pub fn model_exists(&self, model: &str) -> bool {
        self.signatures.keys().any(|(m, _)| m == model)
    }

    /// Returns all loaded signatures.
    pub fn all_signatures(&self) -> impl Iterator<Item = &ModelSignature> {
        self.signatures.values()
    }

    /// Returns the number of loaded signatures.
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// Saves a signature to disk at its standard location.
    pub fn save_signature(&self, signature: &ModelSignature) -> SignatureResult<PathBuf> {
        signature
            .validate_structure()
            .map_err(|reason| SignatureError::Malformed {
                path: "<in-memory>".into(),
                reason,
            })?;

        let path = self.signature_dir.join(signature.file_name());
        if path.exists() {
            return Err(SignatureError::Immutable {
                model: signature.model.clone(),
                version: signature.version.clone(),
            });
        }

        if !self.signature_dir.exists() {
            fs::create_dir_all(&self.signature_dir).map_err(|e| {
                malformed(
                    &self.signature_dir,
                    format!("Failed to create signature directory: {}", e),
                )
            })?;
        }

        let content = serde_json::to_string_pretty(signature)
            .map_err(|e| malformed(&path, format!("Failed to serialize signature: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| malformed(&path, format!("Failed to write file: {}", e)))?;

        Ok(path)
    }
}

fn malformed(path: &Path, reason: String) -> SignatureError {
    SignatureError::Malformed {
        path: path.display().to_string(),
        reason,
    }
}
