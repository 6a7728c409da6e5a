//! Enforcement configuration
//!
//! Loaded from a JSON document; every field has a default so an empty
//! object is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::signature::{SignatureError, SignatureResult};

/// Configuration for signature loading and enforcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Directory holding `signature_<model>_<version>.json` files (default: "signatures")
    #[serde(default = "default_signature_dir")]
    pub signature_dir: PathBuf,

    /// Whether rejected calls are logged (default: true)
    #[serde(default = "default_log_rejections")]
    pub log_rejections: bool,
}

fn default_signature_dir() -> PathBuf {
    PathBuf::from("signatures")
}

fn default_log_rejections() -> bool {
    true
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            signature_dir: default_signature_dir(),
            log_rejections: default_log_rejections(),
        }
    }
}

impl EnforcementConfig {
    /// Create a config reading signatures from `dir`
    pub fn with_signature_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            signature_dir: dir.into(),
            ..Default::default()
        }
    }

    /// Parse a config from JSON text
    pub fn from_json_str(content: &str) -> SignatureResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| SignatureError::Config(format!("Invalid JSON: {}", e)))
    }

    /// Read a config file
    pub fn from_file(path: &Path) -> SignatureResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SignatureError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }
}
