use serde::Deserialize;

use crate::error::{MergeError, Result};

/// Version shown for a main branch that has no manifest
pub const UNDEFINED_VERSION: &str = "undefined";

/// A `package.json`-style document read at some revision
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VersionManifest {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VersionManifest {
    /// Parse manifest text read at `revision` (used for error context)
    pub fn parse(text: &str, revision: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            MergeError::precondition(format!(
                "problem parsing the manifest at '{}': {}",
                revision, e
            ))
        })
    }

    /// The version string, required for naming the release
    pub fn require_version(&self, revision: &str) -> Result<&str> {
        self.version.as_deref().ok_or_else(|| {
            MergeError::precondition(format!("the manifest at '{}' has no version", revision))
        })
    }
}

/// The main branch version as far as the workflow knows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainVersion {
    Known(String),
    /// No manifest on the main branch and version matching was skipped
    Undefined,
}

impl MainVersion {
    pub fn as_str(&self) -> &str {
        match self {
            MainVersion::Known(v) => v,
            MainVersion::Undefined => UNDEFINED_VERSION,
        }
    }
}
