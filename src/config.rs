use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MergeError, Result};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".m2m";

/// Scripts run around the merge and the knobs that go with them.
///
/// ```json
/// { "before": ["npm test", "./scripts/check.sh"], "after": ["./notify.sh"] }
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Must all exit 0 before anything is merged
    pub before: Vec<String>,

    /// Run once the merge is done; failures are only reported
    #[serde(default)]
    pub after: Option<Vec<String>>,

    /// Manifest holding the version, relative to the repository root
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Ask before merging a commit that already is the main branch tip
    #[serde(default)]
    pub confirm_matching_commits: bool,
}

/// Returns the default version manifest path.
fn default_manifest() -> String {
    "package.json".to_string()
}

impl WorkflowConfig {
    /// Parse and validate config text; `origin` names the source in errors
    pub fn from_json(text: &str, origin: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            MergeError::config(format!("unable to parse config file '{}': {}", origin, e))
        })
    }

    pub fn after_scripts(&self) -> Option<&[String]> {
        self.after.as_deref()
    }
}

/// User-level fallback, `<config dir>/m2m/config.json`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("m2m").join("config.json"))
}

/// Locate the config file.
///
/// Attempts, in order:
/// 1. Custom path provided as parameter (must exist), relative to `workdir`
/// 2. `.m2m` in `workdir`
/// 3. `m2m/config.json` in the user config directory
pub fn resolve_config_path(config_path: Option<&Path>, workdir: &Path) -> Result<PathBuf> {
    if let Some(path) = config_path {
        let path = workdir.join(path);
        if !path.is_file() {
            return Err(MergeError::config(format!(
                "config file '{}' not found",
                path.display()
            )));
        }
        return Ok(path);
    }

    let local = workdir.join(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        return Ok(local);
    }

    match user_config_path() {
        Some(path) if path.is_file() => Ok(path),
        _ => Err(MergeError::config(format!(
            "no '{}' file found in {}",
            DEFAULT_CONFIG_FILE,
            workdir.display()
        ))),
    }
}

/// Loads and validates the workflow configuration.
///
/// # Returns
/// * `Ok(WorkflowConfig)` - Validated configuration
/// * `Err` - If no file is found, it cannot be read, or it is malformed
pub fn load_config(config_path: Option<&Path>, workdir: &Path) -> Result<WorkflowConfig> {
    let path = resolve_config_path(config_path, workdir)?;
    log::debug!("loading config from {}", path.display());
    let text = fs::read_to_string(&path)?;
    WorkflowConfig::from_json(&text, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config = WorkflowConfig::from_json(r#"{"before": []}"#, ".m2m").unwrap();
        assert!(config.before.is_empty());
        assert_eq!(config.after, None);
        assert_eq!(config.manifest, "package.json");
        assert!(!config.confirm_matching_commits);
    }

    #[test]
    fn test_full_config() {
        let text = r#"{
            "before": ["npm test", "./check.sh"],
            "after": ["./notify.sh"],
            "manifest": "app/package.json",
            "confirmMatchingCommits": true,
            "comment": "unknown keys are ignored"
        }"#;
        let config = WorkflowConfig::from_json(text, ".m2m").unwrap();
        assert_eq!(config.before, vec!["npm test", "./check.sh"]);
        assert_eq!(config.after_scripts(), Some(&["./notify.sh".to_string()][..]));
        assert_eq!(config.manifest, "app/package.json");
        assert!(config.confirm_matching_commits);
    }

    #[test]
    fn test_missing_before_rejected() {
        let err = WorkflowConfig::from_json(r#"{"after": ["x"]}"#, ".m2m").unwrap_err();
        assert!(matches!(err, MergeError::Config(_)));
        assert!(err.to_string().contains("before"));
    }

    #[test]
    fn test_non_string_elements_rejected() {
        assert!(WorkflowConfig::from_json(r#"{"before": ["ok", 1]}"#, ".m2m").is_err());
        assert!(WorkflowConfig::from_json(r#"{"before": [], "after": [true]}"#, ".m2m").is_err());
        assert!(WorkflowConfig::from_json(r#"{"before": "npm test"}"#, ".m2m").is_err());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(WorkflowConfig::from_json("null", ".m2m").is_err());
        assert!(WorkflowConfig::from_json("[]", ".m2m").is_err());
        assert!(WorkflowConfig::from_json("not json", ".m2m").is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(Path::new("nope.json")), dir.path()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_loads_default_file_from_workdir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".m2m"), r#"{"before": ["true"]}"#).unwrap();
        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.before, vec!["true"]);
    }
}
