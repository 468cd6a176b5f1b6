/// Point of the workflow a script list runs at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPhase {
    Before,
    After,
}

impl ScriptPhase {
    /// Get the phase name as a string
    pub fn name(&self) -> &'static str {
        match self {
            ScriptPhase::Before => "before",
            ScriptPhase::After => "after",
        }
    }
}

/// What a script is told about the merge being performed
#[derive(Debug, Clone)]
pub struct ScriptContext {
    pub phase: ScriptPhase,
    /// Hash of the commit being merged
    pub source_hash: String,
    /// Branch the commit is merged into
    pub target_branch: String,
    /// Version from the source manifest
    pub version: String,
    pub dry_run: bool,
}

impl ScriptContext {
    /// Convert context to environment variables for the script
    ///
    /// Maps context fields to M2M_* environment variables
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        vec![
            ("M2M_PHASE".to_string(), self.phase.name().to_string()),
            ("M2M_SOURCE_HASH".to_string(), self.source_hash.clone()),
            ("M2M_TARGET_BRANCH".to_string(), self.target_branch.clone()),
            ("M2M_VERSION".to_string(), self.version.clone()),
            ("M2M_DRY_RUN".to_string(), self.dry_run.to_string()),
        ]
    }

    /// The command line actually executed for `script`.
    ///
    /// Scripts addressed by a relative path (leading `.`) get the source hash
    /// and target branch as trailing arguments; anything else runs verbatim.
    pub fn invocation(&self, script: &str) -> String {
        if script.starts_with('.') {
            format!("{} {} {}", script, self.source_hash, self.target_branch)
        } else {
            script.to_string()
        }
    }
}
