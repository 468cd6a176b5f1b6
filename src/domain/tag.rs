/// Names derived from a release version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub name: String,
}

impl ReleaseTag {
    /// Tag for a version, e.g. "1.2.3" -> "v1.2.3"
    pub fn for_version(version: &str) -> Self {
        let version = version.trim_start_matches('v').trim_start_matches('V');
        ReleaseTag {
            name: format!("v{}", version),
        }
    }

    /// Annotation message of the tag
    pub fn message(&self) -> &str {
        &self.name
    }

    /// Message of the merge commit that the tag points at
    pub fn merge_message(&self) -> String {
        format!("merge {}", self.name)
    }
}
