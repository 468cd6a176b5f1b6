use std::fmt;

use crate::domain::manifest::UNDEFINED_VERSION;

/// Warnings raised by the safety checks that precede a merge.
/// These are non-fatal on their own; some are followed by a confirmation gate.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Source commit is already the tip of the main branch
    SameCommit { main_branch: String, hash: String },
    /// Source and main carry the same version
    SameVersion { source_hash: String, version: String },
    /// Source version is older than the main branch version
    VersionBehind {
        source_hash: String,
        source_version: String,
        main_version: String,
    },
    /// Main branch has no manifest; its version is shown as undefined
    MissingMainManifest { main_branch: String, manifest: String },
    /// Main branch does not exist yet
    MissingMainBranch { main_branch: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::SameCommit { main_branch, hash } => write!(
                f,
                "'{} ({})' and '{}' are the same commit",
                main_branch, hash, hash
            ),
            BoundaryWarning::SameVersion {
                source_hash,
                version,
            } => write!(
                f,
                "main branch and {} have the same version number {}",
                source_hash, version
            ),
            BoundaryWarning::VersionBehind {
                source_hash,
                source_version,
                main_version,
            } => write!(
                f,
                "{} version {} is behind the main branch version {}",
                source_hash, source_version, main_version
            ),
            BoundaryWarning::MissingMainManifest {
                main_branch,
                manifest,
            } => write!(
                f,
                "'{}' branch '{}' is missing, using version '{}'",
                main_branch, manifest, UNDEFINED_VERSION
            ),
            BoundaryWarning::MissingMainBranch { main_branch } => {
                write!(f, "branch '{}' does not exist yet", main_branch)
            }
        }
    }
}
