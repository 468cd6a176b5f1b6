use std::sync::OnceLock;

use regex::Regex;

use crate::error::{MergeError, Result};

/// Marker `git branch` puts in front of the checked-out branch
const CURRENT_MARKER: &str = "*";

fn branch_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<marker>[*+ ]) (?P<name>\([^)]*\)|\S+)\s+(?P<hash>[0-9a-fA-F]+)(?:\s+\[(?P<tracking>[^\]]*)\])?(?:\s+(?P<subject>.*))?$",
        )
        .expect("branch line pattern is valid")
    })
}

/// A local branch as reported by `git branch -vv`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub hash: String,
    pub remote_tracking_ref: String,
    pub subject: String,
    pub is_current: bool,
}

impl Branch {
    /// Parse one listing line.
    ///
    /// Returns `Ok(None)` for the detached-HEAD pseudo entry, which names a
    /// commit rather than a branch.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let caps = branch_line_regex()
            .captures(line)
            .ok_or_else(|| MergeError::parse(format!("malformed branch line: {:?}", line)))?;

        let name = &caps["name"];
        if name.starts_with('(') {
            return Ok(None);
        }

        // "[origin/main: ahead 1, behind 2]" tracks "origin/main"
        let remote_tracking_ref = caps
            .name("tracking")
            .map(|m| m.as_str().split(':').next().unwrap_or_default().trim())
            .unwrap_or_default();

        Ok(Some(Branch {
            name: name.to_string(),
            hash: caps["hash"].to_string(),
            remote_tracking_ref: remote_tracking_ref.to_string(),
            subject: caps
                .name("subject")
                .map(|m| m.as_str().trim_end())
                .unwrap_or_default()
                .to_string(),
            is_current: &caps["marker"] == CURRENT_MARKER,
        }))
    }
}

/// All local branches from one listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchListing {
    branches: Vec<Branch>,
}

impl BranchListing {
    /// Parse the full `git branch -vv` output. Any malformed line fails the listing.
    pub fn parse(output: &str) -> Result<Self> {
        let mut branches = Vec::new();
        for line in output.lines().filter(|line| !line.trim().is_empty()) {
            if let Some(branch) = Branch::parse(line)? {
                branches.push(branch);
            }
        }
        Ok(BranchListing { branches })
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// The checked-out branch, `None` when HEAD is detached
    pub fn current(&self) -> Option<&Branch> {
        self.branches.iter().find(|branch| branch.is_current)
    }

    pub fn hash_of(&self, name: &str) -> Option<&str> {
        self.branches
            .iter()
            .find(|branch| branch.name == name)
            .map(|branch| branch.hash.as_str())
    }
}
