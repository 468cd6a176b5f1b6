//! Version-control operations abstraction layer
//!
//! Everything the workflow asks of git goes through the [CommandRunner]
//! trait, which executes one command and reports its exit code and output.
//! The concrete implementations are:
//!
//! - [runner::ShellRunner]: spawns real processes in a working directory
//! - [mock::MockRunner]: records calls and simulates branch state for tests
//!
//! [Git] layers the individual git queries and mutations on top of a runner.
//!
//! ```rust
//! # use merge_to_master::git::{Git, MockRunner};
//! let git = Git::new(MockRunner::new("develop"));
//! assert_eq!(git.current_branch().unwrap(), "develop");
//! ```

pub mod mock;
pub mod runner;

pub use mock::MockRunner;
pub use runner::ShellRunner;

use std::sync::Arc;

use crate::domain::commit::LOG_FORMAT;
use crate::domain::{BranchListing, CommitLog};
use crate::error::{MergeError, Result};

/// Result of one external command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Process exit code; -1 when the process was killed by a signal
    pub exit_code: i32,
    /// Captured stdout (empty when output was streamed)
    pub stdout: String,
    /// Captured stderr (empty when output was streamed)
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Blocking command execution primitive
///
/// ## Silent mode
///
/// With `silent = true` output is captured into [CommandOutput]; otherwise it
/// is streamed to the terminal and the captured fields stay empty.
///
/// ## Errors
///
/// A non-zero exit code is *not* an error at this level. `Err` is reserved for
/// commands that could not be started at all.
///
/// Implementors must be `Send + Sync`: the signal handler restores the
/// bookmarked branch from its own thread.
pub trait CommandRunner: Send + Sync {
    /// Run `git` with the given arguments
    fn git(&self, args: &[&str], silent: bool) -> Result<CommandOutput>;

    /// Run a command line through the shell with extra environment variables
    fn shell(&self, command: &str, env: &[(String, String)], silent: bool)
        -> Result<CommandOutput>;
}

/// Git queries and mutations used by the merge workflow
pub struct Git<R: CommandRunner> {
    runner: Arc<R>,
}

impl<R: CommandRunner> Clone for Git<R> {
    fn clone(&self) -> Self {
        Git {
            runner: Arc::clone(&self.runner),
        }
    }
}

impl<R: CommandRunner> Git<R> {
    pub fn new(runner: R) -> Self {
        Git {
            runner: Arc::new(runner),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run a git command, turning a non-zero exit into an error
    fn run_checked(&self, args: &[&str], silent: bool) -> Result<CommandOutput> {
        let output = self.runner.git(args, silent)?;
        if !output.success() {
            return Err(MergeError::command(
                format!("git {}", args.join(" ")),
                output.exit_code,
                output.stderr.trim(),
            ));
        }
        Ok(output)
    }

    /// Name of the checked-out branch ("HEAD" when detached)
    pub fn current_branch(&self) -> Result<String> {
        let output = self.run_checked(&["rev-parse", "--abbrev-ref", "HEAD"], true)?;
        Ok(output.stdout.trim().to_string())
    }

    /// Something `git checkout` can return to: the branch name, or the
    /// commit hash when HEAD is detached
    pub fn bookmark(&self) -> Result<String> {
        let branch = self.current_branch()?;
        if branch != "HEAD" {
            return Ok(branch);
        }
        let output = self.run_checked(&["rev-parse", "--short", "HEAD"], true)?;
        Ok(output.stdout.trim().to_string())
    }

    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        let output = self.run_checked(&["status", "--porcelain"], true)?;
        Ok(!output.stdout.trim().is_empty())
    }

    pub fn branches(&self) -> Result<BranchListing> {
        let output = self.run_checked(&["--no-pager", "branch", "--no-color", "-vv"], true)?;
        BranchListing::parse(&output.stdout)
    }

    /// Short hash of a local branch tip; `None` when the branch does not exist
    pub fn branch_hash(&self, name: &str) -> Result<Option<String>> {
        Ok(self.branches()?.hash_of(name).map(str::to_string))
    }

    /// Most recent commits, newest first
    pub fn commit_log(&self, max_count: Option<usize>) -> Result<CommitLog> {
        let limit = max_count.map(|n| format!("-{}", n));
        let mut args = vec!["--no-pager", "log", LOG_FORMAT];
        if let Some(limit) = limit.as_deref() {
            args.push(limit);
        }

        let output = self.runner.git(&args, true)?;
        if !output.success() {
            // A repository without commits has no log yet
            log::debug!("git log failed: {}", output.stderr.trim());
            return Ok(CommitLog::default());
        }
        Ok(CommitLog::parse(&output.stdout))
    }

    /// Contents of `path` at `revision`, `None` if the file is not there
    pub fn show_file(&self, path: &str, revision: &str) -> Result<Option<String>> {
        let spec = format!("{}:./{}", revision, path);
        let output = self.runner.git(&["--no-pager", "show", &spec], true)?;
        if !output.success() {
            return Ok(None);
        }
        let text = output.stdout.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }

    pub fn checkout(&self, target: &str) -> Result<()> {
        self.run_checked(&["checkout", target], true)?;
        Ok(())
    }

    /// Merge `hash` into the checked-out branch, always creating a merge commit
    pub fn merge_no_ff(&self, hash: &str, message: &str) -> Result<()> {
        self.run_checked(&["merge", hash, "--no-ff", "-m", message], false)?;
        Ok(())
    }

    /// Create an annotated tag
    pub fn tag(&self, name: &str, target: &str, message: &str) -> Result<()> {
        self.run_checked(&["tag", "-a", name, target, "-m", message], false)?;
        Ok(())
    }

    /// Push `branch` together with its reachable annotated tags
    pub fn push_with_tags(&self, remote: &str, branch: &str) -> Result<()> {
        self.run_checked(&["push", remote, branch, "--follow-tags"], false)?;
        Ok(())
    }
}
