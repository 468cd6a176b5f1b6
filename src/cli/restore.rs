//! Returning the working tree to the branch the operator started on.
//!
//! One [BranchRestorer] is created per run and cloned into the signal
//! handler. All clones share a single "done" flag, so whichever exit path
//! fires first performs the checkout and every later call is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::git::{CommandRunner, Git};
use crate::ui::formatter::display_notice;

pub struct BranchRestorer<R: CommandRunner> {
    git: Git<R>,
    bookmark: Arc<str>,
    done: Arc<AtomicBool>,
}

impl<R: CommandRunner> Clone for BranchRestorer<R> {
    fn clone(&self) -> Self {
        BranchRestorer {
            git: self.git.clone(),
            bookmark: Arc::clone(&self.bookmark),
            done: Arc::clone(&self.done),
        }
    }
}

impl<R: CommandRunner> BranchRestorer<R> {
    /// Bookmark whatever is checked out right now
    pub fn bookmark_current(git: Git<R>) -> Result<Self> {
        let bookmark = git.bookmark()?;
        log::debug!("bookmarked '{}'", bookmark);
        Ok(Self::new(git, bookmark))
    }

    pub fn new(git: Git<R>, bookmark: impl Into<String>) -> Self {
        let bookmark: String = bookmark.into();
        BranchRestorer {
            git,
            bookmark: Arc::from(bookmark),
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn bookmark(&self) -> &str {
        &self.bookmark
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Check the bookmark out again if something else is checked out.
    ///
    /// Runs at most once across all clones. Returns whether a checkout happened.
    pub fn restore(&self) -> Result<bool> {
        if self.done.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        let current = self.git.bookmark()?;
        if current == *self.bookmark {
            return Ok(false);
        }

        display_notice(&format!("restoring '{}'", self.bookmark));
        self.git.checkout(&self.bookmark)?;
        Ok(true)
    }

    /// Guard that restores when dropped, covering unwinding panics
    pub fn guard(&self) -> RestoreGuard<'_, R> {
        RestoreGuard { restorer: self }
    }
}

pub struct RestoreGuard<'a, R: CommandRunner> {
    restorer: &'a BranchRestorer<R>,
}

impl<R: CommandRunner> RestoreGuard<'_, R> {
    /// Restore now and report the outcome
    pub fn finish(self) -> Result<bool> {
        self.restorer.restore()
    }
}

impl<R: CommandRunner> Drop for RestoreGuard<'_, R> {
    fn drop(&mut self) {
        if let Err(e) = self.restorer.restore() {
            log::error!("unable to restore '{}': {}", self.restorer.bookmark, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRunner;

    fn detached_repo() -> Git<MockRunner> {
        let runner = MockRunner::new("develop");
        runner.add_commit("abc1234", "Jo", "wip", "");
        Git::new(runner)
    }

    #[test]
    fn test_restore_checks_out_bookmark() {
        let git = detached_repo();
        let restorer = BranchRestorer::bookmark_current(git.clone()).unwrap();
        git.checkout("abc1234").unwrap();

        assert!(restorer.restore().unwrap());
        assert_eq!(git.runner().head(), "develop");
    }

    #[test]
    fn test_restore_is_noop_on_bookmark() {
        let git = detached_repo();
        let restorer = BranchRestorer::bookmark_current(git.clone()).unwrap();
        assert!(!restorer.restore().unwrap());
        assert_eq!(git.runner().count_calls("git checkout"), 0);
    }

    #[test]
    fn test_restore_runs_once_across_clones() {
        let git = detached_repo();
        let restorer = BranchRestorer::bookmark_current(git.clone()).unwrap();
        let handler_copy = restorer.clone();
        git.checkout("abc1234").unwrap();

        assert!(handler_copy.restore().unwrap());
        assert!(restorer.is_done());
        git.checkout("abc1234").unwrap();
        assert!(!restorer.restore().unwrap());
        assert_eq!(git.runner().count_calls("git checkout develop"), 1);
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let git = detached_repo();
        let restorer = BranchRestorer::bookmark_current(git.clone()).unwrap();
        {
            let _guard = restorer.guard();
            git.checkout("abc1234").unwrap();
        }
        assert_eq!(git.runner().head(), "develop");
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let git = detached_repo();
        let restorer = BranchRestorer::bookmark_current(git.clone()).unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = restorer.guard();
            git.checkout("abc1234").unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(git.runner().head(), "develop");
    }

    #[test]
    fn test_detached_bookmark() {
        let git = detached_repo();
        git.checkout("abc1234").unwrap();
        let restorer = BranchRestorer::bookmark_current(git.clone()).unwrap();
        assert_eq!(restorer.bookmark(), "abc1234");
        git.checkout("develop").unwrap();
        assert!(restorer.restore().unwrap());
        assert_eq!(git.runner().head(), "abc1234");
    }
}
