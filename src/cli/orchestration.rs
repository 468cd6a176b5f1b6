//! Main workflow orchestration logic
//!
//! The merge runs as a fixed pipeline of stages. Each stage takes what the
//! previous ones produced as explicit arguments and returns a `Result`; the
//! first failure ends the run. Branch restoration happens in [Workflow::run]
//! whatever the outcome.

use std::path::PathBuf;

use crate::boundary::BoundaryWarning;
use crate::cli::restore::BranchRestorer;
use crate::config::{self, WorkflowConfig};
use crate::domain::version::{self, VersionCheck};
use crate::domain::{CommitLogEntry, MainVersion, ReleaseTag, VersionManifest};
use crate::error::{MergeError, Result};
use crate::git::{CommandRunner, Git};
use crate::hooks::{RunReport, ScriptContext, ScriptPhase, ScriptRunner};
use crate::ui::formatter::{self, version_table};
use crate::ui::{
    display_boundary_warning, display_error, display_info, display_notice, display_success,
    display_warning, Prompter,
};

/// Arguments for the merge workflow
///
/// Mirrors the CLI flags in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowArgs {
    /// Config file, relative to the working directory
    pub config_path: Option<PathBuf>,

    /// Branch the source commit is merged into
    pub main_branch: String,

    /// Remote pushed to after the merge
    pub remote: String,

    /// Run every check and script but do not merge, tag or push
    pub dry_run: bool,

    pub skip_matching_versions: bool,

    pub skip_uncommitted_changes: bool,

    /// Suppress the same-commit gate enabled by `confirmMatchingCommits`
    pub skip_matching_commits: bool,
}

impl Default for WorkflowArgs {
    fn default() -> Self {
        WorkflowArgs {
            config_path: None,
            main_branch: "master".to_string(),
            remote: "origin".to_string(),
            dry_run: false,
            skip_matching_versions: false,
            skip_uncommitted_changes: false,
            skip_matching_commits: false,
        }
    }
}

/// Everything the later stages work from, fixed once manifests are loaded
#[derive(Debug, Clone)]
pub struct RunState {
    pub bookmark: String,
    pub source: CommitLogEntry,
    pub config: WorkflowConfig,
    pub source_version: String,
    pub main_version: MainVersion,
    pub dry_run: bool,
}

/// Result of a completed workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// Hash of the merged commit
    pub source_hash: String,

    /// Version read from the source manifest
    pub version: String,

    /// Tag created on the main branch; `None` on a dry run
    pub tag: Option<String>,

    /// Whether the main branch and tags were pushed
    pub pushed: bool,

    pub before: RunReport,

    /// Present when the config lists after scripts
    pub after: Option<RunReport>,
}

/// The merge-to-main state machine
pub struct Workflow<R: CommandRunner, P: Prompter> {
    git: Git<R>,
    prompter: P,
    args: WorkflowArgs,
    workdir: PathBuf,
}

impl<R: CommandRunner, P: Prompter> Workflow<R, P> {
    pub fn new(git: Git<R>, prompter: P, args: WorkflowArgs, workdir: impl Into<PathBuf>) -> Self {
        Workflow {
            git,
            prompter,
            args,
            workdir: workdir.into(),
        }
    }

    /// Run the whole workflow, then put the bookmarked branch back.
    ///
    /// Restoration happens on success, on every error and while unwinding
    /// from a panic. A failed restoration is reported; the workflow's own
    /// error takes precedence when both fail.
    pub fn run(&self, restorer: &BranchRestorer<R>) -> Result<WorkflowResult> {
        let guard = restorer.guard();
        let outcome = self.run_stages(restorer.bookmark());
        let restored = guard.finish();

        match (outcome, restored) {
            (Ok(result), Ok(_)) => Ok(result),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(restore_err)) => {
                display_error(&format!(
                    "unable to restore '{}': {}",
                    restorer.bookmark(),
                    restore_err
                ));
                Err(e)
            }
        }
    }

    fn run_stages(&self, bookmark: &str) -> Result<WorkflowResult> {
        self.check_uncommitted_changes()?;

        let source = self.select_source()?;
        self.checkout_source(&source)?;

        let config = self.load_config()?;
        self.verify_commits(&source, &config)?;

        let (source_version, main_version) = self.load_manifests(&source, &config)?;
        let state = RunState {
            bookmark: bookmark.to_string(),
            source,
            config,
            source_version,
            main_version,
            dry_run: self.args.dry_run,
        };

        self.verify_versions(&state)?;

        let before = self
            .run_scripts(ScriptPhase::Before, &state.config.before, &state)?
            .into_result()?;

        let (tag, pushed) = if state.dry_run {
            display_notice("dry run: skipping merge, tag and push");
            (None, false)
        } else {
            let (tag, pushed) = self.merge(&state)?;
            (Some(tag), pushed)
        };

        let after = match state.config.after_scripts() {
            Some(scripts) => {
                let report = self.run_scripts(ScriptPhase::After, scripts, &state)?;
                if let Some(failed) = report.failure() {
                    display_warning(&format!(
                        "after script {} failed with {}; the merge stands",
                        failed.script, failed.exit_code
                    ));
                }
                Some(report)
            }
            None => None,
        };

        Ok(WorkflowResult {
            source_hash: state.source.hash.clone(),
            version: state.source_version.clone(),
            tag,
            pushed,
            before,
            after,
        })
    }

    fn check_uncommitted_changes(&self) -> Result<()> {
        if self.args.skip_uncommitted_changes || !self.git.has_uncommitted_changes()? {
            return Ok(());
        }
        Err(MergeError::precondition(
            "there are uncommitted changes, commit or stash them first (or pass --skipUncommittedChanges)",
        ))
    }

    fn select_source(&self) -> Result<CommitLogEntry> {
        let log = self.git.commit_log(None)?;
        if log.is_empty() {
            return Err(MergeError::precondition("the repository has no commits"));
        }

        let source = |needle: &str| {
            log.filter_by_text(needle)
                .iter()
                .map(|entry| entry.display_line())
                .collect::<Vec<_>>()
        };
        let message = format!(
            "Select the commit you want to merge to {}:",
            self.args.main_branch
        );
        let line = self.prompter.select(&message, &source)?;

        let hash = CommitLogEntry::hash_from_display_line(&line);
        Ok(log.find_by_hash(hash)?.clone())
    }

    fn checkout_source(&self, source: &CommitLogEntry) -> Result<()> {
        self.git.checkout(&source.hash)
    }

    fn load_config(&self) -> Result<WorkflowConfig> {
        config::load_config(self.args.config_path.as_deref(), &self.workdir)
    }

    /// Same-commit policy: always a warning, a gate only when the config asks
    fn verify_commits(&self, source: &CommitLogEntry, config: &WorkflowConfig) -> Result<()> {
        let main = &self.args.main_branch;
        match self.git.branch_hash(main)? {
            None => display_boundary_warning(&BoundaryWarning::MissingMainBranch {
                main_branch: main.clone(),
            }),
            Some(main_hash) if main_hash == source.hash => {
                let warning = BoundaryWarning::SameCommit {
                    main_branch: main.clone(),
                    hash: main_hash,
                };
                if config.confirm_matching_commits && !self.args.skip_matching_commits {
                    self.gate(&warning)?;
                } else {
                    display_boundary_warning(&warning);
                }
            }
            Some(main_hash) => display_info(&format!(
                "source ({}) -> target '{}' ({})",
                source.hash, main, main_hash
            )),
        }
        Ok(())
    }

    fn load_manifests(
        &self,
        source: &CommitLogEntry,
        config: &WorkflowConfig,
    ) -> Result<(String, MainVersion)> {
        let manifest = &config.manifest;
        let main = &self.args.main_branch;

        let text = self
            .git
            .show_file(manifest, &source.hash)?
            .ok_or_else(|| {
                MergeError::precondition(format!("'{}' {} is missing", source.hash, manifest))
            })?;
        let source_version = VersionManifest::parse(&text, &source.hash)?
            .require_version(&source.hash)?
            .to_string();

        let skip = self.args.skip_matching_versions;
        let main_version = match self.git.show_file(manifest, main)? {
            Some(text) => match VersionManifest::parse(&text, main)?.version {
                Some(v) => MainVersion::Known(v),
                None if skip => MainVersion::Undefined,
                None => {
                    return Err(MergeError::precondition(format!(
                        "'{}' branch {} has no version",
                        main, manifest
                    )))
                }
            },
            None if skip => {
                display_boundary_warning(&BoundaryWarning::MissingMainManifest {
                    main_branch: main.clone(),
                    manifest: manifest.clone(),
                });
                MainVersion::Undefined
            }
            None => {
                return Err(MergeError::precondition(format!(
                    "'{}' branch {} is missing",
                    main, manifest
                )))
            }
        };

        Ok((source_version, main_version))
    }

    /// Compare versions, show the table and gate anything but "ahead".
    ///
    /// With `skip_matching_versions` the table is informational: an unparsable
    /// or undefined version shows as an unknown comparison instead of failing.
    fn verify_versions(&self, state: &RunState) -> Result<Option<VersionCheck>> {
        let skip = self.args.skip_matching_versions;
        let check = match &state.main_version {
            MainVersion::Known(main) if skip => version::classify(&state.source_version, main).ok(),
            MainVersion::Known(main) => Some(version::classify(&state.source_version, main)?),
            MainVersion::Undefined => None,
        };

        println!(
            "{}",
            version_table(
                &state.config.manifest,
                &state.source.hash,
                &state.source_version,
                &self.args.main_branch,
                state.main_version.as_str(),
                check,
            )
        );

        if skip {
            return Ok(check);
        }

        match check {
            Some(VersionCheck::Same) => self.gate(&BoundaryWarning::SameVersion {
                source_hash: state.source.hash.clone(),
                version: state.source_version.clone(),
            })?,
            Some(VersionCheck::Behind) => self.gate(&BoundaryWarning::VersionBehind {
                source_hash: state.source.hash.clone(),
                source_version: state.source_version.clone(),
                main_version: state.main_version.as_str().to_string(),
            })?,
            _ => {}
        }

        Ok(check)
    }

    /// Show a warning and ask to continue; declining aborts the run
    fn gate(&self, warning: &BoundaryWarning) -> Result<()> {
        display_boundary_warning(warning);
        if self.prompter.confirm(&format!("{}, continue?", warning), false)? {
            Ok(())
        } else {
            Err(MergeError::abort(warning.to_string()))
        }
    }

    fn run_scripts(&self, phase: ScriptPhase, scripts: &[String], state: &RunState) -> Result<RunReport> {
        let context = ScriptContext {
            phase,
            source_hash: state.source.hash.clone(),
            target_branch: self.args.main_branch.clone(),
            version: state.source_version.clone(),
            dry_run: state.dry_run,
        };
        ScriptRunner::new(self.git.runner()).run_sequence(scripts, &context)
    }

    /// Merge, tag, optionally push, then return to the bookmark.
    ///
    /// Returns the tag name and whether it was pushed.
    fn merge(&self, state: &RunState) -> Result<(String, bool)> {
        let main = &self.args.main_branch;
        let remote = &self.args.remote;
        let tag = ReleaseTag::for_version(&state.source_version);

        self.git.checkout(main)?;
        self.git.merge_no_ff(&state.source.hash, &tag.merge_message())?;

        let log = self.git.commit_log(Some(1))?;
        let merge_commit = log
            .entries()
            .first()
            .ok_or_else(|| MergeError::not_found("merge commit"))?;
        self.git.tag(&tag.name, &merge_commit.hash, tag.message())?;
        display_success(&format!(
            "merged {} into {} as {} and tagged {}",
            state.source.hash, main, merge_commit.hash, tag.name
        ));

        let push_prompt = format!("Push {} with tags to {}", main, remote);
        let pushed = self.prompter.confirm(&push_prompt, false)?;
        if pushed {
            self.git.push_with_tags(remote, main)?;
            display_success(&format!("pushed {} and {} to {}", main, tag.name, remote));
        } else {
            formatter::display_message("To push later, run:", 0);
            formatter::display_message(&format!("git push {} {} --follow-tags", remote, main), 2);
        }

        self.git.checkout(&state.bookmark)?;
        Ok((tag.name, pushed))
    }
}
