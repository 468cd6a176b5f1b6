use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use merge_to_master::cli::{BranchRestorer, Workflow, WorkflowArgs};
use merge_to_master::error::{ErrorKind, MergeError};
use merge_to_master::git::{Git, ShellRunner};
use merge_to_master::ui::{self, formatter, DialoguerPrompter};

const USAGE: &str = "\
Pick a commit, check that its manifest version moves past the main branch, \
run the configured before scripts, merge it into the main branch with --no-ff, \
tag the merge v<version>, optionally push, then run the after scripts. \
The branch you started on is checked out again however the run ends.

Scripts are read from .m2m in the current directory, e.g.
  { \"before\": [\"npm test\"], \"after\": [\"./notify.sh\"] }";

#[derive(clap::Parser)]
#[command(
    name = "m2m",
    version,
    about = "Merge a chosen commit into the main branch and tag the release",
    after_help = USAGE
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(
        short = 'd',
        long = "dryRun",
        help = "Run checks and scripts without merging, tagging or pushing"
    )]
    dry_run: bool,

    #[arg(short, long, help = "Show the 20 most recent commits and exit")]
    logs: bool,

    #[arg(
        long = "skipMatchingVersions",
        help = "Do not ask when the source version is not ahead of the main branch"
    )]
    skip_matching_versions: bool,

    #[arg(
        long = "skipUncommittedChanges",
        help = "Proceed even if the working tree has uncommitted changes"
    )]
    skip_uncommitted_changes: bool,

    #[arg(
        long = "skipMatchingCommits",
        help = "Do not ask when the source commit already is the main branch tip"
    )]
    skip_matching_commits: bool,

    #[arg(long = "main", default_value = "master", help = "Branch to merge into")]
    main_branch: String,

    #[arg(long, default_value = "origin", help = "Remote to push to")]
    remote: String,
}

impl Args {
    fn workflow_args(&self) -> WorkflowArgs {
        WorkflowArgs {
            config_path: self.config.clone(),
            main_branch: self.main_branch.clone(),
            remote: self.remote.clone(),
            dry_run: self.dry_run,
            skip_matching_versions: self.skip_matching_versions,
            skip_uncommitted_changes: self.skip_uncommitted_changes,
            skip_matching_commits: self.skip_matching_commits,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<MergeError>() {
            Some(err) => report(err),
            None => {
                ui::display_unexpected(&format!("{:#}", e));
                ExitCode::from(1)
            }
        },
    }
}

fn report(err: &MergeError) -> ExitCode {
    match err.kind() {
        ErrorKind::UserAbort => println!("{}", err),
        ErrorKind::Precondition | ErrorKind::ExternalCommand => ui::display_error(&err.to_string()),
        ErrorKind::Unexpected => ui::display_unexpected(err),
    }
    ExitCode::from(err.exit_code())
}

fn run(args: &Args) -> Result<()> {
    let workdir = std::env::current_dir().context("unable to read the working directory")?;
    let git = Git::new(ShellRunner::new(&workdir));

    if args.logs {
        let log = git.commit_log(Some(20))?;
        formatter::display_commit_log(log.entries());
        return Ok(());
    }

    ui::display_notice(&format!(
        "m2m {}: merging into '{}'",
        env!("CARGO_PKG_VERSION"),
        args.main_branch
    ));
    if args.dry_run {
        ui::display_notice("dry run, nothing will be merged, tagged or pushed");
    }

    let restorer = BranchRestorer::bookmark_current(git.clone())?;

    let handler_restorer = restorer.clone();
    ctrlc::set_handler(move || {
        if let Err(e) = handler_restorer.restore() {
            ui::display_error(&format!(
                "unable to restore '{}': {}",
                handler_restorer.bookmark(),
                e
            ));
        }
        std::process::exit(130);
    })
    .context("unable to install the interrupt handler")?;

    let workflow = Workflow::new(git, DialoguerPrompter::new(), args.workflow_args(), workdir);
    let result = workflow.run(&restorer)?;

    match result.tag {
        Some(tag) => ui::display_success(&format!(
            "{} merged into {} as {}{}",
            result.source_hash,
            args.main_branch,
            tag,
            if result.pushed { " and pushed" } else { "" }
        )),
        None => ui::display_success(&format!(
            "dry run of {} (version {}) finished",
            result.source_hash, result.version
        )),
    }
    Ok(())
}
