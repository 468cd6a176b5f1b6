use crate::error::{MergeError, Result};
use crate::git::CommandRunner;
use crate::hooks::{ScriptContext, ScriptPhase};
use crate::ui::formatter::{display_error, display_notice, display_success};

/// Outcome of one executed script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutcome {
    /// The script as written in the config
    pub script: String,
    /// The command line that was executed
    pub invocation: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// What happened to one script list
///
/// Scripts after the first failure were never started and do not appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub phase: ScriptPhase,
    pub outcomes: Vec<ScriptOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(ScriptOutcome::success)
    }

    /// The script that stopped the sequence, if any
    pub fn failure(&self) -> Option<&ScriptOutcome> {
        self.outcomes.iter().find(|outcome| !outcome.success())
    }

    /// Turn a failed report into [MergeError::Script]
    pub fn into_result(self) -> Result<Self> {
        match self.failure() {
            Some(failed) => Err(MergeError::script(&failed.script, failed.exit_code)),
            None => Ok(self),
        }
    }
}

/// Executes configured script lists in order with fail-fast semantics
pub struct ScriptRunner<'a, R: CommandRunner> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> ScriptRunner<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        ScriptRunner { runner }
    }

    /// Execute `scripts` one after another.
    ///
    /// Each script must exit 0. The first failure stops the sequence and is
    /// the last entry of the returned report. `Err` means a script could not
    /// be started at all.
    pub fn run_sequence(&self, scripts: &[String], context: &ScriptContext) -> Result<RunReport> {
        let env = context.to_env_vars();
        let mut outcomes = Vec::with_capacity(scripts.len());

        for script in scripts {
            let invocation = context.invocation(script);
            display_notice(&format!("starting {}", script));

            let output = self.runner.shell(&invocation, &env, false)?;

            let outcome = ScriptOutcome {
                script: script.clone(),
                invocation,
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            };

            let summary = format!("{} returned {}", script, outcome.exit_code);
            let failed = !outcome.success();
            if failed {
                display_error(&format!("⛔ {}", summary));
            } else {
                display_success(&summary);
            }

            outcomes.push(outcome);
            if failed {
                log::debug!(
                    "{} scripts stopped after {} of {}",
                    context.phase.name(),
                    outcomes.len(),
                    scripts.len()
                );
                break;
            }
        }

        Ok(RunReport {
            phase: context.phase,
            outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRunner;

    fn context() -> ScriptContext {
        ScriptContext {
            phase: ScriptPhase::Before,
            source_hash: "abc1234".to_string(),
            target_branch: "master".to_string(),
            version: "1.0.0".to_string(),
            dry_run: false,
        }
    }

    fn scripts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_scripts_succeed() {
        let runner = MockRunner::new("develop");
        let report = ScriptRunner::new(&runner)
            .run_sequence(&scripts(&["npm test", "./build.sh"]), &context())
            .unwrap();
        assert!(report.succeeded());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(
            runner.calls(),
            vec!["sh npm test", "sh ./build.sh abc1234 master"]
        );
    }

    #[test]
    fn test_fail_fast_stops_sequence() {
        let runner = MockRunner::new("develop");
        runner.set_exit_code("exit 1", 1);
        let report = ScriptRunner::new(&runner)
            .run_sequence(&scripts(&["exit 0", "exit 1", "exit 0"]), &context())
            .unwrap();

        assert_eq!(runner.count_calls("sh "), 2);
        assert!(!report.succeeded());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failure().unwrap().script, "exit 1");
        assert!(matches!(
            report.into_result(),
            Err(MergeError::Script { code: 1, .. })
        ));
    }

    #[test]
    fn test_empty_list() {
        let runner = MockRunner::new("develop");
        let report = ScriptRunner::new(&runner)
            .run_sequence(&[], &context())
            .unwrap();
        assert!(report.succeeded());
        assert!(report.outcomes.is_empty());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_scripts_receive_context_env() {
        let runner = MockRunner::new("develop");
        ScriptRunner::new(&runner)
            .run_sequence(&scripts(&["true"]), &context())
            .unwrap();
        let envs = runner.script_envs();
        assert!(envs[0].contains(&("M2M_SOURCE_HASH".to_string(), "abc1234".to_string())));
    }

    #[cfg(unix)]
    #[test]
    fn test_fail_fast_with_real_shell() {
        use crate::git::ShellRunner;

        let dir = tempfile::tempdir().unwrap();
        let runner = ShellRunner::new(dir.path());
        let report = ScriptRunner::new(&runner)
            .run_sequence(
                &scripts(&["touch first", "exit 1", "touch third"]),
                &context(),
            )
            .unwrap();

        assert!(dir.path().join("first").exists());
        assert!(!dir.path().join("third").exists());
        assert_eq!(report.outcomes.len(), 2);
    }
}
