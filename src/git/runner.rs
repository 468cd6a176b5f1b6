use crate::error::Result;
use crate::git::{CommandOutput, CommandRunner};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Runs real processes rooted at a working directory
pub struct ShellRunner {
    workdir: PathBuf,
}

impl ShellRunner {
    /// Create a runner executing everything inside `workdir`
    pub fn new<P: AsRef<Path>>(workdir: P) -> Self {
        ShellRunner {
            workdir: workdir.as_ref().to_path_buf(),
        }
    }

    fn run(&self, mut cmd: Command, display: &str, silent: bool) -> Result<CommandOutput> {
        log::debug!("$ {}", display);
        cmd.current_dir(&self.workdir);

        if silent {
            let output = cmd.stdin(Stdio::null()).output()?;
            return Ok(to_command_output(output));
        }

        let status = cmd.status()?;
        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            ..Default::default()
        })
    }
}

fn to_command_output(output: Output) -> CommandOutput {
    CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

impl CommandRunner for ShellRunner {
    fn git(&self, args: &[&str], silent: bool) -> Result<CommandOutput> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        self.run(cmd, &format!("git {}", args.join(" ")), silent)
    }

    fn shell(
        &self,
        command: &str,
        env: &[(String, String)],
        silent: bool,
    ) -> Result<CommandOutput> {
        let mut cmd = shell_command(command);
        cmd.envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        self.run(cmd, command, silent)
    }
}
