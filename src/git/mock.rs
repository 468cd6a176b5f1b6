use crate::error::Result;
use crate::git::{CommandOutput, CommandRunner};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Head {
    Branch(String),
    Detached(String),
}

#[derive(Debug, Clone)]
struct MockCommit {
    hash: String,
    author: String,
    subject: String,
    refs: String,
}

#[derive(Debug)]
struct MockState {
    head: Head,
    branches: BTreeMap<String, String>,
    commits: Vec<MockCommit>,
    files: HashMap<(String, String), String>,
    tags: Vec<String>,
    dirty: bool,
    failing: Vec<String>,
    script_exit_codes: HashMap<String, i32>,
    calls: Vec<String>,
    script_envs: Vec<Vec<(String, String)>>,
    merges: usize,
}

/// Mock command runner for testing without a real repository
///
/// Simulates just enough git behaviour for the merge workflow: a HEAD that
/// follows checkouts, branch tips, a commit log, files at revisions and merge
/// commits. Every invocation is recorded as a call string (`git checkout x`,
/// `sh ./build.sh`) for assertions.
pub struct MockRunner {
    state: Mutex<MockState>,
}

impl MockRunner {
    /// Create a mock repository with `branch` checked out
    pub fn new(branch: impl Into<String>) -> Self {
        let branch = branch.into();
        let mut branches = BTreeMap::new();
        branches.insert(branch.clone(), "0000000".to_string());

        MockRunner {
            state: Mutex::new(MockState {
                head: Head::Branch(branch),
                branches,
                commits: Vec::new(),
                files: HashMap::new(),
                tags: Vec::new(),
                dirty: false,
                failing: Vec::new(),
                script_exit_codes: HashMap::new(),
                calls: Vec::new(),
                script_envs: Vec::new(),
                merges: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a commit to the log (add the newest first)
    pub fn add_commit(&self, hash: &str, author: &str, subject: &str, refs: &str) {
        self.state().commits.push(MockCommit {
            hash: hash.to_string(),
            author: author.to_string(),
            subject: subject.to_string(),
            refs: refs.to_string(),
        });
    }

    /// Create or move a local branch
    pub fn set_branch(&self, name: &str, hash: &str) {
        self.state()
            .branches
            .insert(name.to_string(), hash.to_string());
    }

    /// Make `path` readable at `revision` through `git show`
    pub fn set_file(&self, revision: &str, path: &str, content: &str) {
        self.state().files.insert(
            (revision.to_string(), path.to_string()),
            content.to_string(),
        );
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.state().dirty = dirty;
    }

    /// Exit code returned for a shell command (default 0)
    pub fn set_exit_code(&self, command: &str, code: i32) {
        self.state()
            .script_exit_codes
            .insert(command.to_string(), code);
    }

    /// Fail every call whose call string starts with `prefix`
    pub fn fail_on(&self, prefix: &str) {
        self.state().failing.push(prefix.to_string());
    }

    /// All recorded calls in order
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Number of recorded calls starting with `prefix`
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    /// Environment passed to each shell command, in call order
    pub fn script_envs(&self) -> Vec<Vec<(String, String)>> {
        self.state().script_envs.clone()
    }

    /// Checked-out branch name, or the hash when detached
    pub fn head(&self) -> String {
        match &self.state().head {
            Head::Branch(name) | Head::Detached(name) => name.clone(),
        }
    }

    pub fn tags(&self) -> Vec<String> {
        self.state().tags.clone()
    }
}

fn ok(stdout: impl Into<String>) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout: stdout.into(),
        stderr: String::new(),
    }
}

fn fail(stderr: impl Into<String>) -> CommandOutput {
    CommandOutput {
        exit_code: 1,
        stdout: String::new(),
        stderr: stderr.into(),
    }
}

impl MockState {
    fn head_hash(&self) -> String {
        match &self.head {
            Head::Branch(name) => self.branches.get(name).cloned().unwrap_or_default(),
            Head::Detached(hash) => hash.clone(),
        }
    }

    fn branch_listing(&self) -> String {
        let mut out = String::new();
        if let Head::Detached(hash) = &self.head {
            out.push_str(&format!("* (HEAD detached at {}) {} detached\n", hash, hash));
        }
        for (name, hash) in &self.branches {
            let marker = if self.head == Head::Branch(name.clone()) {
                '*'
            } else {
                ' '
            };
            out.push_str(&format!("{} {} {} tip of {}\n", marker, name, hash, name));
        }
        out
    }

    fn log(&self, limit: Option<usize>) -> String {
        let limit = limit.unwrap_or(usize::MAX);
        self.commits
            .iter()
            .take(limit)
            .map(|c| {
                format!(
                    "{}\x1f{}\x1f{}@example.com\x1f{}\x1f{}",
                    c.hash,
                    c.author,
                    c.author.to_lowercase(),
                    c.subject,
                    c.refs
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn checkout(&mut self, target: &str) -> CommandOutput {
        if self.branches.contains_key(target) {
            self.head = Head::Branch(target.to_string());
            ok("")
        } else if self.commits.iter().any(|c| c.hash == target) {
            self.head = Head::Detached(target.to_string());
            ok("")
        } else {
            fail(format!(
                "error: pathspec '{}' did not match any file(s) known to git",
                target
            ))
        }
    }

    fn merge(&mut self, message: &str) -> CommandOutput {
        let Head::Branch(branch) = self.head.clone() else {
            return fail("fatal: not on a branch");
        };
        self.merges += 1;
        let hash = format!("{:07x}", 0xfeed000 + self.merges);
        self.commits.insert(
            0,
            MockCommit {
                hash: hash.clone(),
                author: "Merger".to_string(),
                subject: message.to_string(),
                refs: format!("HEAD -> {}", branch),
            },
        );
        self.branches.insert(branch, hash);
        ok("")
    }

    fn git(&mut self, args: &[&str]) -> CommandOutput {
        match args {
            ["rev-parse", "--abbrev-ref", "HEAD"] => match &self.head {
                Head::Branch(name) => ok(format!("{}\n", name)),
                Head::Detached(_) => ok("HEAD\n"),
            },
            ["rev-parse", "--short", "HEAD"] => ok(format!("{}\n", self.head_hash())),
            ["status", "--porcelain"] => ok(if self.dirty { " M src/lib.rs\n" } else { "" }),
            ["--no-pager", "branch", "--no-color", "-vv"] => ok(self.branch_listing()),
            ["--no-pager", "log", _format, rest @ ..] => {
                let limit = rest
                    .first()
                    .and_then(|n| n.trim_start_matches('-').parse().ok());
                ok(self.log(limit))
            }
            ["--no-pager", "show", spec] => {
                let (revision, path) = spec.split_once(":./").unwrap_or((*spec, ""));
                match self.files.get(&(revision.to_string(), path.to_string())) {
                    Some(content) => ok(content.clone()),
                    None => fail(format!("fatal: path '{}' does not exist in '{}'", path, revision)),
                }
            }
            ["checkout", target] => self.checkout(target),
            ["merge", _hash, "--no-ff", "-m", message] => self.merge(message),
            ["tag", "-a", name, ..] => {
                self.tags.push(name.to_string());
                ok("")
            }
            _ => ok(""),
        }
    }
}

impl CommandRunner for MockRunner {
    fn git(&self, args: &[&str], _silent: bool) -> Result<CommandOutput> {
        let mut state = self.state();
        let call = format!("git {}", args.join(" "));
        state.calls.push(call.clone());

        if state.failing.iter().any(|prefix| call.starts_with(prefix)) {
            return Ok(fail(format!("simulated failure of `{}`", call)));
        }

        Ok(state.git(args))
    }

    fn shell(
        &self,
        command: &str,
        env: &[(String, String)],
        _silent: bool,
    ) -> Result<CommandOutput> {
        let mut state = self.state();
        let call = format!("sh {}", command);
        state.calls.push(call);
        state.script_envs.push(env.to_vec());

        let code = state.script_exit_codes.get(command).copied().unwrap_or(0);
        Ok(CommandOutput {
            exit_code: code,
            ..Default::default()
        })
    }
}
