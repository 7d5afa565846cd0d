//! Test doubles for the executor boundary.

use std::{
    cell::RefCell,
    collections::HashMap,
    io,
    path::Path,
    process::Command,
};

use tempfile::TempDir;

use super::{ExecOutput, Executor, Repository};

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

/// A commit in the fake history.
#[derive(Debug, Clone)]
pub struct FakeCommit {
    pub id: String,
    pub message: String,
    pub author_date: Option<String>,
}

#[derive(Default)]
struct State {
    commits: Vec<FakeCommit>,
    next_id: usize,
    staged: bool,
    calls: Vec<Call>,
    always_fail: Vec<String>,
    /// Subcommand → 1-based invocation numbers that fail.
    fail_nth: HashMap<String, Vec<usize>>,
    seen: HashMap<String, usize>,
    stage_nothing: bool,
}

/// In-memory stand-in for the subset of git this crate uses.
#[derive(Default)]
pub struct FakeGit {
    state: RefCell<State>,
}

impl FakeGit {
    /// An empty repository with no commits.
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository with one pre-existing commit.
    pub fn seeded() -> Self {
        let git = Self::new();
        git.push_commit("initial", None);
        git
    }

    /// Make every invocation of `subcommand` fail.
    pub fn fail(&self, subcommand: &str) {
        self.state
            .borrow_mut()
            .always_fail
            .push(subcommand.to_string());
    }

    /// Make the `nth` invocation (1-based) of `subcommand` fail.
    pub fn fail_nth(&self, subcommand: &str, nth: usize) {
        self.state
            .borrow_mut()
            .fail_nth
            .entry(subcommand.to_string())
            .or_default()
            .push(nth);
    }

    /// `add` succeeds but leaves nothing in the index.
    pub fn stage_nothing(&self) {
        self.state.borrow_mut().stage_nothing = true;
    }

    pub fn head(&self) -> Option<String> {
        self.state.borrow().commits.last().map(|c| c.id.clone())
    }

    pub fn commits(&self) -> Vec<FakeCommit> {
        self.state.borrow().commits.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// How many times `subcommand` was invoked.
    pub fn calls_to(&self, subcommand: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.args.first().is_some_and(|a| a == subcommand))
            .count()
    }

    pub fn push_commit(&self, message: &str, author_date: Option<String>) -> String {
        let mut state = self.state.borrow_mut();
        let id = format!("fake{:04}", state.next_id);
        state.next_id += 1;
        state.commits.push(FakeCommit {
            id: id.clone(),
            message: message.to_string(),
            author_date,
        });
        id
    }

    fn position(state: &State, revision: &str) -> Option<usize> {
        state.commits.iter().position(|c| c.id == revision)
    }
}

fn ok(stdout: impl Into<String>) -> ExecOutput {
    ExecOutput {
        code: Some(0),
        stdout: stdout.into(),
        stderr: String::new(),
    }
}

fn exit(code: i32, stderr: &str) -> ExecOutput {
    ExecOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

impl Executor for FakeGit {
    fn execute(
        &self,
        _workdir: &Path,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> io::Result<ExecOutput> {
        let subcommand = args.first().copied().unwrap_or_default().to_string();
        {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call {
                args: args.iter().map(ToString::to_string).collect(),
                env: env
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            });
            let seen = state.seen.entry(subcommand.clone()).or_default();
            *seen += 1;
            let nth = *seen;
            let scheduled = state
                .fail_nth
                .get(&subcommand)
                .is_some_and(|n| n.contains(&nth));
            if scheduled || state.always_fail.contains(&subcommand) {
                return Ok(exit(128, "fatal: simulated failure\n"));
            }
        }

        let author_date = env
            .iter()
            .find(|(k, _)| *k == super::AUTHOR_DATE_VAR)
            .map(|(_, v)| (*v).to_string());

        let output = match subcommand.as_str() {
            "status" => ok(""),
            "rev-parse" => match self.head() {
                Some(id) => ok(format!("{id}\n")),
                None => exit(1, ""),
            },
            "add" => {
                let mut state = self.state.borrow_mut();
                state.staged = !state.stage_nothing;
                ok("")
            }
            "diff" => {
                if self.state.borrow().staged {
                    ok(format!("{}\n", args.last().copied().unwrap_or_default()))
                } else {
                    ok("")
                }
            }
            "commit" => {
                if !self.state.borrow().staged {
                    return Ok(exit(1, "nothing to commit"));
                }
                let message = args
                    .iter()
                    .position(|a| *a == "-m")
                    .and_then(|i| args.get(i + 1))
                    .copied()
                    .unwrap_or_default();
                self.push_commit(message, author_date);
                self.state.borrow_mut().staged = false;
                ok("")
            }
            "rev-list" => {
                let state = self.state.borrow();
                let range = args.last().copied().unwrap_or_default();
                let start = range.trim_end_matches("..HEAD");
                match Self::position(&state, start) {
                    Some(i) => ok(format!("{}\n", state.commits.len() - i - 1)),
                    None => exit(128, "fatal: bad revision"),
                }
            }
            "merge-base" => {
                let state = self.state.borrow();
                match Self::position(&state, args[2]) {
                    Some(_) => ok(""),
                    None => exit(1, ""),
                }
            }
            "reset" => {
                let mut state = self.state.borrow_mut();
                let revision = args.last().copied().unwrap_or_default();
                match Self::position(&state, revision) {
                    Some(i) => {
                        state.commits.truncate(i + 1);
                        ok("")
                    }
                    None => exit(128, "fatal: ambiguous argument"),
                }
            }
            "log" => {
                let state = self.state.borrow();
                let lines: Vec<String> = state
                    .commits
                    .iter()
                    .rev()
                    .map(|c| format!("{} {}", c.id, c.message))
                    .collect();
                ok(lines.join("\n"))
            }
            _ => exit(1, "unsupported"),
        };
        Ok(output)
    }
}

/// A fresh repository backed by the real `git` binary.
///
/// Returns `None` when git isn't installed, so callers can skip.
pub fn real_git_repo() -> Option<(TempDir, Repository)> {
    let available = Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success());
    if !available {
        return None;
    }

    let dir = TempDir::new().unwrap();
    let repo = Repository::open(dir.path());
    repo.run(&["init", "--quiet"], None).unwrap();
    for (key, value) in [
        ("user.name", "Backfill Test"),
        ("user.email", "backfill@example.com"),
        ("commit.gpgsign", "false"),
    ] {
        repo.run(&["config", key, value], None).unwrap();
    }
    Some((dir, repo))
}
