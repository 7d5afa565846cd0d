//! Version-control plumbing: git subcommands against a single repository.
//!
//! [`Repository::run`] is a thin, fail-visible wrapper: a non-zero exit
//! becomes a [`CommandError`] carrying the captured stderr, and nothing is
//! retried here. Callers decide whether a failure skips, aborts, or is
//! simply reported.

mod executor;
#[cfg(test)]
pub mod testing;

use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use jiff::civil::DateTime;
use tracing::debug;

pub use executor::{ExecOutput, Executor, ProcessExecutor};

/// Environment variable git reads for the author timestamp.
pub const AUTHOR_DATE_VAR: &str = "GIT_AUTHOR_DATE";

/// Environment variable git reads for the committer timestamp.
pub const COMMITTER_DATE_VAR: &str = "GIT_COMMITTER_DATE";

/// Errors from running a git command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to run git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("git {command} failed: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unexpected output from git {command}: {output:?}")]
    Unparseable { command: String, output: String },
}

impl CommandError {
    fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { code, .. } => *code,
            _ => None,
        }
    }
}

/// A forged commit time, rendered as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backdate(DateTime);

impl Backdate {
    pub fn new(at: DateTime) -> Self {
        Self(at)
    }
}

impl fmt::Display for Backdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.strftime("%Y-%m-%d %H:%M:%S"))
    }
}

/// How far a reset reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Move the branch pointer only; the working tree keeps its bytes.
    Soft,
    /// Move the branch pointer and discard working-tree changes.
    Hard,
}

impl ResetMode {
    fn flag(self) -> &'static str {
        match self {
            Self::Soft => "--soft",
            Self::Hard => "--hard",
        }
    }
}

/// A working tree plus the executor used to drive it.
pub struct Repository<E = ProcessExecutor> {
    root: PathBuf,
    executor: E,
}

impl Repository {
    /// A repository driven by the `git` binary on `PATH`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(root, ProcessExecutor::git())
    }
}

impl<E: Executor> Repository<E> {
    pub fn new(root: impl Into<PathBuf>, executor: E) -> Self {
        Self {
            root: root.into(),
            executor,
        }
    }

    /// The working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[cfg(test)]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run one git command, returning stdout on success.
    ///
    /// With a `backdate`, both the author and committer timestamps of this
    /// single invocation are forced to that value.
    pub fn run(&self, args: &[&str], backdate: Option<Backdate>) -> Result<String, CommandError> {
        let command = args.join(" ");
        let stamp = backdate.map(|b| b.to_string());
        let env: Vec<(&str, &str)> = match stamp.as_deref() {
            Some(s) => vec![(AUTHOR_DATE_VAR, s), (COMMITTER_DATE_VAR, s)],
            None => Vec::new(),
        };

        debug!(%command, backdate = stamp.as_deref(), "running git");

        let output = self
            .executor
            .execute(&self.root, args, &env)
            .map_err(|source| CommandError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.success() {
            return Err(CommandError::Failed {
                command,
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }

    // ── Queries ──

    /// Confirm the root is inside a usable repository.
    pub fn check_status(&self) -> Result<(), CommandError> {
        self.run(&["status", "--short"], None).map(drop)
    }

    /// The current tip, or `None` when the branch has no commits yet.
    pub fn head(&self) -> Result<Option<String>, CommandError> {
        match self.run(&["rev-parse", "--verify", "--quiet", "HEAD"], None) {
            Ok(out) => Ok(Some(out.trim().to_string()).filter(|rev| !rev.is_empty())),
            // `--verify --quiet` exits 1 without output for a missing ref.
            Err(e) if e.exit_code() == Some(1) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether `path` has changes in the index.
    pub fn has_staged_changes(&self, path: &Path) -> Result<bool, CommandError> {
        let path = path.to_string_lossy();
        let out = self.run(&["diff", "--cached", "--name-only", "--", &path], None)?;
        Ok(!out.trim().is_empty())
    }

    /// Number of commits strictly after `revision`, up to the tip.
    pub fn count_since(&self, revision: &str) -> Result<u32, CommandError> {
        let range = format!("{revision}..HEAD");
        let out = self.run(&["rev-list", "--count", &range], None)?;
        out.trim()
            .parse()
            .map_err(|_| CommandError::Unparseable {
                command: format!("rev-list --count {range}"),
                output: out.clone(),
            })
    }

    /// Whether `revision` is an ancestor of (or equal to) the tip.
    pub fn is_ancestor(&self, revision: &str) -> Result<bool, CommandError> {
        match self.run(&["merge-base", "--is-ancestor", revision, "HEAD"], None) {
            Ok(_) => Ok(true),
            Err(e) if e.exit_code() == Some(1) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// The most recent `limit` commits, one `<short-sha> <subject>` per line.
    pub fn recent_log(&self, limit: usize) -> Result<Vec<String>, CommandError> {
        let limit = limit.to_string();
        let out = self.run(&["log", "--oneline", "-n", &limit], None)?;
        Ok(out.lines().map(str::to_string).collect())
    }

    // ── Mutations ──

    pub fn stage(&self, path: &Path) -> Result<(), CommandError> {
        let path = path.to_string_lossy();
        self.run(&["add", "--", &path], None).map(drop)
    }

    /// Commit only `path`, stamped with `when`.
    pub fn commit(&self, message: &str, path: &Path, when: Backdate) -> Result<(), CommandError> {
        let path = path.to_string_lossy();
        self.run(&["commit", "--quiet", "-m", message, "--", &path], Some(when))
            .map(drop)
    }

    pub fn reset(&self, mode: ResetMode, revision: &str) -> Result<(), CommandError> {
        self.run(&["reset", "--quiet", mode.flag(), revision], None)
            .map(drop)
    }
}
