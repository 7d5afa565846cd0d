//! The command executor boundary.
//!
//! Everything above this module talks to version control through the
//! [`Executor`] trait, so tests can swap the real process for a fake.

use std::{io, path::Path, process::Command};

/// Captured result of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs one command to completion in a working directory.
///
/// `env` entries are applied on top of the inherited environment for this
/// invocation only. Blocks until the command exits; there is no timeout.
pub trait Executor {
    fn execute(
        &self,
        workdir: &Path,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> io::Result<ExecOutput>;
}

/// Spawns a real program (normally `git`).
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: String,
}

impl ProcessExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn git() -> Self {
        Self::new("git")
    }
}

impl Executor for ProcessExecutor {
    fn execute(
        &self,
        workdir: &Path,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> io::Result<ExecOutput> {
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(workdir)
            .envs(env.iter().copied())
            .output()?;

        Ok(ExecOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
