//! A full generation run: plan a range, commit each planned day, record a
//! checkpoint.
//!
//! Only setup problems stop a run. Per-commit failures are absorbed by the
//! sessions, and a checkpoint that can't be written is a warning.

use std::{
    path::{Component, Path, PathBuf},
    time::Duration,
};

use jiff::Timestamp;
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    ledger::Ledger,
    model::{Checkpoint, DateRange},
    planner::SchedulePlanner,
    repository::{CommandError, Executor, Repository},
    session::CommitSession,
};

/// Errors that stop a run before any commit is made.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation not confirmed")]
    ConfirmationDeclined,

    #[error("not inside a usable git repository: {0}")]
    NotARepository(#[source] CommandError),

    #[error("invalid target file {}: {reason}", path.display())]
    InvalidTarget { path: PathBuf, reason: &'static str },

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Inputs for one run.
pub struct GenerateRequest<'a> {
    pub range: DateRange,
    /// Target path relative to the repository root.
    pub target: &'a Path,
    pub pace: Duration,
    /// The operator agreed to rewrite history.
    pub confirmed: bool,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub requested: u32,
    pub total_commits: u32,
    pub active_days: usize,
    pub bursts: usize,
    pub checkpoint: Option<Checkpoint>,
}

impl RunSummary {
    pub fn average_per_active_day(&self) -> f64 {
        if self.active_days == 0 {
            return 0.0;
        }
        f64::from(self.total_commits) / self.active_days as f64
    }
}

/// Run the whole pipeline against `repo`.
pub fn generate<E: Executor, R: Rng + ?Sized>(
    repo: &Repository<E>,
    ledger: &Ledger,
    planner: &SchedulePlanner,
    request: &GenerateRequest<'_>,
    rng: &mut R,
) -> Result<RunSummary, GenerateError> {
    if !request.confirmed {
        return Err(GenerateError::ConfirmationDeclined);
    }
    repo.check_status().map_err(GenerateError::NotARepository)?;
    validate_target(repo.root(), request.target)?;

    let run_id = Uuid::new_v4();
    let start = repo.head()?;
    if start.is_none() {
        warn!("repository has no commits yet; this run cannot be checkpointed");
    }

    let entries = planner.plan(&request.range, rng);
    info!(
        %run_id,
        start = %request.range.start(),
        end = %request.range.end(),
        entries = entries.len(),
        "starting generation"
    );

    let session = CommitSession::new(repo, request.target).with_pace(request.pace);
    let mut summary = RunSummary {
        run_id,
        requested: 0,
        total_commits: 0,
        active_days: 0,
        bursts: 0,
        checkpoint: None,
    };
    let mut last_active = None;

    for entry in &entries {
        let report = session.run_day(entry.date, entry.commit_count, rng);
        let committed = report.committed();
        summary.requested += entry.commit_count;
        summary.total_commits += committed;
        if entry.is_burst {
            summary.bursts += 1;
            info!(date = %entry.date, extra = committed, "burst day");
        }
        if committed > 0 && last_active != Some(entry.date) {
            summary.active_days += 1;
            last_active = Some(entry.date);
        }
    }

    let end = repo.head()?;
    summary.checkpoint = match (start, end) {
        (Some(start_revision), Some(end_revision)) => {
            let checkpoint = Checkpoint {
                run_id,
                start_revision,
                end_revision,
                total_commits: summary.total_commits,
                date_range: request.range.label(),
                created_at: Timestamp::now(),
                target_file: request.target.to_path_buf(),
            };
            match ledger.save(&checkpoint) {
                Ok(()) => {
                    info!(path = %ledger.path().display(), "checkpoint saved");
                    Some(checkpoint)
                }
                Err(e) => {
                    warn!(error = %e, "could not save checkpoint; this run cannot be unwound");
                    None
                }
            }
        }
        _ => None,
    };

    Ok(summary)
}

/// The target must stay inside the working tree and name a file.
fn validate_target(root: &Path, target: &Path) -> Result<(), GenerateError> {
    let invalid = |reason| GenerateError::InvalidTarget {
        path: target.to_path_buf(),
        reason,
    };

    if target.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    if target.is_absolute() {
        return Err(invalid("path must be relative to the repository root"));
    }
    if target
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(invalid("path must not leave the repository"));
    }
    if target.components().next() == Some(Component::Normal(".git".as_ref())) {
        return Err(invalid("path must not point into .git"));
    }
    if root.join(target).is_dir() {
        return Err(invalid("path is a directory"));
    }
    Ok(())
}
