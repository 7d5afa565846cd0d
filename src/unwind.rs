//! Unwinding a generation run from its checkpoint.
//!
//! The unwinder is a small typestate machine:
//!
//! ```text
//! HistoryUnwinder::load ─► Loaded ─► plan ─► Plan::Ready(Planned) ─► execute ─► UnwindReport
//!                            │               Plan::NothingToRemove
//!                            └─► clean (target cleanup only, history untouched)
//! ```
//!
//! A failed reset leaves the checkpoint in place so the whole sequence can
//! be retried from `load`. A successful reset consumes the checkpoint.

use std::{io, path::PathBuf};

use tracing::{info, warn};

use crate::{
    ledger::{Ledger, LedgerError},
    model::Checkpoint,
    mutation::{CleanReport, clean_target},
    repository::{CommandError, Executor, Repository, ResetMode},
};

/// The literal phrase that authorizes a hard reset.
pub const HARD_RESET_PHRASE: &str = "DELETE";

/// Errors that halt an unwind.
#[derive(Debug, thiserror::Error)]
pub enum UnwindError {
    #[error("no outstanding run to unwind (expected a checkpoint at {})", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Ledger(LedgerError),

    #[error("start revision {0} is not an ancestor of the current tip")]
    NotAncestor(String),

    #[error("hard reset not confirmed: pass the phrase {HARD_RESET_PHRASE}")]
    ConfirmationDeclined,

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("failed to clean {}: {source}", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<LedgerError> for UnwindError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotFound(path) => Self::NotFound(path),
            other => Self::Ledger(other),
        }
    }
}

/// How to move history back to the checkpoint's start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rollback {
    /// Keep working-tree bytes; optionally strip markers from the target.
    Soft { clean_target: bool },
    /// Discard every working-tree change. `confirmation` must equal
    /// [`HARD_RESET_PHRASE`].
    Hard { confirmation: String },
}

/// What a completed rollback did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwindReport {
    pub mode: ResetMode,
    pub commits_removed: u32,
    pub cleaned: Option<CleanReport>,
    pub checkpoint_cleared: bool,
}

/// Entry point: binds a repository to its ledger.
pub struct HistoryUnwinder<'a, E> {
    repo: &'a Repository<E>,
    ledger: &'a Ledger,
}

impl<'a, E: Executor> HistoryUnwinder<'a, E> {
    pub fn new(repo: &'a Repository<E>, ledger: &'a Ledger) -> Self {
        Self { repo, ledger }
    }

    /// Read the outstanding checkpoint.
    pub fn load(&self) -> Result<Loaded<'a, E>, UnwindError> {
        let checkpoint = self.ledger.load()?;
        info!(run_id = %checkpoint.run_id, range = %checkpoint.date_range, "checkpoint loaded");
        Ok(Loaded {
            repo: self.repo,
            ledger: self.ledger,
            checkpoint,
        })
    }
}

/// A checkpoint has been read; nothing has been touched yet.
pub struct Loaded<'a, E> {
    repo: &'a Repository<E>,
    ledger: &'a Ledger,
    checkpoint: Checkpoint,
}

impl<'a, E: Executor> Loaded<'a, E> {
    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    /// Count the commits past the checkpoint's start and verify ancestry.
    pub fn plan(self) -> Result<Plan<'a, E>, UnwindError> {
        let start = &self.checkpoint.start_revision;
        if !self.repo.is_ancestor(start)? {
            return Err(UnwindError::NotAncestor(start.clone()));
        }

        let commits_to_remove = self.repo.count_since(start)?;
        if commits_to_remove == 0 {
            info!(%start, "nothing to remove");
            return Ok(Plan::NothingToRemove(self.checkpoint));
        }

        Ok(Plan::Ready(Planned {
            loaded: self,
            commits_to_remove,
        }))
    }

    /// Strip automation markers from the target file without touching history.
    ///
    /// The checkpoint stays outstanding.
    pub fn clean(&self) -> Result<CleanReport, UnwindError> {
        clean(self.repo, &self.checkpoint)
    }
}

/// Outcome of planning.
pub enum Plan<'a, E> {
    /// The tip already sits at the start revision.
    NothingToRemove(Checkpoint),
    Ready(Planned<'a, E>),
}

/// The span to remove is known and verified.
pub struct Planned<'a, E> {
    loaded: Loaded<'a, E>,
    commits_to_remove: u32,
}

impl<E: Executor> Planned<'_, E> {
    pub fn commits_to_remove(&self) -> u32 {
        self.commits_to_remove
    }

    /// Reset to the start revision and consume the checkpoint.
    pub fn execute(self, rollback: &Rollback) -> Result<UnwindReport, UnwindError> {
        let (mode, clean_after) = match rollback {
            Rollback::Soft { clean_target } => (ResetMode::Soft, *clean_target),
            Rollback::Hard { confirmation } => {
                if confirmation != HARD_RESET_PHRASE {
                    return Err(UnwindError::ConfirmationDeclined);
                }
                (ResetMode::Hard, false)
            }
        };

        let Loaded {
            repo,
            ledger,
            checkpoint,
        } = self.loaded;

        repo.reset(mode, &checkpoint.start_revision)?;
        info!(
            ?mode,
            removed = self.commits_to_remove,
            start = %checkpoint.start_revision,
            "history reset"
        );

        let checkpoint_cleared = match ledger.delete() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, path = %ledger.path().display(), "could not remove used checkpoint");
                false
            }
        };

        let cleaned = if clean_after {
            Some(clean(repo, &checkpoint)?)
        } else {
            None
        };

        Ok(UnwindReport {
            mode,
            commits_removed: self.commits_to_remove,
            cleaned,
            checkpoint_cleared,
        })
    }
}

fn clean<E: Executor>(
    repo: &Repository<E>,
    checkpoint: &Checkpoint,
) -> Result<CleanReport, UnwindError> {
    let path = repo.root().join(&checkpoint.target_file);
    let report = clean_target(&path).map_err(|source| UnwindError::Clean {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), removed = report.removed, "target cleaned");
    Ok(report)
}
