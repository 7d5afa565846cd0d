//! Checkpoint persistence for generation runs.
//!
//! At most one checkpoint is outstanding per repository. It lives at a
//! fixed hidden path in the working tree root:
//!
//! ```text
//! <repo>/.backfill-checkpoint.json
//! ```
//!
//! Its presence means a run finished and has not been unwound yet.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::model::Checkpoint;

/// File name of the checkpoint, relative to the repository root.
pub const CHECKPOINT_FILE: &str = ".backfill-checkpoint.json";

/// Errors that can occur reading or writing the checkpoint.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("no checkpoint found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("checkpoint at {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, LedgerError>;

/// Reads and writes the single checkpoint of a repository.
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// The ledger for the repository rooted at `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(CHECKPOINT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the checkpoint, replacing any previous one.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let json = serde_json::to_string_pretty(checkpoint)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Loads the outstanding checkpoint.
    pub fn load(&self) -> Result<Checkpoint> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LedgerError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&json).map_err(|source| LedgerError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Removes the checkpoint.
    ///
    /// Idempotent: does nothing if the file doesn't exist.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
