//! Checkpoint: the persisted record of a finished generation run.

use std::path::PathBuf;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything an unwind needs to know about a generation run.
///
/// `start_revision` must remain an ancestor of the branch tip for an unwind
/// to be safe; the unwinder checks this before resetting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub run_id: Uuid,
    pub start_revision: String,
    pub end_revision: String,
    pub total_commits: u32,
    pub date_range: String,
    pub created_at: Timestamp,
    pub target_file: PathBuf,
}
