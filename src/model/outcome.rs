//! What happened while committing: one mutation, one attempt, one day.

use jiff::civil::{Date, DateTime};

/// A cosmetic line appended to the target file for one commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub sequence_number: u32,
    pub date_label: String,
    pub text: String,
}

/// How far a single commit attempt got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOutcome {
    pub attempted: bool,
    pub staged: bool,
    pub committed: bool,
    pub timestamp: DateTime,
}

impl CommitOutcome {
    /// An attempt that has not reached the stage step yet.
    pub fn attempted(timestamp: DateTime) -> Self {
        Self {
            attempted: true,
            staged: false,
            committed: false,
            timestamp,
        }
    }
}

/// Result of one commit session: requested count plus every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    pub date: Date,
    pub requested: u32,
    pub outcomes: Vec<CommitOutcome>,
}

impl DayReport {
    /// Number of iterations that got past the start line.
    pub fn attempted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.attempted).count()
    }

    /// Number of commits that were actually created.
    pub fn committed(&self) -> u32 {
        let count = self.outcomes.iter().filter(|o| o.committed).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}
