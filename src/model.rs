//! Core data model for backfill.
//!
//! Schedules say what to commit and when, outcomes record what a day's
//! session actually managed, and checkpoints remember a finished run so it
//! can be unwound later.

mod checkpoint;
mod outcome;
mod schedule;

pub use checkpoint::Checkpoint;
pub use outcome::{CommitOutcome, DayReport, MutationRecord};
pub use schedule::{DateRange, ScheduleEntry, is_weekend};
