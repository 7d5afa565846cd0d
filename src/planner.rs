//! Schedule planning: which days get commits, and how many.
//!
//! The plan is a pure function of the date range and the random source.
//! Feeding the same seeded RNG the same range yields the same schedule.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::model::{DateRange, ScheduleEntry, is_weekend};

/// Tunables for the activity pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSettings {
    /// Chance that any given day sees commits at all.
    pub active_probability: f64,
    /// Chance that an active day also gets a burst.
    pub burst_probability: f64,
    pub weekday_commits: RangeInclusive<u32>,
    pub weekend_commits: RangeInclusive<u32>,
    pub burst_commits: RangeInclusive<u32>,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            active_probability: 0.65,
            burst_probability: 0.05,
            weekday_commits: 1..=8,
            weekend_commits: 1..=4,
            burst_commits: 5..=12,
        }
    }
}

/// Decides the commit schedule for a date range.
#[derive(Debug, Clone, Default)]
pub struct SchedulePlanner {
    settings: PlannerSettings,
}

impl SchedulePlanner {
    pub fn new(settings: PlannerSettings) -> Self {
        Self { settings }
    }

    /// Plan every day in `range`, in date order.
    ///
    /// Inactive days produce nothing. An active day produces a regular entry
    /// and, occasionally, a second burst entry for the same date.
    pub fn plan<R: Rng + ?Sized>(&self, range: &DateRange, rng: &mut R) -> Vec<ScheduleEntry> {
        let s = &self.settings;
        let mut entries = Vec::new();

        for date in range.iter() {
            if !rng.random_bool(s.active_probability) {
                continue;
            }

            let counts = if is_weekend(date) {
                &s.weekend_commits
            } else {
                &s.weekday_commits
            };
            entries.push(ScheduleEntry {
                date,
                commit_count: rng.random_range(counts.clone()),
                is_burst: false,
            });

            if rng.random_bool(s.burst_probability) {
                entries.push(ScheduleEntry {
                    date,
                    commit_count: rng.random_range(s.burst_commits.clone()),
                    is_burst: true,
                });
            }
        }

        entries
    }
}

/// Totals over a planned schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanSummary {
    pub active_days: usize,
    pub entries: usize,
    pub bursts: usize,
    pub commits: u32,
}

impl PlanSummary {
    pub fn of(entries: &[ScheduleEntry]) -> Self {
        let mut summary = Self {
            entries: entries.len(),
            ..Self::default()
        };
        let mut last_date = None;
        for entry in entries {
            if last_date != Some(entry.date) {
                summary.active_days += 1;
                last_date = Some(entry.date);
            }
            if entry.is_burst {
                summary.bursts += 1;
            }
            summary.commits += entry.commit_count;
        }
        summary
    }
}
