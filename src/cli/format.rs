//! Output formatting for CLI display.

use crate::{
    generate::RunSummary,
    model::{Checkpoint, ScheduleEntry},
    mutation::CleanReport,
    planner::PlanSummary,
    repository::ResetMode,
    unwind::UnwindReport,
};

/// One schedule line, e.g. `2024-01-06 Sat   3 commits`.
pub(super) fn format_entry(entry: &ScheduleEntry) -> String {
    let noun = if entry.commit_count == 1 {
        "commit"
    } else {
        "commits"
    };
    let burst = if entry.is_burst { "  [burst]" } else { "" };
    format!(
        "{} {}  {:>3} {noun}{burst}",
        entry.date,
        entry.date.strftime("%a"),
        entry.commit_count
    )
}

pub(super) fn format_plan_summary(summary: &PlanSummary, days: usize) -> String {
    format!(
        "{} of {days} days active, {} commits planned ({} burst {})",
        summary.active_days,
        summary.commits,
        summary.bursts,
        if summary.bursts == 1 { "day" } else { "days" }
    )
}

pub(super) fn format_run_summary(summary: &RunSummary) -> String {
    let mut out = format!(
        "Run {}: created {} of {} planned commits across {} active days ({:.1} per active day)",
        &summary.run_id.to_string()[..8],
        summary.total_commits,
        summary.requested,
        summary.active_days,
        summary.average_per_active_day()
    );
    if summary.bursts > 0 {
        out.push_str(&format!("\nBurst days: {}", summary.bursts));
    }
    match &summary.checkpoint {
        Some(c) => out.push_str(&format!(
            "\nCheckpoint: {} → {}",
            short(&c.start_revision),
            short(&c.end_revision)
        )),
        None => out.push_str("\nNo checkpoint written: this run cannot be unwound automatically"),
    }
    out
}

pub(super) fn format_checkpoint(checkpoint: &Checkpoint) -> String {
    format!(
        "Run {}\n  Range:   {}\n  Commits: {}\n  Target:  {}\n  Start:   {}\n  Created: {}",
        &checkpoint.run_id.to_string()[..8],
        checkpoint.date_range,
        checkpoint.total_commits,
        checkpoint.target_file.display(),
        short(&checkpoint.start_revision),
        checkpoint.created_at,
    )
}

pub(super) fn format_unwind(report: &UnwindReport) -> String {
    let kind = match report.mode {
        ResetMode::Soft => "soft reset; working tree preserved",
        ResetMode::Hard => "hard reset; working tree discarded",
    };
    let mut out = format!("Removed {} commits ({kind})", report.commits_removed);
    if let Some(cleaned) = report.cleaned {
        out.push_str(&format!("\n{}", format_clean(cleaned)));
    }
    if !report.checkpoint_cleared {
        out.push_str("\nWarning: the used checkpoint could not be removed");
    }
    out
}

pub(super) fn format_clean(report: CleanReport) -> String {
    format!(
        "Cleaned target: {} automation lines removed, {} lines kept",
        report.removed, report.kept
    )
}

/// Revision ids are opaque; only shorten ones that look like full hashes.
pub(super) fn short(revision: &str) -> &str {
    if revision.len() == 40 && revision.chars().all(|c| c.is_ascii_hexdigit()) {
        &revision[..8]
    } else {
        revision
    }
}
