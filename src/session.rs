//! Commit sessions: one calendar day's worth of backdated commits.
//!
//! Each iteration mutates the target, stages it, checks the index really
//! changed, and commits with a forged timestamp. A failed step skips that
//! iteration only; the session always runs to the requested count.

use std::{path::Path, thread, time::Duration};

use jiff::civil::{Date, DateTime};
use rand::{Rng, seq::IndexedRandom};
use tracing::{debug, info, warn};

use crate::{
    model::{CommitOutcome, DayReport},
    mutation::MutationGenerator,
    repository::{Backdate, Executor, Repository},
};

/// Pause between commits so consecutive invocations don't pile up.
pub const DEFAULT_PACE: Duration = Duration::from_millis(100);

/// Generic messages, one picked at random per commit.
pub const COMMIT_MESSAGES: [&str; 20] = [
    "Update code structure",
    "Fix minor issues",
    "Refactor code",
    "Add improvements",
    "Update documentation",
    "Optimize performance",
    "Fix bugs",
    "Clean up code",
    "Add new features",
    "Update comments",
    "Improve UI",
    "Fix styling",
    "Update methods",
    "Add error handling",
    "Improve logic",
    "Code cleanup",
    "Minor updates",
    "Performance improvements",
    "Bug fixes",
    "Feature updates",
];

/// Drives mutate → stage → verify → commit for one target file.
pub struct CommitSession<'a, E> {
    repo: &'a Repository<E>,
    /// Target path relative to the repository root.
    target: &'a Path,
    generator: MutationGenerator,
    pace: Duration,
}

impl<'a, E: Executor> CommitSession<'a, E> {
    pub fn new(repo: &'a Repository<E>, target: &'a Path) -> Self {
        Self {
            repo,
            target,
            generator: MutationGenerator,
            pace: DEFAULT_PACE,
        }
    }

    #[must_use]
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Attempt `commit_count` commits dated on `date`.
    ///
    /// The report holds one outcome per attempt; fewer commits than requested
    /// is a normal result, not an error.
    pub fn run_day<R: Rng + ?Sized>(
        &self,
        date: Date,
        commit_count: u32,
        rng: &mut R,
    ) -> DayReport {
        let outcomes = (1..=commit_count)
            .map(|sequence| self.attempt(date, sequence, rng))
            .collect();

        let report = DayReport {
            date,
            requested: commit_count,
            outcomes,
        };
        info!(
            %date,
            committed = report.committed(),
            attempted = report.attempted(),
            requested = report.requested,
            "day complete"
        );
        report
    }

    fn attempt<R: Rng + ?Sized>(&self, date: Date, sequence: u32, rng: &mut R) -> CommitOutcome {
        let at = random_time(date, rng);
        let mut outcome = CommitOutcome::attempted(at);
        let date_label = date.to_string();

        let path = self.repo.root().join(self.target);
        match self.generator.mutate(&path, sequence, &date_label, rng) {
            Ok(record) => debug!(
                date = %record.date_label,
                sequence = record.sequence_number,
                line = %record.text,
                "target mutated"
            ),
            Err(e) => {
                warn!(%date, sequence, error = %e, "skipping commit: mutation failed");
                return outcome;
            }
        }

        if let Err(e) = self.repo.stage(self.target) {
            warn!(%date, sequence, error = %e, "skipping commit: staging failed");
            return outcome;
        }

        match self.repo.has_staged_changes(self.target) {
            Ok(true) => outcome.staged = true,
            Ok(false) => {
                warn!(%date, sequence, "skipping commit: nothing staged");
                return outcome;
            }
            Err(e) => {
                warn!(%date, sequence, error = %e, "skipping commit: could not inspect index");
                return outcome;
            }
        }

        let message = COMMIT_MESSAGES.choose(rng).copied().unwrap_or_default();
        let when = Backdate::new(outcome.timestamp);
        match self.repo.commit(message, self.target, when) {
            Ok(()) => {
                outcome.committed = true;
                debug!(%when, message, sequence, "commit created");
            }
            Err(e) => warn!(%date, sequence, error = %e, "commit failed"),
        }

        if !self.pace.is_zero() {
            thread::sleep(self.pace);
        }
        outcome
    }
}

/// A uniformly random second between 09:00:00 and 23:59:59 on `date`.
fn random_time<R: Rng + ?Sized>(date: Date, rng: &mut R) -> DateTime {
    date.at(
        rng.random_range(9..=23),
        rng.random_range(0..=59),
        rng.random_range(0..=59),
        0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use jiff::civil::{date, time};
    use rand::{SeedableRng, rngs::StdRng};
    use tempfile::TempDir;

    use crate::repository::testing::{FakeGit, real_git_repo};

    const TARGET: &str = "activity.py";

    fn fake_repo(git: FakeGit) -> (TempDir, Repository<FakeGit>) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), git);
        (dir, repo)
    }

    #[test]
    fn random_time_stays_in_working_window() {
        let mut rng = StdRng::seed_from_u64(5);
        let day = date(2024, 4, 1);
        for _ in 0..1000 {
            let at = random_time(day, &mut rng);
            assert_eq!(at.date(), day);
            assert!(at.time() >= time(9, 0, 0, 0));
        }
    }

    #[test]
    fn creates_requested_commits_with_backdates() {
        let (dir, repo) = fake_repo(FakeGit::seeded());
        let session = CommitSession::new(&repo, Path::new(TARGET)).with_pace(Duration::ZERO);

        let report = session.run_day(date(2024, 2, 14), 4, &mut StdRng::seed_from_u64(1));

        assert_eq!(report.requested, 4);
        assert_eq!(report.committed(), 4);
        assert!(report.outcomes.iter().all(|o| o.staged && o.committed));

        let commits = repo.executor().commits();
        assert_eq!(commits.len(), 5);
        for commit in &commits[1..] {
            let stamp = commit.author_date.as_deref().unwrap();
            assert!(stamp.starts_with("2024-02-14 "), "{stamp}");
            assert!(COMMIT_MESSAGES.contains(&commit.message.as_str()));
        }
        assert!(dir.path().join(TARGET).exists());
    }

    #[test]
    fn failed_iterations_do_not_stop_the_day() {
        let git = FakeGit::seeded();
        git.fail_nth("add", 2);
        git.fail_nth("commit", 3);
        let (_dir, repo) = fake_repo(git);
        let session = CommitSession::new(&repo, Path::new(TARGET)).with_pace(Duration::ZERO);

        let report = session.run_day(date(2024, 2, 14), 5, &mut StdRng::seed_from_u64(2));

        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(report.committed(), 3);
        assert!(!report.outcomes[1].staged);
        assert!(report.outcomes[3].staged && !report.outcomes[3].committed);
        assert!(report.outcomes[4].committed);
        // The failed add never reached the commit step.
        assert_eq!(repo.executor().calls_to("commit"), 4);
    }

    #[test]
    fn nothing_staged_skips_commit() {
        let git = FakeGit::seeded();
        git.stage_nothing();
        let (_dir, repo) = fake_repo(git);
        let session = CommitSession::new(&repo, Path::new(TARGET)).with_pace(Duration::ZERO);

        let report = session.run_day(date(2024, 2, 14), 3, &mut StdRng::seed_from_u64(3));

        assert_eq!(report.committed(), 0);
        assert_eq!(repo.executor().calls_to("commit"), 0);
        assert_eq!(repo.executor().commits().len(), 1);
    }

    #[test]
    fn mutation_failure_skips_without_touching_git() {
        let (dir, repo) = fake_repo(FakeGit::seeded());
        fs::create_dir(dir.path().join(TARGET)).unwrap();
        let session = CommitSession::new(&repo, Path::new(TARGET)).with_pace(Duration::ZERO);

        let report = session.run_day(date(2024, 2, 14), 2, &mut StdRng::seed_from_u64(4));

        assert_eq!(report.committed(), 0);
        assert!(report.outcomes.iter().all(|o| o.attempted && !o.staged));
        assert_eq!(repo.executor().calls_to("add"), 0);
    }

    #[test]
    fn zero_commits_is_an_empty_report() {
        let (_dir, repo) = fake_repo(FakeGit::seeded());
        let session = CommitSession::new(&repo, Path::new(TARGET));

        let report = session.run_day(date(2024, 2, 14), 0, &mut StdRng::seed_from_u64(5));

        assert!(report.outcomes.is_empty());
        assert!(repo.executor().calls().is_empty());
    }

    #[test]
    fn real_git_day_session() {
        let Some((_dir, repo)) = real_git_repo() else {
            return;
        };
        let session = CommitSession::new(&repo, Path::new("src/lib.rs")).with_pace(Duration::ZERO);

        let report = session.run_day(date(2023, 7, 8), 3, &mut StdRng::seed_from_u64(6));
        assert_eq!(report.committed(), 3);

        let dates = repo
            .run(&["log", "--format=%ad", "--date=format:%Y-%m-%d"], None)
            .unwrap();
        assert_eq!(dates.lines().collect::<Vec<_>>(), vec!["2023-07-08"; 3]);
    }
}
