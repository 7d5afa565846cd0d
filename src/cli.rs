//! CLI interface for backfill.
//!
//! Each subcommand is non-interactive: confirmations are flags, never
//! prompts. Commands that rewrite history refuse to act without them.
//!
//! - `backfill plan`: preview a schedule, touches nothing.
//! - `backfill generate`: create backdated commits and a checkpoint.
//! - `backfill unwind soft|hard|clean`: roll a run back.
//! - `backfill status`: show the outstanding checkpoint and recent history.
//! - `backfill suggest`: list candidate target files.

mod format;

use std::{env, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use jiff::civil::Date;
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;

use crate::{
    config::Config,
    generate::{GenerateError, GenerateRequest, generate},
    ledger::Ledger,
    model::DateRange,
    planner::{PlanSummary, SchedulePlanner},
    repository::Repository,
    suggest::{MAX_SUGGESTIONS, suggest_targets},
    unwind::{HARD_RESET_PHRASE, HistoryUnwinder, Plan, Rollback, UnwindError},
};

use format::{
    format_checkpoint, format_clean, format_entry, format_plan_summary, format_run_summary,
    format_unwind, short,
};

/// Fill a date range with backdated commits, and take them back.
#[derive(Debug, Parser)]
#[command(name = "backfill", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Repository root. Defaults to the current directory.
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow:
  1. backfill plan --year 2023 --seed 7
  2. backfill generate --year 2023 --seed 7 --target notes.md --yes
  3. backfill status
  4. backfill unwind soft --clean
     backfill unwind hard --confirm DELETE";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Preview the schedule for a date range without touching the repository.
    Plan {
        #[command(flatten)]
        range: RangeArgs,

        /// Seed for a reproducible schedule.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Create backdated commits for every planned day and record a checkpoint.
    ///
    /// Without `--yes`, prints the plan and exits without committing.
    Generate {
        #[command(flatten)]
        range: RangeArgs,

        /// File to mutate, relative to the repository root.
        /// Created if missing. Defaults to `target-file` from config.
        #[arg(long)]
        target: Option<PathBuf>,

        /// Seed for a reproducible run. A random seed is logged otherwise.
        #[arg(long)]
        seed: Option<u64>,

        /// Confirm that history should be rewritten.
        #[arg(long)]
        yes: bool,
    },

    /// Roll back the commits of the outstanding run.
    Unwind {
        #[command(subcommand)]
        mode: UnwindMode,
    },

    /// Show the outstanding checkpoint and recent commits.
    Status {
        /// How many recent commits to list.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// List files in the repository that would make good targets.
    Suggest,
}

#[derive(Debug, Subcommand)]
pub enum UnwindMode {
    /// Move the branch back; keep working-tree contents as uncommitted changes.
    Soft {
        /// Also strip automation lines from the target file.
        #[arg(long)]
        clean: bool,
    },

    /// Move the branch back and discard ALL uncommitted changes.
    Hard {
        /// Type DELETE to confirm irreversible data loss.
        #[arg(long, value_name = "PHRASE")]
        confirm: Option<String>,
    },

    /// Strip automation lines from the target file; history is untouched.
    Clean,
}

/// Exactly one way of naming the date range.
#[derive(Debug, Args)]
pub struct RangeArgs {
    /// First day, inclusive (YYYY-MM-DD). Requires `--end`.
    #[arg(long, requires = "end")]
    start: Option<Date>,

    /// Last day, inclusive (YYYY-MM-DD). Requires `--start`.
    #[arg(long, requires = "start")]
    end: Option<Date>,

    /// The last N days, ending today.
    #[arg(long, conflicts_with_all = ["start", "end", "year"])]
    last: Option<u16>,

    /// A whole calendar year.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    year: Option<i16>,
}

impl RangeArgs {
    fn to_range(&self) -> Result<DateRange, String> {
        let range = match (self.start, self.end, self.last, self.year) {
            (Some(start), Some(end), None, None) => DateRange::new(start, end),
            (None, None, Some(days), None) => DateRange::last_days(days),
            (None, None, None, Some(year)) => DateRange::year(year),
            _ => return Err("specify a range: --start/--end, --last, or --year".to_string()),
        };
        range.map_err(|e| e.to_string())
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();

    let root = match cli.repo {
        Some(root) => root,
        None => env::current_dir().map_err(|e| format!("failed to read current directory: {e}"))?,
    };
    let config = Config::load(&root)?;
    let repo = Repository::open(&root);
    let ledger = Ledger::new(&root);

    match cli.command {
        Command::Plan { range, seed } => cmd_plan(&config, &range, seed),
        Command::Generate {
            range,
            target,
            seed,
            yes,
        } => cmd_generate(&config, &repo, &ledger, &range, target, seed, yes),
        Command::Unwind { mode } => cmd_unwind(&repo, &ledger, mode),
        Command::Status { limit } => cmd_status(&repo, &ledger, limit),
        Command::Suggest => cmd_suggest(&config, &repo),
    }
}

/// A seeded RNG; without a seed, one is drawn and logged so the run can be replayed.
fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "random source seeded");
    StdRng::seed_from_u64(seed)
}

fn print_plan(planner: &SchedulePlanner, range: &DateRange, rng: &mut StdRng) {
    let entries = planner.plan(range, rng);
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    println!(
        "{}",
        format_plan_summary(&PlanSummary::of(&entries), range.days())
    );
}

fn cmd_plan(config: &Config, range: &RangeArgs, seed: Option<u64>) -> Result<(), String> {
    let range = range.to_range()?;
    let planner = SchedulePlanner::new(config.planner_settings());

    println!("Schedule for {}:", range.label());
    print_plan(&planner, &range, &mut seeded_rng(seed));
    Ok(())
}

fn cmd_generate(
    config: &Config,
    repo: &Repository,
    ledger: &Ledger,
    range: &RangeArgs,
    target: Option<PathBuf>,
    seed: Option<u64>,
    yes: bool,
) -> Result<(), String> {
    let range = range.to_range()?;
    let target = target.unwrap_or_else(|| config.target_file.clone());
    let planner = SchedulePlanner::new(config.planner_settings());
    let mut rng = seeded_rng(seed);

    if !yes {
        println!("Would generate for {} into {}:", range.label(), target.display());
        print_plan(&planner, &range, &mut rng.clone());
    }

    let request = GenerateRequest {
        range,
        target: &target,
        pace: config.pace(),
        confirmed: yes,
    };

    match generate(repo, ledger, &planner, &request, &mut rng) {
        Ok(summary) => {
            println!("{}", format_run_summary(&summary));
            Ok(())
        }
        Err(GenerateError::ConfirmationDeclined) => {
            eprintln!("Nothing committed. Re-run with --yes to rewrite history.");
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}

fn cmd_unwind(repo: &Repository, ledger: &Ledger, mode: UnwindMode) -> Result<(), String> {
    let unwinder = HistoryUnwinder::new(repo, ledger);
    let loaded = match unwinder.load() {
        Ok(loaded) => loaded,
        Err(UnwindError::NotFound(_)) => {
            println!("No outstanding run to unwind");
            return Ok(());
        }
        Err(e) => {
            return Err(format!(
                "{e}\nInspect or remove {} manually.",
                ledger.path().display()
            ));
        }
    };
    println!("{}", format_checkpoint(loaded.checkpoint()));

    let rollback = match mode {
        UnwindMode::Clean => {
            let report = loaded.clean().map_err(|e| e.to_string())?;
            println!("{}", format_clean(report));
            return Ok(());
        }
        UnwindMode::Soft { clean } => Rollback::Soft {
            clean_target: clean,
        },
        UnwindMode::Hard { confirm } => {
            // Check before planning so a missing phrase costs no git calls.
            if confirm.as_deref() != Some(HARD_RESET_PHRASE) {
                return Err(UnwindError::ConfirmationDeclined.to_string());
            }
            Rollback::Hard {
                confirmation: confirm.unwrap_or_default(),
            }
        }
    };

    let planned = match loaded.plan().map_err(|e| e.to_string())? {
        Plan::NothingToRemove(checkpoint) => {
            println!(
                "Nothing to remove: the branch is already at {}",
                short(&checkpoint.start_revision)
            );
            return Ok(());
        }
        Plan::Ready(planned) => planned,
    };
    println!("Removing {} commits", planned.commits_to_remove());

    let report = planned.execute(&rollback).map_err(|e| e.to_string())?;
    println!("{}", format_unwind(&report));
    Ok(())
}

fn cmd_status(repo: &Repository, ledger: &Ledger, limit: usize) -> Result<(), String> {
    repo.check_status()
        .map_err(|e| format!("not inside a usable git repository: {e}"))?;

    match HistoryUnwinder::new(repo, ledger).load() {
        Ok(loaded) => {
            let checkpoint = loaded.checkpoint();
            println!("{}", format_checkpoint(checkpoint));
            match repo.count_since(&checkpoint.start_revision) {
                Ok(n) => println!("  Past start: {n} commits"),
                Err(e) => println!("  Past start: unknown ({e})"),
            }
        }
        Err(UnwindError::NotFound(_)) => println!("No outstanding run"),
        Err(e) => return Err(e.to_string()),
    }

    match repo.head().map_err(|e| e.to_string())? {
        Some(_) => {
            let log = repo.recent_log(limit).map_err(|e| e.to_string())?;
            println!("\nRecent commits:");
            for line in log {
                println!("  {line}");
            }
        }
        None => println!("\nNo commits yet"),
    }
    Ok(())
}

fn cmd_suggest(config: &Config, repo: &Repository) -> Result<(), String> {
    let found = suggest_targets(repo.root(), MAX_SUGGESTIONS);
    if found.is_empty() {
        println!(
            "No source files found; {} will be created",
            config.target_file.display()
        );
        return Ok(());
    }
    for path in found {
        println!("{}", path.display());
    }
    Ok(())
}
