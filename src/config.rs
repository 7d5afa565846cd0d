//! Backfill configuration.
//!
//! Looked up in order:
//!
//! 1. `<repo>/.backfill.toml`
//! 2. `~/.backfill/config.toml`
//!
//! The first file found wins. With neither present, built-in defaults apply.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::planner::PlannerSettings;

/// Repository-local config file name.
pub const LOCAL_CONFIG_FILE: &str = ".backfill.toml";

/// Backfill configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Target file used when `--target` is not given.
    pub target_file: PathBuf,

    /// Pause between commits, in milliseconds.
    pub pace_ms: u64,

    pub schedule: ScheduleConfig,
}

/// The `[schedule]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ScheduleConfig {
    pub active_probability: f64,
    pub burst_probability: f64,
    pub weekday_commits: [u32; 2],
    pub weekend_commits: [u32; 2],
    pub burst_commits: [u32; 2],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_file: PathBuf::from("automation_target.txt"),
            pace_ms: 100,
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            active_probability: 0.65,
            burst_probability: 0.05,
            weekday_commits: [1, 8],
            weekend_commits: [1, 4],
            burst_commits: [5, 12],
        }
    }
}

impl Config {
    /// Load config for the repository at `repo_root`.
    pub fn load(repo_root: &Path) -> Result<Self, String> {
        let candidates = [Some(repo_root.join(LOCAL_CONFIG_FILE)), Self::global_path()];
        for path in candidates.into_iter().flatten() {
            if let Some(config) = Self::load_file(&path)? {
                return Ok(config);
            }
        }
        Ok(Self::default())
    }

    /// The global config path: `~/.backfill/config.toml`.
    pub fn global_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".backfill").join("config.toml"))
    }

    /// Parse one config file. A missing file is `Ok(None)`.
    fn load_file(path: &Path) -> Result<Option<Self>, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;
        config
            .validate()
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        Ok(Some(config))
    }

    fn validate(&self) -> Result<(), String> {
        let s = &self.schedule;
        for (name, p) in [
            ("active-probability", s.active_probability),
            ("burst-probability", s.burst_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be between 0 and 1, got {p}"));
            }
        }
        for (name, [min, max]) in [
            ("weekday-commits", s.weekday_commits),
            ("weekend-commits", s.weekend_commits),
            ("burst-commits", s.burst_commits),
        ] {
            if min == 0 || min > max {
                return Err(format!(
                    "{name} must be [min, max] with 1 <= min <= max, got [{min}, {max}]"
                ));
            }
        }
        Ok(())
    }

    pub fn pace(&self) -> Duration {
        Duration::from_millis(self.pace_ms)
    }

    pub fn planner_settings(&self) -> PlannerSettings {
        let s = &self.schedule;
        PlannerSettings {
            active_probability: s.active_probability,
            burst_probability: s.burst_probability,
            weekday_commits: s.weekday_commits[0]..=s.weekday_commits[1],
            weekend_commits: s.weekend_commits[0]..=s.weekend_commits[1],
            burst_commits: s.burst_commits[0]..=s.burst_commits[1],
        }
    }
}
