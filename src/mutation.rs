//! Cosmetic mutations of the target file.
//!
//! Every commit needs a non-empty diff, so each mutation appends one
//! commented line drawn from a fixed catalog. The same catalog defines the
//! automation markers that [`clean_target`] later strips back out.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use rand::{Rng, seq::IndexedRandom};
use regex::Regex;

use crate::model::MutationRecord;

/// Header lines written when the target file is created.
const HEADER: [&str; 2] = ["Automation target file", "Created for commit automation"];

const UPDATE_WORDS: [&str; 4] = ["refactor", "optimize", "cleanup", "enhance"];
const FEATURE_WORDS: [&str; 4] = ["improvement", "bugfix", "enhancement", "maintenance"];

/// Matches one whole line written by this module, in any comment style.
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    let bodies = [
        r"Automation target file",
        r"Created for commit automation",
        r"Modified on \d{4}-\d{2}-\d{2}",
        r"Commit #\d+ - Auto-generated comment \d+",
        r"Update: (?:refactor|optimize|cleanup|enhance)",
        r"Version: \d+\.\d+",
        r"Build: \d+",
        r"Feature: (?:improvement|bugfix|enhancement|maintenance)",
        r"Automation commit \d+",
    ]
    .join("|");
    let pattern = format!(r"^\s*(?:(?:#|//) (?:{bodies})|<!-- (?:{bodies}) -->)\s*$");
    Regex::new(&pattern).expect("marker pattern is valid")
});

/// Errors writing the target file.
#[derive(Debug, thiserror::Error)]
#[error("failed to write {}: {source}", path.display())]
pub struct MutationError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl MutationError {
    fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Comment syntax, chosen from the target file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    Hash,
    DoubleSlash,
    Html,
}

impl CommentStyle {
    /// Unknown or missing extensions fall back to `#`.
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("java" | "js" | "ts" | "cpp" | "c" | "cs" | "php" | "go" | "rs") => {
                Self::DoubleSlash
            }
            Some("html" | "xml") => Self::Html,
            _ => Self::Hash,
        }
    }

    pub fn wrap(self, body: &str) -> String {
        match self {
            Self::Hash => format!("# {body}"),
            Self::DoubleSlash => format!("// {body}"),
            Self::Html => format!("<!-- {body} -->"),
        }
    }
}

/// Whether a line was written by the mutation generator.
pub fn is_marker(line: &str) -> bool {
    MARKER.is_match(line.trim_end_matches(['\r', '\n']))
}

/// Appends cosmetic lines to a target file.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationGenerator;

impl MutationGenerator {
    /// Append one cosmetic line to `path`, creating the file first if needed.
    ///
    /// The file always grows: a blank separator and a non-empty comment line
    /// are appended on every call.
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        path: &Path,
        sequence_number: u32,
        date_label: &str,
        rng: &mut R,
    ) -> Result<MutationRecord, MutationError> {
        let style = CommentStyle::for_path(path);
        ensure_exists(path, style).map_err(|e| MutationError::new(path, e))?;

        let text = style.wrap(&body(sequence_number, date_label, rng));

        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| MutationError::new(path, e))?;
        file.write_all(format!("\n{text}\n").as_bytes())
            .map_err(|e| MutationError::new(path, e))?;

        Ok(MutationRecord {
            sequence_number,
            date_label: date_label.to_string(),
            text,
        })
    }
}

/// Create the target with a header unless it already exists.
fn ensure_exists(path: &Path, style: CommentStyle) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(()),
        Err(e) => return Err(e),
    };
    let header: String = HEADER
        .iter()
        .map(|line| format!("{}\n", style.wrap(line)))
        .collect();
    file.write_all(header.as_bytes())
}

/// Pick one template from the catalog and fill it in.
fn body<R: Rng + ?Sized>(sequence_number: u32, date_label: &str, rng: &mut R) -> String {
    match rng.random_range(0..7) {
        0 => format!("Modified on {date_label}"),
        1 => format!(
            "Commit #{sequence_number} - Auto-generated comment {}",
            rng.random_range(1000..=9999)
        ),
        2 => format!("Update: {}", pick(&UPDATE_WORDS, rng)),
        3 => format!(
            "Version: {}.{}",
            rng.random_range(1..=100),
            rng.random_range(0..=9)
        ),
        4 => format!("Build: {}", rng.random_range(1000..=9999)),
        5 => format!("Feature: {}", pick(&FEATURE_WORDS, rng)),
        _ => format!("Automation commit {}", rng.random_range(100..=999)),
    }
}

fn pick<'a, R: Rng + ?Sized>(words: &[&'a str], rng: &mut R) -> &'a str {
    words.choose(rng).copied().unwrap_or_default()
}

/// Lines removed by a cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: usize,
    pub kept: usize,
}

/// Strip every automation marker line from `path`.
///
/// All other lines, blank ones included, are kept byte-for-byte.
pub fn clean_target(path: &Path) -> io::Result<CleanReport> {
    let contents = fs::read_to_string(path)?;
    let mut removed = 0;
    let mut kept = 0;
    let mut cleaned = String::with_capacity(contents.len());

    for line in contents.split_inclusive('\n') {
        if is_marker(line) {
            removed += 1;
        } else {
            kept += 1;
            cleaned.push_str(line);
        }
    }

    if removed > 0 {
        fs::write(path, cleaned)?;
    }
    Ok(CleanReport { removed, kept })
}
