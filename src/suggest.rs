//! Target suggestions: source files in the repository that could carry
//! the cosmetic mutations.
//!
//! Walks the working tree with `.gitignore` respected and hidden
//! directories skipped.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// Extensions worth suggesting.
const SOURCE_EXTENSIONS: [&str; 10] = ["py", "js", "java", "cpp", "c", "ts", "php", "rb", "go", "rs"];

/// How many suggestions to return at most.
pub const MAX_SUGGESTIONS: usize = 20;

/// Source files under `root`, relative to it, sorted by path.
pub fn suggest_targets(root: &Path, limit: usize) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .sort_by_file_name(Ord::cmp)
        .build();

    let mut found: Vec<PathBuf> = walker
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| is_source(entry.path()))
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .take(limit)
        .collect();

    found.sort();
    found
}

fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn lists_source_files_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/main.rs");
        touch(dir.path(), "app.py");
        touch(dir.path(), "README.md");
        touch(dir.path(), "web/index.html");

        let found = suggest_targets(dir.path(), MAX_SUGGESTIONS);

        assert_eq!(
            found,
            vec![PathBuf::from("app.py"), PathBuf::from("src/main.rs")]
        );
    }

    #[test]
    fn skips_hidden_and_ignored() {
        let dir = TempDir::new().unwrap();
        // The ignore crate only honors .gitignore inside a git repository.
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();
        touch(dir.path(), ".hidden/tool.py");
        touch(dir.path(), "target/debug/build.rs");
        touch(dir.path(), "lib.go");

        let found = suggest_targets(dir.path(), MAX_SUGGESTIONS);

        assert_eq!(found, vec![PathBuf::from("lib.go")]);
    }

    #[test]
    fn respects_limit() {
        let dir = TempDir::new().unwrap();
        for i in 0..30 {
            touch(dir.path(), &format!("m{i:02}.c"));
        }

        assert_eq!(suggest_targets(dir.path(), 5).len(), 5);
    }
}
