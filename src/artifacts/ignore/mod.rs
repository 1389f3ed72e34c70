//! Ignore rules
//!
//! Patterns are read from an ignore file at the repository root, one glob per
//! line; blank lines and lines starting with `#` are skipped. A path is
//! ignored as soon as any pattern matches it. Answers are cached per exact
//! path and the cache is dropped whenever the pattern set changes.

pub mod pattern;

use crate::artifacts::core::error::{BitResult, IoResultExt};
use crate::artifacts::ignore::pattern::Pattern;
use crate::artifacts::index::index_entry::path_segments;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Starter patterns written by `init`
pub const DEFAULT_PATTERNS: &str = "\
# Build artifacts
target/
build/
dist/
out/
*.o
*.class
*.pyc

# Dependencies
node_modules/

# Metadata directories
.bit/
.git/

# Editor and OS files
*.swp
.DS_Store
";

#[derive(Debug)]
pub struct Ignore {
    /// Path to the ignore file
    path: Box<Path>,
    patterns: Vec<Pattern>,
    /// Keyed by the exact path string and whether it was asked about as a directory
    cache: RefCell<HashMap<(PathBuf, bool), bool>>,
}

impl Ignore {
    pub fn new(path: Box<Path>) -> Self {
        Ignore {
            path,
            patterns: Vec::new(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }

    /// Replace the active patterns with the content of the ignore file
    ///
    /// A missing file leaves an empty pattern set. Lines that do not form a
    /// pattern are skipped with a warning.
    pub fn load(&mut self) -> BitResult<()> {
        self.patterns.clear();
        self.cache.borrow_mut().clear();

        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no ignore file");
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.path).with_path("read ignore file", &self.path)?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match Pattern::new(line) {
                Ok(pattern) => self.patterns.push(pattern),
                Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "skipping ignore line"),
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            patterns = self.patterns.len(),
            "loaded ignore patterns"
        );

        Ok(())
    }

    pub fn add_pattern(&mut self, pattern: &str) -> BitResult<()> {
        self.patterns.push(Pattern::new(pattern)?);
        self.cache.borrow_mut().clear();

        Ok(())
    }

    /// Whether a repository-relative file path is excluded from staging
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.check(path, false)
    }

    /// Whether a repository-relative directory is excluded, together with
    /// everything below it
    pub fn is_dir_ignored(&self, path: &Path) -> bool {
        self.check(path, true)
    }

    fn check(&self, path: &Path, is_dir: bool) -> bool {
        let key = (path.to_path_buf(), is_dir);
        if let Some(ignored) = self.cache.borrow().get(&key) {
            return *ignored;
        }

        let ignored = match path_segments(path) {
            Ok(segments) if !segments.is_empty() => self
                .patterns
                .iter()
                .any(|pattern| pattern.matches(&segments, is_dir)),
            _ => false,
        };

        self.cache.borrow_mut().insert(key, ignored);
        ignored
    }

    /// Write the starter ignore file into `dir_path`
    ///
    /// Returns `false` without touching anything when the file already exists.
    pub fn create_default_ignore_file(dir_path: &Path, file_name: &str) -> BitResult<bool> {
        let path = dir_path.join(file_name);
        if path.exists() {
            return Ok(false);
        }

        std::fs::write(&path, DEFAULT_PATTERNS).with_path("write ignore file", &path)?;
        tracing::info!(path = %path.display(), "created default ignore file");

        Ok(true)
    }

    #[cfg(test)]
    fn cached_paths(&self) -> usize {
        self.cache.borrow().len()
    }
}
