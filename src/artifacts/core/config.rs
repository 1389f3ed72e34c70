//! Repository layout and tunables
//!
//! Defaults can be overridden through the environment:
//!
//! - `BITSTAGE_DIR`: name of the metadata directory (default `.bit`)
//! - `BITSTAGE_IGNORE_FILE`: name of the ignore file (default `.bitignore`)
//! - `BITSTAGE_COMPRESSION`: zlib level used for stored objects, `0..=9`

use crate::artifacts::core::error::{BitError, BitResult};
use std::path::{Path, PathBuf};

pub const DEFAULT_METADATA_DIR: &str = ".bit";
pub const DEFAULT_INDEX_FILE: &str = "index";
pub const DEFAULT_OBJECTS_DIR: &str = "objects";
pub const DEFAULT_IGNORE_FILE: &str = ".bitignore";
pub const DEFAULT_COMPRESSION: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub metadata_dir: String,
    pub index_file: String,
    pub objects_dir: String,
    pub ignore_file: String,
    pub compression: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            metadata_dir: DEFAULT_METADATA_DIR.to_string(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            objects_dir: DEFAULT_OBJECTS_DIR.to_string(),
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            compression: DEFAULT_COMPRESSION,
        }
    }
}

impl Config {
    pub fn load_from_env() -> BitResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BitResult<Self> {
        let mut config = Config::default();

        if let Some(dir) = lookup("BITSTAGE_DIR").filter(|dir| !dir.trim().is_empty()) {
            config.metadata_dir = dir;
        }
        if let Some(file) = lookup("BITSTAGE_IGNORE_FILE").filter(|file| !file.trim().is_empty()) {
            config.ignore_file = file;
        }
        if let Some(level) = lookup("BITSTAGE_COMPRESSION") {
            config.compression = level
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|level| *level <= 9)
                .ok_or_else(|| {
                    BitError::InvalidConfig(format!(
                        "BITSTAGE_COMPRESSION must be between 0 and 9, got '{level}'"
                    ))
                })?;
        }

        Ok(config)
    }

    pub fn metadata_path(&self, root: &Path) -> PathBuf {
        root.join(&self.metadata_dir)
    }

    pub fn index_path(&self, root: &Path) -> PathBuf {
        self.metadata_path(root).join(&self.index_file)
    }

    pub fn objects_path(&self, root: &Path) -> PathBuf {
        self.metadata_path(root).join(&self.objects_dir)
    }

    pub fn ignore_path(&self, root: &Path) -> PathBuf {
        root.join(&self.ignore_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(
            config.index_path(Path::new("/repo")),
            PathBuf::from("/repo/.bit/index")
        );
        assert_eq!(
            config.objects_path(Path::new("/repo")),
            PathBuf::from("/repo/.bit/objects")
        );
    }

    #[test]
    fn environment_overrides_layout() {
        let config = Config::from_lookup(lookup_from(&[
            ("BITSTAGE_DIR", ".meta"),
            ("BITSTAGE_IGNORE_FILE", ".stageignore"),
            ("BITSTAGE_COMPRESSION", "9"),
        ]))
        .unwrap();

        assert_eq!(config.metadata_dir, ".meta");
        assert_eq!(config.ignore_file, ".stageignore");
        assert_eq!(config.compression, 9);
    }

    #[test]
    fn out_of_range_compression_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("BITSTAGE_COMPRESSION", "12")]));

        assert!(matches!(result, Err(BitError::InvalidConfig(_))));
    }
}
