//! Staging index
//!
//! The index records which files will make up the next tree: their object
//! IDs, sizes, modes and modification times.
//!
//! ## Persistence
//!
//! - Loading a missing or empty index file yields an empty index.
//! - A file that fails signature, version, entry or checksum validation is
//!   refused with [`BitError::CorruptIndex`]; staged work is never dropped
//!   silently.
//! - Saving writes a temporary sibling file, syncs it and renames it over the
//!   index, so readers see either the old or the new file, never a mix.
//! - Saves hold an exclusive lock on the `<index>.lock` sidecar and loads a
//!   shared one. The sidecar is never renamed, so the lock spans processes.
//! - Saving an unchanged index that already exists on disk is a no-op.
//!
//! ## Data Structures
//!
//! - `entries`: Maps file paths to their index entries
//! - `children`: Maps directory paths to the entries below them

use crate::artifacts::core::error::{BitError, BitResult, IoResultExt};
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, EntryMetadata, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::HEADER_SIZE;
use fake::rand;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Staging index
///
/// Holds no lock of its own: a single owner (see `Repository::index`) must
/// serialize every mutation.
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.bit/index`)
    path: Box<Path>,
    /// Tracked files mapped by path
    entries: BTreeMap<Box<Path>, IndexEntry>,
    /// Directory hierarchy for efficient parent-child lookups
    children: BTreeMap<Box<Path>, BTreeSet<Box<Path>>>,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn is_file_staged(&self, path: &Path) -> bool {
        self.entries.get(path).is_some_and(|entry| entry.staged)
    }

    /// Every entry, staged or not, ordered by path
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn staged_entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values().filter(|entry| entry.staged)
    }

    /// Snapshot of the staged entries; later mutations are not reflected
    pub fn staged_files(&self) -> Vec<IndexEntry> {
        self.staged_entries().cloned().collect()
    }

    /// Snapshot of every entry; later mutations are not reflected
    pub fn all_files(&self) -> Vec<IndexEntry> {
        self.entries().cloned().collect()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.changed = true;
        }
        self.entries.clear();
        self.children.clear();
    }

    /// Load the index from disk, replacing the in-memory entries
    ///
    /// Holds a shared lock on the sidecar while reading. On failure the
    /// in-memory index is left empty and the file is not touched.
    pub fn rehydrate(&mut self) -> BitResult<()> {
        self.entries.clear();
        self.children.clear();
        self.changed = false;

        let mut lock_file = match self.open_lock_file() {
            Ok(file) => file,
            // no metadata directory, so no index either
            Err(BitError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };
        let _lock = file_guard::lock(&mut lock_file, file_guard::Lock::Shared, 0, 1)
            .with_path("lock index", &self.lock_path())?;

        let mut index_file = match std::fs::OpenOptions::new().read(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e).with_path("open index", &self.path),
        };

        // if the index file is empty, return early
        if index_file.metadata().with_path("stat index", &self.path)?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(&self.path, &mut index_file);
        let loaded = self
            .parse_header(&mut reader)
            .and_then(|entries_count| self.parse_entries(entries_count, &mut reader))
            .and_then(|_| reader.verify());

        if let Err(e) = loaded {
            self.entries.clear();
            self.children.clear();
            tracing::warn!(path = %self.path.display(), error = %e, "refusing to load index");
            return Err(e);
        }

        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "loaded index");

        Ok(())
    }

    fn parse_header(&self, reader: &mut Checksum) -> BitResult<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(&header_bytes)
            .and_then(|header| header.validate().map(|_| header))
            .map_err(|reason| BitError::corrupt_index(&self.path, reason))?;

        Ok(header.entries_count)
    }

    /// Parse all entries from the index file
    ///
    /// Reads each entry, handling variable-length paths with 8-byte alignment.
    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> BitResult<()> {
        for _ in 0..entries_count {
            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();

            while entry_bytes.last() != Some(&0) {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
            }

            let entry = IndexEntry::deserialize(&entry_bytes)
                .map_err(|reason| BitError::corrupt_index(&self.path, reason))?;

            if self.entries.contains_key(entry.name.as_path()) {
                return Err(BitError::corrupt_index(
                    &self.path,
                    format!("duplicate entry '{}'", entry.name.display()),
                ));
            }

            self.store_entry(entry);
        }

        Ok(())
    }

    /// Remove any conflicting entries before adding a new entry
    ///
    /// Removes parent directories that might be file entries, and
    /// removes any children entries if this entry is becoming a file.
    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        let name = entry.name.clone().into_boxed_path();

        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_path_buf().into_boxed_path())
                .or_default()
                .insert(name.clone());
        }

        self.entries.insert(name, entry);
    }

    fn remove_children(&mut self, path_name: &Path) {
        if let Some(children) = self.children.remove(path_name) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, path_name: &Path) {
        if let Some(entry) = self.entries.remove(path_name) {
            for parent in entry.parent_dirs() {
                if let Some(children) = self.children.get_mut(parent) {
                    children.remove(path_name);
                    if children.is_empty() {
                        self.children.remove(parent);
                    }
                }
            }
        }
    }

    /// Insert or replace the entry for its path
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(entry);

        self.changed = true;
    }

    /// Delete the entry for `path`, or every entry below it for a directory
    ///
    /// Removing an untracked path is not an error. Returns whether anything
    /// was removed.
    pub fn remove_file(&mut self, path: &Path) -> bool {
        let before = self.entries.len();
        self.remove_entry(path);
        self.remove_children(path);

        let removed = self.entries.len() != before;
        self.changed |= removed;
        removed
    }

    /// Keep tracking `path` but leave it out of the next tree
    pub fn unstage_file(&mut self, path: &Path) -> bool {
        match self.entries.get_mut(path) {
            Some(entry) if entry.staged => {
                entry.staged = false;
                self.changed = true;
                true
            }
            _ => false,
        }
    }

    pub fn update_entry_stat(&mut self, path: &Path, stat: EntryMetadata) {
        if let Some(existing_entry) = self.entries.get_mut(path) {
            if existing_entry.metadata != stat {
                existing_entry.metadata = stat;
                self.changed = true;
            }
        }
    }

    /// Persist the index atomically
    ///
    /// Skipped when nothing changed since the last load or save and the file
    /// is already there.
    pub fn write_updates(&mut self) -> BitResult<()> {
        if !self.changed && self.path.exists() {
            return Ok(());
        }

        let index_dir = self.path.parent().ok_or_else(|| {
            BitError::InvalidObject(format!("invalid index path {}", self.path.display()))
        })?;
        std::fs::create_dir_all(index_dir).with_path("create index directory", index_dir)?;

        let mut lock_file = self.open_lock_file()?;
        let _lock = file_guard::lock(&mut lock_file, file_guard::Lock::Exclusive, 0, 1)
            .with_path("lock index", &self.lock_path())?;

        let temp_path = self.temp_path();
        let written = self
            .write_to(&temp_path)
            .and_then(|_| std::fs::rename(&temp_path, &self.path).with_path("rename index", &self.path));

        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }

        self.changed = false;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "saved index");

        Ok(())
    }

    fn write_to(&self, temp_path: &Path) -> BitResult<()> {
        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp_path)
            .with_path("create index", temp_path)?;

        let mut writer = Checksum::new(temp_path, &mut temp_file);

        let header = IndexHeader {
            entries_count: self.entries.len() as u32,
            ..IndexHeader::empty()
        };
        writer.write(&header.serialize())?;

        for entry in self.entries() {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index".to_string())
    }

    fn temp_path(&self) -> PathBuf {
        self.path
            .with_file_name(format!("{}.tmp-{}", self.file_name(), rand::random::<u32>()))
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_file_name(format!("{}.lock", self.file_name()))
    }

    fn open_lock_file(&self) -> BitResult<std::fs::File> {
        let lock_path = self.lock_path();

        match std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
        {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BitError::NotFound(lock_path)),
            Err(e) => Err(e).with_path("open index lock", &lock_path),
        }
    }
}
