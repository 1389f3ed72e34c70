use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::core::error::{BitError, BitResult};
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_status::FileStatus;
use crate::artifacts::status::resolver::resolve;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(new)]
pub struct Inspector<'r> {
    repository: &'r Repository,
}

impl<'r> Inspector<'r> {
    /// Status of every non-ignored workspace file and every staged entry
    ///
    /// Entries whose content still matches after a rehash get their stat
    /// refreshed, so the next query can take the fast path.
    pub fn file_statuses(
        &self,
        index: &mut Index,
        committed_tree: Option<&ObjectId>,
    ) -> BitResult<BTreeMap<PathBuf, FileStatus>> {
        let committed = match committed_tree {
            Some(tree_oid) => self.repository.database().read_tree_recursive(tree_oid)?,
            None => BTreeMap::new(),
        };

        let workspace_files = self
            .repository
            .workspace()
            .list_files(None, self.repository.ignore())?;

        let paths = workspace_files
            .into_iter()
            .chain(index.staged_entries().map(|entry| entry.name.clone()))
            .collect::<BTreeSet<_>>();

        let mut statuses = BTreeMap::new();
        for path in paths {
            let working = self.working_digest(&path, index)?;
            let committed = committed.get(&path).map(|entry: &DatabaseEntry| &entry.oid);

            let status = resolve(working.as_ref(), index.entry_by_path(&path), committed);
            statuses.insert(path, status);
        }

        Ok(statuses)
    }

    /// Digest of the working copy, or `None` when no file exists at `path`
    ///
    /// A directory standing where a file was staged counts as missing. The
    /// index digest is reused without reading the file when the size, mode
    /// and modification time still match what was staged.
    fn working_digest(&self, path: &Path, index: &mut Index) -> BitResult<Option<ObjectId>> {
        let stat = match self.repository.workspace().stat_file(path) {
            Ok(stat) if stat.mode.is_tree() => return Ok(None),
            Ok(stat) => stat,
            Err(BitError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        if let Some(entry) = index.entry_by_path(path) {
            if Self::is_unchanged_since_staging(entry, &stat) {
                return Ok(Some(entry.oid.clone()));
            }
        }

        let oid = self.repository.workspace().parse_blob(path)?.object_id()?;

        // touched but not edited
        if index.entry_by_path(path).is_some_and(|entry| entry.oid == oid) {
            index.update_entry_stat(path, stat);
        }

        Ok(Some(oid))
    }

    fn is_unchanged_since_staging(entry: &IndexEntry, stat: &EntryMetadata) -> bool {
        entry.stat_match(stat) && entry.times_match(stat)
    }
}
