use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_status::FileStatus;

/// Classify one path from its three observations, most specific rule first
///
/// - `working`: digest of the working copy, `None` when the file is gone
/// - `index`: the index entry for the path; only a staged entry counts
/// - `committed`: digest recorded in the committed tree
pub fn resolve(
    working: Option<&ObjectId>,
    index: Option<&IndexEntry>,
    committed: Option<&ObjectId>,
) -> FileStatus {
    match (index.filter(|entry| entry.staged), committed) {
        (Some(entry), _) if working == Some(&entry.oid) => FileStatus::Staged,
        (Some(_), _) => FileStatus::Modified,
        (None, Some(committed)) if working == Some(committed) => FileStatus::Committed,
        (None, Some(_)) => FileStatus::Modified,
        (None, None) => FileStatus::Untracked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::index_entry::EntryMetadata;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::object::Object;
    use bytes::Bytes;
    use rstest::{fixture, rstest};
    use std::path::PathBuf;

    fn oid_of(content: &'static str) -> ObjectId {
        Blob::new(Bytes::from_static(content.as_bytes()))
            .object_id()
            .unwrap()
    }

    #[fixture]
    fn v1() -> ObjectId {
        oid_of("version 1")
    }

    #[fixture]
    fn v2() -> ObjectId {
        oid_of("version 2")
    }

    fn staged(oid: &ObjectId) -> IndexEntry {
        IndexEntry::new(PathBuf::from("a.txt"), oid.clone(), EntryMetadata::default())
    }

    fn unstaged(oid: &ObjectId) -> IndexEntry {
        let mut entry = staged(oid);
        entry.staged = false;
        entry
    }

    #[rstest]
    fn staged_content_matching_the_working_copy_is_staged(v1: ObjectId, v2: ObjectId) {
        assert_eq!(resolve(Some(&v1), Some(&staged(&v1)), None), FileStatus::Staged);
        assert_eq!(resolve(Some(&v1), Some(&staged(&v1)), Some(&v2)), FileStatus::Staged);
    }

    #[rstest]
    fn staged_content_differing_from_the_working_copy_is_modified(v1: ObjectId, v2: ObjectId) {
        assert_eq!(resolve(Some(&v2), Some(&staged(&v1)), None), FileStatus::Modified);
        assert_eq!(resolve(Some(&v2), Some(&staged(&v1)), Some(&v2)), FileStatus::Modified);
    }

    #[rstest]
    fn staged_file_deleted_from_the_workspace_is_modified(v1: ObjectId) {
        assert_eq!(resolve(None, Some(&staged(&v1)), None), FileStatus::Modified);
    }

    #[rstest]
    fn unchanged_committed_file_is_committed(v1: ObjectId) {
        assert_eq!(resolve(Some(&v1), None, Some(&v1)), FileStatus::Committed);
    }

    #[rstest]
    fn committed_file_edited_in_the_workspace_is_modified(v1: ObjectId, v2: ObjectId) {
        assert_eq!(resolve(Some(&v2), None, Some(&v1)), FileStatus::Modified);
    }

    #[rstest]
    fn unknown_file_is_untracked(v1: ObjectId) {
        assert_eq!(resolve(Some(&v1), None, None), FileStatus::Untracked);
    }

    #[rstest]
    fn unstaged_entries_fall_back_to_the_committed_tree(v1: ObjectId, v2: ObjectId) {
        assert_eq!(resolve(Some(&v1), Some(&unstaged(&v1)), None), FileStatus::Untracked);
        assert_eq!(resolve(Some(&v1), Some(&unstaged(&v2)), Some(&v1)), FileStatus::Committed);
    }
}
