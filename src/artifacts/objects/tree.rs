//! Tree object
//!
//! Trees represent directory snapshots. They map a single path segment to
//! either a blob (file) or another tree (subdirectory).
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! Entries are always written in byte-wise lexicographic order of their
//! names, so two trees with the same `name -> child` set share one object ID
//! no matter how they were assembled.

use crate::artifacts::core::error::{BitError, BitResult};
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::io::BufRead;

/// A node in a tree: either a reference to a stored object or a subtree
/// still being assembled from the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// Blob, or a subtree read back from the database
    Leaf(DatabaseEntry),
    /// Nested tree built from index entries
    Directory(Tree),
}

impl TreeNode {
    pub fn mode(&self) -> EntryMode {
        match self {
            TreeNode::Leaf(entry) => entry.mode,
            TreeNode::Directory(_) => EntryMode::Directory,
        }
    }

    fn object_type(&self) -> ObjectType {
        match self.mode() {
            EntryMode::Directory => ObjectType::Tree,
            EntryMode::File(_) => ObjectType::Blob,
        }
    }
}

/// Tree object representing a directory snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeNode>,
}

impl Tree {
    /// Build a tree from index entries
    ///
    /// Entries are placed under the directories named by their path segments,
    /// creating intermediate trees as needed. Unstaged entries must be
    /// filtered out by the caller.
    pub fn build<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> BitResult<Self> {
        let mut root = Self::default();

        for entry in entries {
            let segments = entry.segments()?;
            root.add_entry(&segments, entry)?;
        }

        Ok(root)
    }

    fn add_entry(&mut self, segments: &[&str], entry: &IndexEntry) -> BitResult<()> {
        let (name, rest) = segments.split_first().ok_or_else(|| {
            BitError::InvalidObject(format!("empty path in index entry {}", entry.oid))
        })?;

        if rest.is_empty() {
            if let Some(TreeNode::Directory(_)) = self.entries.get(*name) {
                return Err(Self::conflict(entry));
            }
            self.entries.insert(
                name.to_string(),
                TreeNode::Leaf(DatabaseEntry::new(entry.oid.clone(), entry.metadata.mode)),
            );
            return Ok(());
        }

        let node = self
            .entries
            .entry(name.to_string())
            .or_insert_with(|| TreeNode::Directory(Tree::default()));

        match node {
            TreeNode::Directory(tree) => tree.add_entry(rest, entry),
            TreeNode::Leaf(_) => Err(Self::conflict(entry)),
        }
    }

    fn conflict(entry: &IndexEntry) -> BitError {
        BitError::InvalidObject(format!(
            "'{}' is staged both as a file and as a directory",
            entry.name.display()
        ))
    }

    /// Hash the tree bottom-up, handing every tree object to `store`
    ///
    /// Children are visited before their parents, so a tree is only handed
    /// over once all of its subtrees are known. Returns the root object ID.
    pub fn write_with<F>(&self, store: &mut F) -> BitResult<ObjectId>
    where
        F: FnMut(&ObjectId, Bytes) -> BitResult<()>,
    {
        let content = self.serialize_with(store)?;
        let oid = hash(&content)?;
        store(&oid, content)?;

        Ok(oid)
    }

    fn serialize_with<F>(&self, store: &mut F) -> BitResult<Bytes>
    where
        F: FnMut(&ObjectId, Bytes) -> BitResult<()>,
    {
        let mut content_bytes = Vec::new();

        for (name, node) in &self.entries {
            let oid = match node {
                TreeNode::Leaf(entry) => entry.oid.clone(),
                TreeNode::Directory(tree) => tree.write_with(store)?,
            };

            content_bytes.extend_from_slice(format!("{} {}", node.mode().as_str(), name).as_bytes());
            content_bytes.push(0);
            oid.write_h40_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::with_capacity(content_bytes.len() + 16);
        tree_bytes
            .extend_from_slice(format!("{} {}\0", ObjectType::Tree, content_bytes.len()).as_bytes());
        tree_bytes.extend_from_slice(&content_bytes);

        Ok(Bytes::from(tree_bytes))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeNode)> {
        self.entries.iter()
    }

    pub fn entry(&self, name: &str) -> Option<&TreeNode> {
        self.entries.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn hash(content: &[u8]) -> BitResult<ObjectId> {
    let mut hasher = Sha1::new();
    hasher.update(content);
    ObjectId::from_digest(&hasher.finalize())
}

impl Packable for Tree {
    fn serialize(&self) -> BitResult<Bytes> {
        self.serialize_with(&mut |_, _| Ok(()))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> BitResult<Self> {
        let mut entries = BTreeMap::new();
        let malformed = |reason: &str| BitError::InvalidObject(format!("malformed tree: {reason}"));

        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader
                .read_until(b' ', &mut mode_bytes)
                .map_err(|_| malformed("unreadable mode"))?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(malformed("unexpected EOF in mode"));
            }

            let mode_str =
                std::str::from_utf8(&mode_bytes).map_err(|_| malformed("non UTF-8 mode"))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            name_bytes.clear();
            reader
                .read_until(b'\0', &mut name_bytes)
                .map_err(|_| malformed("unreadable name"))?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(malformed("unexpected EOF in name"));
            }
            let name = std::str::from_utf8(&name_bytes)
                .map_err(|_| malformed("non UTF-8 name"))?
                .to_owned();
            if name.is_empty() || name.contains('/') {
                return Err(malformed("invalid entry name"));
            }

            let oid = ObjectId::read_h40_from(&mut reader)?;

            entries.insert(name, TreeNode::Leaf(DatabaseEntry::new(oid, mode)));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|(name, node)| {
                let oid = match node {
                    TreeNode::Leaf(entry) => Ok(entry.oid.clone()),
                    TreeNode::Directory(tree) => tree.object_id(),
                };

                format!(
                    "{:0>6} {} {}\t{}",
                    node.mode().as_str(),
                    node.object_type(),
                    oid.unwrap_or_default(),
                    name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use crate::artifacts::index::index_entry::EntryMetadata;
    use crate::artifacts::objects::blob::Blob;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn entry(path: &str, content: &str) -> IndexEntry {
        let blob = Blob::new(Bytes::from(content.to_string()));
        IndexEntry::new(
            PathBuf::from(path),
            blob.object_id().unwrap(),
            EntryMetadata {
                size: content.len() as u64,
                ..Default::default()
            },
        )
    }

    #[test]
    fn empty_tree_has_the_well_known_id() {
        let tree = Tree::build(std::iter::empty()).unwrap();

        assert_eq!(
            tree.object_id().unwrap().as_ref(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[test]
    fn flat_tree_matches_git_mktree() {
        // `printf 'hello\n' > a.txt && git add a.txt && git write-tree`
        let tree = Tree::build(&[entry("a.txt", "hello\n")]).unwrap();

        assert_eq!(
            tree.object_id().unwrap().as_ref(),
            "2e81171448eb9f2ee3821e3d447aa6b2fe3ddba1"
        );
    }

    #[test]
    fn nested_entries_create_subtrees() {
        let entries = [
            entry("a/b/c.txt", "c"),
            entry("a/d.txt", "d"),
            entry("e.txt", "e"),
        ];
        let tree = Tree::build(&entries).unwrap();

        assert_eq!(tree.len(), 2);
        let Some(TreeNode::Directory(a)) = tree.entry("a") else {
            panic!("expected 'a' to be a directory");
        };
        assert_eq!(a.entries().map(|(name, _)| name.as_str()).collect::<Vec<_>>(), ["b", "d.txt"]);
        assert!(matches!(tree.entry("e.txt"), Some(TreeNode::Leaf(_))));
    }

    #[test]
    fn write_with_visits_children_before_parents() {
        let entries = [entry("a/b/c.txt", "c"), entry("top.txt", "top")];
        let tree = Tree::build(&entries).unwrap();

        let mut written = Vec::new();
        let root = tree
            .write_with(&mut |oid, _| {
                written.push(oid.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(written.last(), Some(&root));
        assert_eq!(root, tree.object_id().unwrap());
    }

    #[test]
    fn identical_content_is_referenced_twice() {
        let tree = Tree::build(&[entry("one.txt", "same"), entry("two.txt", "same")]).unwrap();

        let oids = tree
            .entries()
            .map(|(_, node)| match node {
                TreeNode::Leaf(entry) => entry.oid.clone(),
                TreeNode::Directory(_) => panic!("unexpected directory"),
            })
            .collect::<Vec<_>>();
        assert_eq!(oids[0], oids[1]);
    }

    #[rstest]
    #[case(&["a", "a/b.txt"])]
    #[case(&["a/b.txt", "a"])]
    fn file_and_directory_with_the_same_name_conflict(#[case] paths: &[&str]) {
        let entries = paths.iter().map(|path| entry(path, "x")).collect::<Vec<_>>();

        assert!(Tree::build(&entries).is_err());
    }

    #[test]
    fn executable_mode_is_recorded() {
        let mut script = entry("run.sh", "#!/bin/sh");
        script.metadata.mode = EntryMode::File(FileMode::Executable);
        let tree = Tree::build(&[script]).unwrap();

        assert_eq!(tree.entry("run.sh").unwrap().mode().as_str(), "100755");
    }

    #[test]
    fn serialized_tree_reads_back_as_leaves() {
        let entries = [entry("dir/inner.txt", "inner"), entry("outer.txt", "outer")];
        let tree = Tree::build(&entries).unwrap();
        let bytes = tree.serialize().unwrap();

        let mut reader = std::io::Cursor::new(bytes);
        assert_eq!(
            ObjectType::parse_object_type(&mut reader).unwrap(),
            ObjectType::Tree
        );
        let parsed = Tree::deserialize(reader).unwrap();

        assert_eq!(parsed.len(), 2);
        assert!(matches!(parsed.entry("dir"), Some(TreeNode::Leaf(e)) if e.is_tree()));
        assert_eq!(parsed.object_id().unwrap(), tree.object_id().unwrap());
    }

    proptest! {
        #[test]
        fn root_id_does_not_depend_on_insertion_order(
            files in prop::collection::btree_map("[a-c]{1,2}(/[d-f]{1,2}){0,2}\\.txt", "[a-z]{0,8}", 1..12),
            seed in any::<u64>(),
        ) {
            let entries = files
                .iter()
                .map(|(path, content)| entry(path, content))
                .collect::<Vec<_>>();
            let mut shuffled = entries.clone();
            let len = shuffled.len();
            for i in 0..len {
                let j = (seed.wrapping_mul(i as u64 + 1) % len as u64) as usize;
                shuffled.swap(i, j);
            }

            let first = Tree::build(&entries).unwrap().object_id().unwrap();
            let second = Tree::build(&shuffled).unwrap().object_id().unwrap();
            let again = Tree::build(&entries).unwrap().object_id().unwrap();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&first, &again);
        }
    }
}
