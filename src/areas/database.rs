//! Content-addressed object store
//!
//! Objects live at `<objects>/<xx>/<38 hex>` as zlib-compressed envelopes.
//! Storage is write-once: an object that already exists is never rewritten,
//! and new objects are written to a temporary file and renamed into place, so
//! concurrent writers of the same content are harmless.

use crate::artifacts::core::error::{BitError, BitResult, IoResultExt};
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeNode};
use bytes::Bytes;
use fake::rand;
use std::collections::BTreeMap;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
    compression: u32,
}

impl Database {
    pub fn new(path: Box<Path>, compression: u32) -> Self {
        Database { path, compression }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Read the raw envelope (`<type> <size>\0<content>`) of a stored object
    ///
    /// This is the hand-off used by anything that republishes objects by ID.
    pub fn load(&self, object_id: &ObjectId) -> BitResult<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        self.read_object(&object_path)
    }

    /// Store an object unless it already exists and return its ID
    pub fn store(&self, object: &impl Object) -> BitResult<ObjectId> {
        let object_id = object.object_id()?;
        self.store_bytes(&object_id, object.serialize()?)?;

        Ok(object_id)
    }

    /// Store an already serialized envelope under a known ID
    ///
    /// Returns whether anything was written.
    pub fn store_bytes(&self, object_id: &ObjectId, content: Bytes) -> BitResult<bool> {
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            tracing::trace!(oid = %object_id, "object already stored");
            return Ok(false);
        }

        let object_dir = object_path.parent().ok_or_else(|| {
            BitError::InvalidObject(format!("invalid object path {}", object_path.display()))
        })?;
        std::fs::create_dir_all(object_dir).with_path("create object directory", object_dir)?;

        self.write_object(&object_path, content)?;
        tracing::debug!(oid = %object_id, "stored object");

        Ok(true)
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> BitResult<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(object_reader)?))),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> BitResult<Option<Tree>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Tree => Ok(Some(Tree::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    /// Flatten a stored tree into `path -> blob entry`
    pub fn read_tree_recursive(
        &self,
        tree_oid: &ObjectId,
    ) -> BitResult<BTreeMap<PathBuf, DatabaseEntry>> {
        let mut files = BTreeMap::new();
        self.collect_tree(tree_oid, Path::new(""), &mut files)?;

        Ok(files)
    }

    fn collect_tree(
        &self,
        tree_oid: &ObjectId,
        prefix: &Path,
        files: &mut BTreeMap<PathBuf, DatabaseEntry>,
    ) -> BitResult<()> {
        let tree = self
            .parse_object_as_tree(tree_oid)?
            .ok_or_else(|| BitError::InvalidObject(format!("{tree_oid} is not a tree")))?;

        for (name, node) in tree.entries() {
            let path = prefix.join(name);
            match node {
                TreeNode::Leaf(entry) if entry.is_tree() => {
                    self.collect_tree(&entry.oid, &path, files)?
                }
                TreeNode::Leaf(entry) => {
                    files.insert(path, entry.clone());
                }
                TreeNode::Directory(_) => {
                    return Err(BitError::InvalidObject(format!(
                        "unexpected unwritten subtree in {tree_oid}"
                    )));
                }
            }
        }

        Ok(())
    }

    fn parse_object_as_bytes(&self, object_id: &ObjectId) -> BitResult<(ObjectType, impl BufRead)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: &Path) -> BitResult<Bytes> {
        let object_content = std::fs::read(object_path).with_path("read object", object_path)?;

        Self::decompress(&object_content)
            .map_err(|e| BitError::InvalidObject(format!("{}: {e}", object_path.display())))
    }

    fn write_object(&self, object_path: &Path, object_content: Bytes) -> BitResult<()> {
        let object_dir = object_path.parent().ok_or_else(|| {
            BitError::InvalidObject(format!("invalid object path {}", object_path.display()))
        })?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = self
            .compress(&object_content)
            .with_path("compress object", object_path)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .with_path("open object file", &temp_object_path)?;

        let written = file
            .write_all(&object_content)
            .and_then(|_| file.sync_all())
            .with_path("write object file", &temp_object_path)
            .and_then(|_| {
                // rename the temp file to the object file to make it atomic
                std::fs::rename(&temp_object_path, object_path)
                    .with_path("rename object file", object_path)
            });

        if written.is_err() {
            let _ = std::fs::remove_file(&temp_object_path);
        }

        written
    }

    fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::new(self.compression));
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
