use crate::artifacts::core::error::{BitError, BitResult, IoResultExt};
use crate::artifacts::ignore::Ignore;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Working tree rooted at the repository directory
///
/// Paths handed in and out are relative to the root. The metadata directory
/// is never listed, whatever the ignore rules say.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
    metadata_dir: String,
}

impl Workspace {
    pub fn new(path: Box<Path>, metadata_dir: &str) -> Self {
        Workspace {
            path,
            metadata_dir: metadata_dir.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse_blob(&self, file_path: &Path) -> BitResult<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Expand a path into the non-ignored files below it
    ///
    /// `None` lists the whole working tree. A file path yields itself when it
    /// is not ignored; an ignored directory is pruned with everything in it.
    pub fn list_files(&self, root_file_path: Option<&Path>, ignore: &Ignore) -> BitResult<Vec<PathBuf>> {
        let root_file_path = match root_file_path {
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };

        if !root_file_path.exists() {
            return Err(BitError::NotFound(self.relative(&root_file_path)));
        }

        if !root_file_path.is_dir() {
            let relative = self.relative(&root_file_path);
            return Ok(match ignore.is_ignored(&relative) {
                true => Vec::new(),
                false => vec![relative],
            });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root_file_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let relative = self.relative(entry.path());
                if relative.as_os_str().is_empty() {
                    return true;
                }
                if self.is_metadata_path(&relative) {
                    return false;
                }
                match entry.file_type().is_dir() {
                    true => !ignore.is_dir_ignored(&relative),
                    false => !ignore.is_ignored(&relative),
                }
            });

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                BitError::Io {
                    operation: "list directory",
                    source: e.into(),
                    path,
                }
            })?;

            if entry.file_type().is_file() {
                files.push(self.relative(entry.path()));
            }
        }

        Ok(files)
    }

    fn is_metadata_path(&self, relative: &Path) -> bool {
        relative
            .components()
            .next()
            .is_some_and(|first| first.as_os_str() == self.metadata_dir.as_str())
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.path)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    pub fn read_file(&self, file_path: &Path) -> BitResult<Bytes> {
        let absolute_path = self.path.join(file_path);

        match std::fs::read(&absolute_path) {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BitError::NotFound(file_path.to_path_buf()))
            }
            Err(e) => Err(e).with_path("read file", &absolute_path),
        }
    }

    pub fn stat_file(&self, file_path: &Path) -> BitResult<EntryMetadata> {
        let absolute_path = self.path.join(file_path);

        let metadata = match std::fs::metadata(&absolute_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BitError::NotFound(file_path.to_path_buf()));
            }
            Err(e) => return Err(e).with_path("stat file", &absolute_path),
        };

        (absolute_path.as_path(), metadata).try_into()
    }
}
