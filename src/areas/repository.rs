use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::core::config::Config;
use crate::artifacts::core::error::{BitError, BitResult, IoResultExt};
use crate::artifacts::ignore::Ignore;
use crate::artifacts::index::index_entry::{IndexEntry, path_to_slash};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::status::file_status::FileStatus;
use crate::artifacts::status::inspector::Inspector;
use std::cell::{RefCell, RefMut};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    config: Config,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    ignore: Ignore,
}

impl Repository {
    /// Open the repository rooted at `path`, creating the directory if needed
    ///
    /// Layout and tunables come from the environment (see [`Config`]); the
    /// ignore file is loaded eagerly, the index is not.
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> BitResult<Self> {
        Self::with_config(path, writer, Config::load_from_env()?)
    }

    pub fn with_config(
        path: &Path,
        writer: Box<dyn std::io::Write>,
        config: Config,
    ) -> BitResult<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path).with_path("create repository directory", path)?;
        }
        let path = path.canonicalize().with_path("resolve repository path", path)?;

        let index = Index::new(config.index_path(&path).into_boxed_path());
        let database = Database::new(
            config.objects_path(&path).into_boxed_path(),
            config.compression,
        );
        let workspace = Workspace::new(path.clone().into_boxed_path(), &config.metadata_dir);
        let mut ignore = Ignore::new(config.ignore_path(&path).into_boxed_path());
        ignore.load()?;

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            config,
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            ignore,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn ignore(&self) -> &Ignore {
        &self.ignore
    }

    pub fn ignore_mut(&mut self) -> &mut Ignore {
        &mut self.ignore
    }

    /// Turn a user supplied path into one relative to the repository root
    ///
    /// Relative inputs are taken as relative to the repository root.
    pub fn relative_path(&self, path: &Path) -> BitResult<PathBuf> {
        let relative = match path.is_absolute() {
            true => {
                let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
                absolute
                    .strip_prefix(&self.path)
                    .map(Path::to_path_buf)
                    .map_err(|_| BitError::NotFound(path.to_path_buf()))?
            }
            false => path.to_path_buf(),
        };

        Ok(PathBuf::from(path_to_slash(&relative)?))
    }

    /// Stage one file: store its blob and upsert its index entry
    ///
    /// Ignored paths are refused with [`BitError::Ignored`] before anything
    /// is read or written.
    pub fn add_file(&self, index: &mut Index, path: &Path) -> BitResult<IndexEntry> {
        let path = self.relative_path(path)?;

        if self.ignore.is_ignored(&path) {
            tracing::info!(path = %path.display(), "skipping ignored path");
            return Err(BitError::Ignored(path));
        }

        let stat = self.workspace.stat_file(&path)?;
        let blob = self.workspace.parse_blob(&path)?;
        let blob_id = self.database.store(&blob)?;

        let entry = IndexEntry::new(path, blob_id, stat);
        index.add(entry.clone());
        tracing::debug!(path = %entry.name.display(), oid = %entry.oid, "staged file");

        Ok(entry)
    }

    /// Build and store the tree of the staged entries and return its root ID
    ///
    /// Subtrees are stored before the trees that reference them. The index
    /// is only read.
    pub fn create_tree(&self, index: &Index) -> BitResult<ObjectId> {
        let tree = Tree::build(index.staged_entries())?;
        let root = tree.write_with(&mut |oid, content| {
            self.database.store_bytes(oid, content).map(|_| ())
        })?;

        tracing::debug!(oid = %root, entries = index.staged_entries().count(), "created tree");

        Ok(root)
    }

    pub fn file_statuses(
        &self,
        index: &mut Index,
        committed_tree: Option<&ObjectId>,
    ) -> BitResult<BTreeMap<PathBuf, FileStatus>> {
        Inspector::new(self).file_statuses(index, committed_tree)
    }
}
