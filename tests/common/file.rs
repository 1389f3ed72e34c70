use derive_new::new;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

/// Write `files_count` files with fake names and content into `dir`
///
/// Fake names may repeat, so the result is keyed by file name.
pub fn write_generated_files(dir: &Path, files_count: usize) -> BTreeMap<String, FileSpec> {
    use fake::{
        Fake,
        faker::lorem::en::{Word, Words},
    };

    let mut files = BTreeMap::new();
    for _ in 0..files_count {
        let file_name = format!("{}.txt", Word().fake::<String>());
        let file_content = Words(5..10).fake::<Vec<String>>().join(" ");

        let file_spec = FileSpec::new(dir.join(&file_name), file_content);
        write_file(file_spec.clone());
        files.insert(file_name, file_spec);
    }

    files
}

pub fn write_file(file_spec: FileSpec) {
    // make sure the parent directory exists
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    std::fs::write(&file_spec.path, &file_spec.content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", file_spec.path, e));
}

/// Move a file's modification time so the next status cannot trust the index stat
pub fn touch_in_future(path: &Path) {
    let later = filetime::FileTime::from_unix_time(
        filetime::FileTime::now().unix_seconds() + 3600,
        0,
    );
    filetime::set_file_mtime(path, later)
        .unwrap_or_else(|e| panic!("Failed to touch file {:?}: {}", path, e));
}
