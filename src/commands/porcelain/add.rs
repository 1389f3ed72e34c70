use crate::areas::repository::Repository;
use anyhow::Context;
use std::path::Path;

impl Repository {
    /// Stage files, expanding directories into the files below them
    ///
    /// Ignored paths are reported and skipped. Any other failure aborts the
    /// whole command before the index is written.
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        // Load the index file from the disk
        index.rehydrate()?;

        let mut files = Vec::new();
        for path in paths {
            let relative = self
                .relative_path(Path::new(path))
                .with_context(|| format!("Invalid path '{path}'"))?;
            let root = (!relative.as_os_str().is_empty()).then_some(relative.as_path());

            if root.is_some_and(|root| self.ignore().is_ignored(root)) {
                writeln!(self.writer(), "ignored: {}", relative.display())?;
                continue;
            }

            files.extend(self.workspace().list_files(root, self.ignore())?);
        }

        for file in files {
            match self.add_file(&mut index, &file) {
                Ok(_) => {}
                Err(e) if e.is_soft() => writeln!(self.writer(), "ignored: {}", file.display())?,
                Err(e) => return Err(e.into()),
            }
        }

        index.write_updates()?;

        Ok(())
    }
}
