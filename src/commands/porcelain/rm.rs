use crate::areas::repository::Repository;
use std::path::Path;

impl Repository {
    /// Drop paths from the index; stored blobs and working files are kept
    pub async fn rm(&mut self, paths: &[String]) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        for path in paths {
            let relative = self.relative_path(Path::new(path))?;
            if index.remove_file(&relative) {
                writeln!(self.writer(), "rm '{}'", relative.display())?;
            }
        }

        index.write_updates()?;

        Ok(())
    }

    /// Keep paths tracked but leave them out of the next tree
    pub async fn unstage(&mut self, paths: &[String]) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        for path in paths {
            let relative = self.relative_path(Path::new(path))?;
            if !index.unstage_file(&relative) {
                anyhow::bail!("pathspec '{}' is not staged", relative.display());
            }
        }

        index.write_updates()?;

        Ok(())
    }
}
