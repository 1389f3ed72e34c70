use crate::areas::repository::Repository;
use crate::artifacts::ignore::Ignore;
use anyhow::Context;
use std::fs;

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path()).with_context(|| {
            format!(
                "Failed to create {} directory",
                self.database().objects_path().display()
            )
        })?;

        let index = self.index();
        let mut index = index.lock().await;
        // write a valid empty index unless one is already there
        if !index.path().exists() {
            index
                .write_updates()
                .context("Failed to create the index file")?;
        }

        Ignore::create_default_ignore_file(self.path(), &self.config().ignore_file)
            .context("Failed to create the default ignore file")?;
        self.ignore_mut()
            .load()
            .context("Failed to load the ignore file")?;

        writeln!(
            self.writer(),
            "Initialized empty bitstage repository in {}",
            self.config().metadata_path(self.path()).display()
        )?;

        Ok(())
    }
}
