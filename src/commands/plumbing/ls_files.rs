use crate::areas::repository::Repository;

impl Repository {
    /// List index entries; unstaged entries are marked with `-` in stage mode
    pub async fn ls_files(&mut self, stage: bool) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        for entry in index.entries() {
            if stage {
                writeln!(
                    self.writer(),
                    "{} {} {}\t{}",
                    entry.metadata.mode.as_str(),
                    entry.oid,
                    if entry.staged { "+" } else { "-" },
                    entry.name.display()
                )?;
            } else {
                writeln!(self.writer(), "{}", entry.name.display())?;
            }
        }

        Ok(())
    }
}
