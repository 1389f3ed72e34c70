use crate::areas::repository::Repository;

impl Repository {
    pub async fn write_tree(&mut self) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        let root = self.create_tree(&index)?;

        writeln!(self.writer(), "{root}")?;

        Ok(())
    }
}
