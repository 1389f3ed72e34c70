use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;

impl Repository {
    /// Print `<code> <path>` for every path that differs from the committed tree
    pub async fn status(&mut self, committed_tree: Option<&str>) -> anyhow::Result<()> {
        let committed_tree = committed_tree
            .map(|oid| ObjectId::try_parse(oid.to_string()))
            .transpose()?;

        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        let statuses = self.file_statuses(&mut index, committed_tree.as_ref())?;
        // keep the stats refreshed while scanning
        index.write_updates()?;

        for (path, status) in statuses.iter().filter(|(_, status)| !status.is_clean()) {
            writeln!(self.writer(), "{} {}", status, path.display())?;
        }

        Ok(())
    }
}
