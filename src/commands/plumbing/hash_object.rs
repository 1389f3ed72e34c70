use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use std::path::Path;

impl Repository {
    pub fn hash_object(&mut self, object_path: &str, write: bool) -> anyhow::Result<()> {
        let object_path = self.relative_path(Path::new(object_path))?;
        let object = self.workspace().parse_blob(&object_path)?;

        let object_id = match write {
            true => self.database().store(&object)?,
            false => object.object_id()?,
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}
