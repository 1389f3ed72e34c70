use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;

impl Repository {
    pub fn cat_file(&mut self, object_id: &str) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(object_id.to_string())?;

        match self.database().parse_object(&object_id)? {
            // blob content goes out untouched so binary files survive
            ObjectBox::Blob(blob) => self.writer().write_all(blob.content())?,
            object => writeln!(self.writer(), "{}", object.display())?,
        }

        Ok(())
    }
}
