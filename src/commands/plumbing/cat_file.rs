use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Pretty-print any object from the store
    pub fn cat_file(&self, sha: &str) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(sha.to_owned())?;
        let object = self.database().parse_object(&object_id)?;

        write!(self.writer().borrow_mut(), "{}", object.display())?;

        Ok(())
    }
}
