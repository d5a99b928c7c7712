use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Hash a workspace file as a blob, optionally storing it
    pub fn hash_object(&self, file: &Path, write: bool) -> anyhow::Result<()> {
        let content = self.workspace().read_file(file)?;
        let blob = Blob::new(content);

        let object_id = blob.object_id()?;
        writeln!(self.writer().borrow_mut(), "{}", object_id)?;

        if write {
            self.database().store(blob)?;
        }

        Ok(())
    }
}
