use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, RawObject};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::NibError;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Hash a file as an object of `kind`, storing it only when `write` is set
    pub fn hash_object(
        &mut self,
        file_path: &Path,
        kind: ObjectType,
        write: bool,
    ) -> anyhow::Result<ObjectId> {
        let data =
            std::fs::read(file_path).map_err(|e| NibError::io(file_path.display(), e))?;
        let object = RawObject::new(kind, data);

        let object_id = match write {
            true => self.database().store(&object)?,
            false => object.object_id()?,
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(object_id)
    }
}
