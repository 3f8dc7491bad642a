use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::NibError;
use std::io::Write;

/// What `cat-file` prints about an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CatFileMode {
    /// Raw payload, which must be a commit
    Commit,
    /// Raw payload, which must be a tree
    Tree,
    /// Raw payload, which must be a blob
    Blob,
    /// Payload length in bytes
    Size,
    /// Object kind
    Type,
    /// Human-readable rendering
    Pretty,
}

impl CatFileMode {
    fn expected_kind(&self) -> Option<ObjectType> {
        match self {
            CatFileMode::Commit => Some(ObjectType::Commit),
            CatFileMode::Tree => Some(ObjectType::Tree),
            CatFileMode::Blob => Some(ObjectType::Blob),
            _ => None,
        }
    }
}

impl Repository {
    /// Print an object addressed by a unique hash prefix
    pub fn cat_file(&mut self, mode: CatFileMode, hash_prefix: &str) -> anyhow::Result<()> {
        let object_id = self.database().find_by_prefix(hash_prefix)?;
        let object = self.database().load(&object_id)?;

        if let Some(expected) = mode.expected_kind() {
            if object.kind() != expected {
                return Err(NibError::corrupt(
                    &object_id,
                    format!("expected {expected}, found {}", object.kind()),
                )
                .into());
            }
            self.writer().write_all(object.payload())?;
            return Ok(());
        }

        match mode {
            CatFileMode::Size => writeln!(self.writer(), "{}", object.payload().len())?,
            CatFileMode::Type => writeln!(self.writer(), "{}", object.kind())?,
            _ => match object.kind() {
                ObjectType::Tree => {
                    let tree = Tree::deserialize(object.into_payload())
                        .map_err(|e| NibError::corrupt(&object_id, e.to_string()))?;
                    writeln!(self.writer(), "{}", tree.display())?;
                }
                _ => self.writer().write_all(object.payload())?,
            },
        }

        Ok(())
    }
}
