//! Loose object database
//!
//! Every object lives in its own zlib-compressed file at
//! `objects/<first 2 hex chars>/<remaining 38 hex chars>`. Files are written
//! once and never rewritten: storing an object that already exists is a no-op.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::{Object, RawObject, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::NibError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Hash an object and persist it unless an object with that hash already exists.
    ///
    /// Returns the hash whether or not anything was written.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            tracing::debug!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir)
            .map_err(|e| NibError::io(object_dir.display(), e))?;

        self.write_object(object_path, object.framed()?)?;
        tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");

        Ok(object_id)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    /// Read an object back as its kind and payload
    ///
    /// Fails with `NotFound` if there is no such object and with `CorruptObject`
    /// if the declared size disagrees with the stored payload.
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<RawObject> {
        let object_path = self.path.join(object_id.to_path());
        if !object_path.exists() {
            return Err(NibError::NotFound(object_id.to_string()).into());
        }

        let data = self.read_object(object_path)?;
        let (kind, size, payload) = ObjectType::parse_header(&data)
            .map_err(|e| NibError::corrupt(object_id, e.to_string()))?;

        if size != payload.len() {
            return Err(NibError::corrupt(
                object_id,
                format!(
                    "header declares {size} bytes but {} were stored",
                    payload.len()
                ),
            )
            .into());
        }

        tracing::debug!(oid = %object_id, %kind, size, "loaded object");
        Ok(RawObject::new(kind, data.slice(data.len() - size..)))
    }

    /// Load an object and require it to be of the given kind
    pub fn load_as(&self, object_id: &ObjectId, expected: ObjectType) -> anyhow::Result<Bytes> {
        let object = self.load(object_id)?;

        if object.kind() != expected {
            return Err(NibError::corrupt(
                object_id,
                format!("expected {expected}, found {}", object.kind()),
            )
            .into());
        }

        Ok(object.into_payload())
    }

    pub fn load_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        Tree::deserialize(self.load_as(object_id, ObjectType::Tree)?)
            .map_err(|e| NibError::corrupt(object_id, e.to_string()).into())
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        Blob::deserialize(self.load_as(object_id, ObjectType::Blob)?)
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path)
            .map_err(|e| NibError::io(object_path.display(), e))?;

        Self::decompress(object_content.into())
            .context(format!("Unable to decompress {}", object_path.display()))
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .map_err(|e| NibError::io(temp_object_path.display(), e))?;

        file.write_all(&object_content)
            .map_err(|e| NibError::io(temp_object_path.display(), e))?;

        // rename the temp file to the object file so readers never see a partial object
        std::fs::rename(&temp_object_path, &object_path)
            .map_err(|e| NibError::io(object_path.display(), e))?;

        Ok(())
    }

    pub(crate) fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Resolve an abbreviated hash to the single object it names.
    ///
    /// Prefixes shorter than 2 characters are rejected, since they would not
    /// even select a fan-out directory.
    pub fn find_by_prefix(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        if prefix.len() < 2 {
            return Err(anyhow::anyhow!(
                "hash prefix must be 2 or more characters, got {prefix:?}"
            ));
        }

        if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("hash prefix {prefix:?} is not hexadecimal"));
        }

        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() == crate::artifacts::objects::OBJECT_ID_LENGTH {
            let object_id = ObjectId::try_parse(prefix)?;
            return match self.contains(&object_id) {
                true => Ok(object_id),
                false => Err(NibError::NotFound(object_id.to_string()).into()),
            };
        }

        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);

        let mut matches = Vec::new();
        if dir_path.is_dir() {
            for entry in std::fs::read_dir(&dir_path)? {
                let file_name = entry?.file_name();
                let file_name = file_name.to_string_lossy();

                if file_name.starts_with(file_prefix) {
                    if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                        matches.push(oid);
                    }
                }
            }
        }

        match matches.len() {
            0 => Err(NibError::NotFound(prefix).into()),
            1 => Ok(matches.remove(0)),
            count => Err(NibError::AmbiguousPrefix { prefix, count }.into()),
        }
    }
}
