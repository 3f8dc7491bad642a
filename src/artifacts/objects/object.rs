use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};

/// Produces the object's content, without the loose-object header.
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(payload: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// `<type> <size>\0<content>`, the form that is hashed and stored on disk
    fn framed(&self) -> Result<Bytes> {
        let content = self.serialize()?;
        let header = format!("{} {}\0", self.object_type().as_str(), content.len());

        let mut framed = Vec::with_capacity(header.len() + content.len());
        framed.extend_from_slice(header.as_bytes());
        framed.extend_from_slice(&content);

        Ok(Bytes::from(framed))
    }

    fn object_id(&self) -> Result<ObjectId> {
        let mut hasher = Sha1::new();
        hasher.update(self.framed()?);

        ObjectId::from_digest(&hasher.finalize())
    }
}

/// An object whose kind is only known at runtime, as read back from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    kind: ObjectType,
    payload: Bytes,
}

impl RawObject {
    pub fn new(kind: ObjectType, payload: impl Into<Bytes>) -> Self {
        RawObject {
            kind,
            payload: payload.into(),
        }
    }

    pub fn kind(&self) -> ObjectType {
        self.kind
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

impl Packable for RawObject {
    fn serialize(&self) -> Result<Bytes> {
        Ok(self.payload.clone())
    }
}

impl Object for RawObject {
    fn object_type(&self) -> ObjectType {
        self.kind
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
