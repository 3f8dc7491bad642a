//! Pack file encoder
//!
//! ## Format
//!
//! ```text
//! "PACK" | version (u32 BE, always 2) | object count (u32 BE)
//! object entries, in ascending hash order
//! SHA-1 of everything above (20 bytes)
//! ```
//!
//! Each entry is a variable-length header followed by the zlib-compressed
//! payload (no loose-object header). The first header byte holds the
//! continuation bit, the 3-bit type code and the low 4 bits of the size; each
//! following byte holds the continuation bit and the next 7 bits of the size.
//! Objects are always stored whole; deltas are never produced.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use byteorder::WriteBytesExt;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::collections::BTreeSet;
use std::io::Write;

pub const PACK_SIGNATURE: &[u8; 4] = b"PACK";
pub const PACK_VERSION: u32 = 2;

const CONTINUATION_BIT: u8 = 0x80;

#[derive(Debug)]
pub struct PackEncoder<'d> {
    database: &'d Database,
}

impl<'d> PackEncoder<'d> {
    pub fn new(database: &'d Database) -> Self {
        PackEncoder { database }
    }

    /// Encode one stored object as a pack entry
    pub fn encode_object(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        let object = self.database.load(oid)?;
        let payload = object.payload();

        let mut entry = encode_entry_header(object.kind(), payload.len());
        entry.extend_from_slice(&Database::compress(payload.clone())?);

        Ok(Bytes::from(entry))
    }

    /// Bundle `oids` into a complete pack
    ///
    /// The output only depends on the set of objects, so packing the same set
    /// twice gives identical bytes.
    pub fn create_pack(&self, oids: &BTreeSet<ObjectId>) -> anyhow::Result<Bytes> {
        let mut pack = Vec::new();
        pack.write_all(PACK_SIGNATURE)?;
        pack.write_u32::<byteorder::NetworkEndian>(PACK_VERSION)?;
        pack.write_u32::<byteorder::NetworkEndian>(oids.len() as u32)?;

        // BTreeSet iterates in ascending hash order
        for oid in oids {
            pack.extend_from_slice(&self.encode_object(oid)?);
        }

        let checksum = Sha1::digest(&pack);
        pack.extend_from_slice(checksum.as_slice());
        tracing::debug!(objects = oids.len(), bytes = pack.len(), "created pack");

        Ok(Bytes::from(pack))
    }
}

fn encode_entry_header(kind: ObjectType, size: usize) -> Vec<u8> {
    let mut header = Vec::with_capacity(4);

    let mut byte = (kind.pack_code() << 4) | (size & 0x0F) as u8;
    let mut remaining = size >> 4;

    while remaining != 0 {
        header.push(byte | CONTINUATION_BIT);
        byte = (remaining & 0x7F) as u8;
        remaining >>= 7;
    }
    header.push(byte);

    header
}
