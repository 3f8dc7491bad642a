//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path, relative to the repository root, `/`-separated
//! - Content hash (object ID)
//! - File metadata (mode, size, timestamps)
//!
//! ## Entry Format
//!
//! ```text
//! ctime_s ctime_ns mtime_s mtime_ns dev ino mode uid gid size   (ten u32, big-endian)
//! sha1                                                         (20 bytes)
//! flags                                                        (u16: stage << 12 | path length)
//! path NUL [NUL padding up to a multiple of 8]
//! ```

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::NibError;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::cmp::min;
use std::fs::Metadata;
use std::io::Write;
use std::os::unix::prelude::MetadataExt;
use std::path::Path;

/// Largest path length the 12 length bits of the flags can express
const MAX_PATH_SIZE: usize = 0xFFF;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed metadata block preceding the path
pub const ENTRY_FIXED_SIZE: usize = 62;

/// Index entry representing a staged file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub name: String,
    /// SHA-1 hash of file content
    pub oid: ObjectId,
    /// File metadata (mode, size, timestamps)
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Length the entry occupies on disk: fixed block, path and at least one NUL,
    /// rounded up to the next multiple of 8
    pub fn disk_size(path_len: usize) -> usize {
        (ENTRY_FIXED_SIZE + path_len + ENTRY_BLOCK) / ENTRY_BLOCK * ENTRY_BLOCK
    }

    pub fn stage(&self) -> u16 {
        (self.metadata.flags >> 12) & 0b11
    }

    pub fn is_nested(&self) -> bool {
        self.name.contains('/')
    }
}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.as_bytes().cmp(other.name.as_bytes())
    }
}

/// File metadata stored in index entries
///
/// Every numeric field is 32 bits wide on disk; wider stat values are truncated
/// the same way git truncates them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: u32,
    pub ctime_nsec: u32,
    pub mtime: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
    /// Stage bits and path length
    pub flags: u16,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut entry_bytes = Vec::with_capacity(Self::disk_size(self.name.len()));
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mode.as_u32())?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size)?;
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(self.metadata.flags)?;
        entry_bytes.write_all(self.name.as_bytes())?;

        // There must be at least one null byte at the end
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    /// Parse one entry from the start of `bytes`; trailing bytes (padding or
    /// later entries) are ignored.
    fn deserialize(bytes: Bytes) -> anyhow::Result<Self> {
        if bytes.len() <= ENTRY_FIXED_SIZE {
            return Err(NibError::Format("truncated index entry".to_string()).into());
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]);
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]);
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]);
        let dev = byteorder::NetworkEndian::read_u32(&bytes[16..20]);
        let ino = byteorder::NetworkEndian::read_u32(&bytes[20..24]);
        let mode: EntryMode = byteorder::NetworkEndian::read_u32(&bytes[24..28]).into();
        let uid = byteorder::NetworkEndian::read_u32(&bytes[28..32]);
        let gid = byteorder::NetworkEndian::read_u32(&bytes[32..36]);
        let size = byteorder::NetworkEndian::read_u32(&bytes[36..40]);
        let oid = ObjectId::read_h40_from(&mut &bytes[40..60])?;
        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]);

        let name_end = bytes[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| NibError::Format("missing NUL terminator in index path".to_string()))?;
        let name = std::str::from_utf8(&bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + name_end])
            .map_err(|_| NibError::Format("index path is not valid UTF-8".to_string()))?
            .to_string();

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
                flags,
            },
        })
    }
}

impl TryFrom<(&Path, &str, Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    /// Build metadata from a file's stat, given its absolute path and its
    /// repository-relative name
    fn try_from((file_path, name, metadata): (&Path, &str, Metadata)) -> anyhow::Result<Self> {
        let mode = match file_path.is_executable() {
            true => EntryMode::File(FileMode::Executable),
            false => EntryMode::File(FileMode::Regular),
        };

        Ok(Self {
            ctime: metadata.ctime() as u32,
            ctime_nsec: metadata.ctime_nsec() as u32,
            mtime: metadata.mtime() as u32,
            mtime_nsec: metadata.mtime_nsec() as u32,
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
            flags: min(name.len(), MAX_PATH_SIZE) as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use sha1::Digest;

    #[fixture]
    fn oid() -> ObjectId {
        let mut hasher = sha1::Sha1::new();
        hasher.update("test data");
        ObjectId::from_digest(&hasher.finalize()).unwrap()
    }

    #[fixture]
    fn entry_metadata() -> EntryMetadata {
        EntryMetadata {
            ctime: 1_700_000_000,
            ctime_nsec: 12,
            mtime: 1_700_000_001,
            mtime_nsec: 34,
            dev: 2049,
            ino: 131,
            mode: EntryMode::File(FileMode::Executable),
            uid: 1000,
            gid: 100,
            size: 6,
            flags: 5,
        }
    }

    #[rstest]
    #[case(1, 64)]
    #[case(2, 72)]
    #[case(9, 72)]
    #[case(10, 80)]
    fn disk_size_rounds_up_to_eight_bytes(#[case] path_len: usize, #[case] expected: usize) {
        assert_eq!(IndexEntry::disk_size(path_len), expected);
    }

    #[rstest]
    fn serialized_entry_is_padded_and_parses_back(oid: ObjectId, entry_metadata: EntryMetadata) {
        let entry = IndexEntry::new("a.txt".to_string(), oid, entry_metadata);

        let bytes = entry.serialize().unwrap();
        assert_eq!(bytes.len(), IndexEntry::disk_size(5));
        assert_eq!(&bytes[62..67], b"a.txt");
        assert!(bytes[67..].iter().all(|&b| b == 0));

        assert_eq!(IndexEntry::deserialize(bytes).unwrap(), entry);
    }

    #[rstest]
    fn stage_is_read_from_flag_bits(oid: ObjectId, entry_metadata: EntryMetadata) {
        let entry = IndexEntry::new(
            "a.txt".to_string(),
            oid,
            EntryMetadata {
                flags: (2 << 12) | 5,
                ..entry_metadata
            },
        );

        assert_eq!(entry.stage(), 2);
    }

    #[rstest]
    fn nested_paths_are_detected(oid: ObjectId, entry_metadata: EntryMetadata) {
        let flat = IndexEntry::new("a.txt".to_string(), oid.clone(), entry_metadata.clone());
        let nested = IndexEntry::new("dir/a.txt".to_string(), oid, entry_metadata);

        assert!(!flat.is_nested());
        assert!(nested.is_nested());
    }
}
