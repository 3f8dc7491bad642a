//! Git object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character lowercase hexadecimal strings representing SHA-1 hashes.
//! They uniquely identify all objects (blobs, trees, commits).
//!
//! ## Format
//!
//! - Full: 40 hex characters (e.g., "abc123...def")
//! - Short: First 7 characters (e.g., "abc123d")
//! - Binary: 20 raw bytes, as embedded in tree entries and index entries
//!
//! ## Storage
//!
//! Objects are stored in `.git/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::{OBJECT_ID_BYTES, OBJECT_ID_LENGTH};
use std::io;
use std::path::PathBuf;

/// The all-zero id a remote reports (and expects) for a branch that does not exist yet.
pub const NULL_OID: &str = "0000000000000000000000000000000000000000";

/// Git object identifier (SHA-1 hash)
///
/// Ordering is plain lexicographic order of the hex string, which is also
/// the order objects are laid out in a pack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Uppercase input is normalized to lowercase, matching the on-disk form.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object ID length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object ID characters: {}", id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Build an object ID from a finished SHA-1 digest
    pub fn from_digest(digest: &[u8]) -> anyhow::Result<Self> {
        Self::try_parse(hex::encode(digest))
    }

    /// Write the object ID in binary format (20 bytes)
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        let bytes = hex::decode(&self.0)?;
        writer.write_all(&bytes)?;

        Ok(())
    }

    /// Read an object ID from binary format (20 bytes)
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut buffer = [0u8; OBJECT_ID_BYTES];
        reader.read_exact(&mut buffer)?;

        Self::from_digest(&buffer)
    }

    /// Convert to file system path for object storage
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const HELLO_OID: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

    #[test]
    fn binary_form_round_trips_through_twenty_bytes() {
        let oid = ObjectId::try_parse(HELLO_OID.to_string()).unwrap();

        let mut bytes = Vec::new();
        oid.write_h40_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), OBJECT_ID_BYTES);

        let parsed = ObjectId::read_h40_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(parsed, oid);
    }

    #[test]
    fn path_splits_two_character_fan_out() {
        let oid = ObjectId::try_parse(HELLO_OID.to_string()).unwrap();

        assert_eq!(
            oid.to_path(),
            PathBuf::from("ce").join("013625030ba8dba906f756967f9e9ca394464a")
        );
        assert_eq!(oid.to_short_oid(), "ce01362");
    }

    #[rstest]
    #[case("ce01362")]
    #[case("zz013625030ba8dba906f756967f9e9ca394464a")]
    #[case("ce013625030ba8dba906f756967f9e9ca394464a0")]
    fn invalid_ids_are_rejected(#[case] id: &str) {
        assert!(ObjectId::try_parse(id.to_string()).is_err());
    }

    #[test]
    fn uppercase_ids_are_normalized() {
        let oid = ObjectId::try_parse(HELLO_OID.to_uppercase()).unwrap();
        assert_eq!(oid.as_ref(), HELLO_OID);
    }
}
