//! Git index (staging area)
//!
//! The index tracks which files should be included in the next commit.
//! It is read as an ordered list of entries (file order is preserved, since
//! trees are built in index order) and written back sorted by path.
//!
//! ## Validation
//!
//! The trailing SHA-1 is verified before anything else is parsed. After that
//! the header must carry the `DIRC` signature and version 2, and the number of
//! entries found must equal the declared count. A missing index file is simply
//! an empty index.

use crate::artifacts::index::checksum::{self, Checksum};
use crate::artifacts::index::index_entry::{ENTRY_FIXED_SIZE, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::HEADER_SIZE;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::NibError;
use bytes::Bytes;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    entries: Vec<IndexEntry>,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: Vec::new(),
            changed: false,
        }
    }

    /// Load the index from disk, replacing any in-memory entries
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.changed = false;

        if !self.path.exists() {
            self.entries.clear();
            return Ok(());
        }

        let data = std::fs::read(&self.path).map_err(|e| NibError::io(self.path.display(), e))?;
        self.entries = Self::parse(&data)?;
        tracing::debug!(entries = self.entries.len(), "loaded index");

        Ok(())
    }

    /// Parse a complete index file image
    pub fn parse(data: &[u8]) -> anyhow::Result<Vec<IndexEntry>> {
        let content = checksum::verify(data)?;

        if content.len() < HEADER_SIZE {
            return Err(NibError::Format("index header is truncated".to_string()).into());
        }
        let header = IndexHeader::deserialize(Bytes::copy_from_slice(&content[..HEADER_SIZE]))?;
        header.validate()?;

        let body = Bytes::copy_from_slice(&content[HEADER_SIZE..]);
        let mut entries = Vec::new();
        let mut offset = 0;

        while offset + ENTRY_FIXED_SIZE < body.len() {
            let entry = IndexEntry::deserialize(body.slice(offset..))?;
            offset += IndexEntry::disk_size(entry.name.len());
            entries.push(entry);
        }

        if entries.len() != header.entries_count as usize {
            return Err(NibError::Format(format!(
                "index declares {} entries but contains {}",
                header.entries_count,
                entries.len()
            ))
            .into());
        }

        Ok(entries)
    }

    /// Stage an entry, replacing any entry with the same path
    pub fn add(&mut self, entry: IndexEntry) {
        self.entries.retain(|existing| existing.name != entry.name);
        self.entries.push(entry);
        self.entries.sort();
        self.changed = true;
    }

    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return Ok(());
        }

        let data = self.serialize()?;
        std::fs::write(&self.path, &data).map_err(|e| NibError::io(self.path.display(), e))?;
        tracing::debug!(entries = self.entries.len(), "wrote index");
        self.changed = false;

        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }
}

impl Packable for Index {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut writer = Checksum::new(Vec::new());

        let header = IndexHeader::with_count(self.entries.len() as u32);
        writer.write(&header.serialize()?)?;

        for entry in &self.entries {
            writer.write(&entry.serialize()?)?;
        }

        Ok(Bytes::from(writer.write_checksum()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
    use crate::artifacts::index::index_entry::EntryMetadata;
    use crate::artifacts::objects::object_id::ObjectId;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use sha1::{Digest, Sha1};

    fn entry(name: &str, content: &str) -> IndexEntry {
        let oid = ObjectId::from_digest(&Sha1::digest(content.as_bytes())).unwrap();

        IndexEntry::new(
            name.to_string(),
            oid,
            EntryMetadata {
                mtime: 1_700_000_000,
                mode: EntryMode::File(FileMode::Regular),
                size: content.len() as u32,
                flags: name.len() as u16,
                ..Default::default()
            },
        )
    }

    #[fixture]
    fn index_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    #[fixture]
    fn index_image(index_dir: TempDir) -> Vec<u8> {
        let mut index = Index::new(index_dir.path().join("index").into_boxed_path());
        index.add(entry("b.txt", "bee"));
        index.add(entry("a.txt", "ay"));
        index.add(entry("a-much-longer-file-name.md", "long"));

        index.serialize().unwrap().to_vec()
    }

    fn assert_format_error(result: anyhow::Result<Vec<IndexEntry>>) {
        let error = result.unwrap_err();
        assert!(
            matches!(error.downcast_ref::<NibError>(), Some(NibError::Format(_))),
            "unexpected error: {error:#}"
        );
    }

    #[rstest]
    fn missing_index_is_empty(index_dir: TempDir) {
        let mut index = Index::new(index_dir.path().join("index").into_boxed_path());

        index.rehydrate().unwrap();

        assert_eq!(index.entries().count(), 0);
    }

    #[rstest]
    fn written_index_reads_back_sorted(index_dir: TempDir) {
        let path = index_dir.path().join("index").into_boxed_path();
        let mut index = Index::new(path.clone());
        index.add(entry("b.txt", "bee"));
        index.add(entry("a.txt", "ay"));
        index.write_updates().unwrap();

        let mut reloaded = Index::new(path);
        reloaded.rehydrate().unwrap();

        let names = reloaded.entries().map(|e| e.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(reloaded.entries().next(), index.entries().next());
    }

    #[rstest]
    fn adding_an_existing_path_replaces_it(index_dir: TempDir) {
        let mut index = Index::new(index_dir.path().join("index").into_boxed_path());
        index.add(entry("a.txt", "one"));
        index.add(entry("a.txt", "two"));

        let entries = index.entries().collect::<Vec<_>>();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], &entry("a.txt", "two"));
    }

    #[rstest]
    fn file_order_is_preserved_when_parsing() {
        let mut writer = Checksum::new(Vec::new());
        writer
            .write(&IndexHeader::with_count(2).serialize().unwrap())
            .unwrap();
        writer.write(&entry("z.txt", "z").serialize().unwrap()).unwrap();
        writer.write(&entry("a.txt", "a").serialize().unwrap()).unwrap();
        let data = writer.write_checksum().unwrap();

        let names = Index::parse(&data)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["z.txt", "a.txt"]);
    }

    #[rstest]
    fn every_single_byte_flip_is_a_checksum_failure(index_image: Vec<u8>) {
        assert_eq!(Index::parse(&index_image).unwrap().len(), 3);

        for position in 0..index_image.len() {
            let mut damaged = index_image.clone();
            damaged[position] ^= 0x20;

            let error = Index::parse(&damaged).unwrap_err();
            assert!(
                error.to_string().contains("checksum"),
                "byte {position}: {error:#}"
            );
        }
    }

    #[rstest]
    #[case(b"DIRX".as_slice(), 2)]
    #[case(b"DIRC".as_slice(), 3)]
    fn bad_signature_or_version_is_a_format_error(#[case] signature: &[u8], #[case] version: u32) {
        let mut writer = Checksum::new(Vec::new());
        writer.write(signature).unwrap();
        writer.write(&version.to_be_bytes()).unwrap();
        writer.write(&0u32.to_be_bytes()).unwrap();
        let data = writer.write_checksum().unwrap();

        assert_format_error(Index::parse(&data));
    }

    #[rstest]
    fn huge_declared_count_is_a_format_error() {
        let mut writer = Checksum::new(Vec::new());
        writer
            .write(&IndexHeader::with_count(u32::MAX).serialize().unwrap())
            .unwrap();
        let data = writer.write_checksum().unwrap();

        assert_format_error(Index::parse(&data));
    }

    #[rstest]
    fn entry_count_mismatch_is_a_format_error() {
        let mut writer = Checksum::new(Vec::new());
        writer
            .write(&IndexHeader::with_count(2).serialize().unwrap())
            .unwrap();
        writer.write(&entry("a.txt", "a").serialize().unwrap()).unwrap();
        let data = writer.write_checksum().unwrap();

        assert_format_error(Index::parse(&data));
    }
}
