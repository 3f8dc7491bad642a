use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::NibError;
use sha1::{Digest, Sha1};
use std::io::Write;

/// Writer that digests everything passing through it and can append the digest.
#[derive(Debug)]
pub struct Checksum<W> {
    writer: W,
    digest: Sha1,
}

impl<W: Write> Checksum<W> {
    pub(crate) fn new(writer: W) -> Self {
        Checksum {
            writer,
            digest: Sha1::new(),
        }
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    /// Append the SHA-1 of everything written so far and hand the writer back.
    pub(crate) fn write_checksum(mut self) -> anyhow::Result<W> {
        let checksum = self.digest.finalize();
        self.writer.write_all(checksum.as_slice())?;
        self.writer.flush()?;

        Ok(self.writer)
    }
}

/// Check the trailing SHA-1 of `data` and return the bytes it covers.
///
/// Runs before any structural parsing, so damage anywhere in the file
/// surfaces as a checksum failure.
pub(crate) fn verify(data: &[u8]) -> anyhow::Result<&[u8]> {
    if data.len() < CHECKSUM_SIZE {
        return Err(NibError::Format("index is too short to hold a checksum".to_string()).into());
    }

    let (content, expected) = data.split_at(data.len() - CHECKSUM_SIZE);
    let actual = Sha1::digest(content);

    if actual.as_slice() != expected {
        return Err(NibError::Format(
            "index checksum does not match value stored on disk".to_string(),
        )
        .into());
    }

    Ok(content)
}
