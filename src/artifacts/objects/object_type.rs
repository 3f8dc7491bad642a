use crate::errors::NibError;

/// The closed set of object kinds.
///
/// The numeric code is only meaningful inside pack object headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Commit,
    Tree,
    Blob,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Commit => "commit",
            ObjectType::Tree => "tree",
            ObjectType::Blob => "blob",
        }
    }

    pub fn pack_code(&self) -> u8 {
        match self {
            ObjectType::Commit => 1,
            ObjectType::Tree => 2,
            ObjectType::Blob => 3,
        }
    }

    /// Split a decompressed loose object into its kind, declared size and payload.
    ///
    /// Only the header shape is checked here; comparing the declared size against
    /// the payload is left to the caller, which knows the object id to report.
    pub fn parse_header(data: &[u8]) -> anyhow::Result<(ObjectType, usize, &[u8])> {
        let nul = data
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow::anyhow!("missing NUL after object header"))?;
        let header = std::str::from_utf8(&data[..nul])?;
        let (kind, size) = header
            .split_once(' ')
            .ok_or_else(|| anyhow::anyhow!("malformed object header {header:?}"))?;

        let kind = ObjectType::try_from(kind)?;
        if size.is_empty() || !size.bytes().all(|b| b.is_ascii_digit()) {
            return Err(anyhow::anyhow!("invalid object size {size:?}"));
        }
        let size = size
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("invalid object size {size:?}"))?;

        Ok((kind, size, &data[nul + 1..]))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "commit" => Ok(ObjectType::Commit),
            "tree" => Ok(ObjectType::Tree),
            "blob" => Ok(ObjectType::Blob),
            _ => Err(NibError::Format(format!("invalid object type {value:?}")).into()),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
