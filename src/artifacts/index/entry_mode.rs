//! File modes as stored in the index and in tree entries.

/// Mask selecting the object-type bits of a mode.
const TYPE_MASK: u32 = 0o170000;
const TREE_TYPE: u32 = 0o040000;

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum EntryMode {
    File(FileMode),
    Directory,
    /// Any other mode (symlinks, gitlinks), carried through untouched.
    Other(u32),
}

impl Default for EntryMode {
    fn default() -> Self {
        EntryMode::File(FileMode::Regular)
    }
}

impl EntryMode {
    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Directory => 0o40000,
            EntryMode::Other(mode) => *mode,
        }
    }

    /// Octal rendering used inside tree objects (no leading zero)
    pub fn as_octal(&self) -> String {
        format!("{:o}", self.as_u32())
    }

    pub fn is_tree(&self) -> bool {
        self.as_u32() & TYPE_MASK == TREE_TYPE
    }

    pub fn from_octal_str(value: &str) -> anyhow::Result<Self> {
        let mode = u32::from_str_radix(value, 8)
            .map_err(|_| anyhow::anyhow!("Invalid entry mode {value:?}"))?;

        Ok(mode.into())
    }
}

impl From<u32> for EntryMode {
    fn from(mode: u32) -> Self {
        match mode {
            0o100644 => EntryMode::File(FileMode::Regular),
            0o100755 => EntryMode::File(FileMode::Executable),
            0o40000 => EntryMode::Directory,
            other => EntryMode::Other(other),
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("100644", EntryMode::File(FileMode::Regular), false)]
    #[case("100755", EntryMode::File(FileMode::Executable), false)]
    #[case("40000", EntryMode::Directory, true)]
    #[case("120000", EntryMode::Other(0o120000), false)]
    fn octal_modes_parse_and_render(
        #[case] octal: &str,
        #[case] mode: EntryMode,
        #[case] is_tree: bool,
    ) {
        let parsed = EntryMode::from_octal_str(octal).unwrap();

        assert_eq!(parsed, mode);
        assert_eq!(parsed.as_octal(), octal);
        assert_eq!(parsed.is_tree(), is_tree);
    }

    #[test]
    fn non_octal_mode_is_rejected() {
        assert!(EntryMode::from_octal_str("100648").is_err());
    }
}
