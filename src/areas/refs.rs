//! References (HEAD and the master branch)
//!
//! HEAD is always the symbolic reference `ref: refs/heads/master`; the only
//! branch is `master`, stored as a 40-character hash followed by a newline.
//! The ref is always written after the commit it names, so a crash in
//! between leaves an unreferenced object and an untouched ref.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::NibError;
use anyhow::Context;
use derive_new::new;
use std::path::Path;

/// Name of the only branch
pub const DEFAULT_BRANCH: &str = "master";

/// Full name of the only branch, as spoken on the wire
pub const MASTER_REF: &str = "refs/heads/master";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the git directory (typically `.git`)
    path: Box<Path>,
}

impl Refs {
    /// Point HEAD at the master branch
    pub fn set_head(&self) -> anyhow::Result<()> {
        let head_path = self.head_path();

        std::fs::write(&head_path, format!("ref: {MASTER_REF}"))
            .map_err(|e| NibError::io(head_path.display(), e).into())
    }

    /// Read the commit master points to; `None` for a repository with no commits
    pub fn read_master(&self) -> anyhow::Result<Option<ObjectId>> {
        let master_path = self.master_path();
        if !master_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&master_path)
            .map_err(|e| NibError::io(master_path.display(), e))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        ObjectId::try_parse(content.to_string())
            .map(Some)
            .with_context(|| format!("invalid hash in {}", master_path.display()))
    }

    /// Overwrite master with `<hash>\n`
    pub fn update_master(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let master_path = self.master_path();
        std::fs::create_dir_all(self.heads_path())
            .map_err(|e| NibError::io(self.heads_path().display(), e))?;

        std::fs::write(&master_path, format!("{oid}\n"))
            .map_err(|e| NibError::io(master_path.display(), e))?;
        tracing::info!(%oid, "updated {}", MASTER_REF);

        Ok(())
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join("HEAD").into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }

    fn master_path(&self) -> Box<Path> {
        self.heads_path().join(DEFAULT_BRANCH).into_boxed_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn git_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    #[rstest]
    fn absent_master_means_no_commits(git_dir: TempDir) {
        let refs = Refs::new(git_dir.path().into());

        assert_eq!(refs.read_master().unwrap(), None);
    }

    #[rstest]
    fn master_is_written_with_trailing_newline(git_dir: TempDir) {
        let refs = Refs::new(git_dir.path().into());
        let oid = ObjectId::try_parse("ce013625030ba8dba906f756967f9e9ca394464a".to_string())
            .unwrap();

        refs.update_master(&oid).unwrap();

        let content =
            std::fs::read_to_string(git_dir.path().join("refs/heads/master")).unwrap();
        assert_eq!(content, "ce013625030ba8dba906f756967f9e9ca394464a\n");
        assert_eq!(refs.read_master().unwrap(), Some(oid));
    }

    #[rstest]
    fn head_is_a_symbolic_ref_without_newline(git_dir: TempDir) {
        let refs = Refs::new(git_dir.path().into());

        refs.set_head().unwrap();

        let content = std::fs::read_to_string(git_dir.path().join("HEAD")).unwrap();
        assert_eq!(content, "ref: refs/heads/master");
    }
}
