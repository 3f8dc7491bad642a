use crate::areas::repository::Repository;
use crate::errors::NibError;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    /// Create `.git` with an empty object store and HEAD pointing at master
    pub fn init(&mut self) -> anyhow::Result<()> {
        let git_path = self.git_path();
        if git_path.exists() {
            anyhow::bail!("repository already exists at {}", git_path.display());
        }

        fs::create_dir_all(self.database().objects_path())
            .map_err(|e| NibError::io(self.database().objects_path().display(), e))
            .context("Failed to create .git/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .map_err(|e| NibError::io(self.refs().heads_path().display(), e))
            .context("Failed to create .git/refs/heads directory")?;

        self.refs()
            .set_head()
            .context("Failed to create initial HEAD reference")?;
        tracing::info!(path = %self.path().display(), "initialized repository");

        writeln!(
            self.writer(),
            "initialized empty repository: {}",
            self.path().display()
        )?;

        Ok(())
    }
}
