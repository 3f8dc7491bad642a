use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use crate::errors::NibError;
use bytes::Bytes;
use std::path::{Component, Path};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 3] = [".git", ".", ".."];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn parse_blob(&self, name: &str) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(name)?))
    }

    /// Expand a user-supplied path into repository-relative, `/`-separated file names.
    ///
    /// Directories are walked recursively in sorted order; anything under
    /// `.git` is skipped.
    pub fn list_files(&self, file_path: &Path) -> anyhow::Result<Vec<String>> {
        let file_path = match file_path.is_absolute() {
            true => file_path.to_path_buf(),
            false => self.path.join(file_path),
        };

        if !file_path.exists() {
            anyhow::bail!("pathspec {:?} did not match any files", file_path.display());
        }

        if file_path.is_dir() {
            WalkDir::new(&file_path)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| !Self::is_ignored(entry.path()))
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| self.relative_name(entry.path()))
                .collect()
        } else {
            Ok(vec![self.relative_name(&file_path)?])
        }
    }

    pub fn read_file(&self, name: &str) -> anyhow::Result<Bytes> {
        let file_path = self.path.join(name);

        std::fs::read(&file_path)
            .map(Bytes::from)
            .map_err(|e| NibError::io(file_path.display(), e).into())
    }

    pub fn stat_file(&self, name: &str) -> anyhow::Result<EntryMetadata> {
        let file_path = self.path.join(name);
        let metadata =
            std::fs::metadata(&file_path).map_err(|e| NibError::io(file_path.display(), e))?;

        (file_path.as_path(), name, metadata).try_into()
    }

    fn is_ignored(path: &Path) -> bool {
        path.file_name()
            .map(|name| IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }

    fn relative_name(&self, path: &Path) -> anyhow::Result<String> {
        let relative = path.strip_prefix(&self.path).map_err(|_| {
            anyhow::anyhow!("{} is outside repository {}", path.display(), self.path.display())
        })?;

        let parts = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>();

        Ok(parts.join("/"))
    }
}
