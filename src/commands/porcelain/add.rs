use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use std::path::Path;

impl Repository {
    /// Store each file (directories are expanded) as a blob and stage it
    pub fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.index();

        // Load the index file from the disk
        index.rehydrate()?;

        let names = paths
            .iter()
            .map(|path| self.workspace().list_files(Path::new(path)))
            .collect::<anyhow::Result<Vec<_>>>()?
            .into_iter()
            .flatten();

        for name in names {
            let blob = self.workspace().parse_blob(&name)?;
            let stat = self.workspace().stat_file(&name)?;

            let blob_id = self.database().store(&blob)?;
            tracing::debug!(path = %name, oid = %blob_id, "staged file");
            index.add(IndexEntry::new(name, blob_id, stat));
        }

        index.write_updates()?;

        Ok(())
    }
}
