use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// List staged paths; with `stage`, also their mode, hash and stage number
    pub fn ls_files(&mut self, stage: bool) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        for entry in index.entries() {
            match stage {
                true => writeln!(
                    self.writer(),
                    "{:06o} {} {}\t{}",
                    entry.metadata.mode.as_u32(),
                    entry.oid,
                    entry.stage(),
                    entry.name
                )?,
                false => writeln!(self.writer(), "{}", entry.name)?,
            }
        }

        Ok(())
    }
}
