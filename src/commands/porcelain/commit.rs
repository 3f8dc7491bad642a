use crate::areas::refs::DEFAULT_BRANCH;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::io::Write;

impl Repository {
    /// Commit the staged files on top of master and advance master
    ///
    /// `author` is `Name <email>`; without it the identity comes from the
    /// environment.
    pub fn commit(&mut self, message: &str, author: Option<&str>) -> anyhow::Result<ObjectId> {
        let tree = {
            let mut index = self.index();
            index.rehydrate()?;
            Tree::build(index.entries())?
        };
        let tree_id = self.database().store(&tree)?;

        let parent = self.refs().read_master()?;
        let is_root = match parent {
            Some(_) => "",
            None => " (root-commit)",
        };

        let author = Author::load(author)?;
        let commit = Commit::new(parent, tree_id, author, message.to_string());

        // the object must exist before master may point at it
        let commit_id = self.database().store(&commit)?;
        self.refs().update_master(&commit_id)?;

        writeln!(
            self.writer(),
            "[{DEFAULT_BRANCH}{is_root} {}] {}",
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(commit_id)
    }
}
