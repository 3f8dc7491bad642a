//! Object graph reachability
//!
//! Walks commits and trees through the object database to find every object
//! a commit depends on. Traversal is iterative: a worklist of pending hashes
//! plus a visited set, so deep histories cannot exhaust the stack and shared
//! subtrees are loaded once.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::NibError;
use std::collections::BTreeSet;

const TREE_PREFIX: &str = "tree ";
const PARENT_PREFIX: &str = "parent ";

#[derive(Debug)]
pub struct ObjectGraph<'d> {
    database: &'d Database,
}

impl<'d> ObjectGraph<'d> {
    pub fn new(database: &'d Database) -> Self {
        ObjectGraph { database }
    }

    /// The tree itself, every blob under it and every subtree, recursively
    pub fn reachable_from_tree(&self, tree_oid: &ObjectId) -> anyhow::Result<BTreeSet<ObjectId>> {
        let mut reachable = BTreeSet::new();
        self.collect_tree(tree_oid, &mut reachable)?;

        Ok(reachable)
    }

    /// The commit, its tree closure and the closures of all its ancestors
    pub fn reachable_from_commit(
        &self,
        commit_oid: &ObjectId,
    ) -> anyhow::Result<BTreeSet<ObjectId>> {
        let mut reachable = BTreeSet::new();
        let mut pending = vec![commit_oid.clone()];

        while let Some(oid) = pending.pop() {
            if !reachable.insert(oid.clone()) {
                continue;
            }

            let payload = self.database.load_as(&oid, ObjectType::Commit)?;
            let text = std::str::from_utf8(&payload)
                .map_err(|_| NibError::corrupt(&oid, "commit text is not valid UTF-8"))?;
            let (tree_oid, parents) = Self::parse_links(&oid, text)?;

            self.collect_tree(&tree_oid, &mut reachable)?;
            pending.extend(parents.into_iter().filter(|p| !reachable.contains(p)));
        }

        Ok(reachable)
    }

    /// Objects reachable from `local` that `remote` does not already have
    ///
    /// With no remote commit this is the whole local closure. The remote
    /// commit must exist locally, otherwise the remote holds history this
    /// repository has never seen and the load fails with `NotFound`.
    pub fn missing(
        &self,
        local: &ObjectId,
        remote: Option<&ObjectId>,
    ) -> anyhow::Result<BTreeSet<ObjectId>> {
        let local_objects = self.reachable_from_commit(local)?;

        let remote_objects = match remote {
            Some(remote) => self.reachable_from_commit(remote)?,
            None => BTreeSet::new(),
        };

        Ok(local_objects
            .difference(&remote_objects)
            .cloned()
            .collect())
    }

    fn collect_tree(
        &self,
        tree_oid: &ObjectId,
        reachable: &mut BTreeSet<ObjectId>,
    ) -> anyhow::Result<()> {
        let mut pending = vec![tree_oid.clone()];

        while let Some(oid) = pending.pop() {
            if !reachable.insert(oid.clone()) {
                continue;
            }

            for entry in self.database.load_tree(&oid)?.into_entries() {
                match entry.object_type() {
                    ObjectType::Tree => pending.push(entry.oid),
                    _ => {
                        reachable.insert(entry.oid);
                    }
                }
            }
        }

        Ok(())
    }

    /// Pull the tree and parent hashes out of the commit header
    ///
    /// Hashes sit at fixed offsets right after the keyword and a single space.
    fn parse_links(oid: &ObjectId, text: &str) -> anyhow::Result<(ObjectId, Vec<ObjectId>)> {
        let mut tree = None;
        let mut parents = Vec::new();

        for line in text.lines().take_while(|line| !line.is_empty()) {
            if line.starts_with(TREE_PREFIX) {
                tree = Some(Self::fixed_width_hash(oid, line, TREE_PREFIX.len())?);
            } else if line.starts_with(PARENT_PREFIX) {
                parents.push(Self::fixed_width_hash(oid, line, PARENT_PREFIX.len())?);
            }
        }

        let tree = tree.ok_or_else(|| NibError::corrupt(oid, "commit has no tree line"))?;

        Ok((tree, parents))
    }

    fn fixed_width_hash(oid: &ObjectId, line: &str, start: usize) -> anyhow::Result<ObjectId> {
        let end = start + crate::artifacts::objects::OBJECT_ID_LENGTH;

        let hash = line
            .get(start..end)
            .ok_or_else(|| NibError::corrupt(oid, format!("commit line too short: {line:?}")))?;

        ObjectId::try_parse(hash.to_string())
            .map_err(|e| NibError::corrupt(oid, e.to_string()).into())
    }
}
