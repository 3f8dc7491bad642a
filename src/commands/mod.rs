//! Command implementations
//!
//! Every command is a method on [`Repository`](crate::areas::repository::Repository),
//! split the way git splits them:
//!
//! - `plumbing`: direct object and index access (hash-object, cat-file, ls-files)
//! - `porcelain`: user workflows (init, add, commit, push)

pub mod plumbing;
pub mod porcelain;
