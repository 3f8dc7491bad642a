//! Repository storage areas
//!
//! - `database`: loose object store
//! - `index`: staging area file
//! - `refs`: HEAD and the master branch
//! - `repository`: ties the areas together for the commands
//! - `workspace`: working tree file access

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
