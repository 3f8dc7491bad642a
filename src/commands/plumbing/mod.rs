//! Plumbing commands (low-level object and index access)
//!
//! - `hash-object`: compute an object ID and optionally store the object
//! - `cat-file`: print an object or facts about it
//! - `ls-files`: list the staging index

pub mod cat_file;
pub mod hash_object;
pub mod ls_files;
