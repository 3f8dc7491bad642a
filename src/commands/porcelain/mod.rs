//! Porcelain commands (user-facing workflows)
//!
//! - `init`: create a repository
//! - `add`: stage files
//! - `commit`: record the staged files on master
//! - `push`: publish master over smart HTTP

pub mod add;
pub mod commit;
pub mod init;
pub mod push;
