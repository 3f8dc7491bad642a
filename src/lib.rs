//! nib: a minimal git engine
//!
//! Loose object storage, the binary staging index, flat tree and commit
//! construction, reachability analysis, pack encoding and a smart HTTP push
//! client. The command layer in [`commands`] drives these through an explicit
//! [`Repository`](areas::repository::Repository) handle.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
