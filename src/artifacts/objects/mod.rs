//! Git object types and operations
//!
//! Git stores all content as objects identified by SHA-1 hashes. Three kinds are supported:
//!
//! - **Blob**: File content (raw bytes)
//! - **Tree**: Flat directory listing (names, modes, and object IDs)
//! - **Commit**: Snapshot with metadata (author, message, parent commit, tree)
//!
//! Every object is hashed and stored in the loose format `<type> <size>\0<content>`,
//! while pack files carry only the content behind a compact binary header.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in binary format
pub const OBJECT_ID_BYTES: usize = 20;
