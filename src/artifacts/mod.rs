//! Git data structures and algorithms
//!
//! - `objects`: object kinds (blob, tree, commit) and their identifiers
//! - `index`: index file records, header and checksum
//! - `graph`: reachability over commits and trees
//! - `pack`: pack file encoding
//! - `protocol`: pkt-line framing and the smart HTTP push client

pub mod graph;
pub mod index;
pub mod objects;
pub mod pack;
pub mod protocol;
