//! Smart HTTP push protocol
//!
//! - `pkt_line`: length-prefixed line framing
//! - `smart_http`: ref discovery and pack upload against a receive-pack endpoint

pub mod pkt_line;
pub mod smart_http;
