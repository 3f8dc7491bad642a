//! Error taxonomy
//!
//! Every failure is terminal at detection. Library functions return
//! `anyhow::Result` and raise these variants with `.into()`, so callers that
//! care about the category can `downcast_ref::<NibError>()` while everyone
//! else just sees a contextual error chain.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NibError {
    /// Unreadable or unwritable repository file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Bad index signature, version, checksum or entry count; bad pack header.
    #[error("format error: {0}")]
    Format(String),

    /// Stored object disagrees with its own header.
    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: String, reason: String },

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("ambiguous object prefix {prefix} ({count} candidates)")]
    AmbiguousPrefix { prefix: String, count: usize },

    /// Malformed pkt-line, unexpected banner, rejected push, non-success HTTP status.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A path with a directory separator reached the flat tree builder.
    #[error("unsupported layout: {0:?} is inside a subdirectory, only a flat file list can be committed")]
    UnsupportedLayout(String),
}

impl NibError {
    pub fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        NibError::Io {
            path: path.to_string(),
            source,
        }
    }

    pub fn corrupt(oid: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        NibError::CorruptObject {
            oid: oid.to_string(),
            reason: reason.into(),
        }
    }
}
