//! Git commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//! They contain:
//! - A tree object ID (directory snapshot)
//! - At most one parent commit ID
//! - Author and committer information (always the same identity and time)
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//!
//! ```

use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;

/// Author or committer information
///
/// The identity is kept verbatim (`Name <email>`); the timestamp carries the
/// UTC offset it is rendered with.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    identity: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create an author stamped with the current local time
    pub fn new(identity: String) -> Self {
        Author {
            identity,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        identity: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            identity,
            timestamp,
        }
    }

    /// Resolve the author from an explicit identity or the environment
    ///
    /// Falls back to `GIT_AUTHOR_NAME` and `GIT_AUTHOR_EMAIL` when no identity is
    /// given. `GIT_AUTHOR_DATE` optionally pins the timestamp.
    pub fn load(identity: Option<&str>) -> anyhow::Result<Self> {
        let identity = match identity {
            Some(identity) => identity.to_string(),
            None => {
                let name = std::env::var("GIT_AUTHOR_NAME").context("GIT_AUTHOR_NAME not set")?;
                let email =
                    std::env::var("GIT_AUTHOR_EMAIL").context("GIT_AUTHOR_EMAIL not set")?;
                format!("{name} <{email}>")
            }
        };

        match std::env::var("GIT_AUTHOR_DATE") {
            Ok(date_str) => Ok(Author::new_with_timestamp(
                identity,
                Self::parse_date(&date_str)?,
            )),
            Err(_) => Ok(Author::new(identity)),
        }
    }

    /// Accepts RFC 2822 or `%Y-%m-%d %H:%M:%S %z`
    fn parse_date(date_str: &str) -> anyhow::Result<chrono::DateTime<chrono::FixedOffset>> {
        chrono::DateTime::parse_from_rfc2822(date_str)
            .or_else(|_| chrono::DateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S %z"))
            .with_context(|| format!("GIT_AUTHOR_DATE {date_str:?} is not a valid date"))
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// `<unix-epoch-seconds> <+|-><HH><MM>`
    pub fn timestamp_line(&self) -> String {
        format!(
            "{} {}",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// `Name <email> timestamp timezone`
    pub fn display(&self) -> String {
        format!("{} {}", self.identity, self.timestamp_line())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parent: Option<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    message: String,
}

impl Commit {
    pub fn new(parent: Option<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parent,
            tree_oid,
            author,
            message,
        }
    }

    /// First line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    fn text(&self) -> String {
        let mut text = format!("tree {}\n", self.tree_oid);
        if let Some(parent) = &self.parent {
            text.push_str(&format!("parent {parent}\n"));
        }
        // committer is the author: no separate committer identity
        text.push_str(&format!("author {}\n", self.author.display()));
        text.push_str(&format!("committer {}\n", self.author.display()));
        text.push('\n');
        text.push_str(&self.message);
        text.push_str("\n\n");

        text
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(Bytes::from(self.text()))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.text()
    }
}
