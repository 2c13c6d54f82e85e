//! STAMP provenance tuple
//!
//! Every version is stamped with five coordinates:
//! **S**tatus, **T**ime, **A**uthor, **M**odule, **P**ath.
//!
//! A committed stamp is interned once into a dense [`StampSequence`]; two
//! versions with an identical 5-tuple share one sequence. A stamp whose time
//! is [`Timestamp::UNCOMMITTED`] belongs to a draft and is never interned.

use super::Timestamp;
use crate::types::Nid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status recorded on a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Current, in-force content
    Active,
    /// Retired content
    Inactive,
    /// Bootstrapping content that predates any module
    Primordial,
    /// Content withdrawn before it was ever in force
    Cancelled,
}

impl Status {
    /// All statuses, in tag order
    pub const ALL: [Status; 4] = [
        Status::Active,
        Status::Inactive,
        Status::Primordial,
        Status::Cancelled,
    ];

    /// Stable one-byte tag used by the record formats
    pub const fn as_tag(&self) -> u8 {
        match self {
            Status::Active => 0x01,
            Status::Inactive => 0x02,
            Status::Primordial => 0x03,
            Status::Cancelled => 0x04,
        }
    }

    /// Decode a tag written by [`Status::as_tag`]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Status::Active),
            0x02 => Some(Status::Inactive),
            0x03 => Some(Status::Primordial),
            0x04 => Some(Status::Cancelled),
            _ => None,
        }
    }

    /// Bit used by status sets
    #[inline]
    pub const fn bit(&self) -> u8 {
        1 << (self.as_tag() - 1)
    }

    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::Primordial => "Primordial",
            Status::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (Status, Time, Author, Module, Path) tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stamp {
    /// Lifecycle status
    pub status: Status,
    /// Commit time, or `UNCOMMITTED` for a draft
    pub time: Timestamp,
    /// Author concept
    pub author: Nid,
    /// Module concept
    pub module: Nid,
    /// Path concept
    pub path: Nid,
}

impl Stamp {
    /// Create a committed-or-draft stamp from its five coordinates
    pub const fn new(status: Status, time: Timestamp, author: Nid, module: Nid, path: Nid) -> Self {
        Stamp {
            status,
            time,
            author,
            module,
            path,
        }
    }

    /// Create a draft stamp (time = `UNCOMMITTED`)
    pub const fn uncommitted(status: Status, author: Nid, module: Nid, path: Nid) -> Self {
        Stamp::new(status, Timestamp::UNCOMMITTED, author, module, path)
    }

    /// Check if this stamp still belongs to a draft
    #[inline]
    pub const fn is_uncommitted(&self) -> bool {
        self.time.is_uncommitted()
    }

    /// Return a copy of this stamp with its final time assigned
    pub const fn with_time(&self, time: Timestamp) -> Self {
        Stamp::new(self.status, time, self.author, self.module, self.path)
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {} author={} module={} path={}]",
            self.status, self.time, self.author, self.module, self.path
        )
    }
}

/// Dense, immutable sequence of an interned committed stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StampSequence(u32);

impl StampSequence {
    /// Create a stamp sequence from its raw value
    #[inline]
    pub const fn new(raw: u32) -> Self {
        StampSequence(raw)
    }

    /// Get the raw value
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for StampSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stamp:{}", self.0)
    }
}
