//! Identifier types for Chronicle
//!
//! This module defines the foundational identifiers:
//! - Nid: Dense internal identifier for a component
//! - ComponentKind: Concept vs semantic discriminator
//! - SequenceNumber: Per-kind dense numbering used for bitset indexing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Native identifier of a component
///
/// A Nid is a dense, signed 32-bit integer assigned exactly once when a
/// component is first seen. Nids are never reused, and the mapping from a
/// Nid to its UUID set is immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Nid(i32);

impl Nid {
    /// Smallest Nid handed out by the identifier layer
    pub const FIRST: Nid = Nid(1);

    /// Create a Nid from its raw integer value
    #[inline]
    pub const fn new(raw: i32) -> Self {
        Nid(raw)
    }

    /// Get the raw integer value
    #[inline]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Little-endian byte form used by the record formats
    #[inline]
    pub const fn to_le_bytes(&self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Rebuild a Nid from its little-endian byte form
    #[inline]
    pub const fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Nid(i32::from_le_bytes(bytes))
    }
}

impl fmt::Display for Nid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nid:{}", self.0)
    }
}

impl From<i32> for Nid {
    fn from(raw: i32) -> Self {
        Nid(raw)
    }
}

/// Kind of component a Nid addresses
///
/// Sequence numbers are assigned densely per kind, so a concept and a
/// semantic may share the same sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// A concept: the thing being described
    Concept,
    /// A semantic assertion about another component
    Semantic,
}

impl ComponentKind {
    /// All kinds, in tag order
    pub const ALL: [ComponentKind; 2] = [ComponentKind::Concept, ComponentKind::Semantic];

    /// Stable one-byte tag used by the record formats
    pub const fn as_tag(&self) -> u8 {
        match self {
            ComponentKind::Concept => 0x01,
            ComponentKind::Semantic => 0x02,
        }
    }

    /// Decode a tag written by [`ComponentKind::as_tag`]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(ComponentKind::Concept),
            0x02 => Some(ComponentKind::Semantic),
            _ => None,
        }
    }

    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Concept => "concept",
            ComponentKind::Semantic => "semantic",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dense secondary number over the Nids of one [`ComponentKind`]
///
/// Assignment is monotonic and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceNumber(u32);

impl SequenceNumber {
    /// Create a sequence number from its raw value
    #[inline]
    pub const fn new(raw: u32) -> Self {
        SequenceNumber(raw)
    }

    /// Get the raw value
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Position of this sequence inside a bitset or dense vector
    #[inline]
    pub const fn as_index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq:{}", self.0)
    }
}
