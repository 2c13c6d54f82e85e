//! Typed fields of brittle semantic versions
//!
//! A brittle version carries a fixed-length tuple of typed values. The
//! tuple's shape is declared once per assemblage as an ordered list of
//! [`FieldType`]s; every value stored against it must match position by
//! position.

use crate::types::Nid;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declared type of one field position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Component reference (4 bytes, signed)
    Nid,
    /// 32-bit signed integer (4 bytes)
    Integer,
    /// 64-bit signed integer (8 bytes)
    Long,
    /// 32-bit float (4 bytes)
    Float,
    /// Boolean (1 byte)
    Boolean,
    /// UUID (16 bytes)
    Uuid,
    /// Millisecond instant (8 bytes, signed)
    Instant,
    /// UTF-8 string (u32 length prefix)
    String,
    /// Opaque bytes (u32 length prefix)
    Bytes,
}

impl FieldType {
    /// Stable one-byte tag used by schema encodings
    pub const fn as_tag(&self) -> u8 {
        match self {
            FieldType::Nid => 0x01,
            FieldType::Integer => 0x02,
            FieldType::Long => 0x03,
            FieldType::Float => 0x04,
            FieldType::Boolean => 0x05,
            FieldType::Uuid => 0x06,
            FieldType::Instant => 0x07,
            FieldType::String => 0x08,
            FieldType::Bytes => 0x09,
        }
    }

    /// Decode a tag written by [`FieldType::as_tag`]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(FieldType::Nid),
            0x02 => Some(FieldType::Integer),
            0x03 => Some(FieldType::Long),
            0x04 => Some(FieldType::Float),
            0x05 => Some(FieldType::Boolean),
            0x06 => Some(FieldType::Uuid),
            0x07 => Some(FieldType::Instant),
            0x08 => Some(FieldType::String),
            0x09 => Some(FieldType::Bytes),
            _ => None,
        }
    }

    /// Encoded width for fixed-width types, `None` for length-prefixed ones
    pub const fn fixed_width(&self) -> Option<usize> {
        match self {
            FieldType::Nid | FieldType::Integer | FieldType::Float => Some(4),
            FieldType::Long | FieldType::Instant => Some(8),
            FieldType::Boolean => Some(1),
            FieldType::Uuid => Some(16),
            FieldType::String | FieldType::Bytes => None,
        }
    }

    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldType::Nid => "NID",
            FieldType::Integer => "INTEGER",
            FieldType::Long => "LONG",
            FieldType::Float => "FLOAT",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Uuid => "UUID",
            FieldType::Instant => "INSTANT",
            FieldType::String => "STRING",
            FieldType::Bytes => "BYTES",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single decoded field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Component reference
    Nid(Nid),
    /// 32-bit signed integer
    Integer(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// Boolean
    Boolean(bool),
    /// UUID
    Uuid(Uuid),
    /// Millisecond instant
    Instant(i64),
    /// UTF-8 string
    String(String),
    /// Opaque bytes
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// The type this value satisfies
    pub const fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Nid(_) => FieldType::Nid,
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Long(_) => FieldType::Long,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::Uuid(_) => FieldType::Uuid,
            FieldValue::Instant(_) => FieldType::Instant,
            FieldValue::String(_) => FieldType::String,
            FieldValue::Bytes(_) => FieldType::Bytes,
        }
    }

    /// The referenced Nid, if this is a NID field
    pub fn as_nid(&self) -> Option<Nid> {
        match self {
            FieldValue::Nid(nid) => Some(*nid),
            _ => None,
        }
    }

    /// The string, if this is a STRING field
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Nid> for FieldValue {
    fn from(nid: Nid) -> Self {
        FieldValue::Nid(nid)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        FieldValue::Uuid(v)
    }
}
