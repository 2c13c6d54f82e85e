//! Export records for chronologies and the stamp table
//!
//! # Stamp table record
//!
//! ```text
//! +------------------+
//! | Magic: "STMP"    | 4 bytes
//! | Format Version   | 2 bytes (u16 LE)
//! | Row Count        | 4 bytes (u32 LE)
//! | Rows             | 25 bytes each
//! | CRC32            | 4 bytes
//! +------------------+
//!
//! Row: sequence(u32) status(u8) time(i64) author(i32) module(i32) path(i32)
//! ```
//!
//! # Chronology record
//!
//! ```text
//! +------------------+
//! | Magic: "CHRN"    | 4 bytes
//! | Format Version   | 2 bytes (u16 LE)
//! | Nid              | 4 bytes (i32 LE)
//! | Kind Tag         | 1 byte
//! | UUID Count       | 2 bytes (u16 LE)
//! | UUIDs            | 16 bytes each
//! | Semantic Header  | semantics only, see below
//! | Version Count    | 4 bytes (u32 LE)
//! | Versions         | sequence(u32) + payload len(u32) + payload
//! | CRC32            | 4 bytes
//! +------------------+
//!
//! Semantic header: assemblage(i32) referenced(i32) field count(u16) field tags(u8 each)
//! ```
//!
//! Versions refer to stamps by sequence only; importing a chronology requires
//! the stamp table it was exported with.

use byteorder::{LittleEndian, ReadBytesExt};
use chronicle_core::{ComponentKind, FieldType, Nid, Stamp, StampSequence, Status, Timestamp};
use std::io::{Cursor, Read};
use uuid::Uuid;

/// Stamp table record magic bytes
pub const STAMP_TABLE_MAGIC: [u8; 4] = *b"STMP";

/// Chronology record magic bytes
pub const CHRONOLOGY_MAGIC: [u8; 4] = *b"CHRN";

/// Current record format version
pub const RECORD_FORMAT_VERSION: u16 = 1;

/// Errors decoding an export record
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Record ended early
    #[error("Record too short")]
    TooShort,

    /// Invalid magic bytes
    #[error("Invalid magic bytes")]
    InvalidMagic,

    /// Record written by a format version this build does not read
    #[error("Unsupported format version {0}")]
    UnsupportedVersion(u16),

    /// Checksum mismatch
    #[error("Checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// Expected CRC32 value (from record)
        expected: u32,
        /// Computed CRC32 value
        computed: u32,
    },

    /// Unknown enum tag
    #[error("Invalid {what} tag {tag}")]
    InvalidTag {
        /// Which enum the tag belongs to
        what: &'static str,
        /// The offending tag
        tag: u8,
    },

    /// Bytes after the last field
    #[error("{0} trailing bytes")]
    TrailingBytes(usize),
}

impl From<FormatError> for chronicle_core::Error {
    fn from(e: FormatError) -> Self {
        tracing::error!(error = %e, "corrupt export record");
        chronicle_core::Error::Corruption(e.to_string())
    }
}

impl From<std::io::Error> for FormatError {
    fn from(_: std::io::Error) -> Self {
        FormatError::TooShort
    }
}

fn seal(mut bytes: Vec<u8>) -> Vec<u8> {
    let crc = crc32fast::hash(&bytes);
    bytes.extend_from_slice(&crc.to_le_bytes());
    bytes
}

/// Check magic, version and trailer; return a cursor over the body
fn open<'a>(bytes: &'a [u8], magic: &[u8; 4]) -> Result<Cursor<&'a [u8]>, FormatError> {
    if bytes.len() < 4 + 2 + 4 {
        return Err(FormatError::TooShort);
    }
    if &bytes[0..4] != magic {
        return Err(FormatError::InvalidMagic);
    }
    let (data, trailer) = bytes.split_at(bytes.len() - 4);
    let expected = (&trailer[..]).read_u32::<LittleEndian>()?;
    let computed = crc32fast::hash(data);
    if expected != computed {
        return Err(FormatError::ChecksumMismatch { expected, computed });
    }
    let mut cursor = Cursor::new(data);
    cursor.set_position(4);
    let version = cursor.read_u16::<LittleEndian>()?;
    if version != RECORD_FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    Ok(cursor)
}

fn close(cursor: &Cursor<&[u8]>) -> Result<(), FormatError> {
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if remaining != 0 {
        return Err(FormatError::TrailingBytes(remaining));
    }
    Ok(())
}

/// Every interned stamp, in sequence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampTableRecord {
    /// (sequence, stamp) rows
    pub rows: Vec<(StampSequence, Stamp)>,
}

impl StampTableRecord {
    /// Serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(14 + self.rows.len() * 25);
        bytes.extend_from_slice(&STAMP_TABLE_MAGIC);
        bytes.extend_from_slice(&RECORD_FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.rows.len() as u32).to_le_bytes());
        for (seq, stamp) in &self.rows {
            bytes.extend_from_slice(&seq.as_u32().to_le_bytes());
            bytes.push(stamp.status.as_tag());
            bytes.extend_from_slice(&stamp.time.as_millis().to_le_bytes());
            bytes.extend_from_slice(&stamp.author.to_le_bytes());
            bytes.extend_from_slice(&stamp.module.to_le_bytes());
            bytes.extend_from_slice(&stamp.path.to_le_bytes());
        }
        seal(bytes)
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut cursor = open(bytes, &STAMP_TABLE_MAGIC)?;
        let count = cursor.read_u32::<LittleEndian>()? as usize;
        let mut rows = Vec::with_capacity(count.min(1 << 16));
        for _ in 0..count {
            let seq = StampSequence::new(cursor.read_u32::<LittleEndian>()?);
            let tag = cursor.read_u8()?;
            let status = Status::from_tag(tag).ok_or(FormatError::InvalidTag {
                what: "status",
                tag,
            })?;
            let time = Timestamp::from_millis(cursor.read_i64::<LittleEndian>()?);
            let author = read_nid(&mut cursor)?;
            let module = read_nid(&mut cursor)?;
            let path = read_nid(&mut cursor)?;
            rows.push((seq, Stamp::new(status, time, author, module, path)));
        }
        close(&cursor)?;
        Ok(StampTableRecord { rows })
    }
}

/// One committed version: its stamp sequence and encoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Interned stamp
    pub stamp: StampSequence,
    /// Brittle-encoded fields (empty for concepts)
    pub payload: Vec<u8>,
}

/// Semantic-only part of a chronology record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticHeader {
    /// Assemblage the semantic belongs to
    pub assemblage: Nid,
    /// Component the semantic is about
    pub referenced: Nid,
    /// Field types of the assemblage
    pub fields: Vec<FieldType>,
}

/// A whole committed chronology with its identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChronologyRecord {
    /// Component identifier
    pub nid: Nid,
    /// Component kind
    pub kind: ComponentKind,
    /// UUIDs bound to the component
    pub uuids: Vec<Uuid>,
    /// Present for semantics
    pub semantic: Option<SemanticHeader>,
    /// Committed versions in commit order
    pub versions: Vec<VersionRecord>,
}

impl ChronologyRecord {
    /// Serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&CHRONOLOGY_MAGIC);
        bytes.extend_from_slice(&RECORD_FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&self.nid.to_le_bytes());
        bytes.push(self.kind.as_tag());
        bytes.extend_from_slice(&(self.uuids.len() as u16).to_le_bytes());
        for uuid in &self.uuids {
            bytes.extend_from_slice(uuid.as_bytes());
        }
        if let Some(header) = &self.semantic {
            bytes.extend_from_slice(&header.assemblage.to_le_bytes());
            bytes.extend_from_slice(&header.referenced.to_le_bytes());
            bytes.extend_from_slice(&(header.fields.len() as u16).to_le_bytes());
            bytes.extend(header.fields.iter().map(FieldType::as_tag));
        }
        bytes.extend_from_slice(&(self.versions.len() as u32).to_le_bytes());
        for version in &self.versions {
            bytes.extend_from_slice(&version.stamp.as_u32().to_le_bytes());
            bytes.extend_from_slice(&(version.payload.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&version.payload);
        }
        seal(bytes)
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut cursor = open(bytes, &CHRONOLOGY_MAGIC)?;
        let nid = read_nid(&mut cursor)?;
        let tag = cursor.read_u8()?;
        let kind = ComponentKind::from_tag(tag).ok_or(FormatError::InvalidTag { what: "kind", tag })?;

        let uuid_count = cursor.read_u16::<LittleEndian>()? as usize;
        let mut uuids = Vec::with_capacity(uuid_count);
        for _ in 0..uuid_count {
            let mut raw = [0u8; 16];
            cursor.read_exact(&mut raw)?;
            uuids.push(Uuid::from_bytes(raw));
        }

        let semantic = match kind {
            ComponentKind::Concept => None,
            ComponentKind::Semantic => {
                let assemblage = read_nid(&mut cursor)?;
                let referenced = read_nid(&mut cursor)?;
                let field_count = cursor.read_u16::<LittleEndian>()? as usize;
                let mut fields = Vec::with_capacity(field_count);
                for _ in 0..field_count {
                    let tag = cursor.read_u8()?;
                    fields.push(
                        FieldType::from_tag(tag).ok_or(FormatError::InvalidTag { what: "field type", tag })?,
                    );
                }
                Some(SemanticHeader {
                    assemblage,
                    referenced,
                    fields,
                })
            }
        };

        let version_count = cursor.read_u32::<LittleEndian>()? as usize;
        let mut versions = Vec::with_capacity(version_count.min(1 << 16));
        for _ in 0..version_count {
            let stamp = StampSequence::new(cursor.read_u32::<LittleEndian>()?);
            let len = cursor.read_u32::<LittleEndian>()? as usize;
            let remaining = cursor.get_ref().len() - cursor.position() as usize;
            if len > remaining {
                return Err(FormatError::TooShort);
            }
            let mut payload = vec![0u8; len];
            cursor.read_exact(&mut payload)?;
            versions.push(VersionRecord { stamp, payload });
        }
        close(&cursor)?;

        Ok(ChronologyRecord {
            nid,
            kind,
            uuids,
            semantic,
            versions,
        })
    }
}

fn read_nid(cursor: &mut Cursor<&[u8]>) -> Result<Nid, FormatError> {
    Ok(Nid::new(cursor.read_i32::<LittleEndian>()?))
}
