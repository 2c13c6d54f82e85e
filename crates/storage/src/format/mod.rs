//! Byte formats for exporting and importing store contents.
//!
//! Keeping serialization separate from the in-memory structures makes
//! format evolution easier to manage. Every record starts with four magic
//! bytes and a format version and ends with a CRC32 of everything before it.

pub mod records;

pub use records::{
    ChronologyRecord, FormatError, SemanticHeader, StampTableRecord, VersionRecord,
    CHRONOLOGY_MAGIC, RECORD_FORMAT_VERSION, STAMP_TABLE_MAGIC,
};
