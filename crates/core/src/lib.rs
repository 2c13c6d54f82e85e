//! Core types for Chronicle
//!
//! This crate defines the foundational types used throughout the system:
//! - Nid: Dense internal identifier of a component
//! - ComponentKind / SequenceNumber: Per-kind dense numbering
//! - Timestamp: Signed millisecond stamp time with the uncommitted sentinel
//! - Stamp / StampSequence / Status: The STAMP provenance tuple
//! - FieldType / FieldValue: Typed fields of brittle semantic versions
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod contract;
pub mod error;
pub mod field;
pub mod types;

// Re-export commonly used types
pub use contract::{Stamp, StampSequence, Status, Timestamp};
pub use error::{Error, Result};
pub use field::{FieldType, FieldValue};
pub use types::{ComponentKind, Nid, SequenceNumber};
