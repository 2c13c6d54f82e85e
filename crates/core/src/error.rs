//! Error types for Chronicle
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Errors fall into four families:
//! - identity: unknown Nid/UUID/version lookups, recoverable
//! - structural integrity: arity faults, cyclic path origins, corrupt records;
//!   these mean an assemblage definition or record is damaged and are never
//!   patched over
//! - concurrency: double commit of a draft, recoverable by re-reading
//! - capability: a query the backing assemblage cannot answer

use crate::contract::{StampSequence, Timestamp};
use crate::field::FieldType;
use crate::types::Nid;
use std::io;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Chronicle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Chronicle
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (configuration files, record files)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Nid was never allocated
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(Nid),

    /// UUID is not mapped to any Nid
    #[error("Unknown UUID: {0}")]
    UnknownUuid(Uuid),

    /// Draft handle does not address a version of the component
    #[error("Unknown version: draft {draft} of {nid}")]
    UnknownVersion {
        /// Component the handle points into
        nid: Nid,
        /// Draft slot
        draft: u32,
    },

    /// Nid is not a declared assemblage
    #[error("Unknown assemblage: {0}")]
    UnknownAssemblage(Nid),

    /// Stamp sequence was never interned
    #[error("Unknown stamp sequence: {0}")]
    UnknownStampSequence(StampSequence),

    /// Field tuple length differs from its declaration
    #[error("Arity mismatch: declared {declared} fields, got {actual}")]
    ArityMismatch {
        /// Number of declared field types
        declared: usize,
        /// Number of values supplied or encoded
        actual: usize,
    },

    /// Field value does not satisfy its declared type
    #[error("Field type mismatch at position {index}: expected {expected}, got {actual}")]
    FieldTypeMismatch {
        /// Position in the tuple
        index: usize,
        /// Declared type
        expected: FieldType,
        /// Type of the supplied value
        actual: FieldType,
    },

    /// Coordinate cannot be resolved (cyclic or malformed path origins)
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Data corruption detected
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Draft was already committed
    #[error("Version of {nid} already committed as {stamp}")]
    AlreadyCommitted {
        /// Component the draft belongs to
        nid: Nid,
        /// Sequence assigned by the earlier commit
        stamp: StampSequence,
    },

    /// Assemblage has no materialized closure to answer a transitive query
    #[error("Unsupported by assemblage {0}: no materialized closure index")]
    UnsupportedByAssemblage(Nid),

    /// Attempted to intern a draft stamp
    #[error("Uncommitted stamps cannot be interned")]
    UncommittedStamp,

    /// Commit would place a version before an earlier-committed one
    #[error("Time regression on {nid}: last committed {last}, attempted {attempted}")]
    TimeRegression {
        /// Component being appended to
        nid: Nid,
        /// Time of the newest committed version
        last: Timestamp,
        /// Rejected commit time
        attempted: Timestamp,
    },

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration could not be read or validated
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Structural-integrity faults are never recovered from
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::ArityMismatch { .. }
                | Error::FieldTypeMismatch { .. }
                | Error::InvalidCoordinate(_)
                | Error::Corruption(_)
        )
    }

    /// Identity failures are surfaced as explicit "not found" results
    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            Error::UnknownIdentifier(_)
                | Error::UnknownUuid(_)
                | Error::UnknownVersion { .. }
                | Error::UnknownAssemblage(_)
                | Error::UnknownStampSequence(_)
        )
    }
}
