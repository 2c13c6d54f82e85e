//! Storage layer for chronicle
//!
//! This crate implements the versioned component store with:
//! - IdentifierMap: UUID sets → dense Nids → per-kind sequence numbers
//! - StampTable: interned committed stamps
//! - PathGraph: path origin DAG with cycle detection
//! - Brittle codec: fixed-arity typed field tuples
//! - ChronicleStore: per-component append-only chronologies
//! - Secondary indices (assemblage, referenced component, field value)
//! - Export record formats
//!
//! # Concurrency
//!
//! The `ChronicleStore` shards chronologies by Nid:
//! - Lock-free lookups via DashMap
//! - One RwLock per chronology (no cross-component contention)
//! - Copy-on-read snapshots for resolution

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chronology;
pub mod codec;
pub mod format;
pub mod identifier;
pub mod index;
pub mod path;
pub mod stamp_table;
pub mod store;

pub use chronology::{Chronology, Payload, Version, VersionHandle};
pub use codec::{BrittleTuple, FieldSchema};
pub use format::FormatError;
pub use identifier::{IdentifierMap, UuidSet};
pub use index::{FieldValueIndex, NidIndex, SemanticIndex};
pub use path::{PathGraph, PathOrigin, PathOrigins};
pub use stamp_table::StampTable;
pub use store::{ChronicleStore, NewComponent};
