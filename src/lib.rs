//! Chronicle - bitemporal, append-only store for terminology content
//!
//! Every component (a concept, or a semantic about another component) keeps
//! its whole history as a chronology of versions. Each version carries a
//! STAMP: status, time, author, module and path. Reads pick the version a
//! reader should see from a coordinate: a position on one or more paths, the
//! allowed statuses, and a module preference order.
//!
//! # Quick Start
//!
//! ```ignore
//! use chronicle::{Database, Stamp, StampFilter, Status, Timestamp};
//!
//! let db = Database::in_memory();
//! let path = db.create_path(vec![])?;
//! let concept = db.create_concept()?;
//!
//! let stamp = Stamp::new(Status::Active, Timestamp::from_millis(100), path, path, path);
//! db.append_version(concept, stamp, &[])?;
//!
//! let latest = db.latest(concept, &StampFilter::latest_on(path))?;
//! assert!(latest.present().is_some());
//! ```
//!
//! # Architecture
//!
//! - `chronicle-core`: identifiers, stamps, field types, errors
//! - `chronicle-storage`: identifier layer, stamp table, path graph, brittle
//!   codec, chronologies and the concurrent store
//! - `chronicle-engine`: filters, resolver, taxonomy snapshots, `Database`

pub use chronicle_core::{
    ComponentKind, Error, FieldType, FieldValue, Nid, Result, SequenceNumber, Stamp,
    StampSequence, Status, Timestamp,
};
pub use chronicle_engine::*;
pub use chronicle_storage::{
    BrittleTuple, ChronicleStore, Chronology, FieldSchema, FieldValueIndex, NewComponent,
    PathOrigin, PathOrigins, Payload, Version, VersionHandle,
};
