//! Query engine for Chronicle
//!
//! This crate turns stored chronologies into answers:
//! - Coordinate filters: allowed statuses, path positions, module priority
//! - Resolver: latest visible version or an explicit contradiction set
//! - Taxonomy snapshots: parent/child queries over an edge assemblage
//! - Closure collaborators for transitive queries
//! - Database: store + `chronicle.toml` configuration
//!
//! Resolvers and snapshots are immutable values built from explicit
//! arguments; nothing here is looked up at runtime.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod closure;
pub mod coordinate;
pub mod database;
pub mod resolver;
pub mod taxonomy;

pub use closure::{ClosureIndex, MaterializedClosure};
pub use coordinate::{ModuleFilter, StampFilter, StampFilterBuilder, StampPosition, StatusSet};
pub use database::{ChronicleConfig, Database, TaxonomyConfig, CONFIG_FILE_NAME};
pub use resolver::{LatestVersion, Resolver, TieBreak, TieBreakOrder};
pub use taxonomy::{ContradictionPolicy, TaxonomySnapshot};
