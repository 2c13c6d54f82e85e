//! Contract types for API stability
//!
//! This module contains the provenance types every version carries:
//!
//! - `timestamp`: Signed millisecond stamp time with the uncommitted sentinel
//! - `stamp`: The (Status, Time, Author, Module, Path) tuple and its interned sequence
//!
//! ## Usage
//!
//! ```
//! use chronicle_core::contract::{Stamp, StampSequence, Status, Timestamp};
//! ```

pub mod stamp;
pub mod timestamp;

// Re-exports
pub use stamp::{Stamp, StampSequence, Status};
pub use timestamp::Timestamp;
