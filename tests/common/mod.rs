//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

pub use chronicle::{
    ChronicleConfig, ClosureIndex, ContradictionPolicy, Database, Error, FieldSchema, FieldType, FieldValue,
    LatestVersion, MaterializedClosure, ModuleFilter, Nid, PathOrigin, Stamp, StampFilter,
    Status, StatusSet, TaxonomySnapshot, Timestamp,
};
use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Millisecond timestamp shorthand.
pub fn ms(t: i64) -> Timestamp {
    Timestamp::from_millis(t)
}

// ============================================================================
// TestDb - database plus the concepts every scenario needs
// ============================================================================

/// In-memory database with one author, two modules and one root path.
pub struct TestDb {
    pub db: Database,
    pub author: Nid,
    pub m1: Nid,
    pub m2: Nid,
    pub p1: Nid,
}

impl TestDb {
    /// Create a database with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ChronicleConfig::default())
    }

    /// Create a database with an explicit configuration.
    pub fn with_config(config: ChronicleConfig) -> Self {
        init_tracing();
        let db = Database::with_config(config).expect("valid config");
        let author = db.create_concept().unwrap();
        let m1 = db.create_concept().unwrap();
        let m2 = db.create_concept().unwrap();
        let p1 = db.create_path(vec![]).unwrap();
        TestDb {
            db,
            author,
            m1,
            m2,
            p1,
        }
    }

    /// Committed stamp authored by the fixture author.
    pub fn stamp(&self, status: Status, t: i64, module: Nid, path: Nid) -> Stamp {
        Stamp::new(status, ms(t), self.author, module, path)
    }

    /// Concept with one active version at `t` on `path`.
    pub fn concept_at(&self, t: i64, path: Nid) -> Nid {
        let nid = self.db.create_concept().unwrap();
        self.db
            .append_version(nid, self.stamp(Status::Active, t, self.m1, path), &[])
            .unwrap();
        nid
    }

    /// Assemblage whose semantics carry a single child NID.
    pub fn is_a_assemblage(&self) -> Nid {
        let isa = self.db.create_concept().unwrap();
        self.db
            .define_assemblage(isa, FieldSchema::new(vec![FieldType::Nid]))
            .unwrap();
        isa
    }

    /// Semantic asserting `child` is-a `parent`, first version stamped `stamp`.
    pub fn edge(&self, isa: Nid, parent: Nid, child: Nid, stamp: Stamp) -> Nid {
        let edge = self.db.create_semantic(isa, parent).unwrap();
        self.db
            .append_version(edge, stamp, &[FieldValue::Nid(child)])
            .unwrap();
        edge
    }

    /// Filter standing at `t` on `path`, Active only, modules `[m1]`.
    pub fn filter_at(&self, path: Nid, t: i64) -> StampFilter {
        StampFilter::builder()
            .allow_status(Status::Active)
            .position(path, ms(t))
            .module(self.m1)
            .build()
            .unwrap()
    }
}
