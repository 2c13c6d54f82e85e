//! Database struct and open logic
//!
//! The Database owns one [`ChronicleStore`] and the configuration read from
//! `chronicle.toml`, and hands out resolvers and taxonomy snapshots built
//! from that configuration.
//!
//! ## Write path
//!
//! Components, assemblages and paths are created through the database, and
//! versions are appended directly (committed stamp) or as drafts (uncommitted
//! stamp) that are later committed with [`Database::commit`].
//!
//! ## Read path
//!
//! Every read goes through a [`Resolver`] built from a [`StampFilter`]. The
//! resolver copies the path graph when it is built, so a resolver (and any
//! taxonomy snapshot holding one) keeps answering from the same coordinate.

pub mod config;

pub use config::{ChronicleConfig, TaxonomyConfig, CONFIG_FILE_NAME};

use crate::coordinate::StampFilter;
use crate::resolver::{LatestVersion, Resolver};
use crate::taxonomy::TaxonomySnapshot;
use chronicle_core::{FieldValue, Nid, Result, Stamp, StampSequence, Timestamp};
use chronicle_storage::{
    ChronicleStore, FieldSchema, NewComponent, PathOrigin, Version, VersionHandle,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Main database struct
///
/// Create a database with [`Database::open`] (configuration from a data
/// directory) or [`Database::in_memory`].
///
/// # Example
///
/// ```text
/// use chronicle_engine::{Database, StampFilter};
///
/// let db = Database::open("/path/to/data")?;
/// let path = db.create_path(vec![])?;
/// let concept = db.create_concept()?;
/// let latest = db.latest(concept, &StampFilter::latest_on(path))?;
/// ```
pub struct Database {
    /// Data directory path (None for in-memory databases)
    data_dir: Option<PathBuf>,

    /// Chronologies, stamps, paths and indices (thread-safe)
    store: Arc<ChronicleStore>,

    /// Configuration (mirrors chronicle.toml)
    config: ChronicleConfig,
}

impl Database {
    /// Open a database at the given path
    ///
    /// Reads `chronicle.toml` from the data directory. If no config file
    /// exists, creates one with defaults.
    ///
    /// # Errors
    ///
    /// If the directory cannot be created or the config is invalid.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        ChronicleConfig::write_default_if_missing(&config_path)?;
        let cfg = ChronicleConfig::from_file(&config_path)?;

        let mut db = Self::with_config(cfg)?;
        info!(path = %data_dir.display(), "opened database");
        db.data_dir = Some(data_dir);
        Ok(db)
    }

    /// Create an in-memory database with the default configuration
    pub fn in_memory() -> Self {
        let config = ChronicleConfig::default();
        Database {
            data_dir: None,
            store: Arc::new(ChronicleStore::with_capacity(config.initial_capacity)),
            config,
        }
    }

    /// Create an in-memory database with an explicit configuration
    pub fn with_config(config: ChronicleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Database {
            data_dir: None,
            store: Arc::new(ChronicleStore::with_capacity(config.initial_capacity)),
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ChronicleConfig {
        &self.config
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<ChronicleStore> {
        &self.store
    }

    /// Data directory, if the database was opened from one
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    // ========================================================================
    // Write API
    // ========================================================================

    /// Create (or look up) a component identified by `uuids`
    pub fn create_component(&self, uuids: &[Uuid], new: NewComponent) -> Result<Nid> {
        self.store.create_component_with_uuids(uuids, new)
    }

    /// Create a concept with a fresh identity
    pub fn create_concept(&self) -> Result<Nid> {
        self.store.create_concept()
    }

    /// Create a semantic of `assemblage` about `referenced`
    pub fn create_semantic(&self, assemblage: Nid, referenced: Nid) -> Result<Nid> {
        self.store.create_semantic(assemblage, referenced)
    }

    /// Declare the field schema of an assemblage concept
    pub fn define_assemblage(&self, assemblage: Nid, schema: FieldSchema) -> Result<Arc<FieldSchema>> {
        self.store.define_assemblage(assemblage, schema)
    }

    /// Create a path concept with the given origins
    pub fn create_path(&self, origins: Vec<PathOrigin>) -> Result<Nid> {
        let path = self.store.create_concept()?;
        self.store.declare_path(path, origins)?;
        Ok(path)
    }

    /// Declare an existing concept as a path
    pub fn declare_path(&self, path: Nid, origins: Vec<PathOrigin>) -> Result<()> {
        self.store.declare_path(path, origins)
    }

    /// Append a version; an uncommitted stamp appends a draft
    pub fn append_version(&self, nid: Nid, stamp: Stamp, values: &[FieldValue]) -> Result<VersionHandle> {
        self.store.append_version(nid, stamp, values)
    }

    /// Replace the payload of a draft
    pub fn update_draft(&self, handle: VersionHandle, values: &[FieldValue]) -> Result<()> {
        self.store.update_draft(handle, values)
    }

    /// Commit a draft at `time`
    pub fn commit(&self, handle: VersionHandle, time: Timestamp) -> Result<StampSequence> {
        self.store.commit(handle, time)
    }

    // ========================================================================
    // Read API
    // ========================================================================

    /// Committed versions in commit order, then pending drafts
    pub fn versions_of(&self, nid: Nid) -> Result<Vec<Version>> {
        self.store.versions_of(nid)
    }

    /// Build a resolver for `filter` using the configured tie-break order
    pub fn resolver(&self, filter: &StampFilter) -> Result<Resolver> {
        Resolver::with_tie_break(
            filter.clone(),
            &self.store.path_snapshot(),
            self.config.tie_break_order()?,
        )
    }

    /// Latest visible version of `nid` under `filter`
    pub fn latest(&self, nid: Nid, filter: &StampFilter) -> Result<LatestVersion> {
        let resolver = self.resolver(filter)?;
        Ok(resolver.latest(&self.store.chronology(nid)?))
    }

    /// Latest version of `nid` if its status is allowed by `filter`
    pub fn current(&self, nid: Nid, filter: &StampFilter) -> Result<LatestVersion> {
        let resolver = self.resolver(filter)?;
        Ok(resolver.current(&self.store.chronology(nid)?))
    }

    /// Taxonomy over `assemblage` seen through `filter`
    ///
    /// The child field and contradiction policy come from the `[taxonomy]`
    /// section of the configuration.
    pub fn taxonomy(&self, assemblage: Nid, filter: &StampFilter) -> Result<TaxonomySnapshot> {
        let resolver = self.resolver(filter)?;
        let snapshot = TaxonomySnapshot::new(
            Arc::clone(&self.store),
            assemblage,
            self.config.taxonomy.child_field,
            resolver,
        )?;
        Ok(snapshot.with_contradictions(self.config.contradiction_policy()?))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Recompute the secondary indices from the chronologies
    pub fn rebuild_indexes(&self) {
        self.store.rebuild_indexes();
    }

    /// Clear every table
    ///
    /// Resolvers and snapshots built before the reset keep their path copy
    /// but see no components.
    pub fn reset(&self) {
        self.store.reset();
        info!("database reset");
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::in_memory()
    }
}
