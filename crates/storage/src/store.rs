//! Chronicle store: the owner of every chronology
//!
//! # Design
//!
//! - DashMap keyed by Nid, one `RwLock<Chronology>` per component
//! - Appends to one component serialize on its lock; different components
//!   never contend
//! - Readers take a cloned snapshot of a chronology (copy-on-read), so
//!   resolution never holds a lock while it runs
//!
//! # Lock Order
//!
//! chronology lock → stamp table → secondary index lock. Readers of the
//! index copy their answer out and release the index lock before touching
//! any chronology.

use crate::chronology::{Chronology, Payload, Version, VersionHandle};
use crate::codec::{BrittleTuple, FieldSchema};
use crate::format::{ChronologyRecord, SemanticHeader, StampTableRecord, VersionRecord};
use crate::identifier::{IdentifierMap, UuidSet};
use crate::index::{FieldValueIndex, SemanticIndex};
use crate::path::{PathGraph, PathOrigin, PathOrigins};
use crate::stamp_table::StampTable;
use chronicle_core::{
    ComponentKind, Error, FieldValue, Nid, Result, Stamp, StampSequence, Status, Timestamp,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// What kind of component to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewComponent {
    /// A concept
    Concept,
    /// A semantic in `assemblage` about `referenced`
    Semantic {
        /// Assemblage the semantic belongs to
        assemblage: Nid,
        /// Component the semantic is about
        referenced: Nid,
    },
}

impl NewComponent {
    /// Kind of the component to create
    pub fn kind(&self) -> ComponentKind {
        match self {
            NewComponent::Concept => ComponentKind::Concept,
            NewComponent::Semantic { .. } => ComponentKind::Semantic,
        }
    }
}

/// Versioned component store
///
/// # Thread Safety
///
/// All operations take `&self`. Share the store with `Arc`.
pub struct ChronicleStore {
    ids: IdentifierMap,
    stamps: StampTable,
    paths: PathGraph,
    assemblages: DashMap<Nid, Arc<FieldSchema>>,
    chronologies: DashMap<Nid, Arc<RwLock<Chronology>>>,
    index: RwLock<SemanticIndex>,
}

impl ChronicleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with expected number of components
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: IdentifierMap::with_capacity(capacity),
            stamps: StampTable::new(),
            paths: PathGraph::new(),
            assemblages: DashMap::new(),
            chronologies: DashMap::with_capacity(capacity),
            index: RwLock::new(SemanticIndex::new()),
        }
    }

    /// The identifier layer
    pub fn identifiers(&self) -> &IdentifierMap {
        &self.ids
    }

    /// The stamp table
    pub fn stamp_table(&self) -> &StampTable {
        &self.stamps
    }

    /// The path origin graph
    pub fn paths(&self) -> &PathGraph {
        &self.paths
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Create a component under a fresh random UUID
    pub fn create_component(&self, new: NewComponent) -> Result<Nid> {
        self.create_component_with_uuids(&[Uuid::new_v4()], new)
    }

    /// Create a component identified by `uuids`
    ///
    /// Idempotent: creating the same component again returns its Nid. A UUID
    /// set already bound to a component of a different shape is rejected.
    pub fn create_component_with_uuids(&self, uuids: &[Uuid], new: NewComponent) -> Result<Nid> {
        if let NewComponent::Semantic {
            assemblage,
            referenced,
        } = new
        {
            self.schema(assemblage)?;
            if !self.ids.contains(referenced) {
                return Err(Error::UnknownIdentifier(referenced));
            }
        }

        if let Some(existing) = self.ids.existing_nid(uuids)? {
            let kind = self.ids.kind_of(existing).unwrap_or(new.kind());
            if kind != new.kind() {
                return Err(Error::InvalidOperation(format!(
                    "{} is a {}, not a {}",
                    existing,
                    kind,
                    new.kind()
                )));
            }
        }

        let nid = self.ids.nid_for(uuids)?;
        self.ids.register_kind(nid, new.kind())?;

        let created = match self.chronologies.entry(nid) {
            Entry::Occupied(existing) => {
                let existing = existing.get().read();
                let same = match new {
                    NewComponent::Concept => existing.kind() == ComponentKind::Concept,
                    NewComponent::Semantic {
                        assemblage,
                        referenced,
                    } => {
                        existing.assemblage() == Some(assemblage)
                            && existing.referenced_component() == Some(referenced)
                    }
                };
                if !same {
                    return Err(Error::InvalidOperation(format!(
                        "{} already exists with a different shape",
                        nid
                    )));
                }
                false
            }
            Entry::Vacant(slot) => {
                let chronology = match new {
                    NewComponent::Concept => Chronology::concept(nid),
                    NewComponent::Semantic {
                        assemblage,
                        referenced,
                    } => Chronology::semantic(nid, assemblage, referenced),
                };
                slot.insert(Arc::new(RwLock::new(chronology)));
                true
            }
        };

        if created {
            if let NewComponent::Semantic {
                assemblage,
                referenced,
            } = new
            {
                self.index.write().add_semantic(nid, assemblage, referenced);
            }
            tracing::debug!(%nid, kind = %new.kind(), "created component");
        }
        Ok(nid)
    }

    /// Create a concept under a fresh random UUID
    pub fn create_concept(&self) -> Result<Nid> {
        self.create_component(NewComponent::Concept)
    }

    /// Create a semantic under a fresh random UUID
    pub fn create_semantic(&self, assemblage: Nid, referenced: Nid) -> Result<Nid> {
        self.create_component(NewComponent::Semantic {
            assemblage,
            referenced,
        })
    }

    /// Check if a component exists
    pub fn contains(&self, nid: Nid) -> bool {
        self.chronologies.contains_key(&nid)
    }

    /// Kind of an existing component
    pub fn kind_of(&self, nid: Nid) -> Result<ComponentKind> {
        self.ids.kind_of(nid)
    }

    /// UUIDs of an existing component
    pub fn uuids_for(&self, nid: Nid) -> Result<UuidSet> {
        self.ids.uuids_for(nid)
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.chronologies.len()
    }

    /// Check if the store holds no component
    pub fn is_empty(&self) -> bool {
        self.chronologies.is_empty()
    }

    // ========================================================================
    // Assemblages and paths
    // ========================================================================

    /// Declare the field schema of an assemblage
    ///
    /// The assemblage must be an existing component. Declaring the same
    /// schema twice is a no-op; a different schema is rejected.
    pub fn define_assemblage(&self, assemblage: Nid, schema: FieldSchema) -> Result<Arc<FieldSchema>> {
        if !self.ids.contains(assemblage) {
            return Err(Error::UnknownIdentifier(assemblage));
        }
        self.install_schema(assemblage, schema)
    }

    fn install_schema(&self, assemblage: Nid, schema: FieldSchema) -> Result<Arc<FieldSchema>> {
        match self.assemblages.entry(assemblage) {
            Entry::Occupied(existing) if **existing.get() == schema => Ok(Arc::clone(existing.get())),
            Entry::Occupied(_) => Err(Error::InvalidOperation(format!(
                "assemblage {} already declared with a different schema",
                assemblage
            ))),
            Entry::Vacant(slot) => {
                tracing::debug!(%assemblage, arity = schema.arity(), "defined assemblage");
                Ok(Arc::clone(slot.insert(Arc::new(schema)).value()))
            }
        }
    }

    /// Field schema of an assemblage
    pub fn schema(&self, assemblage: Nid) -> Result<Arc<FieldSchema>> {
        self.assemblages
            .get(&assemblage)
            .map(|e| Arc::clone(e.value()))
            .ok_or(Error::UnknownAssemblage(assemblage))
    }

    /// Declare a path concept and its origins
    pub fn declare_path(&self, path: Nid, origins: Vec<PathOrigin>) -> Result<()> {
        for nid in std::iter::once(path).chain(origins.iter().map(|o| o.path)) {
            if self.ids.kind_of(nid)? != ComponentKind::Concept {
                return Err(Error::InvalidOperation(format!("{} is not a concept", nid)));
            }
        }
        self.paths.add_path(path, origins)
    }

    /// Origins of a path, in declaration order
    pub fn path_origins(&self, path: Nid) -> Vec<PathOrigin> {
        self.paths.origins(path)
    }

    /// Consistent copy of the path graph
    pub fn path_snapshot(&self) -> PathOrigins {
        self.paths.snapshot()
    }

    /// Intern a committed stamp
    pub fn intern_stamp(
        &self,
        status: Status,
        time: Timestamp,
        author: Nid,
        module: Nid,
        path: Nid,
    ) -> Result<StampSequence> {
        self.stamps.intern_parts(status, time, author, module, path)
    }

    // ========================================================================
    // Versions
    // ========================================================================

    fn handle(&self, nid: Nid) -> Result<Arc<RwLock<Chronology>>> {
        self.chronologies
            .get(&nid)
            .map(|e| Arc::clone(e.value()))
            .ok_or(Error::UnknownIdentifier(nid))
    }

    fn payload_for(&self, chronology: &RwLock<Chronology>, values: &[FieldValue]) -> Result<Payload> {
        let assemblage = chronology.read().assemblage();
        match assemblage {
            None if values.is_empty() => Ok(Payload::Concept),
            None => Err(Error::ArityMismatch {
                declared: 0,
                actual: values.len(),
            }),
            Some(assemblage) => Ok(Payload::Fields(BrittleTuple::new(
                self.schema(assemblage)?,
                values,
            )?)),
        }
    }

    fn index_committed(&self, nid: Nid, version: &Version) {
        if let Some(fields) = version.fields() {
            let values = fields.referenced_nids();
            if !values.is_empty() {
                self.index.write().add_field_values(nid, values);
            }
        }
    }

    /// Append a version to a component
    ///
    /// A stamp whose time is `UNCOMMITTED` creates a draft; any other stamp is
    /// interned and the version is committed immediately.
    ///
    /// # Errors
    ///
    /// - `UnknownIdentifier` if the component does not exist
    /// - `ArityMismatch`/`FieldTypeMismatch` if the values do not fit the schema
    /// - `TimeRegression` if a committed stamp predates the latest commit
    pub fn append_version(&self, nid: Nid, stamp: Stamp, values: &[FieldValue]) -> Result<VersionHandle> {
        let chronology = self.handle(nid)?;
        let payload = self.payload_for(&chronology, values)?;

        if stamp.is_uncommitted() {
            let slot = chronology.write().append_draft(Version::draft(stamp, payload));
            tracing::debug!(%nid, slot, "appended draft");
            return Ok(VersionHandle { nid, slot });
        }

        let mut guard = chronology.write();
        guard.check_order(stamp.time)?;
        let seq = self.stamps.intern(stamp)?;
        let slot = guard.append_committed(Version::committed(stamp, seq, payload))?;
        if let Some(version) = guard.committed().last() {
            self.index_committed(nid, version);
        }
        tracing::debug!(%nid, slot, %seq, "appended committed version");
        Ok(VersionHandle { nid, slot })
    }

    /// Replace the fields of a draft in place
    pub fn update_draft(&self, handle: VersionHandle, values: &[FieldValue]) -> Result<()> {
        let chronology = self.handle(handle.nid)?;
        let payload = self.payload_for(&chronology, values)?;
        let mut guard = chronology.write();
        guard.replace_draft_payload(handle.slot, payload)
    }

    /// Commit a draft at `time`, assigning its stamp sequence
    ///
    /// The transition happens under the component's write lock, so readers see
    /// either the draft or the committed version, never a mix.
    ///
    /// # Errors
    ///
    /// - `UncommittedStamp` if `time` is the uncommitted sentinel
    /// - `AlreadyCommitted` if the draft was committed before
    /// - `TimeRegression` if `time` predates the latest commit
    pub fn commit(&self, handle: VersionHandle, time: Timestamp) -> Result<StampSequence> {
        if time.is_uncommitted() {
            return Err(Error::UncommittedStamp);
        }
        let chronology = self.handle(handle.nid)?;
        let mut guard = chronology.write();
        let stamp = guard.check_commit(handle.slot, time)?.stamp().with_time(time);
        let seq = self.stamps.intern(stamp)?;
        let version = guard.commit_draft(handle.slot, stamp, seq)?;
        self.index_committed(handle.nid, version);
        tracing::debug!(nid = %handle.nid, slot = handle.slot, %seq, "committed version");
        Ok(seq)
    }

    /// Every version of a component: committed in commit order, then drafts
    pub fn versions_of(&self, nid: Nid) -> Result<Vec<Version>> {
        let chronology = self.handle(nid)?;
        let guard = chronology.read();
        Ok(guard.versions().cloned().collect())
    }

    /// Consistent copy of a component's chronology
    pub fn chronology(&self, nid: Nid) -> Result<Chronology> {
        let chronology = self.handle(nid)?;
        let snapshot = chronology.read().clone();
        Ok(snapshot)
    }

    // ========================================================================
    // Secondary indices
    // ========================================================================

    /// Semantics belonging to an assemblage
    pub fn semantics_in_assemblage(&self, assemblage: Nid) -> Vec<Nid> {
        self.index.read().in_assemblage(assemblage)
    }

    /// Semantics of an assemblage about `referenced`
    pub fn semantics_referencing(&self, assemblage: Nid, referenced: Nid) -> Vec<Nid> {
        self.index.read().referencing(assemblage, referenced)
    }

    /// Recompute the secondary indices from the chronologies
    ///
    /// Meant for a quiescent store; commits that race with the rebuild may
    /// be missing until the next rebuild.
    pub fn rebuild_indexes(&self) {
        let mut fresh = SemanticIndex::new();
        let handles: Vec<_> = self
            .chronologies
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();
        for chronology in handles {
            let chronology = chronology.read();
            if let (Some(assemblage), Some(referenced)) =
                (chronology.assemblage(), chronology.referenced_component())
            {
                fresh.add_semantic(chronology.nid(), assemblage, referenced);
            }
            for version in chronology.committed() {
                if let Some(fields) = version.fields() {
                    fresh.add_field_values(chronology.nid(), fields.referenced_nids());
                }
            }
        }
        *self.index.write() = fresh;
        tracing::info!(components = self.chronologies.len(), "rebuilt secondary indices");
    }

    /// Drop every component, stamp, path and assemblage
    ///
    /// Must not race with writers.
    pub fn reset(&self) {
        self.chronologies.clear();
        *self.index.write() = SemanticIndex::new();
        self.assemblages.clear();
        self.paths.reset();
        self.stamps.reset();
        self.ids.reset();
        tracing::info!("store reset");
    }

    // ========================================================================
    // Export / import
    // ========================================================================

    /// Encode the stamp table
    pub fn export_stamps(&self) -> Vec<u8> {
        StampTableRecord {
            rows: self.stamps.entries(),
        }
        .to_bytes()
    }

    /// Load a stamp table record
    pub fn import_stamps(&self, bytes: &[u8]) -> Result<()> {
        let record = StampTableRecord::from_bytes(bytes)?;
        self.stamps.restore(&record.rows)
    }

    /// Encode the committed part of a chronology
    pub fn export_chronology(&self, nid: Nid) -> Result<Vec<u8>> {
        let chronology = self.chronology(nid)?;
        let semantic = match chronology.assemblage() {
            Some(assemblage) => Some(SemanticHeader {
                assemblage,
                referenced: chronology
                    .referenced_component()
                    .ok_or_else(|| Error::Corruption(format!("{} has no referenced component", nid)))?,
                fields: self.schema(assemblage)?.types().to_vec(),
            }),
            None => None,
        };
        let versions = chronology
            .committed()
            .iter()
            .map(|v| {
                Ok(VersionRecord {
                    stamp: v
                        .stamp_sequence()
                        .ok_or_else(|| Error::Corruption(format!("{} committed without a stamp", nid)))?,
                    payload: v.payload().as_bytes().to_vec(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ChronologyRecord {
            nid,
            kind: chronology.kind(),
            uuids: self.ids.uuids_for(nid)?.to_vec(),
            semantic,
            versions,
        }
        .to_bytes())
    }

    /// Load a chronology record
    ///
    /// The stamp table it refers to must have been imported first.
    pub fn import_chronology(&self, bytes: &[u8]) -> Result<Nid> {
        let record = ChronologyRecord::from_bytes(bytes)?;
        let nid = record.nid;
        if record.uuids.is_empty() {
            return Err(Error::Corruption(format!("{} has no uuids", nid)));
        }
        if self.contains(nid) {
            return Err(Error::InvalidOperation(format!("{} already present", nid)));
        }

        let (mut chronology, schema) = match (record.kind, record.semantic) {
            (ComponentKind::Concept, None) => (Chronology::concept(nid), None),
            (ComponentKind::Semantic, Some(header)) => {
                let declared = FieldSchema::new(header.fields);
                let schema = match self.assemblages.get(&header.assemblage) {
                    Some(existing) if **existing.value() == declared => Arc::clone(existing.value()),
                    Some(_) => {
                        return Err(Error::InvalidOperation(format!(
                            "assemblage {} already declared with a different schema",
                            header.assemblage
                        )))
                    }
                    None => Arc::new(declared),
                };
                (
                    Chronology::semantic(nid, header.assemblage, header.referenced),
                    Some((header.assemblage, schema)),
                )
            }
            (kind, _) => {
                return Err(Error::Corruption(format!(
                    "{} record header does not match kind {}",
                    nid, kind
                )))
            }
        };

        for version in record.versions {
            let stamp = self.stamps.stamp(version.stamp)?;
            let payload = match &schema {
                None if version.payload.is_empty() => Payload::Concept,
                None => {
                    return Err(Error::Corruption(format!(
                        "concept {} carries a field payload",
                        nid
                    )))
                }
                Some((_, schema)) => {
                    Payload::Fields(BrittleTuple::from_bytes(Arc::clone(schema), &version.payload)?)
                }
            };
            chronology.append_committed(Version::committed(stamp, version.stamp, payload))?;
        }

        // Nothing is installed until every version decoded
        if let Some((assemblage, schema)) = schema {
            self.install_schema(assemblage, (*schema).clone())?;
        }
        self.ids.restore(nid, &record.uuids, record.kind)?;
        match self.chronologies.entry(nid) {
            Entry::Occupied(_) => {
                return Err(Error::InvalidOperation(format!("{} already present", nid)))
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(chronology.clone())));
            }
        }

        let mut shared = self.index.write();
        if let (Some(assemblage), Some(referenced)) =
            (chronology.assemblage(), chronology.referenced_component())
        {
            shared.add_semantic(nid, assemblage, referenced);
        }
        for version in chronology.committed() {
            if let Some(fields) = version.fields() {
                shared.add_field_values(nid, fields.referenced_nids());
            }
        }
        drop(shared);

        tracing::debug!(%nid, versions = chronology.len(), "imported chronology");
        Ok(nid)
    }
}

impl Default for ChronicleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldValueIndex for ChronicleStore {
    fn find_semantics_referencing_field_value(&self, value: Nid) -> Vec<Nid> {
        self.index.read().with_field_value(value)
    }
}
