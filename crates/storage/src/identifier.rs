//! Identifier layer: UUID sets → dense Nids → per-kind sequence numbers
//!
//! Everything above this layer addresses components by [`Nid`]. The UUIDs a
//! component was created with are stable across storage compaction; the Nid
//! is the compact handle used in records and indices.
//!
//! # Thread Safety
//!
//! - Lookups are lock-free reads via DashMap
//! - Allocation takes a single mutex so that two threads racing to map the
//!   same fresh UUID agree on one Nid

use chronicle_core::{ComponentKind, Error, Nid, Result, SequenceNumber};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicI32, Ordering};
use uuid::Uuid;

/// UUIDs assigned to one Nid (almost always exactly one)
pub type UuidSet = SmallVec<[Uuid; 1]>;

/// Bidirectional UUID ↔ Nid map with per-kind sequence numbering
pub struct IdentifierMap {
    uuid_to_nid: DashMap<Uuid, Nid>,
    nid_to_uuids: DashMap<Nid, UuidSet>,
    /// Nid → (kind, sequence within kind)
    kinds: DashMap<Nid, (ComponentKind, SequenceNumber)>,
    /// Sequence → Nid, one dense vector per kind
    concept_sequences: RwLock<Vec<Nid>>,
    semantic_sequences: RwLock<Vec<Nid>>,
    next_nid: AtomicI32,
    allocation: Mutex<()>,
}

impl IdentifierMap {
    /// Create an empty identifier map
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with expected number of components
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uuid_to_nid: DashMap::with_capacity(capacity),
            nid_to_uuids: DashMap::with_capacity(capacity),
            kinds: DashMap::with_capacity(capacity),
            concept_sequences: RwLock::new(Vec::new()),
            semantic_sequences: RwLock::new(Vec::new()),
            next_nid: AtomicI32::new(Nid::FIRST.as_i32()),
            allocation: Mutex::new(()),
        }
    }

    /// Map a UUID set to its Nid, allocating on first sight
    ///
    /// Idempotent: any later call containing a UUID that is already mapped
    /// returns the same Nid. A set whose members are mapped to two different
    /// Nids is rejected.
    pub fn nid_for(&self, uuids: &[Uuid]) -> Result<Nid> {
        if uuids.is_empty() {
            return Err(Error::InvalidOperation(
                "cannot allocate a nid for an empty uuid set".to_string(),
            ));
        }

        if let Some(nid) = self.existing_nid(uuids)? {
            return Ok(nid);
        }

        let _guard = self.allocation.lock();
        // Another thread may have allocated while we waited
        if let Some(nid) = self.existing_nid(uuids)? {
            return Ok(nid);
        }

        let nid = Nid::new(self.next_nid.fetch_add(1, Ordering::AcqRel));
        let mut set = UuidSet::new();
        for uuid in uuids {
            if !set.contains(uuid) {
                set.push(*uuid);
            }
        }
        for uuid in &set {
            self.uuid_to_nid.insert(*uuid, nid);
        }
        self.nid_to_uuids.insert(nid, set);
        tracing::trace!(%nid, "allocated nid");
        Ok(nid)
    }

    /// Allocate a Nid for a freshly generated random UUID
    pub fn allocate(&self) -> Nid {
        let uuid = Uuid::new_v4();
        let _guard = self.allocation.lock();
        let nid = Nid::new(self.next_nid.fetch_add(1, Ordering::AcqRel));
        self.uuid_to_nid.insert(uuid, nid);
        self.nid_to_uuids.insert(nid, smallvec::smallvec![uuid]);
        nid
    }

    /// Nid already bound to any UUID of the set, without allocating
    pub fn existing_nid(&self, uuids: &[Uuid]) -> Result<Option<Nid>> {
        let mut found: Option<Nid> = None;
        for uuid in uuids {
            if let Some(nid) = self.uuid_to_nid.get(uuid).map(|e| *e.value()) {
                match found {
                    Some(prev) if prev != nid => {
                        return Err(Error::InvalidOperation(format!(
                            "uuid set spans two components: {} and {}",
                            prev, nid
                        )))
                    }
                    _ => found = Some(nid),
                }
            }
        }
        Ok(found)
    }

    /// UUIDs assigned to a Nid
    pub fn uuids_for(&self, nid: Nid) -> Result<UuidSet> {
        self.nid_to_uuids
            .get(&nid)
            .map(|e| e.value().clone())
            .ok_or(Error::UnknownIdentifier(nid))
    }

    /// Look up the Nid of a single UUID without allocating
    pub fn nid_for_uuid(&self, uuid: &Uuid) -> Option<Nid> {
        self.uuid_to_nid.get(uuid).map(|e| *e.value())
    }

    /// Check if a Nid was ever allocated
    pub fn contains(&self, nid: Nid) -> bool {
        self.nid_to_uuids.contains_key(&nid)
    }

    /// Assign the kind and next sequence number of that kind to a Nid
    ///
    /// Idempotent for the same kind. Registering an allocated Nid under a
    /// second kind is rejected.
    pub fn register_kind(&self, nid: Nid, kind: ComponentKind) -> Result<SequenceNumber> {
        if !self.contains(nid) {
            return Err(Error::UnknownIdentifier(nid));
        }
        let entry = self.kinds.entry(nid).or_insert_with(|| {
            let mut sequences = self.sequences(kind).write();
            let seq = SequenceNumber::new(sequences.len() as u32);
            sequences.push(nid);
            (kind, seq)
        });
        let (registered, seq) = *entry.value();
        if registered != kind {
            return Err(Error::InvalidOperation(format!(
                "{} is a {}, not a {}",
                nid, registered, kind
            )));
        }
        Ok(seq)
    }

    /// Kind registered for a Nid
    pub fn kind_of(&self, nid: Nid) -> Result<ComponentKind> {
        self.kinds
            .get(&nid)
            .map(|e| e.value().0)
            .ok_or(Error::UnknownIdentifier(nid))
    }

    /// Sequence number of a Nid within its kind
    pub fn sequence_for(&self, nid: Nid) -> Result<SequenceNumber> {
        self.kinds
            .get(&nid)
            .map(|e| e.value().1)
            .ok_or(Error::UnknownIdentifier(nid))
    }

    /// Nid holding a sequence number of the given kind
    pub fn nid_for_sequence(&self, kind: ComponentKind, seq: SequenceNumber) -> Option<Nid> {
        self.sequences(kind).read().get(seq.as_index()).copied()
    }

    /// Number of sequence numbers handed out for a kind
    pub fn sequence_count(&self, kind: ComponentKind) -> usize {
        self.sequences(kind).read().len()
    }

    /// Re-install a previously allocated mapping (used when reloading records)
    ///
    /// The Nid counter is advanced past `nid` so later allocations never reuse it.
    pub fn restore(&self, nid: Nid, uuids: &[Uuid], kind: ComponentKind) -> Result<SequenceNumber> {
        let _guard = self.allocation.lock();
        match self.existing_nid(uuids)? {
            Some(existing) if existing != nid => {
                return Err(Error::InvalidOperation(format!(
                    "cannot restore {}: uuids already mapped to {}",
                    nid, existing
                )))
            }
            Some(_) => {}
            None => {
                if self.nid_to_uuids.contains_key(&nid) {
                    return Err(Error::InvalidOperation(format!(
                        "cannot restore {}: nid already carries other uuids",
                        nid
                    )));
                }
                let set: UuidSet = uuids.iter().copied().collect();
                for uuid in &set {
                    self.uuid_to_nid.insert(*uuid, nid);
                }
                self.nid_to_uuids.insert(nid, set);
            }
        }
        self.next_nid
            .fetch_max(nid.as_i32().saturating_add(1), Ordering::AcqRel);
        drop(_guard);
        self.register_kind(nid, kind)
    }

    /// Number of allocated Nids
    pub fn len(&self) -> usize {
        self.nid_to_uuids.len()
    }

    /// Check if no Nid was allocated
    pub fn is_empty(&self) -> bool {
        self.nid_to_uuids.is_empty()
    }

    /// Forget every mapping and restart numbering
    pub fn reset(&self) {
        let _guard = self.allocation.lock();
        self.uuid_to_nid.clear();
        self.nid_to_uuids.clear();
        self.kinds.clear();
        self.concept_sequences.write().clear();
        self.semantic_sequences.write().clear();
        self.next_nid.store(Nid::FIRST.as_i32(), Ordering::Release);
    }

    fn sequences(&self, kind: ComponentKind) -> &RwLock<Vec<Nid>> {
        match kind {
            ComponentKind::Concept => &self.concept_sequences,
            ComponentKind::Semantic => &self.semantic_sequences,
        }
    }
}

impl Default for IdentifierMap {
    fn default() -> Self {
        Self::new()
    }
}
