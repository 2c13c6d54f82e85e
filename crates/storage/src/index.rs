//! Secondary indices over semantic chronologies
//!
//! These indices let the taxonomy engine find candidate semantics without
//! scanning every chronology:
//! - by assemblage: assemblage Nid → semantics in it
//! - by referenced component: (assemblage, referenced Nid) → semantics about it
//! - by field value: Nid stored in a NID field → semantics carrying it
//!
//! Every index answers with a superset. Entries are added when a semantic is
//! created or a version is committed, and are never removed by later versions;
//! callers re-validate each hit against their own visibility filter.

use chronicle_core::Nid;
use rustc_hash::{FxHashMap, FxHashSet};

/// Reverse lookup from a Nid held in a field to the semantics holding it
///
/// Implementations may be stale or over-inclusive; callers must never treat
/// a hit as proof of a currently visible edge.
pub trait FieldValueIndex: Send + Sync {
    /// Semantics that carry `value` in some NID-typed field
    fn find_semantics_referencing_field_value(&self, value: Nid) -> Vec<Nid>;
}

/// Multimap Nid → set of Nids
#[derive(Debug, Default, Clone)]
pub struct NidIndex {
    index: FxHashMap<Nid, FxHashSet<Nid>>,
}

impl NidIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
        }
    }

    /// Add `member` under `key`
    pub fn insert(&mut self, key: Nid, member: Nid) {
        self.index.entry(key).or_default().insert(member);
    }

    /// Members stored under `key`
    pub fn get(&self, key: &Nid) -> Option<&FxHashSet<Nid>> {
        self.index.get(key)
    }

    /// Members stored under `key`, sorted for deterministic iteration
    pub fn sorted(&self, key: &Nid) -> Vec<Nid> {
        let mut members: Vec<Nid> = self
            .index
            .get(key)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.index.len()
    }
}

/// All secondary indices the store maintains
#[derive(Debug, Default, Clone)]
pub struct SemanticIndex {
    by_assemblage: NidIndex,
    by_referenced: FxHashMap<Nid, NidIndex>,
    by_field_value: NidIndex,
}

impl SemanticIndex {
    /// Create empty indices
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly created semantic
    pub fn add_semantic(&mut self, semantic: Nid, assemblage: Nid, referenced: Nid) {
        self.by_assemblage.insert(assemblage, semantic);
        self.by_referenced
            .entry(assemblage)
            .or_default()
            .insert(referenced, semantic);
    }

    /// Record the Nids held by a committed version's NID fields
    pub fn add_field_values(&mut self, semantic: Nid, values: impl IntoIterator<Item = Nid>) {
        for value in values {
            self.by_field_value.insert(value, semantic);
        }
    }

    /// Semantics in an assemblage
    pub fn in_assemblage(&self, assemblage: Nid) -> Vec<Nid> {
        self.by_assemblage.sorted(&assemblage)
    }

    /// Semantics in an assemblage whose referenced component is `referenced`
    pub fn referencing(&self, assemblage: Nid, referenced: Nid) -> Vec<Nid> {
        self.by_referenced
            .get(&assemblage)
            .map(|index| index.sorted(&referenced))
            .unwrap_or_default()
    }

    /// Semantics holding `value` in a NID field
    pub fn with_field_value(&self, value: Nid) -> Vec<Nid> {
        self.by_field_value.sorted(&value)
    }

    /// Check if nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.by_assemblage.is_empty() && self.by_field_value.is_empty()
    }
}
