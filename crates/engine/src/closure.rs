//! Transitive closure collaborators
//!
//! Taxonomy snapshots never walk the whole graph to answer transitive
//! questions. A [`ClosureIndex`] supplies them instead; [`MaterializedClosure`]
//! is an in-memory one computed once from a snapshot and a root set.

use crate::taxonomy::TaxonomySnapshot;
use chronicle_core::{Nid, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Precomputed transitive closure over one assemblage
pub trait ClosureIndex: Send + Sync {
    /// Assemblage the closure was computed over
    fn assemblage(&self) -> Nid;

    /// Check if `descendant` lies transitively below `ancestor`
    fn is_descendant_of(&self, descendant: Nid, ancestor: Nid) -> bool;
}

/// Ancestor sets materialized from a taxonomy snapshot
///
/// The closure reflects the snapshot it was built from. It is not updated by
/// later commits; rebuild it when the assemblage changes.
#[derive(Debug, Clone)]
pub struct MaterializedClosure {
    assemblage: Nid,
    ancestors: FxHashMap<Nid, FxHashSet<Nid>>,
}

impl MaterializedClosure {
    /// Walk the snapshot down from `roots` and record every ancestor set
    pub fn build(snapshot: &TaxonomySnapshot, roots: &[Nid]) -> Result<Self> {
        let mut parents: FxHashMap<Nid, FxHashSet<Nid>> = FxHashMap::default();
        let mut seen: FxHashSet<Nid> = roots.iter().copied().collect();
        let mut queue: VecDeque<Nid> = roots.iter().copied().collect();

        while let Some(parent) = queue.pop_front() {
            for child in snapshot.children(parent)? {
                parents.entry(child).or_default().insert(parent);
                if seen.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        let mut ancestors = FxHashMap::default();
        for concept in &seen {
            let mut found = FxHashSet::default();
            let mut stack: Vec<Nid> = parents
                .get(concept)
                .map(|p| p.iter().copied().collect())
                .unwrap_or_default();
            while let Some(next) = stack.pop() {
                if found.insert(next) {
                    if let Some(up) = parents.get(&next) {
                        stack.extend(up.iter().copied());
                    }
                }
            }
            ancestors.insert(*concept, found);
        }

        tracing::debug!(
            assemblage = %snapshot.assemblage(),
            concepts = ancestors.len(),
            "materialized closure"
        );
        Ok(MaterializedClosure {
            assemblage: snapshot.assemblage(),
            ancestors,
        })
    }

    /// Every ancestor of `concept`, sorted
    pub fn ancestors_of(&self, concept: Nid) -> Vec<Nid> {
        let mut ancestors: Vec<Nid> = self
            .ancestors
            .get(&concept)
            .map(|a| a.iter().copied().collect())
            .unwrap_or_default();
        ancestors.sort();
        ancestors
    }

    /// Number of concepts reached from the roots
    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    /// Check if nothing was reached
    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }
}

impl ClosureIndex for MaterializedClosure {
    fn assemblage(&self) -> Nid {
        self.assemblage
    }

    fn is_descendant_of(&self, descendant: Nid, ancestor: Nid) -> bool {
        self.ancestors
            .get(&descendant)
            .map_or(false, |a| a.contains(&ancestor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::StampFilter;
    use crate::resolver::Resolver;
    use chronicle_core::{FieldType, FieldValue, Stamp, Status, Timestamp};
    use chronicle_storage::{ChronicleStore, FieldSchema};
    use std::sync::Arc;

    #[test]
    fn test_closure_over_diamond() {
        let store = Arc::new(ChronicleStore::new());
        let isa = store.create_concept().unwrap();
        store
            .define_assemblage(isa, FieldSchema::new(vec![FieldType::Nid]))
            .unwrap();
        let path = store.create_concept().unwrap();
        store.declare_path(path, vec![]).unwrap();
        let stamp = Stamp::new(Status::Active, Timestamp::from_millis(1), path, path, path);

        let concept = || {
            let nid = store.create_concept().unwrap();
            store.append_version(nid, stamp, &[]).unwrap();
            nid
        };
        let (top, left, right, bottom) = (concept(), concept(), concept(), concept());
        for (parent, child) in [(top, left), (top, right), (left, bottom), (right, bottom)] {
            let edge = store.create_semantic(isa, parent).unwrap();
            store
                .append_version(edge, stamp, &[FieldValue::Nid(child)])
                .unwrap();
        }

        let resolver = Resolver::new(StampFilter::latest_on(path), &store.path_snapshot()).unwrap();
        let snapshot = TaxonomySnapshot::new(Arc::clone(&store), isa, 0, resolver).unwrap();
        let closure = MaterializedClosure::build(&snapshot, &[top]).unwrap();

        assert_eq!(closure.len(), 4);
        assert!(closure.is_descendant_of(bottom, top));
        assert!(closure.is_descendant_of(bottom, left));
        assert!(!closure.is_descendant_of(left, right));
        assert!(!closure.is_descendant_of(top, bottom));
        let mut expected = vec![top, left, right];
        expected.sort();
        assert_eq!(closure.ancestors_of(bottom), expected);

        let snapshot = snapshot.with_closure(Arc::new(closure)).unwrap();
        assert!(snapshot.is_descendant_of(bottom, top).unwrap());
        assert!(snapshot.kind_of(bottom, bottom).unwrap());
        assert!(snapshot.kind_of(bottom, left).unwrap());
        assert!(!snapshot.kind_of(top, left).unwrap());
    }

    #[test]
    fn test_closure_for_other_assemblage_is_rejected() {
        let store = Arc::new(ChronicleStore::new());
        let isa = store.create_concept().unwrap();
        store
            .define_assemblage(isa, FieldSchema::new(vec![FieldType::Nid]))
            .unwrap();
        let path = store.create_concept().unwrap();
        store.declare_path(path, vec![]).unwrap();
        let resolver = Resolver::new(StampFilter::latest_on(path), &store.path_snapshot()).unwrap();
        let snapshot = TaxonomySnapshot::new(Arc::clone(&store), isa, 0, resolver).unwrap();

        let foreign = MaterializedClosure {
            assemblage: Nid::new(9999),
            ancestors: FxHashMap::default(),
        };
        assert!(snapshot.with_closure(Arc::new(foreign)).is_err());
    }
}
