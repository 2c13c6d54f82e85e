//! `parents` against reverse indices that return stale or foreign hits.

use crate::common::*;
use chronicle::FieldValueIndex;
use std::sync::Arc;

/// Reverse index that answers every query with a fixed list.
struct FixedIndex(Vec<Nid>);

impl FieldValueIndex for FixedIndex {
    fn find_semantics_referencing_field_value(&self, _value: Nid) -> Vec<Nid> {
        self.0.clone()
    }
}

#[test]
fn stale_and_unknown_hits_are_filtered() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(1, t.p1);
    let b = t.concept_at(1, t.p1);
    let c = t.concept_at(1, t.p1);
    let stamp = t.stamp(Status::Active, 10, t.m1, t.p1);
    let real = t.edge(isa, a, b, stamp);
    let unrelated = t.edge(isa, a, c, stamp);

    let index = FixedIndex(vec![Nid::new(9_999), unrelated, real, a]);
    let taxonomy = t
        .db
        .taxonomy(isa, &t.filter_at(t.p1, 10))
        .unwrap()
        .with_reverse_index(Arc::new(index));

    let parents = taxonomy.parents(b).unwrap();
    assert_eq!(parents.into_iter().collect::<Vec<_>>(), vec![a]);
}

#[test]
fn empty_index_yields_no_parents() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(1, t.p1);
    let b = t.concept_at(1, t.p1);
    t.edge(isa, a, b, t.stamp(Status::Active, 10, t.m1, t.p1));

    let taxonomy = t
        .db
        .taxonomy(isa, &t.filter_at(t.p1, 10))
        .unwrap()
        .with_reverse_index(Arc::new(FixedIndex(Vec::new())));
    assert!(taxonomy.parents(b).unwrap().is_empty());
    // children does not go through the reverse index
    assert!(taxonomy.children(a).unwrap().contains(&b));
}

#[test]
fn rebuilt_store_index_agrees() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(1, t.p1);
    let b = t.concept_at(1, t.p1);
    t.edge(isa, a, b, t.stamp(Status::Active, 10, t.m1, t.p1));

    t.db.rebuild_indexes();
    let taxonomy = t.db.taxonomy(isa, &t.filter_at(t.p1, 10)).unwrap();
    assert!(taxonomy.is_child_of(b, a).unwrap());
}
