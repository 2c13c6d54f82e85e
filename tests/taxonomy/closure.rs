//! Transitive queries through a materialized closure.

use crate::common::*;
use std::sync::Arc;

struct Chain {
    t: TestDb,
    isa: Nid,
    top: Nid,
    middle: Nid,
    bottom: Nid,
    side: Nid,
}

fn chain() -> Chain {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let top = t.concept_at(1, t.p1);
    let middle = t.concept_at(1, t.p1);
    let bottom = t.concept_at(1, t.p1);
    let side = t.concept_at(1, t.p1);
    let stamp = t.stamp(Status::Active, 10, t.m1, t.p1);
    t.edge(isa, top, middle, stamp);
    t.edge(isa, middle, bottom, stamp);
    t.edge(isa, top, side, stamp);
    Chain {
        t,
        isa,
        top,
        middle,
        bottom,
        side,
    }
}

#[test]
fn transitive_queries_need_a_closure() {
    let c = chain();
    let taxonomy = c.t.db.taxonomy(c.isa, &c.t.filter_at(c.t.p1, 10)).unwrap();
    assert!(matches!(
        taxonomy.is_descendant_of(c.bottom, c.top),
        Err(Error::UnsupportedByAssemblage(nid)) if nid == c.isa
    ));
    assert!(matches!(
        taxonomy.kind_of(c.bottom, c.top),
        Err(Error::UnsupportedByAssemblage(_))
    ));
}

#[test]
fn closure_answers_descendant_and_kind_of() {
    let c = chain();
    let taxonomy = c.t.db.taxonomy(c.isa, &c.t.filter_at(c.t.p1, 10)).unwrap();
    let closure = MaterializedClosure::build(&taxonomy, &[c.top]).unwrap();
    assert_eq!(closure.len(), 4);
    assert_eq!(closure.ancestors_of(c.bottom).len(), 2);

    let taxonomy = taxonomy.with_closure(Arc::new(closure)).unwrap();
    assert!(taxonomy.is_descendant_of(c.bottom, c.top).unwrap());
    assert!(taxonomy.is_descendant_of(c.bottom, c.middle).unwrap());
    assert!(!taxonomy.is_descendant_of(c.side, c.middle).unwrap());
    assert!(!taxonomy.is_descendant_of(c.top, c.bottom).unwrap());
    assert!(taxonomy.kind_of(c.middle, c.middle).unwrap());
    assert!(taxonomy.kind_of(c.side, c.top).unwrap());
    assert!(!taxonomy.kind_of(c.top, c.side).unwrap());
}

#[test]
fn closure_reflects_the_coordinate_it_was_built_from() {
    let c = chain();
    // retire middle -> bottom after the closure's coordinate
    let edge = c.t.db.store().semantics_referencing(c.isa, c.middle)[0];
    c.t.db
        .append_version(
            edge,
            c.t.stamp(Status::Inactive, 20, c.t.m1, c.t.p1),
            &[FieldValue::Nid(c.bottom)],
        )
        .unwrap();

    let old = c.t.db.taxonomy(c.isa, &c.t.filter_at(c.t.p1, 10)).unwrap();
    let old_closure = MaterializedClosure::build(&old, &[c.top]).unwrap();
    assert!(old_closure.is_descendant_of(c.bottom, c.top));

    let new = c.t.db.taxonomy(c.isa, &c.t.filter_at(c.t.p1, 20)).unwrap();
    let new_closure = MaterializedClosure::build(&new, &[c.top]).unwrap();
    assert!(!new_closure.is_descendant_of(c.bottom, c.top));
    assert_eq!(new_closure.len(), 3);
}

#[test]
fn closure_tolerates_cycles() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(1, t.p1);
    let b = t.concept_at(1, t.p1);
    let stamp = t.stamp(Status::Active, 10, t.m1, t.p1);
    t.edge(isa, a, b, stamp);
    t.edge(isa, b, a, stamp);

    let taxonomy = t.db.taxonomy(isa, &t.filter_at(t.p1, 10)).unwrap();
    let closure = MaterializedClosure::build(&taxonomy, &[a]).unwrap();
    assert!(closure.is_descendant_of(a, b));
    assert!(closure.is_descendant_of(b, a));
    assert!(closure.is_descendant_of(a, a));
}
