//! Retiring edges with later Inactive versions.

use crate::common::*;

#[test]
fn inactive_version_retires_edge() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(100, t.p1);
    let b = t.concept_at(100, t.p1);
    let edge = t.edge(isa, a, b, t.stamp(Status::Active, 100, t.m1, t.p1));
    t.db.append_version(
        edge,
        t.stamp(Status::Inactive, 200, t.m1, t.p1),
        &[FieldValue::Nid(b)],
    )
    .unwrap();

    let retired = t.db.taxonomy(isa, &t.filter_at(t.p1, 200)).unwrap();
    assert!(retired.children(a).unwrap().is_empty());
    assert!(retired.parents(b).unwrap().is_empty());
    assert!(retired.is_leaf(a).unwrap());

    // the history is still there for a reader standing earlier
    let earlier = t.db.taxonomy(isa, &t.filter_at(t.p1, 199)).unwrap();
    assert!(earlier.is_child_of(b, a).unwrap());
}

#[test]
fn reactivated_edge_is_visible_again() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(100, t.p1);
    let b = t.concept_at(100, t.p1);
    let edge = t.edge(isa, a, b, t.stamp(Status::Active, 100, t.m1, t.p1));
    for (status, time) in [(Status::Inactive, 200), (Status::Active, 300)] {
        t.db.append_version(edge, t.stamp(status, time, t.m1, t.p1), &[FieldValue::Nid(b)])
            .unwrap();
    }

    let taxonomy = t.db.taxonomy(isa, &t.filter_at(t.p1, 300)).unwrap();
    assert!(taxonomy.is_child_of(b, a).unwrap());
}

#[test]
fn moved_edge_drops_the_old_child() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(1, t.p1);
    let b = t.concept_at(1, t.p1);
    let c = t.concept_at(1, t.p1);
    let edge = t.edge(isa, a, b, t.stamp(Status::Active, 10, t.m1, t.p1));
    t.db.append_version(edge, t.stamp(Status::Active, 20, t.m1, t.p1), &[FieldValue::Nid(c)])
        .unwrap();

    let taxonomy = t.db.taxonomy(isa, &t.filter_at(t.p1, 20)).unwrap();
    assert!(taxonomy.is_child_of(c, a).unwrap());
    // the reverse index still lists the edge for b; it must be re-validated
    assert!(taxonomy.parents(b).unwrap().is_empty());
}

#[test]
fn draft_retirement_is_invisible_until_committed() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(100, t.p1);
    let b = t.concept_at(100, t.p1);
    let edge = t.edge(isa, a, b, t.stamp(Status::Active, 100, t.m1, t.p1));
    let draft = t
        .db
        .append_version(
            edge,
            Stamp::uncommitted(Status::Inactive, t.author, t.m1, t.p1),
            &[FieldValue::Nid(b)],
        )
        .unwrap();

    let filter = StampFilter::latest_on(t.p1);
    assert!(t.db.taxonomy(isa, &filter).unwrap().is_child_of(b, a).unwrap());

    t.db.commit(draft, ms(200)).unwrap();
    assert!(!t.db.taxonomy(isa, &filter).unwrap().is_child_of(b, a).unwrap());
}
