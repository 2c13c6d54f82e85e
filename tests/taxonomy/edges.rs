//! Parent/child queries over an is-a assemblage.

use crate::common::*;
use std::collections::BTreeSet;

fn set(nids: &[Nid]) -> BTreeSet<Nid> {
    nids.iter().copied().collect()
}

#[test]
fn single_edge_is_visible_both_ways() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(100, t.p1);
    let b = t.concept_at(100, t.p1);
    t.edge(isa, a, b, t.stamp(Status::Active, 100, t.m1, t.p1));

    let taxonomy = t.db.taxonomy(isa, &t.filter_at(t.p1, 100)).unwrap();
    assert_eq!(taxonomy.children(a).unwrap(), set(&[b]));
    assert_eq!(taxonomy.parents(b).unwrap(), set(&[a]));
    assert!(taxonomy.is_child_of(b, a).unwrap());
    assert!(!taxonomy.is_child_of(a, b).unwrap());
    assert!(taxonomy.is_leaf(b).unwrap());
    assert!(!taxonomy.is_leaf(a).unwrap());
    assert!(taxonomy.is_root(a).unwrap());
    assert!(!taxonomy.is_root(b).unwrap());
}

#[test]
fn edge_is_invisible_before_its_time() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(100, t.p1);
    let b = t.concept_at(100, t.p1);
    t.edge(isa, a, b, t.stamp(Status::Active, 150, t.m1, t.p1));

    let before = t.db.taxonomy(isa, &t.filter_at(t.p1, 149)).unwrap();
    assert!(before.children(a).unwrap().is_empty());
    assert!(before.parents(b).unwrap().is_empty());

    let at = t.db.taxonomy(isa, &t.filter_at(t.p1, 150)).unwrap();
    assert_eq!(at.children(a).unwrap(), set(&[b]));
}

#[test]
fn edge_from_unlisted_module_is_ignored() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(100, t.p1);
    let b = t.concept_at(100, t.p1);
    t.edge(isa, a, b, t.stamp(Status::Active, 100, t.m2, t.p1));

    let taxonomy = t.db.taxonomy(isa, &t.filter_at(t.p1, 100)).unwrap();
    assert!(taxonomy.children(a).unwrap().is_empty());
}

#[test]
fn edge_to_invisible_child_is_suppressed() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let a = t.concept_at(100, t.p1);
    // child only exists from t=300
    let b = t.concept_at(300, t.p1);
    t.edge(isa, a, b, t.stamp(Status::Active, 300, t.m1, t.p1));

    let mut filter = t.filter_at(t.p1, 300);
    let taxonomy = t.db.taxonomy(isa, &filter).unwrap();
    assert_eq!(taxonomy.children(a).unwrap(), set(&[b]));

    // retire the child concept itself; the edge stays active
    t.db.append_version(b, t.stamp(Status::Inactive, 400, t.m1, t.p1), &[])
        .unwrap();
    filter = t.filter_at(t.p1, 400);
    let taxonomy = t.db.taxonomy(isa, &filter).unwrap();
    assert!(taxonomy.children(a).unwrap().is_empty());
    assert!(!taxonomy.is_visible(b).unwrap());
}

#[test]
fn several_children_and_parents() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let animal = t.concept_at(1, t.p1);
    let pet = t.concept_at(1, t.p1);
    let dog = t.concept_at(1, t.p1);
    let cat = t.concept_at(1, t.p1);
    let stamp = t.stamp(Status::Active, 10, t.m1, t.p1);
    t.edge(isa, animal, dog, stamp);
    t.edge(isa, animal, cat, stamp);
    t.edge(isa, pet, dog, stamp);

    let taxonomy = t.db.taxonomy(isa, &t.filter_at(t.p1, 10)).unwrap();
    assert_eq!(taxonomy.children(animal).unwrap(), set(&[dog, cat]));
    assert_eq!(taxonomy.parents(dog).unwrap(), set(&[animal, pet]));
    assert_eq!(taxonomy.parents(cat).unwrap(), set(&[animal]));
}

#[test]
fn edges_of_another_assemblage_are_not_mixed_in() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let part_of = t.is_a_assemblage();
    let a = t.concept_at(1, t.p1);
    let b = t.concept_at(1, t.p1);
    t.edge(part_of, a, b, t.stamp(Status::Active, 10, t.m1, t.p1));

    let taxonomy = t.db.taxonomy(isa, &t.filter_at(t.p1, 10)).unwrap();
    assert!(taxonomy.children(a).unwrap().is_empty());
    assert!(taxonomy.parents(b).unwrap().is_empty());
}

#[test]
fn unknown_concept_is_reported() {
    let t = TestDb::new();
    let isa = t.is_a_assemblage();
    let taxonomy = t.db.taxonomy(isa, &t.filter_at(t.p1, 10)).unwrap();
    let missing = Nid::new(9_999);
    assert!(matches!(
        taxonomy.children(missing),
        Err(Error::UnknownIdentifier(_))
    ));
    assert!(matches!(
        taxonomy.parents(missing),
        Err(Error::UnknownIdentifier(_))
    ));
}

#[test]
fn unknown_assemblage_is_reported() {
    let t = TestDb::new();
    let not_an_assemblage = t.concept_at(1, t.p1);
    assert!(matches!(
        t.db.taxonomy(not_an_assemblage, &t.filter_at(t.p1, 10)),
        Err(Error::UnknownAssemblage(_))
    ));
}
