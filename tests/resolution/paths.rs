//! Visibility through path origins.

use crate::common::*;

#[test]
fn development_path_inherits_origin_history_up_to_origin_time() {
    let t = TestDb::new();
    let dev = t.db.create_path(vec![PathOrigin::new(t.p1, ms(150))]).unwrap();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m1, t.p1), &[])
        .unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 200, t.m1, t.p1), &[])
        .unwrap();

    let on_dev = t.db.latest(concept, &StampFilter::latest_on(dev)).unwrap();
    assert_eq!(on_dev.present().unwrap().time(), ms(100));

    let on_main = t.db.latest(concept, &StampFilter::latest_on(t.p1)).unwrap();
    assert_eq!(on_main.present().unwrap().time(), ms(200));
}

#[test]
fn origin_time_is_inclusive() {
    let t = TestDb::new();
    let dev = t.db.create_path(vec![PathOrigin::new(t.p1, ms(150))]).unwrap();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 150, t.m1, t.p1), &[])
        .unwrap();

    let on_dev = t.db.latest(concept, &StampFilter::latest_on(dev)).unwrap();
    assert_eq!(on_dev.present().unwrap().time(), ms(150));
}

#[test]
fn more_specific_path_beats_newer_origin_version() {
    let t = TestDb::new();
    let dev = t.db.create_path(vec![PathOrigin::new(t.p1, ms(150))]).unwrap();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 120, t.m1, dev), &[])
        .unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 140, t.m1, t.p1), &[])
        .unwrap();

    let latest = t.db.latest(concept, &StampFilter::latest_on(dev)).unwrap();
    let winner = latest.present().unwrap();
    assert_eq!(winner.stamp().path, dev);
    assert_eq!(winner.time(), ms(120));
}

#[test]
fn grandparent_origin_is_cut_at_the_narrowest_window() {
    let t = TestDb::new();
    let release = t.db.create_path(vec![PathOrigin::new(t.p1, ms(300))]).unwrap();
    let patch = t
        .db
        .create_path(vec![PathOrigin::new(release, ms(100))])
        .unwrap();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 50, t.m1, t.p1), &[])
        .unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 200, t.m1, t.p1), &[])
        .unwrap();

    let resolver = t.db.resolver(&StampFilter::latest_on(patch)).unwrap();
    assert_eq!(resolver.window(release), Some(ms(100)));
    assert_eq!(resolver.window(t.p1), Some(ms(100)));

    let latest = t.db.latest(concept, &StampFilter::latest_on(patch)).unwrap();
    assert_eq!(latest.present().unwrap().time(), ms(50));
}

#[test]
fn cyclic_origins_are_rejected_before_resolution() {
    let t = TestDb::new();
    let a = t.db.create_concept().unwrap();
    let b = t.db.create_concept().unwrap();
    t.db.declare_path(b, vec![PathOrigin::new(a, ms(10))]).unwrap();
    t.db.declare_path(a, vec![PathOrigin::new(b, ms(10))]).unwrap();
    let concept = t.concept_at(1, t.p1);

    let err = t.db.latest(concept, &StampFilter::latest_on(a)).unwrap_err();
    assert!(matches!(err, Error::InvalidCoordinate(_)));
    assert!(err.is_structural());
    assert!(t.db.store().paths().validate().is_err());

    // a coordinate that never reaches the cycle still resolves
    assert!(t.db.latest(concept, &StampFilter::latest_on(t.p1)).is_ok());
}

#[test]
fn versions_on_paths_outside_the_coordinate_are_ignored() {
    let t = TestDb::new();
    let other = t.db.create_path(vec![]).unwrap();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 10, t.m1, other), &[])
        .unwrap();

    assert!(t.db.latest(concept, &StampFilter::latest_on(t.p1)).unwrap().is_empty());
}
