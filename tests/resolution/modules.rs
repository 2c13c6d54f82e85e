//! Module filtering and priority.

use crate::common::*;

#[test]
fn module_priority_picks_preferred_module() {
    let t = TestDb::new();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m1, t.p1), &[])
        .unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m2, t.p1), &[])
        .unwrap();

    let prefer_m2 = StampFilter::builder()
        .allow_status(Status::Active)
        .position(t.p1, ms(100))
        .module(t.m2)
        .module(t.m1)
        .build()
        .unwrap();
    let latest = t.db.latest(concept, &prefer_m2).unwrap();
    assert_eq!(latest.present().unwrap().stamp().module, t.m2);

    let prefer_m1 = prefer_m2.with_modules(ModuleFilter::Prioritized(vec![t.m1, t.m2]));
    let latest = t.db.latest(concept, &prefer_m1).unwrap();
    assert_eq!(latest.present().unwrap().stamp().module, t.m1);
}

#[test]
fn same_time_same_path_without_priority_takes_later_append() {
    let t = TestDb::new();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m1, t.p1), &[])
        .unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m2, t.p1), &[])
        .unwrap();

    let latest = t.db.latest(concept, &StampFilter::latest_on(t.p1)).unwrap();
    assert_eq!(latest.present().unwrap().stamp().module, t.m2);
}

#[test]
fn unlisted_module_is_invisible() {
    let t = TestDb::new();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m2, t.p1), &[])
        .unwrap();

    assert!(t.db.latest(concept, &t.filter_at(t.p1, 100)).unwrap().is_empty());
}

#[test]
fn newer_version_wins_over_preferred_module() {
    let t = TestDb::new();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m2, t.p1), &[])
        .unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 200, t.m1, t.p1), &[])
        .unwrap();

    let filter = StampFilter::builder()
        .allow_status(Status::Active)
        .position(t.p1, ms(200))
        .module(t.m2)
        .module(t.m1)
        .build()
        .unwrap();
    let latest = t.db.latest(concept, &filter).unwrap();
    assert_eq!(latest.present().unwrap().time(), ms(200));
}
