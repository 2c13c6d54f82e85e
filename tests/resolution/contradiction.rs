//! Ties that survive every tie-break are reported, never picked.

use crate::common::*;

#[test]
fn unrelated_paths_at_same_time_contradict() {
    let t = TestDb::new();
    let p2 = t.db.create_path(vec![]).unwrap();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m1, t.p1), &[])
        .unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m1, p2), &[])
        .unwrap();

    let filter = StampFilter::builder()
        .allow_status(Status::Active)
        .position(t.p1, ms(100))
        .position(p2, ms(100))
        .build()
        .unwrap();

    match t.db.latest(concept, &filter).unwrap() {
        LatestVersion::Contradiction(tied) => {
            assert_eq!(tied.len(), 2);
            let mut paths: Vec<Nid> = tied.iter().map(|v| v.stamp().path).collect();
            paths.sort();
            let mut expected = vec![t.p1, p2];
            expected.sort();
            assert_eq!(paths, expected);
        }
        other => panic!("expected contradiction, got {:?}", other),
    }
}

#[test]
fn contradiction_is_resolved_by_module_priority() {
    let t = TestDb::new();
    let p2 = t.db.create_path(vec![]).unwrap();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m1, t.p1), &[])
        .unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m2, p2), &[])
        .unwrap();

    let filter = StampFilter::builder()
        .allow_status(Status::Active)
        .position(t.p1, ms(100))
        .position(p2, ms(100))
        .module(t.m2)
        .module(t.m1)
        .build()
        .unwrap();

    let latest = t.db.latest(concept, &filter).unwrap();
    assert_eq!(latest.present().unwrap().stamp().path, p2);
}

#[test]
fn only_one_path_in_view_is_not_a_contradiction() {
    let t = TestDb::new();
    let p2 = t.db.create_path(vec![]).unwrap();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m1, t.p1), &[])
        .unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m1, p2), &[])
        .unwrap();

    let latest = t.db.latest(concept, &StampFilter::latest_on(p2)).unwrap();
    assert_eq!(latest.present().unwrap().stamp().path, p2);
}

#[test]
fn current_drops_retired_members_of_a_contradiction() {
    let t = TestDb::new();
    let p2 = t.db.create_path(vec![]).unwrap();
    let concept = t.db.create_concept().unwrap();
    t.db.append_version(concept, t.stamp(Status::Active, 100, t.m1, t.p1), &[])
        .unwrap();
    t.db.append_version(concept, t.stamp(Status::Inactive, 100, t.m1, p2), &[])
        .unwrap();

    let filter = StampFilter::builder()
        .allow_status(Status::Active)
        .position(t.p1, ms(100))
        .position(p2, ms(100))
        .build()
        .unwrap();

    let current = t.db.current(concept, &filter).unwrap();
    assert_eq!(current.present().unwrap().stamp().path, t.p1);
}
