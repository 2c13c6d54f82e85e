//! Property tests for resolution laws.

use crate::common::*;
use chronicle::Resolver;
use proptest::prelude::*;

const STATUSES: [Status; 4] = [
    Status::Active,
    Status::Inactive,
    Status::Primordial,
    Status::Cancelled,
];

/// (status index, module index, path index, time step)
fn history() -> impl Strategy<Value = Vec<(usize, usize, usize, i64)>> {
    prop::collection::vec((0usize..4, 0usize..2, 0usize..2, 0i64..20), 1..24)
}

struct World {
    t: TestDb,
    dev: Nid,
    concept: Nid,
}

fn world(steps: &[(usize, usize, usize, i64)]) -> World {
    let t = TestDb::new();
    let dev = t.db.create_path(vec![PathOrigin::new(t.p1, ms(100))]).unwrap();
    let concept = t.db.create_concept().unwrap();
    let modules = [t.m1, t.m2];
    let paths = [t.p1, dev];
    let mut time = 0;
    for (status, module, path, step) in steps {
        time += step;
        let stamp = t.stamp(STATUSES[*status], time, modules[*module], paths[*path]);
        t.db.append_version(concept, stamp, &[]).unwrap();
    }
    World { t, dev, concept }
}

fn visible(w: &World, filter: &StampFilter) -> Vec<chronicle::Version> {
    let resolver: Resolver = w.t.db.resolver(filter).unwrap();
    resolver.visible_versions(&w.t.db.store().chronology(w.concept).unwrap())
}

proptest! {
    #[test]
    fn widening_statuses_never_hides_a_version(
        steps in history(),
        narrow_bits in 0u8..16,
        extra_bits in 0u8..16,
        at in 0i64..300,
    ) {
        let w = world(&steps);
        let narrow: StatusSet = STATUSES
            .iter()
            .enumerate()
            .filter(|(i, _)| narrow_bits & (1 << i) != 0)
            .map(|(_, s)| *s)
            .collect();
        let extra: StatusSet = STATUSES
            .iter()
            .enumerate()
            .filter(|(i, _)| extra_bits & (1 << i) != 0)
            .map(|(_, s)| *s)
            .collect();
        let base = StampFilter::builder()
            .position(w.dev, ms(at))
            .build()
            .unwrap();

        let before = visible(&w, &base.with_statuses(narrow));
        let after = visible(&w, &base.with_statuses(narrow.union(extra)));
        for version in &before {
            prop_assert!(after.contains(version));
        }
    }

    #[test]
    fn widening_modules_never_hides_a_version(
        steps in history(),
        to_any in any::<bool>(),
        at in 0i64..300,
    ) {
        let w = world(&steps);
        let base = StampFilter::builder()
            .allow_statuses(StatusSet::all())
            .position(w.dev, ms(at))
            .module(w.t.m1)
            .build()
            .unwrap();
        let wide = if to_any {
            base.with_modules(ModuleFilter::Any)
        } else {
            base.with_modules(ModuleFilter::Prioritized(vec![w.t.m1, w.t.m2]))
        };

        let before = visible(&w, &base);
        let after = visible(&w, &wide);
        for version in &before {
            prop_assert!(after.contains(version));
        }
    }

    #[test]
    fn latest_is_always_drawn_from_visible_versions(steps in history(), at in 0i64..300) {
        let w = world(&steps);
        let filter = StampFilter::builder()
            .allow_status(Status::Active)
            .position(w.dev, ms(at))
            .build()
            .unwrap();
        let visible = visible(&w, &filter);
        let latest = w.t.db.latest(w.concept, &filter).unwrap();
        for version in latest.versions() {
            prop_assert!(visible.contains(version));
        }
        prop_assert_eq!(latest.is_empty(), visible.is_empty());
    }

    #[test]
    fn committed_history_is_time_ordered(times in prop::collection::vec(0i64..1_000, 1..16)) {
        let t = TestDb::new();
        let concept = t.db.create_concept().unwrap();
        for time in &times {
            let draft = t
                .db
                .append_version(concept, Stamp::uncommitted(Status::Active, t.author, t.m1, t.p1), &[])
                .unwrap();
            // regressions are rejected and leave the draft pending
            let _ = t.db.commit(draft, ms(*time));
        }
        let committed: Vec<Timestamp> = t
            .db
            .versions_of(concept)
            .unwrap()
            .iter()
            .filter(|v| v.is_committed())
            .map(|v| v.time())
            .collect();
        prop_assert!(committed.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(!committed.is_empty());
    }

    #[test]
    fn any_origin_cycle_is_rejected(len in 1usize..6, start in 0usize..6) {
        let t = TestDb::new();
        let ring: Vec<Nid> = (0..len).map(|_| t.db.create_concept().unwrap()).collect();
        for (i, path) in ring.iter().enumerate() {
            let origin = ring[(i + 1) % len];
            t.db.declare_path(*path, vec![PathOrigin::new(origin, ms(10))]).unwrap();
        }
        let position = ring[start % len];
        let err = t.db.resolver(&StampFilter::latest_on(position)).unwrap_err();
        prop_assert!(matches!(err, Error::InvalidCoordinate(_)));
    }
}
