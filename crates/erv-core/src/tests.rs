//! Unit tests for erv-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AccidentId, RsuId, SegmentId, VehicleId};

    #[test]
    fn index_roundtrip() {
        let id = SegmentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(SegmentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(VehicleId(0) < VehicleId(1));
        assert!(AccidentId(100) > AccidentId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(SegmentId::INVALID.0, u32::MAX);
        assert_eq!(VehicleId::default(), VehicleId::INVALID);
        assert_eq!(RsuId::INVALID.0, u16::MAX);
    }

    #[test]
    fn rsu_id_rejects_overflow() {
        assert!(RsuId::try_from(70_000usize).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(VehicleId(7).to_string(), "VehicleId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::Point2;

    #[test]
    fn zero_distance() {
        let p = Point2::new(30.0, 120.0);
        assert_eq!(p.distance_m(p), 0.0);
    }

    #[test]
    fn pythagorean_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(300.0, 400.0);
        assert!((a.distance_m(b) - 500.0).abs() < 1e-3);
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
    }

    #[test]
    fn since_saturates() {
        assert_eq!(Tick(3).since(Tick(10)), 0);
        assert_eq!(Tick(10).since(Tick(3)), 7);
    }

    #[test]
    fn clock_elapsed() {
        let mut clock = SimClock::new(0.5);
        clock.advance();
        clock.advance();
        assert_eq!(clock.current_tick, Tick(2));
        assert!((clock.elapsed_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn advance_to_never_rewinds() {
        let mut clock = SimClock::default();
        clock.advance_to(Tick(9));
        clock.advance_to(Tick(4));
        assert_eq!(clock.current_tick, Tick(9));
    }

    #[test]
    fn ticks_for_secs_rounds_up() {
        let clock = SimClock::new(1.0);
        assert_eq!(clock.ticks_for_secs(2.5), 3);
        assert_eq!(clock.ticks_for_secs(0.0), 0);
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for _ in 0..100 {
            let a: f32 = r1.random();
            let b: f32 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn streams_differ() {
        let mut s0 = SimRng::stream(1, 0);
        let mut s1 = SimRng::stream(1, 1);
        let a: u64 = s0.random();
        let b: u64 = s1.random();
        assert_ne!(a, b, "adjacent streams should diverge");
    }

    #[test]
    fn children_reproducible() {
        let mut p1 = SimRng::new(7);
        let mut p2 = SimRng::new(7);
        let mut c1 = p1.child(3);
        let mut c2 = p2.child(3);
        assert_eq!(c1.random::<u64>(), c2.random::<u64>());
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = SimRng::new(0);
        for _ in 0..1000 {
            let v = rng.gen_range(0.0f32..1.0);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
        assert!(rng.gen_bool(7.0));
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = SimRng::new(0);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}

#[cfg(test)]
mod vehicle {
    use std::collections::BTreeSet;

    use crate::{CoreError, SegmentId, VehicleId, VehicleKind, VehicleState};

    fn route(ids: &[u32]) -> Vec<SegmentId> {
        ids.iter().map(|&i| SegmentId(i)).collect()
    }

    #[test]
    fn remaining_route_starts_at_current_segment() {
        let mut v = VehicleState::civilian(VehicleId(1), route(&[0, 1, 2, 3]));
        v.segment = SegmentId(2);
        assert_eq!(v.remaining_route(), &route(&[2, 3])[..]);
        assert_eq!(v.destination(), Some(SegmentId(3)));
    }

    #[test]
    fn remaining_route_off_route_falls_back() {
        let mut v = VehicleState::civilian(VehicleId(1), route(&[0, 1]));
        v.segment = SegmentId(9);
        assert_eq!(v.remaining_route().len(), 2);
    }

    #[test]
    fn intersects_only_ahead() {
        let mut v = VehicleState::civilian(VehicleId(1), route(&[0, 1, 2]));
        v.segment = SegmentId(1);
        let behind: BTreeSet<_> = [SegmentId(0)].into();
        let ahead: BTreeSet<_> = [SegmentId(2)].into();
        assert!(!v.route_intersects(&behind));
        assert!(v.route_intersects(&ahead));
    }

    #[test]
    fn validate_rejects_impossible_reports() {
        let mut v = VehicleState::civilian(VehicleId(4), route(&[0]));
        assert!(v.validate().is_ok());
        v.speed_mps = f32::NAN;
        assert!(matches!(v.validate(), Err(CoreError::InvalidVehicle { vehicle: VehicleId(4), .. })));
        v.speed_mps = 3.0;
        v.position_m = -1.0;
        assert!(v.validate().is_err());

        let mut erv = VehicleState::erv(VehicleId(5), SegmentId(0), 0.5);
        erv.kind = VehicleKind::Erv { readiness: f32::INFINITY, available: true };
        assert!(erv.validate().is_err());
    }

    #[test]
    fn erv_readiness_clamped() {
        let v = VehicleState::erv(VehicleId(3), SegmentId(0), 1.7);
        assert_eq!(v.readiness(), Some(1.0));
        assert!(v.is_available_erv());
        assert!(!v.is_civilian());
    }

    #[test]
    fn unavailable_erv() {
        let mut v = VehicleState::erv(VehicleId(3), SegmentId(0), 0.5);
        v.kind = VehicleKind::Erv { readiness: 0.5, available: false };
        assert!(!v.is_available_erv());
        assert_eq!(VehicleKind::Relay.as_str(), "relay");
    }
}
