//! Unit tests for erv-network.
//!
//! All tests use hand-built networks.

#[cfg(test)]
mod helpers {
    use erv_core::{Point2, SegmentId};
    use crate::{RoadNetwork, RoadNetworkBuilder};

    /// Two parallel ways between an entry and an exit segment.
    ///
    /// ```text
    ///          ┌── 1 (main, 100 m) ──┐
    ///   0 ─────┤                     ├───── 3
    ///          └── 2 (bypass, 150 m)─┘
    /// ```
    ///
    /// One-way: 0→1, 0→2, 1→3, 2→3.
    pub fn bypass_network() -> (RoadNetwork, [SegmentId; 4]) {
        let mut b = RoadNetworkBuilder::new().with_sample_window(3);
        let s0 = b.add_segment(100.0, 20, 15.0, Point2::new(0.0, 0.0));
        let s1 = b.add_segment(100.0, 20, 15.0, Point2::new(100.0, 0.0));
        let s2 = b.add_segment(150.0, 20, 15.0, Point2::new(100.0, 80.0));
        let s3 = b.add_segment(100.0, 20, 15.0, Point2::new(200.0, 0.0));
        b.connect(s0, s1).unwrap();
        b.connect(s0, s2).unwrap();
        b.connect(s1, s3).unwrap();
        b.connect(s2, s3).unwrap();
        b.add_rsu(Point2::new(0.0, 0.0));
        b.add_rsu(Point2::new(200.0, 0.0));
        (b.build(), [s0, s1, s2, s3])
    }

    pub fn unit_length(net: &RoadNetwork) -> impl Fn(SegmentId) -> f32 + '_ {
        move |s| net.segment(s).map(|seg| seg.length_m).unwrap_or(0.0)
    }
}

// ── Builder & topology ────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use erv_core::{Point2, SegmentId};
    use crate::{NetworkError, RoadNetworkBuilder};

    #[test]
    fn empty_build() {
        let net = RoadNetworkBuilder::new().build();
        assert_eq!(net.segment_count(), 0);
        assert!(net.is_empty());
        assert!(net.nearest_segment(Point2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn connect_unknown_segment_errors() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_segment(10.0, 5, 10.0, Point2::default());
        let err = b.connect(a, SegmentId(9)).unwrap_err();
        assert!(matches!(err, NetworkError::UnknownSegment(SegmentId(9))));
    }

    #[test]
    fn duplicate_links_collapse() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_segment(10.0, 5, 10.0, Point2::default());
        let c = b.add_segment(10.0, 5, 10.0, Point2::new(10.0, 0.0));
        b.connect(a, c).unwrap();
        b.connect(a, c).unwrap();
        let net = b.build();
        assert_eq!(net.adjacency_count(), 1);
    }

    #[test]
    fn neighbors_sorted_and_directed() {
        let (net, [s0, s1, s2, s3]) = super::helpers::bypass_network();
        assert_eq!(net.neighbors(s0).unwrap(), &[s1, s2]);
        assert_eq!(net.neighbors(s3).unwrap(), &[] as &[SegmentId]);
        assert!(net.is_adjacent(s1, s3));
        assert!(!net.is_adjacent(s3, s1));
    }

    #[test]
    fn unknown_segment_queries_fail() {
        let (net, _) = super::helpers::bypass_network();
        assert!(matches!(net.segment(SegmentId(40)), Err(NetworkError::UnknownSegment(_))));
        assert!(net.neighbors(SegmentId(40)).is_err());
    }

    #[test]
    fn degenerate_attributes_are_raised() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_segment(0.0, 0, -3.0, Point2::default());
        let net = b.build();
        let seg = net.segment(a).unwrap();
        assert!(seg.length_m > 0.0);
        assert_eq!(seg.capacity, 1);
        assert!(seg.free_flow_mps > 0.0);
    }
}

// ── Samples ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod samples {
    use erv_core::{SegmentId, Tick};
    use crate::NetworkError;

    #[test]
    fn latest_is_most_recent() {
        let (net, [s0, ..]) = super::helpers::bypass_network();
        assert_eq!(net.latest(s0).unwrap(), None);
        net.record_sample(s0, 4, 10.0, Tick(1)).unwrap();
        net.record_sample(s0, 7, 6.0, Tick(2)).unwrap();
        let latest = net.latest(s0).unwrap().unwrap();
        assert_eq!(latest.vehicle_count, 7);
        assert_eq!(latest.tick, Tick(2));
    }

    #[test]
    fn window_evicts_oldest() {
        let (net, [s0, ..]) = super::helpers::bypass_network();
        for t in 0..5u64 {
            net.record_sample(s0, t as u32, 1.0, Tick(t)).unwrap();
        }
        let window = net.window(s0).unwrap();
        assert_eq!(window.len(), 3);
        let counts: Vec<u32> = window.iter().map(|s| s.vehicle_count).collect();
        assert_eq!(counts, vec![2, 3, 4]);
        let (mean_count, mean_speed) = window.mean().unwrap();
        assert!((mean_count - 3.0).abs() < 1e-6);
        assert!((mean_speed - 1.0).abs() < 1e-6);
    }

    #[test]
    fn negative_speed_rejected() {
        let (net, [s0, ..]) = super::helpers::bypass_network();
        let err = net.record_sample(s0, 1, -2.0, Tick(0)).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidSample { .. }));
        assert!(net.record_sample(s0, 1, f32::NAN, Tick(0)).is_err());
        assert_eq!(net.latest(s0).unwrap(), None);
    }

    #[test]
    fn unknown_segment_rejected() {
        let (net, _) = super::helpers::bypass_network();
        let err = net.record_sample(SegmentId(99), 1, 1.0, Tick(0)).unwrap_err();
        assert!(matches!(err, NetworkError::UnknownSegment(SegmentId(99))));
    }

    #[test]
    fn snapshot_skips_unsampled_segments() {
        let (net, [s0, s1, s2, _]) = super::helpers::bypass_network();
        net.record_sample(s0, 3, 9.0, Tick(0)).unwrap();
        net.record_sample(s2, 5, 4.0, Tick(0)).unwrap();
        let snap = net.snapshot(&[s0, s1, s2]).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[&s2].vehicle_count, 5);
        assert!(!snap.contains_key(&s1));
    }

    #[test]
    fn snapshot_fails_on_unknown() {
        let (net, [s0, ..]) = super::helpers::bypass_network();
        assert!(net.snapshot(&[s0, SegmentId(77)]).is_err());
    }

    #[test]
    fn concurrent_ingest_and_read() {
        let (net, [s0, ..]) = super::helpers::bypass_network();
        std::thread::scope(|scope| {
            scope.spawn(|| {
                for t in 0..200u64 {
                    net.record_sample(s0, (t % 20) as u32, 5.0, Tick(t)).unwrap();
                }
            });
            scope.spawn(|| {
                for _ in 0..200 {
                    if let Some(s) = net.latest(s0).unwrap() {
                        assert!(s.vehicle_count < 20);
                    }
                }
            });
        });
        assert_eq!(net.latest(s0).unwrap().unwrap().tick, Tick(199));
    }
}

// ── Spatial queries ───────────────────────────────────────────────────────────

#[cfg(test)]
mod spatial {
    use erv_core::{Point2, RsuId};

    #[test]
    fn segments_within_radius() {
        let (net, [s0, s1, s2, _]) = super::helpers::bypass_network();
        let near = net.segments_within(Point2::new(50.0, 0.0), 60.0);
        assert_eq!(near, vec![s0, s1]);
        let wider = net.segments_within(Point2::new(100.0, 0.0), 100.0);
        assert!(wider.contains(&s2));
    }

    #[test]
    fn nearest_rsu() {
        let (net, _) = super::helpers::bypass_network();
        assert_eq!(net.nearest_rsu(Point2::new(190.0, 10.0)), Some(RsuId(1)));
        assert_eq!(net.rsu_position(RsuId(0)), Some(Point2::new(0.0, 0.0)));
        assert_eq!(net.rsu_count(), 2);
    }

    #[test]
    fn nearest_segment() {
        let (net, [_, _, s2, _]) = super::helpers::bypass_network();
        assert_eq!(net.nearest_segment(Point2::new(110.0, 70.0)), Some(s2));
    }
}

// ── Dijkstra routing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use std::collections::BTreeSet;

    use erv_core::{Point2, SegmentId};
    use crate::{DijkstraRouter, NetworkError, RoadNetworkBuilder, Router};

    #[test]
    fn trivial_same_segment() {
        let (net, [s0, ..]) = super::helpers::bypass_network();
        let w = super::helpers::unit_length(&net);
        let r = DijkstraRouter.route(&net, s0, s0, &w, &BTreeSet::new()).unwrap();
        assert!(r.is_trivial());
        assert_eq!(r.segments, vec![s0]);
        assert_eq!(r.cost, 0.0);
    }

    #[test]
    fn shortest_path_prefers_main_road() {
        let (net, [s0, s1, _, s3]) = super::helpers::bypass_network();
        let w = super::helpers::unit_length(&net);
        let r = DijkstraRouter.route(&net, s0, s3, &w, &BTreeSet::new()).unwrap();
        assert_eq!(r.segments, vec![s0, s1, s3]);
        assert!((r.length_m - 200.0).abs() < 1e-3);
        assert!((r.cost - 200.0).abs() < 1e-3);
    }

    #[test]
    fn avoid_set_forces_bypass() {
        let (net, [s0, s1, s2, s3]) = super::helpers::bypass_network();
        let w = super::helpers::unit_length(&net);
        let avoid: BTreeSet<_> = [s1].into();
        let r = DijkstraRouter.route(&net, s0, s3, &w, &avoid).unwrap();
        assert_eq!(r.segments, vec![s0, s2, s3]);
        assert!(!r.contains(s1));
    }

    #[test]
    fn congestion_weight_shifts_route() {
        let (net, [s0, s1, s2, s3]) = super::helpers::bypass_network();
        let congested = |s: SegmentId| {
            let len = net.segment(s).unwrap().length_m;
            if s == s1 { len * (1.0 + 9.0) } else { len }
        };
        let r = DijkstraRouter.route(&net, s0, s3, &congested, &BTreeSet::new()).unwrap();
        assert_eq!(r.segments, vec![s0, s2, s3]);
    }

    #[test]
    fn avoided_destination_is_no_route() {
        let (net, [s0, _, _, s3]) = super::helpers::bypass_network();
        let w = super::helpers::unit_length(&net);
        let avoid: BTreeSet<_> = [s3].into();
        let result = DijkstraRouter.route(&net, s0, s3, &w, &avoid);
        assert!(matches!(result, Err(NetworkError::NoRoute { .. })));
    }

    #[test]
    fn one_way_blocks_return() {
        let (net, [s0, _, _, s3]) = super::helpers::bypass_network();
        let w = super::helpers::unit_length(&net);
        assert!(DijkstraRouter.route(&net, s3, s0, &w, &BTreeSet::new()).is_err());
    }

    #[test]
    fn disconnected_is_no_route() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_segment(10.0, 5, 10.0, Point2::new(0.0, 0.0));
        let c = b.add_segment(10.0, 5, 10.0, Point2::new(50.0, 0.0));
        let net = b.build();
        let result = DijkstraRouter.route(&net, a, c, &|_| 1.0, &BTreeSet::new());
        assert!(matches!(result, Err(NetworkError::NoRoute { .. })));
    }

    #[test]
    fn unknown_endpoint_errors() {
        let (net, [s0, ..]) = super::helpers::bypass_network();
        let result = DijkstraRouter.route(&net, s0, SegmentId(50), &|_| 1.0, &BTreeSet::new());
        assert!(matches!(result, Err(NetworkError::UnknownSegment(_))));
    }
}
