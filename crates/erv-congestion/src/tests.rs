//! Unit tests for erv-congestion.

#[cfg(test)]
mod helpers {
    use erv_core::{Point2, SegmentId};
    use erv_network::{RoadNetwork, RoadNetworkBuilder};

    /// One 200 m segment, capacity 20, free flow 15 m/s, plus an unsampled
    /// neighbour.
    pub fn single_segment() -> (RoadNetwork, SegmentId, SegmentId) {
        let mut b = RoadNetworkBuilder::new().with_sample_window(4);
        let s = b.add_segment(200.0, 20, 15.0, Point2::new(0.0, 0.0));
        let t = b.add_segment(200.0, 20, 15.0, Point2::new(200.0, 0.0));
        b.connect_both(s, t).unwrap();
        (b.build(), s, t)
    }
}

// ── Membership functions ──────────────────────────────────────────────────────

#[cfg(test)]
mod membership {
    use crate::MembershipFn;

    #[test]
    fn triangle_degrees() {
        let m = MembershipFn::triangle(0.0, 1.0, 2.0);
        assert_eq!(m.degree(-0.5), 0.0);
        assert_eq!(m.degree(0.5), 0.5);
        assert_eq!(m.degree(1.0), 1.0);
        assert_eq!(m.degree(1.5), 0.5);
        assert_eq!(m.degree(2.5), 0.0);
    }

    #[test]
    fn shoulder_trapezoid_is_one_at_left_edge() {
        let m = MembershipFn::trapezoid(0.0, 0.0, 0.25, 0.5);
        assert_eq!(m.degree(0.0), 1.0);
        assert_eq!(m.degree(0.25), 1.0);
        assert!((m.degree(0.375) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn area_and_centroid() {
        let tri = MembershipFn::triangle(0.0, 1.5, 3.0);
        assert!((tri.area() - 1.5).abs() < 1e-6);
        assert!((tri.centroid() - 1.5).abs() < 1e-6);

        // Right-angled triangle on [0, 3] peaking at 0: centroid at 1.
        let ramp = MembershipFn::trapezoid(0.0, 0.0, 0.0, 3.0);
        assert!((ramp.centroid() - 1.0).abs() < 1e-5);

        let trap = MembershipFn::trapezoid(0.0, 1.0, 3.0, 4.0);
        assert!((trap.area() - 3.0).abs() < 1e-6);
        assert!((trap.centroid() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn malformed_breakpoints_detected() {
        assert!(!MembershipFn::triangle(1.0, 0.0, 2.0).is_well_formed());
        assert!(!MembershipFn::triangle(0.0, f32::NAN, 2.0).is_well_formed());
        assert!(MembershipFn::trapezoid(0.0, 0.0, 1.0, 1.0).is_well_formed());
    }

    #[test]
    fn serde_tagged_shape() {
        let m: MembershipFn =
            serde_json::from_str(r#"{"shape":"triangle","a":0.0,"b":0.5,"c":1.0}"#).unwrap();
        assert_eq!(m, MembershipFn::triangle(0.0, 0.5, 1.0));
    }
}

// ── Rule base & variables ─────────────────────────────────────────────────────

#[cfg(test)]
mod rules {
    use crate::{CongestionLevel, LinguisticVariable, RuleBase};

    #[test]
    fn default_partition_sums_to_one() {
        let var = LinguisticVariable::default();
        for i in 0..=100 {
            let x = i as f32 / 100.0;
            let sum: f32 = var.fuzzify(x).iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "x = {x}: sum {sum}");
        }
    }

    #[test]
    fn default_rules_are_monotone() {
        let rules = RuleBase::default();
        assert!(rules.is_monotone());
        assert_eq!(rules.consequent(2, 0), CongestionLevel::VeryHigh);
        assert_eq!(rules.consequent(0, 2), CongestionLevel::Low);
    }

    #[test]
    fn swapped_rule_breaks_monotonicity() {
        let mut rules = RuleBase::default();
        rules.table[2][0] = CongestionLevel::Low;
        assert!(!rules.is_monotone());
    }
}

// ── Scorer ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scorer {
    use erv_core::{Point2, SegmentId, Tick};
    use erv_network::RoadNetworkBuilder;

    use crate::{CongestionError, CongestionScorer, FuzzyConfig, MembershipFn, ScoreInput, MAX_SCORE};

    #[test]
    fn zero_count_is_zero() {
        let (net, s, _) = super::helpers::single_segment();
        let seg = net.segment(s).unwrap();
        let scorer = CongestionScorer::default();
        for speed in [0.0, 1.0, 7.5, 15.0, 40.0] {
            assert_eq!(scorer.score_values(0.0, speed, seg), 0.0);
        }
    }

    #[test]
    fn heavy_slow_traffic_scores_high() {
        let (net, s, _) = super::helpers::single_segment();
        net.record_sample(s, 18, 2.0, Tick(3)).unwrap();
        let score = CongestionScorer::default().score(&net, s, Tick(3)).unwrap();
        assert!(score.value >= 7.0, "got {}", score.value);
        assert!(!score.stale);
        assert_eq!(score.sample_tick, Some(Tick(3)));
    }

    #[test]
    fn light_fast_traffic_scores_low() {
        let (net, s, _) = super::helpers::single_segment();
        let seg = net.segment(s).unwrap();
        let v = CongestionScorer::default().score_values(1.0, 15.0, seg);
        assert!(v > 0.0 && v < 3.0, "got {v}");
    }

    #[test]
    fn output_within_bounds() {
        let (net, s, _) = super::helpers::single_segment();
        let seg = net.segment(s).unwrap();
        let scorer = CongestionScorer::default();
        for count in 0..=60 {
            for speed_step in 0..=40 {
                let v = scorer.score_values(count as f32, speed_step as f32 * 0.75, seg);
                assert!((0.0..=MAX_SCORE).contains(&v), "count {count} speed {speed_step}: {v}");
            }
        }
    }

    #[test]
    fn monotone_in_vehicle_count() {
        let (net, s, _) = super::helpers::single_segment();
        let seg = net.segment(s).unwrap();
        let scorer = CongestionScorer::default();
        for speed_step in 0..=30 {
            let speed = speed_step as f32 * 0.6;
            let mut prev = -1.0f32;
            for count in 0..=40 {
                let v = scorer.score_values(count as f32, speed, seg);
                assert!(v >= prev, "speed {speed}: count {count} gave {v} < {prev}");
                prev = v;
            }
        }
    }

    #[test]
    fn non_increasing_in_speed() {
        let (net, s, _) = super::helpers::single_segment();
        let seg = net.segment(s).unwrap();
        let scorer = CongestionScorer::default();
        for count in 1..=40 {
            let mut prev = f32::INFINITY;
            for speed_step in 0..=40 {
                let v = scorer.score_values(count as f32, speed_step as f32 * 0.5, seg);
                assert!(v <= prev, "count {count}: step {speed_step} gave {v} > {prev}");
                prev = v;
            }
        }
    }

    #[test]
    fn monotone_on_fine_grid() {
        let scorer = CongestionScorer::default();
        let density = |i: u32| i as f32 / 400.0;
        let ratio   = |j: u32| j as f32 / 100.0;
        for j in 0..=100 {
            let mut prev = f32::NEG_INFINITY;
            for i in 0..=400 {
                let v = scorer.infer(density(i), ratio(j));
                assert!(v >= prev, "ratio {}: density {} gave {v} < {prev}", ratio(j), density(i));
                prev = v;
            }
        }
        for i in 0..=400 {
            let mut prev = f32::INFINITY;
            for j in 0..=100 {
                let v = scorer.infer(density(i), ratio(j));
                assert!(v <= prev, "density {}: ratio {} gave {v} > {prev}", density(i), ratio(j));
                prev = v;
            }
        }
    }

    #[test]
    fn plateau_holds_exact_value_on_large_segment() {
        let mut b = RoadNetworkBuilder::new();
        let s = b.add_segment(500.0, 200, 20.0, Point2::new(0.0, 0.0));
        let net = b.build();
        let seg = net.segment(s).unwrap();
        let scorer = CongestionScorer::default();

        let mut prev = 0.0f32;
        for count in 1..=200 {
            let v = scorer.score_values(count as f32, 15.0, seg);
            assert!(v >= prev, "count {count}: {v} < {prev}");
            prev = v;
        }
        assert_eq!(scorer.score_values(53.0, 15.0, seg), scorer.score_values(54.0, 15.0, seg));
        assert_eq!(scorer.score_values(95.0, 15.0, seg), scorer.score_values(96.0, 15.0, seg));
    }

    #[test]
    fn inputs_outside_unit_range_clamped() {
        let scorer = CongestionScorer::default();
        assert_eq!(scorer.infer(3.0, -1.0), scorer.infer(1.0, 0.0));
        assert_eq!(scorer.infer(f32::NAN, 0.5), scorer.infer(0.0, 0.5));
    }

    #[test]
    fn identical_inputs_identical_scores() {
        let scorer = CongestionScorer::default();
        let a = scorer.infer(0.37, 0.61);
        let b = scorer.infer(0.37, 0.61);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn unsampled_segment_is_no_data() {
        let (net, _, t) = super::helpers::single_segment();
        let err = CongestionScorer::default().score(&net, t, Tick(0)).unwrap_err();
        assert!(matches!(err, CongestionError::NoData(id) if id == t));
    }

    #[test]
    fn unknown_segment_is_network_error() {
        let (net, _, _) = super::helpers::single_segment();
        let err = CongestionScorer::default().score(&net, SegmentId(42), Tick(0)).unwrap_err();
        assert!(matches!(err, CongestionError::Network(_)));
    }

    #[test]
    fn window_mean_smooths_spike() {
        let (net, s, _) = super::helpers::single_segment();
        for t in 0..3u64 {
            net.record_sample(s, 2, 14.0, Tick(t)).unwrap();
        }
        net.record_sample(s, 20, 1.0, Tick(3)).unwrap();

        let latest = CongestionScorer::default().score(&net, s, Tick(3)).unwrap().value;
        let config = FuzzyConfig { input: ScoreInput::WindowMean, ..FuzzyConfig::default() };
        let mean = CongestionScorer::new(config).score(&net, s, Tick(3)).unwrap().value;
        assert!(mean < latest, "mean {mean} should be below latest {latest}");
    }

    #[test]
    fn config_validation() {
        assert!(FuzzyConfig::default().validate().is_ok());

        let mut bad = FuzzyConfig::default();
        bad.density.medium = MembershipFn::triangle(0.75, 0.5, 0.25);
        assert!(matches!(bad.validate(), Err(CongestionError::Config(_))));

        let mut flat = FuzzyConfig::default();
        flat.output.high = MembershipFn::triangle(5.0, 5.0, 5.0);
        assert!(flat.validate().is_err());
    }

    #[test]
    fn config_from_partial_json() {
        let cfg: FuzzyConfig = serde_json::from_str(r#"{"input":"window_mean"}"#).unwrap();
        assert_eq!(cfg.input, ScoreInput::WindowMean);
        assert_eq!(cfg.rules, crate::RuleBase::default());
    }
}

// ── Score board ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod board {
    use erv_core::{SegmentId, Tick};

    use crate::{CongestionScorer, ScoreBoard};

    #[test]
    fn no_data_becomes_zero_and_stale() {
        let (net, _, t) = super::helpers::single_segment();
        let board = ScoreBoard::new(CongestionScorer::default(), 5);
        let score = board.score(&net, t, Tick(0)).unwrap();
        assert_eq!(score.value, 0.0);
        assert!(score.stale);
        assert!(board.get_fresh(t, Tick(0)).is_none());
    }

    #[test]
    fn fresh_score_reused_within_threshold() {
        let (net, s, _) = super::helpers::single_segment();
        let board = ScoreBoard::new(CongestionScorer::default(), 5);
        net.record_sample(s, 18, 2.0, Tick(0)).unwrap();
        let first = board.score(&net, s, Tick(0)).unwrap();

        // New data lands, but the cached score is still fresh.
        net.record_sample(s, 1, 15.0, Tick(2)).unwrap();
        let reused = board.score(&net, s, Tick(5)).unwrap();
        assert_eq!(reused, first);
    }

    #[test]
    fn stale_score_recomputed() {
        let (net, s, _) = super::helpers::single_segment();
        let board = ScoreBoard::new(CongestionScorer::default(), 5);
        net.record_sample(s, 18, 2.0, Tick(0)).unwrap();
        let first = board.score(&net, s, Tick(0)).unwrap();

        net.record_sample(s, 1, 15.0, Tick(6)).unwrap();
        assert!(board.get_fresh(s, Tick(6)).is_none());
        let second = board.score(&net, s, Tick(6)).unwrap();
        assert_eq!(second.computed_at, Tick(6));
        assert!(second.value < first.value);
    }

    #[test]
    fn data_arrival_clears_stale_flag() {
        let (net, _, t) = super::helpers::single_segment();
        let board = ScoreBoard::new(CongestionScorer::default(), 100);
        assert!(board.score(&net, t, Tick(0)).unwrap().stale);
        net.record_sample(t, 10, 5.0, Tick(1)).unwrap();
        let score = board.score(&net, t, Tick(1)).unwrap();
        assert!(!score.stale);
        assert!(score.value > 0.0);
    }

    #[test]
    fn refresh_all_and_unknown() {
        let (net, s, t) = super::helpers::single_segment();
        let board = ScoreBoard::new(CongestionScorer::default(), 5);
        net.record_sample(s, 10, 5.0, Tick(0)).unwrap();
        let scores = board.refresh_all(&net, &[s, t], Tick(0)).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores[&t].stale);
        assert_eq!(board.len(), 2);

        assert!(board.refresh_all(&net, &[s, SegmentId(9)], Tick(0)).is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "scoring unknown segment")]
    fn value_of_unknown_segment_asserts() {
        let (net, _, _) = super::helpers::single_segment();
        let board = ScoreBoard::new(CongestionScorer::default(), 5);
        board.value(&net, SegmentId(9), Tick(0));
    }

    #[test]
    fn invalidate_forces_recompute() {
        let (net, s, _) = super::helpers::single_segment();
        let board = ScoreBoard::new(CongestionScorer::default(), 50);
        net.record_sample(s, 18, 2.0, Tick(0)).unwrap();
        board.score(&net, s, Tick(0)).unwrap();
        board.invalidate(s);
        assert!(board.cached(s).is_none());
        board.clear();
        assert!(board.is_empty());
    }
}
