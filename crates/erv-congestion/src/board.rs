//! Freshness-aware cache of congestion scores.
//!
//! The board is shared by every accident pipeline in a step.  A cached score
//! is reused only while it is younger than `freshness_ticks`; anything older
//! is recomputed before it can feed a decision.  A segment with no sample is
//! recorded as value 0 with the `stale` flag set, and is recomputed on every
//! request until data arrives.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use erv_core::{SegmentId, Tick};
use erv_network::RoadNetwork;

use crate::scorer::CongestionScorer;
use crate::{CongestionError, CongestionResult};

// ── CongestionScore ───────────────────────────────────────────────────────────

/// A computed score for one segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CongestionScore {
    pub segment: SegmentId,
    /// Score in `[0, 10]`.
    pub value: f32,
    /// Tick at which the score was computed.
    pub computed_at: Tick,
    /// Tick of the newest sample that fed it; `None` when there was no data.
    pub sample_tick: Option<Tick>,
    /// Set when the value is a placeholder for missing data.
    pub stale: bool,
}

impl CongestionScore {
    /// Placeholder used when a segment has no samples yet.
    pub fn no_data(segment: SegmentId, now: Tick) -> Self {
        Self { segment, value: 0.0, computed_at: now, sample_tick: None, stale: true }
    }

    /// `true` if this score may be used at `now` without recomputation.
    #[inline]
    pub fn is_fresh(&self, now: Tick, freshness_ticks: u64) -> bool {
        !self.stale && now.since(self.computed_at) <= freshness_ticks
    }
}

// ── ScoreBoard ────────────────────────────────────────────────────────────────

pub struct ScoreBoard {
    scorer:          CongestionScorer,
    freshness_ticks: u64,
    cache:           RwLock<FxHashMap<SegmentId, CongestionScore>>,
}

impl ScoreBoard {
    pub fn new(scorer: CongestionScorer, freshness_ticks: u64) -> Self {
        Self { scorer, freshness_ticks, cache: RwLock::new(FxHashMap::default()) }
    }

    pub fn scorer(&self) -> &CongestionScorer {
        &self.scorer
    }

    pub fn freshness_ticks(&self) -> u64 {
        self.freshness_ticks
    }

    /// Whatever is cached for `id`, fresh or not.
    pub fn cached(&self, id: SegmentId) -> Option<CongestionScore> {
        self.cache.read().get(&id).copied()
    }

    /// Cached score for `id` if it is still fresh at `now`.
    pub fn get_fresh(&self, id: SegmentId, now: Tick) -> Option<CongestionScore> {
        self.cached(id).filter(|s| s.is_fresh(now, self.freshness_ticks))
    }

    /// Fresh score for `id`, recomputing when the cached one is stale or
    /// missing.
    ///
    /// `NoData` is absorbed into a zero, stale placeholder.  Only an unknown
    /// segment is an error.
    pub fn score(&self, network: &RoadNetwork, id: SegmentId, now: Tick) -> CongestionResult<CongestionScore> {
        if let Some(fresh) = self.get_fresh(id, now) {
            return Ok(fresh);
        }
        let score = match self.scorer.score(network, id, now) {
            Ok(score) => score,
            Err(CongestionError::NoData(seg)) => {
                debug!(segment = %seg, "no traffic sample; scoring as 0 (stale)");
                CongestionScore::no_data(seg, now)
            }
            Err(e) => return Err(e),
        };
        self.cache.write().insert(id, score);
        Ok(score)
    }

    /// Score value only.
    ///
    /// Callers pass segments already resolved against `network`; an unknown
    /// id trips a debug assertion and reads as `0.0` in release builds.
    pub fn value(&self, network: &RoadNetwork, id: SegmentId, now: Tick) -> f32 {
        debug_assert!(network.contains(id), "scoring unknown segment {id}");
        self.score(network, id, now).map(|s| s.value).unwrap_or(0.0)
    }

    /// Bring every segment in `ids` up to date and return their scores.
    pub fn refresh_all(
        &self,
        network: &RoadNetwork,
        ids:     &[SegmentId],
        now:     Tick,
    ) -> CongestionResult<BTreeMap<SegmentId, CongestionScore>> {
        ids.iter().map(|&id| Ok((id, self.score(network, id, now)?))).collect()
    }

    pub fn invalidate(&self, id: SegmentId) {
        self.cache.write().remove(&id);
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}
