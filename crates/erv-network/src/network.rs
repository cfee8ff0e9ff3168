//! Road network representation and builder.
//!
//! # Data layout
//!
//! Vertices of the graph are **road segments**; a directed adjacency `a → b`
//! means a vehicle leaving `a` can enter `b`.  Adjacency is stored in
//! **Compressed Sparse Row (CSR)** form:
//!
//! ```text
//! adj_to[ adj_start[s] .. adj_start[s+1] ]
//! ```
//!
//! is the sorted, de-duplicated list of segments reachable from `s`.  Routing
//! and ant construction therefore scan contiguous memory.
//!
//! # Spatial index
//!
//! Two R-trees (via `rstar`) index segment midpoints and roadside units.
//! They answer "which segments lie within r metres of the accident" and
//! "which roadside unit is closest".

use std::collections::BTreeMap;

use parking_lot::RwLock;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use erv_core::{Point2, RsuId, SegmentId, Tick};

use crate::{NetworkError, NetworkResult, Sample, SampleWindow};

/// Default number of samples retained per segment.
pub const DEFAULT_SAMPLE_WINDOW: usize = 8;

// ── R-tree entries ────────────────────────────────────────────────────────────

/// A 2-D point carrying an id, stored in the spatial indexes.
#[derive(Clone)]
struct IndexedPoint<I> {
    point: [f32; 2],
    id:    I,
}

impl<I> RTreeObject for IndexedPoint<I> {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl<I> PointDistance for IndexedPoint<I> {
    /// Squared Euclidean distance in the planar network frame.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── RoadSegment ───────────────────────────────────────────────────────────────

/// Static attributes of one road segment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadSegment {
    pub id: SegmentId,
    /// Geometric length in metres.
    pub length_m: f32,
    /// Vehicles the segment holds at jam density.
    pub capacity: u32,
    /// Free-flow (speed-limit) speed in m/s.
    pub free_flow_mps: f32,
    /// Midpoint in the network frame.
    pub midpoint: Point2,
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Segment graph in CSR form, spatial indexes, and per-segment sample windows.
///
/// Construct with [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    /// Static segment data, indexed by `SegmentId`.
    segments: Vec<RoadSegment>,

    /// CSR row pointer, length `segment_count + 1`.
    adj_start: Vec<u32>,

    /// CSR column array: successor segments.
    adj_to: Vec<SegmentId>,

    /// Roadside unit positions, indexed by `RsuId`.
    rsus: Vec<Point2>,

    /// Rolling sample history, one lock per segment.
    samples: Vec<RwLock<SampleWindow>>,

    segment_idx: RTree<IndexedPoint<SegmentId>>,
    rsu_idx:     RTree<IndexedPoint<RsuId>>,
}

impl RoadNetwork {
    /// Construct a network with no segments.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn adjacency_count(&self) -> usize {
        self.adj_to.len()
    }

    pub fn rsu_count(&self) -> usize {
        self.rsus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: SegmentId) -> bool {
        id.index() < self.segments.len()
    }

    /// All segment ids in ascending order.
    pub fn segment_ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        (0..self.segments.len() as u32).map(SegmentId)
    }

    // ── Topology queries ──────────────────────────────────────────────────

    pub fn segment(&self, id: SegmentId) -> NetworkResult<&RoadSegment> {
        self.segments.get(id.index()).ok_or(NetworkError::UnknownSegment(id))
    }

    /// Segments directly reachable from `id`, ascending.
    pub fn neighbors(&self, id: SegmentId) -> NetworkResult<&[SegmentId]> {
        if !self.contains(id) {
            return Err(NetworkError::UnknownSegment(id));
        }
        Ok(self.successors(id))
    }

    /// Successor slice without the bounds check on `id`, for hot loops.
    ///
    /// # Panics
    /// Panics if `id` is not a segment of this network.
    #[inline]
    pub fn successors(&self, id: SegmentId) -> &[SegmentId] {
        let start = self.adj_start[id.index()] as usize;
        let end   = self.adj_start[id.index() + 1] as usize;
        &self.adj_to[start..end]
    }

    /// `true` if `b` is directly reachable from `a`.
    pub fn is_adjacent(&self, a: SegmentId, b: SegmentId) -> bool {
        self.contains(a) && self.successors(a).binary_search(&b).is_ok()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Segments whose midpoint lies within `radius_m` of `center`, ascending.
    pub fn segments_within(&self, center: Point2, radius_m: f32) -> Vec<SegmentId> {
        let r = radius_m.max(0.0);
        let mut ids: Vec<SegmentId> = self
            .segment_idx
            .locate_within_distance(center.to_array(), r * r)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Segment whose midpoint is closest to `pos`.  `None` for an empty network.
    pub fn nearest_segment(&self, pos: Point2) -> Option<SegmentId> {
        self.segment_idx.nearest_neighbor(&pos.to_array()).map(|e| e.id)
    }

    /// Roadside unit closest to `pos`.  `None` if none were registered.
    pub fn nearest_rsu(&self, pos: Point2) -> Option<RsuId> {
        self.rsu_idx.nearest_neighbor(&pos.to_array()).map(|e| e.id)
    }

    pub fn rsu_position(&self, id: RsuId) -> Option<Point2> {
        self.rsus.get(id.index()).copied()
    }

    // ── Samples ───────────────────────────────────────────────────────────

    /// Append an observation to `id`'s window.
    ///
    /// # Errors
    ///
    /// `UnknownSegment` for an id outside the network; `InvalidSample` when
    /// the speed is negative or not finite.
    pub fn record_sample(
        &self,
        id:            SegmentId,
        vehicle_count: u32,
        avg_speed_mps: f32,
        tick:          Tick,
    ) -> NetworkResult<()> {
        let window = self.samples.get(id.index()).ok_or(NetworkError::UnknownSegment(id))?;
        if !avg_speed_mps.is_finite() || avg_speed_mps < 0.0 {
            return Err(NetworkError::InvalidSample {
                segment: id,
                reason:  format!("average speed must be a non-negative number, got {avg_speed_mps}"),
            });
        }
        window.write().push(Sample { vehicle_count, avg_speed_mps, tick });
        Ok(())
    }

    /// Most recent sample for `id`, or `None` if nothing was recorded yet.
    pub fn latest(&self, id: SegmentId) -> NetworkResult<Option<Sample>> {
        let window = self.samples.get(id.index()).ok_or(NetworkError::UnknownSegment(id))?;
        Ok(window.read().latest())
    }

    /// Copy of `id`'s rolling window.
    pub fn window(&self, id: SegmentId) -> NetworkResult<SampleWindow> {
        let window = self.samples.get(id.index()).ok_or(NetworkError::UnknownSegment(id))?;
        Ok(window.read().clone())
    }

    /// Latest sample for each requested segment.
    ///
    /// Segments without any sample are left out of the map.  Fails on the
    /// first unknown id.
    pub fn snapshot(&self, ids: &[SegmentId]) -> NetworkResult<BTreeMap<SegmentId, Sample>> {
        let mut out = BTreeMap::new();
        for &id in ids {
            if let Some(sample) = self.latest(id)? {
                out.insert(id, sample);
            }
        }
        Ok(out)
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use erv_core::Point2;
/// use erv_network::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_segment(100.0, 20, 13.9, Point2::new(50.0, 0.0));
/// let c = b.add_segment(100.0, 20, 13.9, Point2::new(150.0, 0.0));
/// b.connect_both(a, c).unwrap();
/// let net = b.build();
/// assert_eq!(net.segment_count(), 2);
/// assert_eq!(net.adjacency_count(), 2);
/// ```
pub struct RoadNetworkBuilder {
    segments:    Vec<RoadSegment>,
    links:       Vec<(SegmentId, SegmentId)>,
    rsus:        Vec<Point2>,
    window_size: usize,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            segments:    Vec::new(),
            links:       Vec::new(),
            rsus:        Vec::new(),
            window_size: DEFAULT_SAMPLE_WINDOW,
        }
    }

    /// Number of samples kept per segment (minimum 1).
    pub fn with_sample_window(mut self, size: usize) -> Self {
        self.window_size = size.max(1);
        self
    }

    /// Add a segment and return its `SegmentId` (sequential from 0).
    ///
    /// Non-positive lengths, capacities and speeds are raised to small
    /// positive values so density and heuristic terms stay finite.
    pub fn add_segment(
        &mut self,
        length_m:      f32,
        capacity:      u32,
        free_flow_mps: f32,
        midpoint:      Point2,
    ) -> SegmentId {
        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(RoadSegment {
            id,
            length_m:      length_m.max(0.1),
            capacity:      capacity.max(1),
            free_flow_mps: free_flow_mps.max(0.1),
            midpoint,
        });
        id
    }

    /// Allow travel from `from` directly into `to`.
    pub fn connect(&mut self, from: SegmentId, to: SegmentId) -> NetworkResult<()> {
        for id in [from, to] {
            if id.index() >= self.segments.len() {
                return Err(NetworkError::UnknownSegment(id));
            }
        }
        self.links.push((from, to));
        Ok(())
    }

    /// Allow travel in both directions between `a` and `b`.
    pub fn connect_both(&mut self, a: SegmentId, b: SegmentId) -> NetworkResult<()> {
        self.connect(a, b)?;
        self.connect(b, a)
    }

    /// Register a roadside unit and return its id.
    pub fn add_rsu(&mut self, position: Point2) -> RsuId {
        let id = RsuId(self.rsus.len() as u16);
        self.rsus.push(position);
        id
    }

    pub fn segment_count(&self) -> usize { self.segments.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Time complexity: O(L log L) for the adjacency sort + O(N log N) for
    /// the R-tree bulk loads.
    pub fn build(self) -> RoadNetwork {
        let count = self.segments.len();

        let mut links = self.links;
        links.sort_unstable();
        links.dedup();

        let adj_to: Vec<SegmentId> = links.iter().map(|&(_, to)| to).collect();

        let mut adj_start = vec![0u32; count + 1];
        for &(from, _) in &links {
            adj_start[from.index() + 1] += 1;
        }
        for i in 1..=count {
            adj_start[i] += adj_start[i - 1];
        }
        debug_assert_eq!(adj_start[count] as usize, adj_to.len());

        let segment_idx = RTree::bulk_load(
            self.segments
                .iter()
                .map(|s| IndexedPoint { point: s.midpoint.to_array(), id: s.id })
                .collect(),
        );
        let rsu_idx = RTree::bulk_load(
            self.rsus
                .iter()
                .enumerate()
                .map(|(i, p)| IndexedPoint { point: p.to_array(), id: RsuId(i as u16) })
                .collect(),
        );

        let samples = (0..count)
            .map(|_| RwLock::new(SampleWindow::new(self.window_size)))
            .collect();

        RoadNetwork {
            segments: self.segments,
            adj_start,
            adj_to,
            rsus: self.rsus,
            samples,
            segment_idx,
            rsu_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
