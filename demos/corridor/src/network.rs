//! Nine-junction grid used by the corridor demo.
//!
//! ```text
//!   A ─── B ─── C
//!   │     │     │
//!   D ─── E ─── F
//!   │     │     │
//!   G ─── H ─── I
//! ```
//!
//! Junctions are 200 m apart.  Every road is two directed segments, and a
//! segment leads into every segment leaving its end junction except the one
//! going straight back.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use erv_core::{Point2, SegmentId};
use erv_network::{RoadNetwork, RoadNetworkBuilder};

const SPACING_M:     f32 = 200.0;
const CAPACITY:      u32 = 20;
const FREE_FLOW_MPS: f32 = 13.9; // 50 km/h

const JUNCTIONS: [(char, f32, f32); 9] = [
    ('A', 0.0, 2.0), ('B', 1.0, 2.0), ('C', 2.0, 2.0),
    ('D', 0.0, 1.0), ('E', 1.0, 1.0), ('F', 2.0, 1.0),
    ('G', 0.0, 0.0), ('H', 1.0, 0.0), ('I', 2.0, 0.0),
];

const ROADS: [(char, char); 12] = [
    ('A', 'B'), ('B', 'C'), ('D', 'E'), ('E', 'F'), ('G', 'H'), ('H', 'I'),
    ('A', 'D'), ('D', 'G'), ('B', 'E'), ('E', 'H'), ('C', 'F'), ('F', 'I'),
];

/// Roadside units sit at these junctions.
const RSU_JUNCTIONS: [char; 3] = ['B', 'E', 'H'];

/// Junction-pair names for the grid's segments.
pub struct Labels {
    segments: BTreeMap<(char, char), SegmentId>,
}

impl Labels {
    /// The directed segment from junction `from` to junction `to`.
    pub fn segment(&self, from: char, to: char) -> Result<SegmentId> {
        self.segments
            .get(&(from, to))
            .copied()
            .with_context(|| format!("no road {from}→{to}"))
    }

    /// Segments along a junction sequence, e.g. `"DEF"` → `[D→E, E→F]`.
    pub fn route(&self, junctions: &str) -> Result<Vec<SegmentId>> {
        let chars: Vec<char> = junctions.chars().collect();
        chars.windows(2).map(|w| self.segment(w[0], w[1])).collect()
    }

    pub fn label(&self, id: SegmentId) -> String {
        self.segments
            .iter()
            .find(|&(_, &s)| s == id)
            .map(|(&(a, b), _)| format!("{a}{b}"))
            .unwrap_or_else(|| id.to_string())
    }
}

pub fn build_grid() -> Result<(RoadNetwork, Labels)> {
    let position: BTreeMap<char, Point2> = JUNCTIONS
        .iter()
        .map(|&(name, x, y)| (name, Point2::new(x * SPACING_M, y * SPACING_M)))
        .collect();
    let at = |j: char| position.get(&j).copied().with_context(|| format!("unknown junction {j}"));

    let mut b = RoadNetworkBuilder::new();
    let mut segments = BTreeMap::new();
    for &(u, v) in &ROADS {
        let (pu, pv) = (at(u)?, at(v)?);
        let mid = Point2::new((pu.x + pv.x) / 2.0, (pu.y + pv.y) / 2.0);
        let length = pu.distance_m(pv);
        segments.insert((u, v), b.add_segment(length, CAPACITY, FREE_FLOW_MPS, mid));
        segments.insert((v, u), b.add_segment(length, CAPACITY, FREE_FLOW_MPS, mid));
    }

    for (&(u, v), &from) in &segments {
        for (&(v2, w), &to) in &segments {
            if v2 == v && w != u {
                b.connect(from, to)?;
            }
        }
    }

    for j in RSU_JUNCTIONS {
        b.add_rsu(at(j)?);
    }

    Ok((b.build(), Labels { segments }))
}
