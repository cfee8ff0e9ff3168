//! Traffic samples and the per-segment rolling window.

use std::collections::VecDeque;

use erv_core::Tick;

/// One occupancy/speed observation of a segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub vehicle_count: u32,
    /// Mean speed of the vehicles on the segment, m/s.  Never negative.
    pub avg_speed_mps: f32,
    /// Tick at which the simulator reported this sample.
    pub tick: Tick,
}

/// Bounded history of samples for one segment, oldest first.
///
/// Samples are only ever appended; once `capacity` is reached the oldest is
/// dropped.  Readers only ever see copies.
#[derive(Clone, Debug)]
pub struct SampleWindow {
    samples:  VecDeque<Sample>,
    capacity: usize,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { samples: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Most recent sample, if any.
    #[inline]
    pub fn latest(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    /// Mean `(vehicle_count, avg_speed_mps)` across the window.
    pub fn mean(&self) -> Option<(f32, f32)> {
        if self.samples.is_empty() {
            return None;
        }
        let n = self.samples.len() as f32;
        let (count, speed) = self
            .samples
            .iter()
            .fold((0.0f32, 0.0f32), |(c, s), x| (c + x.vehicle_count as f32, s + x.avg_speed_mps));
        Some((count / n, speed / n))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
