//! A single tracked identity.

use serde::{Deserialize, Serialize};

use crate::tracker::centroid::Centroid;

/// Single tracked object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedObject {
    /// Unique object identifier, never reused by the tracker that issued it
    pub id: u64,
    /// Last known position
    pub centroid: Centroid,
    /// Consecutive frames since the object was last matched
    pub disappeared: u32,
}

impl TrackedObject {
    /// Create a freshly registered object.
    pub fn new(id: u64, centroid: Centroid) -> Self {
        Self {
            id,
            centroid,
            disappeared: 0,
        }
    }

    /// Move the object to a matched centroid and reset its counter.
    pub fn mark_matched(&mut self, centroid: Centroid) {
        self.centroid = centroid;
        self.disappeared = 0;
    }

    /// Count one more frame without a match. The counter saturates at `u32::MAX`.
    pub fn mark_missed(&mut self) {
        self.disappeared = self.disappeared.saturating_add(1);
    }

    /// True once the object has been missing for longer than `max_disappeared` frames.
    ///
    /// Never true for `u32::MAX`, since the counter cannot pass it.
    #[inline]
    pub fn is_expired(&self, max_disappeared: u32) -> bool {
        self.disappeared > max_disappeared
    }
}
