//! Main centroid tracker implementation.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::tracker::bbox::{self, BoundingBox};
use crate::tracker::centroid::Centroid;
use crate::tracker::matching::{self, AssignmentResult, AssignmentStrategy};
use crate::tracker::tracked_object::TrackedObject;

/// Configuration for the [`Tracker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Consecutive unmatched frames tolerated before an object is dropped.
    ///
    /// `u32::MAX` disables deregistration: the miss counter saturates there
    /// and objects are kept until the tracker itself is dropped.
    pub max_disappeared: u32,
    pub assignment: AssignmentStrategy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_disappeared: 50,
            assignment: AssignmentStrategy::Greedy,
        }
    }
}

impl TrackerConfig {
    /// Parse a configuration from JSON, e.g. `{"max_disappeared": 30}`.
    ///
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Centroid tracker.
///
/// Keeps objects in registration order, which is also ascending ID order.
#[derive(Debug, Clone)]
pub struct Tracker {
    objects: Vec<TrackedObject>,
    next_id: u64,
    config: TrackerConfig,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            objects: Vec::new(),
            next_id: 0,
            config,
        }
    }

    pub fn with_max_disappeared(max_disappeared: u32) -> Self {
        Self::new(TrackerConfig {
            max_disappeared,
            ..TrackerConfig::default()
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Currently tracked objects in registration order.
    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    pub fn get(&self, id: u64) -> Option<&TrackedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// ID → centroid pairs in registration order.
    pub fn centroids(&self) -> Vec<(u64, Centroid)> {
        self.objects.iter().map(|o| (o.id, o.centroid)).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// ID the next registered object will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Process one frame of detections and return the tracked objects.
    ///
    /// All boxes are validated before any state changes, so a rejected frame
    /// leaves the tracker exactly as it was.
    pub fn update(&mut self, boxes: &[BoundingBox]) -> Result<Vec<TrackedObject>> {
        let input_centroids = bbox::centroids(boxes)?;

        // Step 1: No detections, every object missed this frame
        if input_centroids.is_empty() {
            for obj in &mut self.objects {
                obj.mark_missed();
            }
            self.drop_expired();
            trace!(tracked = self.objects.len(), "frame without detections");
            return Ok(self.objects.clone());
        }

        // Step 2: Nothing to match against, register everything
        if self.objects.is_empty() {
            for &centroid in &input_centroids {
                self.register(centroid);
            }
            trace!(tracked = self.objects.len(), "bootstrapped tracker");
            return Ok(self.objects.clone());
        }

        // Step 3: Associate existing objects with new centroids
        let object_centroids: Vec<Centroid> = self.objects.iter().map(|o| o.centroid).collect();
        let dists = matching::distance_matrix(&object_centroids, &input_centroids);
        let (num_rows, num_cols) = dists.dim();

        let AssignmentResult {
            matches,
            unmatched_rows,
            unmatched_cols,
        } = matching::assign(&dists, self.config.assignment)?;

        for &(row, col) in &matches {
            self.objects[row].mark_matched(input_centroids[col]);
        }

        // Step 4: Exactly one of the two sides gets bookkeeping
        if num_rows >= num_cols {
            for &row in &unmatched_rows {
                self.objects[row].mark_missed();
            }
            self.drop_expired();
        } else {
            for &col in &unmatched_cols {
                self.register(input_centroids[col]);
            }
        }

        trace!(
            tracked = self.objects.len(),
            detections = num_cols,
            matched = matches.len(),
            "frame processed"
        );

        Ok(self.objects.clone())
    }

    fn register(&mut self, centroid: Centroid) {
        let id = self.next_id;
        self.next_id += 1;
        debug!(id, x = centroid.x, y = centroid.y, "registered object");
        self.objects.push(TrackedObject::new(id, centroid));
    }

    fn drop_expired(&mut self) {
        let max_disappeared = self.config.max_disappeared;
        self.objects.retain(|obj| {
            let expired = obj.is_expired(max_disappeared);
            if expired {
                debug!(id = obj.id, disappeared = obj.disappeared, "deregistered object");
            }
            !expired
        });
    }
}
