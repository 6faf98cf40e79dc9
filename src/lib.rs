//! # centroid-tracker-rs
//!
//! Multi-object tracking by nearest-centroid association.
//!
//! Each frame's bounding boxes are reduced to integer centroids, matched to
//! the objects already being tracked by Euclidean distance, and the
//! leftovers either start new identities or age existing ones until they are
//! dropped. IDs are never reused.
//!
//! ## Example
//!
//! ```rust
//! use centroid_tracker_rs::{BoundingBox, Tracker};
//!
//! let mut tracker = Tracker::with_max_disappeared(50);
//! let objects = tracker.update(&[BoundingBox::new(0.0, 0.0, 10.0, 10.0)]).unwrap();
//! assert_eq!(objects[0].id, 0);
//! ```

mod error;
pub mod integration;
pub mod tracker;
pub mod undistort;

pub use error::{BoxDefect, Error, Result};
pub use integration::{
    BoxBuilder, DetectionSource, IntoBoundingBoxes, PipelineError, TrackerPipeline,
};
pub use tracker::{
    AssignmentStrategy, BoundingBox, Centroid, TrackedObject, Tracker, TrackerConfig,
};
pub use undistort::{CameraModel, Roi, UndistortionMap, undistort};
