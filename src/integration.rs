//! Integration module for connecting object detection backends with the tracker.
//!
//! This module provides traits and utilities for plugging any detector into
//! the centroid tracker, optionally behind lens undistortion.

mod builder;
mod detector;
mod pipeline;

pub use builder::BoxBuilder;
pub use detector::{DetectionSource, IntoBoundingBoxes};
pub use pipeline::{PipelineError, TrackerPipeline};
