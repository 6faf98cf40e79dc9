//! TrackerPipeline for combining undistortion and detection with tracking.

use std::borrow::Cow;

use image::RgbImage;
use thiserror::Error;

use crate::error::Error;
use crate::tracker::{TrackedObject, Tracker, TrackerConfig};
use crate::undistort::UndistortionMap;

use super::DetectionSource;

/// Failure of one pipeline step.
#[derive(Error, Debug)]
pub enum PipelineError<E: std::error::Error + 'static> {
    /// The detector rejected the frame.
    #[error("Detection failed: {0}")]
    Detection(#[source] E),

    /// Undistortion or tracking rejected the frame.
    #[error(transparent)]
    Tracking(#[from] Error),
}

/// Bundles an optional undistortion step and a `DetectionSource` with a `Tracker`.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    undistortion: Option<UndistortionMap>,
    tracker: Tracker,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new tracking pipeline with the given detector and tracker config.
    pub fn new(detector: D, config: TrackerConfig) -> Self {
        Self {
            detector,
            undistortion: None,
            tracker: Tracker::new(config),
        }
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, TrackerConfig::default())
    }

    /// Correct every frame with `map` before detection.
    pub fn with_undistortion(mut self, map: UndistortionMap) -> Self {
        self.undistortion = Some(map);
        self
    }

    /// Process a single frame and return the tracked objects.
    ///
    /// Box coordinates from the detector refer to the corrected frame when
    /// undistortion is enabled.
    pub fn process_frame(
        &mut self,
        frame: &RgbImage,
    ) -> Result<Vec<TrackedObject>, PipelineError<D::Error>> {
        let frame = match &self.undistortion {
            Some(map) => Cow::Owned(map.apply(frame)?.0),
            None => Cow::Borrowed(frame),
        };

        let boxes = self
            .detector
            .detect(frame.as_raw(), frame.width(), frame.height())
            .map_err(PipelineError::Detection)?;

        Ok(self.tracker.update(&boxes)?)
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn undistortion(&self) -> Option<&UndistortionMap> {
        self.undistortion.as_ref()
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }
}
