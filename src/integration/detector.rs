//! Trait for object detection inference backends.

use crate::tracker::BoundingBox;

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the tracker.
///
/// # Example
///
/// ```ignore
/// use centroid_tracker_rs::{BoundingBox, DetectionSource};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<BoundingBox>, Self::Error> {
///         // Run inference and return boxes
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error: std::error::Error + 'static;

    /// Run inference on a frame and return the detected boxes.
    ///
    /// # Arguments
    /// * `input` - Packed RGB8 pixels, row-major
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<BoundingBox>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `BoundingBox`.
pub trait IntoBoundingBoxes {
    fn into_bounding_boxes(self) -> Vec<BoundingBox>;
}

impl IntoBoundingBoxes for Vec<BoundingBox> {
    fn into_bounding_boxes(self) -> Vec<BoundingBox> {
        self
    }
}

/// Raw TLBR arrays, as most detectors emit them.
impl IntoBoundingBoxes for Vec<[f32; 4]> {
    fn into_bounding_boxes(self) -> Vec<BoundingBox> {
        self.into_iter()
            .map(|[x1, y1, x2, y2]| BoundingBox::new(x1, y1, x2, y2))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tlbr_arrays_into_boxes() {
        let raw = vec![[0.0, 0.0, 10.0, 10.0], [5.0, 6.0, 7.0, 8.0]];
        let boxes = raw.into_bounding_boxes();
        assert_eq!(boxes[1], BoundingBox::new(5.0, 6.0, 7.0, 8.0));
    }
}
