//! Lens undistortion of raw camera frames.
//!
//! This runs upstream of detection and is stateless with respect to tracking:
//! a frame goes in, a corrected frame cropped to its valid region comes out.

mod camera;
mod remap;

pub use camera::{CameraModel, Roi};
pub use remap::UndistortionMap;

use image::RgbImage;

use crate::error::Result;

/// Correct a single frame, returning it with its new `(width, height)`.
///
/// Builds a fresh [`UndistortionMap`] on every call; prefer keeping a map
/// around when processing a stream.
pub fn undistort(camera: &CameraModel, image: &RgbImage) -> Result<(RgbImage, (u32, u32))> {
    let (width, height) = image.dimensions();
    UndistortionMap::new(camera, width, height)?.apply(image)
}
