//! Precomputed undistortion map and bilinear resampling.

use image::{Rgb, RgbImage};
use nalgebra::{Matrix3, Vector3};
use tracing::debug;

use crate::error::{Error, Result};
use crate::undistort::camera::{CameraModel, Roi};

/// Per-pixel lookup from the corrected, cropped frame into the raw frame.
///
/// Building the map is the expensive part; reuse one map for every frame of
/// a stream with a fixed resolution.
#[derive(Debug, Clone)]
pub struct UndistortionMap {
    width: u32,
    height: u32,
    roi: Roi,
    new_intrinsics: Matrix3<f64>,
    /// Source (x, y) for each output pixel, row-major over the ROI.
    map: Vec<[f32; 2]>,
}

impl UndistortionMap {
    /// Build the map for frames of `width` x `height` pixels.
    pub fn new(camera: &CameraModel, width: u32, height: u32) -> Result<Self> {
        let (new_intrinsics, roi) = camera.optimal_new_camera_matrix(width, height, 1.0)?;
        let new_inv = new_intrinsics.try_inverse().ok_or_else(|| {
            Error::InvalidCamera("rectified camera matrix is singular".to_string())
        })?;

        let mut map = Vec::with_capacity(roi.width as usize * roi.height as usize);
        for v in roi.y..roi.y + roi.height {
            for u in roi.x..roi.x + roi.width {
                let n = new_inv * Vector3::new(u as f64, v as f64, 1.0);
                let (sx, sy) = camera.project_distorted(n.x / n.z, n.y / n.z);
                map.push([sx as f32, sy as f32]);
            }
        }

        debug!(width, height, ?roi, "built undistortion map");

        Ok(Self {
            width,
            height,
            roi,
            new_intrinsics,
            map,
        })
    }

    /// Valid region, in coordinates of the uncropped corrected frame.
    pub fn roi(&self) -> Roi {
        self.roi
    }

    pub fn new_intrinsics(&self) -> &Matrix3<f64> {
        &self.new_intrinsics
    }

    /// Size of the raw frames this map accepts.
    pub fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size of the corrected frames this map produces.
    pub fn output_size(&self) -> (u32, u32) {
        (self.roi.width, self.roi.height)
    }

    /// Correct one frame and return it with its new `(width, height)`.
    pub fn apply(&self, image: &RgbImage) -> Result<(RgbImage, (u32, u32))> {
        if image.dimensions() != (self.width, self.height) {
            return Err(Error::InvalidImage(format!(
                "expected {}x{} frame, got {}x{}",
                self.width,
                self.height,
                image.width(),
                image.height()
            )));
        }

        let out_w = self.roi.width;
        let corrected = RgbImage::from_fn(out_w, self.roi.height, |x, y| {
            let [sx, sy] = self.map[(y * out_w + x) as usize];
            sample_bilinear(image, sx, sy)
        });
        let dim = corrected.dimensions();
        Ok((corrected, dim))
    }
}

/// Bilinear sample; neighbours outside the frame count as black.
fn sample_bilinear(image: &RgbImage, sx: f32, sy: f32) -> Rgb<u8> {
    if !sx.is_finite() || !sy.is_finite() {
        return Rgb([0, 0, 0]);
    }
    let (w, h) = (image.width() as i64, image.height() as i64);
    let x0f = sx.floor();
    let y0f = sy.floor();
    let fx = sx - x0f;
    let fy = sy - y0f;
    let (x0, y0) = (x0f as i64, y0f as i64);

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];

    let mut acc = [0.0_f32; 3];
    for (px, py, weight) in taps {
        if weight == 0.0 || px < 0 || py < 0 || px >= w || py >= h {
            continue;
        }
        let p = image.get_pixel(px as u32, py as u32);
        for c in 0..3 {
            acc[c] += weight * p[c] as f32;
        }
    }
    Rgb(acc.map(|v| v.round().clamp(0.0, 255.0) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinhole(width: u32, height: u32) -> CameraModel {
        let k = Matrix3::new(
            60.0,
            0.0,
            width as f64 / 2.0,
            0.0,
            60.0,
            height as f64 / 2.0,
            0.0,
            0.0,
            1.0,
        );
        CameraModel::new(k, [0.0; 5]).unwrap()
    }

    #[test]
    fn test_sample_bilinear_blends() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([100, 200, 50]));
        assert_eq!(sample_bilinear(&img, 0.5, 0.0), Rgb([50, 100, 25]));
        assert_eq!(sample_bilinear(&img, 1.0, 0.0), Rgb([100, 200, 50]));
    }

    #[test]
    fn test_sample_outside_is_black() {
        let img = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        assert_eq!(sample_bilinear(&img, -3.0, 1.0), Rgb([0, 0, 0]));
        assert_eq!(sample_bilinear(&img, 1.0, 10.0), Rgb([0, 0, 0]));
        assert_eq!(sample_bilinear(&img, f32::NAN, 1.0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_zero_distortion_keeps_uniform_frame() {
        let camera = pinhole(40, 30);
        let map = UndistortionMap::new(&camera, 40, 30).unwrap();
        let color = Rgb([200, 100, 50]);
        let frame = RgbImage::from_pixel(40, 30, color);

        let (corrected, dim) = map.apply(&frame).unwrap();
        assert_eq!(dim, (39, 29));
        assert_eq!(map.output_size(), dim);
        assert!(corrected.pixels().all(|p| *p == color));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let camera = pinhole(40, 30);
        let map = UndistortionMap::new(&camera, 40, 30).unwrap();
        let frame = RgbImage::new(30, 40);
        assert!(matches!(map.apply(&frame), Err(Error::InvalidImage(_))));
    }

    #[test]
    fn test_default_camera_map() {
        let camera = CameraModel::default();
        let map = UndistortionMap::new(&camera, 640, 480).unwrap();
        let roi = map.roi();
        assert_eq!(map.input_size(), (640, 480));
        assert_eq!(map.output_size(), (roi.width, roi.height));

        let frame = RgbImage::from_pixel(640, 480, Rgb([10, 20, 30]));
        let (corrected, (w, h)) = map.apply(&frame).unwrap();
        assert_eq!(corrected.dimensions(), (w, h));
        // The centre of the valid region maps well inside the raw frame.
        assert_eq!(*corrected.get_pixel(w / 2, h / 2), Rgb([10, 20, 30]));
    }
}
