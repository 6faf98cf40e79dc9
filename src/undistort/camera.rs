//! Pinhole camera model with Brown–Conrady lens distortion.

use nalgebra::{Matrix3, Vector3};

use crate::error::{Error, Result};

/// Grid resolution used when probing the undistorted image extent.
const GRID: usize = 9;

/// Fixed-point iterations used to invert the distortion model.
const UNDISTORT_ITERATIONS: usize = 5;

/// Valid pixel region of an undistorted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
struct RectF {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Camera intrinsics `K` and distortion coefficients `(k1, k2, p1, p2, k3)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraModel {
    intrinsics: Matrix3<f64>,
    intrinsics_inv: Matrix3<f64>,
    distortion: [f64; 5],
}

impl Default for CameraModel {
    /// Calibration of the fixed overhead camera.
    fn default() -> Self {
        let intrinsics = Matrix3::new(
            7.653e+02, 0.0, 3.154e+02, //
            0.0, 7.653e+02, 2.559e+02, //
            0.0, 0.0, 1.0,
        );
        let distortion = [-3.596e-01, 1.739e-01, 7.411e-05, 9.025e-05, -1.927e-01];
        // fx, fy are non-zero so K is invertible.
        let intrinsics_inv = intrinsics.try_inverse().unwrap_or_else(Matrix3::identity);
        Self {
            intrinsics,
            intrinsics_inv,
            distortion,
        }
    }
}

impl CameraModel {
    pub fn new(intrinsics: Matrix3<f64>, distortion: [f64; 5]) -> Result<Self> {
        if intrinsics.iter().chain(distortion.iter()).any(|v| !v.is_finite()) {
            return Err(Error::InvalidCamera("parameters must be finite".to_string()));
        }
        let intrinsics_inv = intrinsics
            .try_inverse()
            .ok_or_else(|| Error::InvalidCamera("intrinsics matrix is singular".to_string()))?;
        Ok(Self {
            intrinsics,
            intrinsics_inv,
            distortion,
        })
    }

    pub fn intrinsics(&self) -> &Matrix3<f64> {
        &self.intrinsics
    }

    pub fn distortion(&self) -> &[f64; 5] {
        &self.distortion
    }

    /// Apply lens distortion to an ideal normalized image point.
    pub fn distort_normalized(&self, x: f64, y: f64) -> (f64, f64) {
        let [k1, k2, p1, p2, k3] = self.distortion;
        let r2 = x * x + y * y;
        let radial = 1.0 + r2 * (k1 + r2 * (k2 + r2 * k3));
        let xd = x * radial + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
        let yd = y * radial + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;
        (xd, yd)
    }

    /// Remove lens distortion from a normalized image point.
    pub fn undistort_normalized(&self, xd: f64, yd: f64) -> (f64, f64) {
        let [k1, k2, p1, p2, k3] = self.distortion;
        let (mut x, mut y) = (xd, yd);
        for _ in 0..UNDISTORT_ITERATIONS {
            let r2 = x * x + y * y;
            let icdist = 1.0 / (1.0 + ((k3 * r2 + k2) * r2 + k1) * r2);
            let delta_x = 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
            let delta_y = p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;
            x = (xd - delta_x) * icdist;
            y = (yd - delta_y) * icdist;
        }
        (x, y)
    }

    /// Undistort a raw pixel, returning normalized coordinates.
    pub fn undistort_pixel(&self, u: f64, v: f64) -> (f64, f64) {
        let n = self.intrinsics_inv * Vector3::new(u, v, 1.0);
        self.undistort_normalized(n.x / n.z, n.y / n.z)
    }

    /// Raw pixel that an ideal normalized point is imaged at.
    pub fn project_distorted(&self, x: f64, y: f64) -> (f64, f64) {
        let (xd, yd) = self.distort_normalized(x, y);
        let p = self.intrinsics * Vector3::new(xd, yd, 1.0);
        (p.x / p.z, p.y / p.z)
    }

    /// Inscribed and circumscribed rectangles of the undistorted frame.
    ///
    /// Coordinates are normalized, or pixels of `projection` when given.
    fn rectangles(
        &self,
        width: u32,
        height: u32,
        projection: Option<&Matrix3<f64>>,
    ) -> (RectF, RectF) {
        let (mut ix0, mut ix1, mut iy0, mut iy1) =
            (f64::MIN, f64::MAX, f64::MIN, f64::MAX);
        let (mut ox0, mut ox1, mut oy0, mut oy1) =
            (f64::MAX, f64::MIN, f64::MAX, f64::MIN);

        for gy in 0..GRID {
            for gx in 0..GRID {
                let u = gx as f64 * width as f64 / (GRID - 1) as f64;
                let v = gy as f64 * height as f64 / (GRID - 1) as f64;
                let (mut px, mut py) = self.undistort_pixel(u, v);
                if let Some(p) = projection {
                    let q = p * Vector3::new(px, py, 1.0);
                    px = q.x / q.z;
                    py = q.y / q.z;
                }

                ox0 = ox0.min(px);
                ox1 = ox1.max(px);
                oy0 = oy0.min(py);
                oy1 = oy1.max(py);
                if gx == 0 {
                    ix0 = ix0.max(px);
                }
                if gx == GRID - 1 {
                    ix1 = ix1.min(px);
                }
                if gy == 0 {
                    iy0 = iy0.max(py);
                }
                if gy == GRID - 1 {
                    iy1 = iy1.min(py);
                }
            }
        }

        let inner = RectF {
            x: ix0,
            y: iy0,
            width: ix1 - ix0,
            height: iy1 - iy0,
        };
        let outer = RectF {
            x: ox0,
            y: oy0,
            width: ox1 - ox0,
            height: oy1 - oy0,
        };
        (inner, outer)
    }

    /// New camera matrix for the undistorted frame and its valid region.
    ///
    /// `alpha = 0` keeps only valid pixels; `alpha = 1` keeps every source pixel.
    pub fn optimal_new_camera_matrix(
        &self,
        width: u32,
        height: u32,
        alpha: f64,
    ) -> Result<(Matrix3<f64>, Roi)> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!(
                "frame size must be non-zero, got {width}x{height}"
            )));
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Error::InvalidConfig(format!(
                "alpha must lie in [0, 1], got {alpha}"
            )));
        }

        let (inner, outer) = self.rectangles(width, height, None);
        if !(inner.width > 0.0 && inner.height > 0.0) {
            return Err(Error::EmptyRegion);
        }

        let view_w = (width - 1) as f64;
        let view_h = (height - 1) as f64;

        let fx0 = view_w / inner.width;
        let fy0 = view_h / inner.height;
        let cx0 = -fx0 * inner.x;
        let cy0 = -fy0 * inner.y;

        let fx1 = view_w / outer.width;
        let fy1 = view_h / outer.height;
        let cx1 = -fx1 * outer.x;
        let cy1 = -fy1 * outer.y;

        let new_intrinsics = Matrix3::new(
            fx0 * (1.0 - alpha) + fx1 * alpha,
            0.0,
            cx0 * (1.0 - alpha) + cx1 * alpha,
            0.0,
            fy0 * (1.0 - alpha) + fy1 * alpha,
            cy0 * (1.0 - alpha) + cy1 * alpha,
            0.0,
            0.0,
            1.0,
        );

        let (valid, _) = self.rectangles(width, height, Some(&new_intrinsics));
        let roi = clip_to_frame(valid, width, height).ok_or(Error::EmptyRegion)?;

        Ok((new_intrinsics, roi))
    }
}

fn clip_to_frame(rect: RectF, width: u32, height: u32) -> Option<Roi> {
    if ![rect.x, rect.y, rect.width, rect.height].iter().all(|v| v.is_finite()) {
        return None;
    }
    let x = rect.x.round() as i64;
    let y = rect.y.round() as i64;
    let x1 = (x + rect.width.round() as i64).min(width as i64);
    let y1 = (y + rect.height.round() as i64).min(height as i64);
    let x0 = x.max(0);
    let y0 = y.max(0);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Roi {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}
