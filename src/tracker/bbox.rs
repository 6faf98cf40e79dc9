use crate::error::{BoxDefect, Error, Result};
use crate::tracker::centroid::Centroid;

/// Axis-aligned bounding box as produced by a detector.
///
/// Stored in TLBR format: the top-left corner `(start_x, start_y)` and the
/// bottom-right corner `(end_x, end_y)`, in pixel units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    /// Top-left x coordinate
    pub start_x: f32,
    /// Top-left y coordinate
    pub start_y: f32,
    /// Bottom-right x coordinate
    pub end_x: f32,
    /// Bottom-right y coordinate
    pub end_y: f32,
}

impl BoundingBox {
    /// Create a new box from TLBR coordinates.
    #[inline]
    pub fn new(start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> Self {
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }

    /// Create a box from TLWH format (top-left x, top-left y, width, height).
    #[inline]
    pub fn from_tlwh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.start_x, self.start_y, self.end_x, self.end_y]
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.end_x - self.start_x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.end_y - self.start_y
    }

    /// Check that the box is usable for tracking.
    pub fn defect(&self) -> Option<BoxDefect> {
        if self.to_tlbr().iter().any(|v| !v.is_finite()) {
            return Some(BoxDefect::NonFinite);
        }
        if self.start_x > self.end_x || self.start_y > self.end_y {
            return Some(BoxDefect::Inverted);
        }
        let (cx, cy) = self.midpoint();
        if !fits_i32(cx) || !fits_i32(cy) {
            return Some(BoxDefect::OutOfRange);
        }
        None
    }

    /// Midpoint of the box, truncated toward zero on each axis.
    ///
    /// Only meaningful for boxes without a [`defect`](Self::defect); an
    /// out-of-range midpoint saturates at the `i32` bounds.
    pub fn centroid(&self) -> Centroid {
        let (cx, cy) = self.midpoint();
        Centroid::new(cx as i32, cy as i32)
    }

    /// Truncated midpoint on each axis, in f64.
    fn midpoint(&self) -> (f64, f64) {
        let cx = (self.start_x as f64 + self.end_x as f64) / 2.0;
        let cy = (self.start_y as f64 + self.end_y as f64) / 2.0;
        (cx.trunc(), cy.trunc())
    }
}

#[inline]
fn fits_i32(v: f64) -> bool {
    (i32::MIN as f64..=i32::MAX as f64).contains(&v)
}

/// Validate every box and compute the centroids in input order.
///
/// Fails on the first malformed box without producing partial output.
pub fn centroids(boxes: &[BoundingBox]) -> Result<Vec<Centroid>> {
    boxes
        .iter()
        .enumerate()
        .map(|(index, b)| match b.defect() {
            Some(defect) => Err(Error::InvalidBox { index, defect }),
            None => Ok(b.centroid()),
        })
        .collect()
}
