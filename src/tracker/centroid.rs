use serde::{Deserialize, Serialize};

/// Integer pixel position used as an object's location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Centroid {
    pub x: i32,
    pub y: i32,
}

impl Centroid {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another centroid.
    #[inline]
    pub fn distance(&self, other: &Centroid) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        dx.hypot(dy)
    }
}

impl From<(i32, i32)> for Centroid {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Centroid::new(0, 0);
        let b = Centroid::new(3, 4);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_distance_extreme_coordinates() {
        let a = Centroid::new(i32::MIN, 0);
        let b = Centroid::new(i32::MAX, 0);
        assert_eq!(a.distance(&b), u32::MAX as f64);
    }
}
