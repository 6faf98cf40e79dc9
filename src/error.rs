//! Error types for the centroid tracker.

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What is wrong with a rejected bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxDefect {
    /// At least one coordinate is NaN or infinite.
    NonFinite,
    /// `start_x > end_x` or `start_y > end_y`.
    Inverted,
    /// The midpoint on some axis does not fit in an `i32` pixel coordinate.
    OutOfRange,
}

impl std::fmt::Display for BoxDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite => write!(f, "coordinates must be finite"),
            Self::Inverted => write!(f, "start corner lies past end corner"),
            Self::OutOfRange => write!(f, "centroid lies outside the i32 range"),
        }
    }
}

/// Errors that can occur while tracking or correcting frames.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid bounding box at index {index}: {defect}")]
    InvalidBox { index: usize, defect: BoxDefect },

    #[error("Assignment solver failed: {0}")]
    Assignment(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid camera model: {0}")]
    InvalidCamera(String),

    #[error("Undistortion left no valid pixels")]
    EmptyRegion,
}
