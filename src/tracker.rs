mod bbox;
mod centroid;
mod centroid_tracker;
mod matching;
mod tracked_object;

pub use bbox::{BoundingBox, centroids};
pub use centroid::Centroid;
pub use centroid_tracker::{Tracker, TrackerConfig};
pub use matching::{
    AssignmentResult, AssignmentStrategy, assign, distance_matrix, greedy_assignment,
    linear_assignment,
};
pub use tracked_object::TrackedObject;
