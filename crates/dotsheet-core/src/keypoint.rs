use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A circular blob reported by a blob detector.
///
/// This is the thing you obtain by adapting the output of your blob detector.
/// It is never mutated by the detection pipeline; decoded attributes are kept
/// in a parallel structure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Blob center in video pixel coordinates.
    pub position: Point2<f32>,
    /// Blob diameter in pixels.
    pub size: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            size,
        }
    }
}
