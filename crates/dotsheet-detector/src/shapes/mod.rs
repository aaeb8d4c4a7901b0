//! Corner shape finding and decoding.
//!
//! A corner shape is 7 dots: an arm of 3, the corner dot, and another arm of
//! 3, read so that `cross(p0 - p3, p6 - p3)` is not positive. Finders locate
//! candidate shapes in the neighbor graph; [`decode_shapes`] reads their
//! colors.

mod right_angle;
mod terminal;

pub use right_angle::RightAngleFinder;
pub use terminal::TerminalPointFinder;

use std::collections::BTreeMap;

use dotsheet_code::{CodeMatcher, CornerCode, CODE_LENGTH};
use dotsheet_core::{cross, Keypoint, Rgb};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::graph::NeighborGraph;
use crate::params::{ShapeParams, ShapeStrategy};

/// Keypoint indices of one corner shape; index 3 is the corner dot.
pub type Shape = [usize; CODE_LENGTH];

/// Strategy for locating corner shapes in the neighbor graph.
pub trait ShapeFinder {
    /// Candidate shapes, winding-normalized. A keypoint belongs to at most
    /// one returned shape.
    fn find_shapes(&self, keypoints: &[Keypoint], graph: &NeighborGraph) -> Vec<Shape>;
}

/// Finder configured by `params.strategy`.
pub fn finder_for(params: &ShapeParams) -> Box<dyn ShapeFinder> {
    match params.strategy {
        ShapeStrategy::RightAngle => Box::new(RightAngleFinder::from_params(params)),
        ShapeStrategy::TerminalPoint => Box::new(TerminalPointFinder::from_params(params)),
    }
}

/// Reverse `shape` if it winds the wrong way.
pub(crate) fn normalize_winding(shape: &mut Shape, keypoints: &[Keypoint], threshold: f32) {
    let p = |k: usize| keypoints[shape[k]].position;
    if cross(p(0) - p(3), p(6) - p(3)) > threshold {
        shape.reverse();
    }
}

/// A shape whose colors matched a printed code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedShape {
    pub shape: Shape,
    pub code: CornerCode,
    pub colors: [u8; CODE_LENGTH],
}

/// Decode candidate shapes; shapes that match no code are dropped.
///
/// `samples` holds one color sample per keypoint.
pub fn decode_shapes(shapes: &[Shape], samples: &[Rgb], matcher: &CodeMatcher<'_>) -> Vec<DecodedShape> {
    shapes
        .iter()
        .filter_map(|shape| {
            let colors = shape.map(|k| samples[k]);
            let m = matcher.decode(&colors)?;
            Some(DecodedShape {
                shape: *shape,
                code: m.code,
                colors: m.colors,
            })
        })
        .collect()
}

/// One observed sheet corner in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerObservation {
    /// Position of the corner dot.
    pub position: Point2<f32>,
    /// Last dot of the shape minus the corner dot.
    pub direction: Vector2<f32>,
}

/// Corner observations of one frame, grouped by sheet id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameCorners {
    pub sheets: BTreeMap<u32, [Option<CornerObservation>; 4]>,
    /// Diameters of every dot in every decoded shape.
    pub dot_sizes: Vec<f32>,
}

impl FrameCorners {
    /// Collect decoded shapes. A later shape for the same sheet corner
    /// replaces an earlier one.
    pub fn from_decoded(decoded: &[DecodedShape], keypoints: &[Keypoint]) -> Self {
        let mut out = Self::default();
        for d in decoded {
            let corner = keypoints[d.shape[3]].position;
            let last = keypoints[d.shape[6]].position;
            let slots = out.sheets.entry(d.code.id).or_insert([None; 4]);
            slots[d.code.corner.index()] = Some(CornerObservation {
                position: corner,
                direction: last - corner,
            });
            out.dot_sizes
                .extend(d.shape.iter().map(|&k| keypoints[k].size));
        }
        out
    }

    /// Mean decoded dot diameter, 0 when nothing was decoded.
    pub fn average_dot_size(&self) -> f32 {
        if self.dot_sizes.is_empty() {
            return 0.0;
        }
        self.dot_sizes.iter().sum::<f32>() / self.dot_sizes.len() as f32
    }
}
