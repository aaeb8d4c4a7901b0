use std::f32::consts::FRAC_PI_2;

use dotsheet_core::{vertex_angle, Keypoint};
use nalgebra::Point2;

use super::{normalize_winding, Shape, ShapeFinder};
use crate::graph::NeighborGraph;
use crate::params::ShapeParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Dots along each arm after the baseline neighbor.
const ARM_EXTENSION: usize = 2;

/// Finds corners as right angles between two neighbors of a dot, then grows
/// both arms along straight lines through the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct RightAngleFinder {
    pub right_angle_tolerance: f32,
    pub arm_angle_tolerance: f32,
    pub winding_threshold: f32,
}

impl Default for RightAngleFinder {
    fn default() -> Self {
        Self::from_params(&ShapeParams::default())
    }
}

impl RightAngleFinder {
    pub fn from_params(params: &ShapeParams) -> Self {
        Self {
            right_angle_tolerance: params.right_angle_tolerance,
            arm_angle_tolerance: params.arm_angle_tolerance,
            winding_threshold: params.winding_threshold,
        }
    }

    fn is_right_angle(&self, angle: f32) -> bool {
        (angle - FRAC_PI_2).abs() / FRAC_PI_2 <= self.right_angle_tolerance
    }

    fn arm(
        &self,
        keypoints: &[Keypoint],
        graph: &NeighborGraph,
        vertex: usize,
        baseline: usize,
        seen: &mut [bool],
    ) -> Option<[usize; 3]> {
        let search = ArmSearch {
            keypoints,
            graph,
            origin: keypoints[vertex].position,
            base: keypoints[baseline].position,
            tolerance: self.arm_angle_tolerance,
        };
        let found = search.grow(baseline, seen, ARM_EXTENSION)?;
        let mut arm = [baseline, found[0], found[1]];
        let origin = search.origin;
        arm.sort_by(|&a, &b| {
            let da = (keypoints[a].position - origin).norm();
            let db = (keypoints[b].position - origin).norm();
            da.total_cmp(&db)
        });
        Some(arm)
    }
}

/// Straight-line extension of one arm through the graph.
struct ArmSearch<'a> {
    keypoints: &'a [Keypoint],
    graph: &'a NeighborGraph,
    /// Corner dot.
    origin: Point2<f32>,
    /// Neighbor of the corner that fixes the arm direction.
    base: Point2<f32>,
    tolerance: f32,
}

impl ArmSearch<'_> {
    /// Depth-first growth from `tip`, keeping dots whose direction from the
    /// corner stays within `tolerance` of the baseline direction. Returns the
    /// added dots, deepest first.
    fn grow(&self, tip: usize, seen: &mut [bool], remaining: usize) -> Option<Vec<usize>> {
        let mut candidates: Vec<(usize, f32)> = self
            .graph
            .neighbors(tip)
            .iter()
            .map(|&c| {
                let a = vertex_angle(self.origin, self.base, self.keypoints[c].position);
                (c, a)
            })
            .filter(|&(_, a)| a < self.tolerance)
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (c, _) in candidates {
            if seen[c] {
                continue;
            }
            seen[c] = true;
            if remaining == 1 {
                return Some(vec![c]);
            }
            if let Some(mut found) = self.grow(c, seen, remaining - 1) {
                found.push(c);
                return Some(found);
            }
            seen[c] = false;
        }
        None
    }
}

impl ShapeFinder for RightAngleFinder {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(keypoints = keypoints.len())))]
    fn find_shapes(&self, keypoints: &[Keypoint], graph: &NeighborGraph) -> Vec<Shape> {
        let n = keypoints.len();
        let mut used = vec![false; n];
        let mut shapes = Vec::new();

        for vertex in 0..n {
            let neighbors = graph.neighbors(vertex);
            if neighbors.len() < 2 || used[vertex] {
                continue;
            }
            let origin = keypoints[vertex].position;

            'pairs: for (pos, &n1) in neighbors.iter().enumerate() {
                for &n2 in &neighbors[pos + 1..] {
                    if used[n1] || used[n2] {
                        continue;
                    }
                    let angle =
                        vertex_angle(origin, keypoints[n1].position, keypoints[n2].position);
                    if !self.is_right_angle(angle) {
                        continue;
                    }

                    let mut seen = used.clone();
                    seen[vertex] = true;
                    seen[n1] = true;
                    seen[n2] = true;

                    let Some(near_one) = self.arm(keypoints, graph, vertex, n1, &mut seen) else {
                        continue;
                    };
                    let Some(near_two) = self.arm(keypoints, graph, vertex, n2, &mut seen) else {
                        continue;
                    };

                    let mut shape: Shape = [
                        near_one[2],
                        near_one[1],
                        near_one[0],
                        vertex,
                        near_two[0],
                        near_two[1],
                        near_two[2],
                    ];
                    for &k in &shape {
                        used[k] = true;
                    }
                    normalize_winding(&mut shape, keypoints, self.winding_threshold);
                    shapes.push(shape);
                    break 'pairs;
                }
            }
        }

        log::debug!("right-angle finder: {} shapes", shapes.len());
        shapes
    }
}
