use dotsheet_code::CODE_LENGTH;
use dotsheet_core::Keypoint;

use super::{normalize_winding, Shape, ShapeFinder};
use crate::graph::NeighborGraph;
use crate::params::ShapeParams;

/// Finds shapes as 7-dot paths starting at a dot with a single neighbor.
///
/// Works for isolated corner codes only; a code touching other dots has no
/// free end.
#[derive(Clone, Debug, PartialEq)]
pub struct TerminalPointFinder {
    pub winding_threshold: f32,
}

impl Default for TerminalPointFinder {
    fn default() -> Self {
        Self::from_params(&ShapeParams::default())
    }
}

impl TerminalPointFinder {
    pub fn from_params(params: &ShapeParams) -> Self {
        Self {
            winding_threshold: params.winding_threshold,
        }
    }
}

/// Extend `path` by depth-first search until it holds `CODE_LENGTH` dots.
fn extend_path(path: &mut Vec<usize>, graph: &NeighborGraph) -> bool {
    if path.len() == CODE_LENGTH {
        return true;
    }
    let Some(&last) = path.last() else {
        return false;
    };
    for &next in graph.neighbors(last) {
        if path.contains(&next) {
            continue;
        }
        path.push(next);
        if extend_path(path, graph) {
            return true;
        }
        path.pop();
    }
    false
}

impl ShapeFinder for TerminalPointFinder {
    fn find_shapes(&self, keypoints: &[Keypoint], graph: &NeighborGraph) -> Vec<Shape> {
        let mut seen = vec![false; keypoints.len()];
        let mut shapes = Vec::new();
        for start in 0..keypoints.len() {
            if graph.degree(start) != 1 || seen[start] {
                continue;
            }
            let mut path = Vec::with_capacity(CODE_LENGTH);
            path.push(start);
            if !extend_path(&mut path, graph) {
                continue;
            }
            let Ok(mut shape) = Shape::try_from(path.as_slice()) else {
                continue;
            };
            for &k in &shape {
                seen[k] = true;
            }
            normalize_winding(&mut shape, keypoints, self.winding_threshold);
            shapes.push(shape);
        }
        log::debug!("terminal-point finder: {} shapes", shapes.len());
        shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GraphParams;
    use nalgebra::Point2;

    #[test]
    fn walks_isolated_corner_from_free_end() {
        let kps = vec![
            Keypoint::new(100.0, 160.0, 12.0),
            Keypoint::new(100.0, 140.0, 12.0),
            Keypoint::new(100.0, 120.0, 12.0),
            Keypoint::new(100.0, 100.0, 12.0),
            Keypoint::new(120.0, 100.0, 12.0),
            Keypoint::new(140.0, 100.0, 12.0),
            Keypoint::new(160.0, 100.0, 12.0),
        ];
        let graph = NeighborGraph::build(&kps, &GraphParams::default());
        let shapes = TerminalPointFinder::default().find_shapes(&kps, &graph);
        assert_eq!(shapes.len(), 1);
        let p = |k: usize| kps[shapes[0][k]].position;
        assert_eq!(p(3), Point2::new(100.0, 100.0));
        assert_eq!(p(0), Point2::new(100.0, 160.0));
        assert_eq!(p(6), Point2::new(160.0, 100.0));
    }

    #[test]
    fn short_chain_yields_nothing() {
        let kps: Vec<Keypoint> = (0..5)
            .map(|i| Keypoint::new(20.0 * i as f32, 0.0, 12.0))
            .collect();
        let graph = NeighborGraph::build(&kps, &GraphParams::default());
        assert!(TerminalPointFinder::default()
            .find_shapes(&kps, &graph)
            .is_empty());
    }
}
