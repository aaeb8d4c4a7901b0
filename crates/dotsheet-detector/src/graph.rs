//! Proximity graph over the detected dots.

use dotsheet_core::Keypoint;

use crate::params::GraphParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Symmetric adjacency over keypoint indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborGraph {
    adjacency: Vec<Vec<usize>>,
}

impl NeighborGraph {
    /// Connect every pair of dots closer than `distance_factor` times the sum
    /// of their diameters.
    ///
    /// Dots are swept in ascending x; the inner scan for dot `i` stops once a
    /// candidate lies more than `scan_factor * size_i` to the right.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(keypoints = keypoints.len())))]
    pub fn build(keypoints: &[Keypoint], params: &GraphParams) -> Self {
        let n = keypoints.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            keypoints[a]
                .position
                .x
                .total_cmp(&keypoints[b].position.x)
        });

        let mut adjacency = vec![Vec::new(); n];
        for (oi, &i) in order.iter().enumerate() {
            let a = &keypoints[i];
            for &j in &order[oi + 1..] {
                let b = &keypoints[j];
                if b.position.x - a.position.x > a.size * params.scan_factor {
                    break;
                }
                let dist = (b.position - a.position).norm();
                if dist < (a.size + b.size) * params.distance_factor {
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                }
            }
        }
        for list in &mut adjacency {
            list.sort_unstable();
        }

        let graph = Self { adjacency };
        log::debug!("neighbor graph: {} nodes, {} edges", n, graph.edge_count());
        graph
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Neighbors of `i` in ascending index order.
    #[inline]
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.adjacency[i]
    }

    #[inline]
    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Every edge once, as `(low, high)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(i, list)| list.iter().filter(move |&&j| j > i).map(move |&j| (i, j)))
    }
}
