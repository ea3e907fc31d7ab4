// Global path algorithm: grow vertex disjoint paths along heavy rated edges, then
// match every path optimally among its two alternating edge sets.
//
// # Reference
//
// Maue, Jens, and Peter Sanders. "Engineering algorithms for approximate weighted matching."
// International Workshop on Experimental and Efficient Algorithms (2007): 242-255.

use std::collections::VecDeque;

use rand::rngs::SmallRng;

use crate::algorithms::{order_nodes, Error, MatchResult, Matcher};
use crate::config::{CoarseningConfig, NodeOrderingType};
use crate::graph::{EdgeId, EdgeRating, Graph, NodeId, UNDEFINED_NODE};

#[derive(Debug, Clone, Copy)]
pub struct GpaMatching {
    pub combine: bool,
    pub node_ordering: NodeOrderingType,
}

impl Default for GpaMatching {
    fn default() -> Self {
        GpaMatching {
            combine: false,
            node_ordering: NodeOrderingType::Random,
        }
    }
}

impl GpaMatching {
    pub fn from_config(config: &CoarseningConfig) -> Self {
        GpaMatching {
            combine: config.combine,
            node_ordering: config.node_ordering,
        }
    }

    /// The out edge of `node` with the highest rating whose target is on no path yet.
    /// The first such edge wins ties.
    fn heaviest_free_edge(&self, graph: &Graph, node: NodeId, on_path: &[bool]) -> Option<EdgeId> {
        let mut best: Option<(EdgeId, EdgeRating)> = None;
        for e in graph.out_edges(node) {
            let target = graph.edge_target(e);
            if target == node || on_path[target] {
                continue;
            }
            if self.combine && graph.second_partition_index(node) != graph.second_partition_index(target) {
                continue;
            }
            let rating = graph.edge_rating(e);
            if best.map_or(true, |(_, best_rating)| rating > best_rating) {
                best = Some((e, rating));
            }
        }
        best.map(|(e, _)| e)
    }

    /// Grows a path through `start` in both directions.
    fn grow_path(&self, graph: &Graph, start: NodeId, on_path: &mut [bool]) -> Path {
        let mut path = Path {
            nodes: VecDeque::from([start]),
            ratings: VecDeque::new(),
        };
        on_path[start] = true;

        let mut head = start;
        while let Some(e) = self.heaviest_free_edge(graph, head, on_path) {
            head = graph.edge_target(e);
            on_path[head] = true;
            path.nodes.push_back(head);
            path.ratings.push_back(graph.edge_rating(e));
        }

        let mut tail = start;
        while let Some(e) = self.heaviest_free_edge(graph, tail, on_path) {
            tail = graph.edge_target(e);
            on_path[tail] = true;
            path.nodes.push_front(tail);
            path.ratings.push_front(graph.edge_rating(e));
        }
        path
    }
}

/// Vertex disjoint path; `ratings[i]` belongs to the edge between `nodes[i]` and `nodes[i + 1]`.
#[derive(Debug)]
struct Path {
    nodes: VecDeque<NodeId>,
    ratings: VecDeque<EdgeRating>,
}

impl Path {
    /// Offset (0 or 1) of the heavier of the two alternating edge sets.
    fn maximum_weight_matching(&self) -> usize {
        let (even, odd) = self
            .ratings
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(even, odd), (position, rating)| {
                if position % 2 == 0 {
                    (even + rating, odd)
                } else {
                    (even, odd + rating)
                }
            });
        if odd > even {
            1
        } else {
            0
        }
    }
}

impl Matcher for GpaMatching {
    fn compute_matching(&self, graph: &Graph, rng: &mut SmallRng) -> Result<MatchResult, Error> {
        let n = graph.number_of_nodes();
        let permutation = order_nodes(graph, self.node_ordering, rng);
        let mut on_path = vec![false; n];
        let mut matching: Vec<NodeId> = graph.nodes().collect();

        for &start in &permutation {
            if on_path[start] {
                continue;
            }
            let path = self.grow_path(graph, start, &mut on_path);
            let offset = path.maximum_weight_matching();
            for position in (offset..path.ratings.len()).step_by(2) {
                let (lhs, rhs) = (path.nodes[position], path.nodes[position + 1]);
                matching[lhs] = rhs;
                matching[rhs] = lhs;
            }
        }

        // coarse ids in visiting order, as pairwise contraction expects
        let mut coarse_mapping = vec![UNDEFINED_NODE; n];
        let mut super_vertex = 0usize;
        for &node in &permutation {
            if coarse_mapping[node] != UNDEFINED_NODE {
                continue;
            }
            coarse_mapping[node] = super_vertex;
            coarse_mapping[matching[node]] = super_vertex;
            super_vertex += 1;
        }

        Ok(MatchResult {
            coarse_mapping,
            no_of_coarse_vertices: super_vertex,
            matching: Some(matching),
            permutation,
        })
    }
}
