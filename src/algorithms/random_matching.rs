use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::algorithms::{Error, MatchResult, Matcher};
use crate::config::CoarseningConfig;
use crate::graph::{Graph, NodeId, UNDEFINED_NODE};

/// Pairs every node, in random order, with a random unmatched neighbor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMatching {
    /// Only pair nodes with the same secondary partition index.
    pub combine: bool,
}

impl RandomMatching {
    pub fn from_config(config: &CoarseningConfig) -> Self {
        RandomMatching { combine: config.combine }
    }
}

impl Matcher for RandomMatching {
    fn compute_matching(&self, graph: &Graph, rng: &mut SmallRng) -> Result<MatchResult, Error> {
        let n = graph.number_of_nodes();
        let mut permutation: Vec<NodeId> = graph.nodes().collect();
        permutation.shuffle(rng);

        let mut matching: Vec<NodeId> = graph.nodes().collect();
        let mut coarse_mapping = vec![UNDEFINED_NODE; n];
        let mut candidates = Vec::new();
        let mut super_vertex = 0usize;

        for &node in &permutation {
            // already part of a coarse node
            if coarse_mapping[node] != UNDEFINED_NODE {
                continue;
            }

            candidates.clear();
            candidates.extend(graph.out_edges(node).map(|e| graph.edge_target(e)).filter(|&target| {
                target != node
                    && coarse_mapping[target] == UNDEFINED_NODE
                    && (!self.combine
                        || graph.second_partition_index(node) == graph.second_partition_index(target))
            }));

            coarse_mapping[node] = super_vertex;
            if let Some(&partner) = candidates.choose(rng) {
                matching[node] = partner;
                matching[partner] = node;
                coarse_mapping[partner] = super_vertex;
            }
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

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use super::*;

    #[test]
    fn test_random_matching_pairs_neighbors() {
        // Arrange
        let graph = Graph::from_adjacency(&[
            vec![(1, 1.0)],
            vec![(0, 1.0), (2, 1.0)],
            vec![(1, 1.0), (3, 1.0)],
            vec![(2, 1.0)],
            vec![],
        ]);
        let mut rng = SmallRng::seed_from_u64(5);

        // Act
        let result = RandomMatching::default().compute_matching(&graph, &mut rng).unwrap();

        // Assert
        assert!(result.validate(5).is_ok());
        let matching = result.matching.unwrap();
        for node in graph.nodes() {
            let partner = matching[node];
            assert_eq!(matching[partner], node);
            assert_eq!(result.coarse_mapping[node], result.coarse_mapping[partner]);
            if partner != node {
                assert!(graph.neighbors(node).any(|(target, _)| target == partner));
            }
        }
        // the isolated node maps onto itself
        assert_eq!(matching[4], 4);
        assert!(result.no_of_coarse_vertices >= 3 && result.no_of_coarse_vertices <= 4);
    }

    #[test]
    fn test_random_matching_coarse_ids_follow_permutation() {
        // Arrange
        let graph = Graph::from_adjacency(&[vec![(1, 1.0)], vec![(0, 1.0)], vec![(3, 1.0)], vec![(2, 1.0)]]);
        let mut rng = SmallRng::seed_from_u64(11);

        // Act
        let result = RandomMatching::default().compute_matching(&graph, &mut rng).unwrap();

        // Assert
        let mut next = 0;
        for &node in &result.permutation {
            if result.coarse_mapping[node] == next {
                next += 1;
            } else {
                assert!(result.coarse_mapping[node] < next);
            }
        }
        assert_eq!(next, result.no_of_coarse_vertices);
        assert_eq!(result.no_of_coarse_vertices, 2);
    }

    #[test]
    fn test_random_matching_respects_combine() {
        // Arrange
        let mut graph = Graph::from_adjacency(&[vec![(1, 1.0)], vec![(0, 1.0)]]);
        graph.set_second_partition_index(1, 1);
        let mut rng = SmallRng::seed_from_u64(3);

        // Act
        let result = RandomMatching { combine: true }.compute_matching(&graph, &mut rng).unwrap();

        // Assert
        assert_eq!(result.no_of_coarse_vertices, 2);
        assert_eq!(result.matching.unwrap(), vec![0, 1]);
    }
}
