use std::hash::{Hash, Hasher};

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::algorithms::{order_nodes, CoarseMapping, Error, MatchResult, Matcher};
use crate::config::{CoarseningConfig, NodeOrderingType};
use crate::graph::{EdgeWeight, Graph, NodeId, NodeWeight, PartitionId};

/// Size-constrained label propagation.
///
/// Every node starts in its own cluster and repeatedly moves to the neighboring
/// cluster with the heaviest connection, as long as that cluster stays below both
/// the node count bound and the weight bound.
#[derive(Debug, Clone)]
pub struct SizeConstraintLabelPropagation {
    pub label_iterations: u32,
    /// A cluster holds fewer than this many nodes.
    pub cluster_upperbound: usize,
    pub upper_bound_partition: NodeWeight,
    pub cluster_coarsening_factor: u32,
    pub combine: bool,
    pub ensemble_clusterings: bool,
    pub number_of_clusterings: u32,
    pub node_ordering: NodeOrderingType,
}

impl Default for SizeConstraintLabelPropagation {
    fn default() -> Self {
        Self::from_config(&CoarseningConfig::default())
    }
}

impl SizeConstraintLabelPropagation {
    pub fn from_config(config: &CoarseningConfig) -> Self {
        SizeConstraintLabelPropagation {
            label_iterations: config.label_iterations,
            cluster_upperbound: config.cluster_upperbound,
            upper_bound_partition: config.upper_bound_partition,
            cluster_coarsening_factor: config.cluster_coarsening_factor,
            combine: config.combine,
            ensemble_clusterings: config.ensemble_clusterings,
            number_of_clusterings: config.number_of_clusterings,
            node_ordering: config.node_ordering,
        }
    }

    fn block_upperbound(&self, cluster_coarsening_factor: u32) -> NodeWeight {
        (self.upper_bound_partition as f64 / cluster_coarsening_factor as f64).ceil() as NodeWeight
    }

    /// One label propagation run. Returns dense cluster ids in first-seen order,
    /// their number, and the sweep order that was used.
    fn label_propagation(
        &self,
        graph: &Graph,
        block_upperbound: NodeWeight,
        rng: &mut SmallRng,
    ) -> (Vec<PartitionId>, usize, Vec<NodeId>) {
        let n = graph.number_of_nodes();
        let mut cluster_id: Vec<PartitionId> = graph.nodes().collect();
        let mut cluster_sizes: Vec<NodeWeight> = graph.nodes().map(|node| graph.node_weight(node)).collect();
        let mut cluster_local_sizes = vec![1usize; n];

        let mut aggregate: Vec<EdgeWeight> = vec![0.0; n];
        let mut is_touched = vec![false; n];
        let mut touched: Vec<PartitionId> = Vec::new();
        let mut ties: Vec<PartitionId> = Vec::new();

        let permutation = order_nodes(graph, self.node_ordering, rng);

        for _ in 0..self.label_iterations {
            for &node in &permutation {
                let my_block = cluster_id[node];
                let node_weight = graph.node_weight(node);

                for (target, weight) in graph.neighbors(node) {
                    if self.combine && graph.second_partition_index(node) != graph.second_partition_index(target) {
                        continue;
                    }
                    let block = cluster_id[target];
                    if !is_touched[block] {
                        is_touched[block] = true;
                        touched.push(block);
                    }
                    aggregate[block] += weight;
                }

                // the own cluster is a candidate regardless of its size
                let mut max_value = aggregate[my_block];
                ties.clear();
                ties.push(my_block);
                for &block in &touched {
                    if block == my_block
                        || cluster_local_sizes[block] + 1 >= self.cluster_upperbound
                        || cluster_sizes[block] + node_weight >= block_upperbound
                    {
                        continue;
                    }
                    let value = aggregate[block];
                    if value > max_value {
                        max_value = value;
                        ties.clear();
                        ties.push(block);
                    } else if value == max_value {
                        ties.push(block);
                    }
                }

                let max_block = if ties.len() == 1 {
                    ties[0]
                } else {
                    *ties.choose(rng).unwrap_or(&my_block)
                };

                for &block in &touched {
                    aggregate[block] = 0.0;
                    is_touched[block] = false;
                }
                touched.clear();

                if max_block != my_block {
                    cluster_sizes[my_block] -= node_weight;
                    cluster_local_sizes[my_block] -= 1;
                    cluster_sizes[max_block] += node_weight;
                    cluster_local_sizes[max_block] += 1;
                    cluster_id[node] = max_block;
                }
            }
        }

        let no_of_blocks = remap_cluster_ids(&mut cluster_id);
        (cluster_id, no_of_blocks, permutation)
    }

    /// Several runs with varying coarsening factors, intersected into one clustering.
    fn ensemble(&self, graph: &Graph, rng: &mut SmallRng) -> (Vec<PartitionId>, usize, Vec<NodeId>) {
        let (mut ensemble, mut no_of_blocks, permutation) =
            self.label_propagation(graph, self.block_upperbound(self.cluster_coarsening_factor), rng);

        for _ in 1..self.number_of_clusterings {
            let factor = rng.gen_range(10..=30);
            let (clustering, _, _) = self.label_propagation(graph, self.block_upperbound(factor), rng);
            let (merged, merged_blocks) = ensemble_two_clusterings(&clustering, &ensemble);
            ensemble = merged;
            no_of_blocks = merged_blocks;
        }
        (ensemble, no_of_blocks, permutation)
    }
}

impl Matcher for SizeConstraintLabelPropagation {
    fn compute_matching(&self, graph: &Graph, rng: &mut SmallRng) -> Result<MatchResult, Error> {
        let (coarse_mapping, no_of_coarse_vertices, permutation) = if self.ensemble_clusterings {
            self.ensemble(graph, rng)
        } else {
            self.label_propagation(graph, self.block_upperbound(self.cluster_coarsening_factor), rng)
        };
        debug!(
            "label propagation: {} nodes in {} clusters",
            graph.number_of_nodes(),
            no_of_coarse_vertices
        );

        Ok(MatchResult {
            coarse_mapping,
            no_of_coarse_vertices,
            matching: None,
            permutation,
        })
    }
}

/// Relabels cluster ids to `0..k` in order of first appearance and returns `k`.
pub(crate) fn remap_cluster_ids(cluster_id: &mut [PartitionId]) -> usize {
    let mut remap: FxHashMap<PartitionId, PartitionId> = FxHashMap::default();
    for cluster in cluster_id.iter_mut() {
        let next = remap.len();
        *cluster = *remap.entry(*cluster).or_insert(next);
    }
    remap.len()
}

/// Key of a node in the intersection of two clusterings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EnsemblePair {
    n: usize,
    lhs: PartitionId,
    rhs: PartitionId,
}

impl Hash for EnsemblePair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.lhs.wrapping_mul(self.n).wrapping_add(self.rhs));
    }
}

/// Intersects two clusterings: two nodes share a cluster of the result iff they
/// share a cluster in both inputs. Ids are dense in first-seen order.
pub fn ensemble_two_clusterings(lhs: &[PartitionId], rhs: &[PartitionId]) -> (CoarseMapping, usize) {
    debug_assert_eq!(lhs.len(), rhs.len());
    let n = lhs.len();
    let mut new_mapping: FxHashMap<EnsemblePair, NodeId> = FxHashMap::default();

    let output = lhs
        .iter()
        .zip(rhs)
        .map(|(&lhs, &rhs)| {
            let next = new_mapping.len();
            *new_mapping.entry(EnsemblePair { n, lhs, rhs }).or_insert(next)
        })
        .collect();
    (output, new_mapping.len())
}

#[cfg(test)]
mod tests {
    use itertools::assert_equal;
    use rand::SeedableRng;
    use super::*;

    /// Two triangles with distinct edge weights, so no sweep ever meets a tie.
    fn two_triangles() -> Graph {
        Graph::from_adjacency(&[
            vec![(1, 1.0), (2, 3.0)],
            vec![(0, 1.0), (2, 2.0)],
            vec![(0, 3.0), (1, 2.0)],
            vec![(4, 1.0), (5, 3.0)],
            vec![(3, 1.0), (5, 2.0)],
            vec![(3, 3.0), (4, 2.0)],
        ])
    }

    #[test]
    fn test_two_triangles_form_two_clusters() {
        // one sweep may end with a pair and a singleton, the second one always closes the triangle
        for label_iterations in [2, 3, 10] {
            for seed in 0..10 {
                // Arrange
                let graph = two_triangles();
                let lp = SizeConstraintLabelPropagation { label_iterations, ..Default::default() };
                let mut rng = SmallRng::seed_from_u64(seed);

                // Act
                let result = lp.compute_matching(&graph, &mut rng).unwrap();

                // Assert
                assert!(result.validate(6).is_ok());
                assert_eq!(result.no_of_coarse_vertices, 2);
                assert_equal(result.coarse_mapping, [0, 0, 0, 1, 1, 1]);
            }
        }
    }

    #[test]
    fn test_ties_with_own_cluster_are_broken_randomly() {
        // Arrange
        // path 0 - 1 - 2: both ends come first (degree order), the first one joins the
        // middle, the second one is blocked by the bound, and the middle node then sees
        // its own cluster and the other end with the same connection weight
        let graph = Graph::from_adjacency(&[vec![(1, 1.0)], vec![(0, 1.0), (2, 1.0)], vec![(1, 1.0)]]);
        let lp = SizeConstraintLabelPropagation {
            label_iterations: 1,
            cluster_upperbound: 3,
            ..Default::default()
        };
        let mut stayed = 0;
        let mut moved = 0;

        // Act
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let result = lp.compute_matching(&graph, &mut rng).unwrap();
            let first_end = result.permutation[0];
            assert_eq!(result.permutation[2], 1);
            assert_eq!(result.no_of_coarse_vertices, 2);
            if result.coarse_mapping[1] == result.coarse_mapping[first_end] {
                stayed += 1;
            } else {
                moved += 1;
            }
        }

        // Assert
        assert!(stayed > 0, "the middle node never stayed");
        assert!(moved > 0, "the middle node never left its cluster on a tie");
    }

    #[test]
    fn test_cluster_node_count_stays_below_bound() {
        // Arrange
        let mut adjacency = vec![Vec::new(); 12];
        for node in 0..11usize {
            adjacency[node].push((node + 1, 1.0));
            adjacency[node + 1].push((node, 1.0));
        }
        let graph = Graph::from_adjacency(&adjacency);
        let lp = SizeConstraintLabelPropagation { cluster_upperbound: 4, ..Default::default() };
        let mut rng = SmallRng::seed_from_u64(9);

        // Act
        let result = lp.compute_matching(&graph, &mut rng).unwrap();

        // Assert
        let mut sizes = vec![0usize; result.no_of_coarse_vertices];
        for &cluster in &result.coarse_mapping {
            sizes[cluster] += 1;
        }
        assert!(sizes.iter().all(|&size| size < 4));
        assert!(result.no_of_coarse_vertices >= 4);
    }

    #[test]
    fn test_cluster_weight_stays_below_block_bound() {
        // Arrange
        let mut graph = two_triangles();
        for node in graph.nodes() {
            graph.set_node_weight(node, 2);
        }
        // ceil(10 / 2) = 5: at most two nodes of weight 2 per cluster
        let lp = SizeConstraintLabelPropagation {
            upper_bound_partition: 10,
            cluster_coarsening_factor: 2,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(4);

        // Act
        let result = lp.compute_matching(&graph, &mut rng).unwrap();

        // Assert
        let mut weights = vec![0; result.no_of_coarse_vertices];
        for node in graph.nodes() {
            weights[result.coarse_mapping[node]] += graph.node_weight(node);
        }
        assert!(weights.iter().all(|&weight| weight < 5));
        assert_eq!(weights.iter().sum::<NodeWeight>(), 12);
    }

    #[test]
    fn test_combine_keeps_second_partitions_apart() {
        // Arrange
        let mut graph = two_triangles();
        graph.set_second_partition_index(2, 1);
        let lp = SizeConstraintLabelPropagation { combine: true, ..Default::default() };
        let mut rng = SmallRng::seed_from_u64(1);

        // Act
        let result = lp.compute_matching(&graph, &mut rng).unwrap();

        // Assert
        let mapping = result.coarse_mapping;
        assert_eq!(mapping[0], mapping[1]);
        assert_ne!(mapping[0], mapping[2]);
        assert_eq!(result.no_of_coarse_vertices, 3);
    }

    #[test]
    fn test_remap_cluster_ids_first_seen_order() {
        let mut cluster_id = vec![7, 3, 7, 9, 3];

        let count = remap_cluster_ids(&mut cluster_id);

        assert_eq!(count, 3);
        assert_eq!(cluster_id, vec![0, 1, 0, 2, 1]);
    }

    #[test]
    fn test_ensemble_two_clusterings_intersects() {
        // Arrange
        let lhs = vec![0, 0, 1, 1, 0];
        let rhs = vec![0, 1, 1, 1, 0];

        // Act
        let (output, no_of_coarse_vertices) = ensemble_two_clusterings(&lhs, &rhs);

        // Assert
        assert_eq!(output, vec![0, 1, 2, 2, 0]);
        assert_eq!(no_of_coarse_vertices, 3);
    }

    #[test]
    fn test_ensemble_mode_yields_dense_mapping() {
        // Arrange
        let graph = two_triangles();
        let lp = SizeConstraintLabelPropagation {
            ensemble_clusterings: true,
            number_of_clusterings: 3,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(12);

        // Act
        let result = lp.compute_matching(&graph, &mut rng).unwrap();

        // Assert
        assert!(result.validate(6).is_ok());
        assert!(result.no_of_coarse_vertices >= 2);
        assert!(result.matching.is_none());
    }
}
