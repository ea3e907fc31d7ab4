use log::{debug, warn};

use crate::algorithms::{Error, MatchResult, QuotientBoundary};
use crate::config::CoarseningConfig;
use crate::graph::{EdgeId, FeatureVec, Graph, NodeId, NodeWeight, PartitionId, UNDEFINED_EDGE};

/// Builds the coarser graph of `finer` from one matching / clustering result.
///
/// Clustering results are contracted through the quotient graph, pairwise matchings
/// node by node.
pub fn contract(
    finer: &mut Graph,
    result: &MatchResult,
    clustering: bool,
    config: &CoarseningConfig,
) -> Result<Graph, Error> {
    if clustering {
        contract_clustering(finer, result, config.combine, config.min_feature_distance)
    } else {
        contract_matching(finer, result, config.combine)
    }
}

fn combine_feature_vec(v1: &FeatureVec, weight1: NodeWeight, v2: &FeatureVec, weight2: NodeWeight) -> FeatureVec {
    (v1 * weight1 as f64 + v2 * weight2 as f64) / (weight1 + weight2) as f64
}

/// Appends the image of fine edge `e` to `coarse_node`, summing parallel edges.
fn visit_edge(
    finer: &Graph,
    coarser: &mut Graph,
    edge_positions: &mut [EdgeId],
    coarse_node: NodeId,
    e: EdgeId,
    new_edge_targets: &[NodeId],
) {
    let new_coarse_edge_target = new_edge_targets[e];
    // edges inside a coarse node vanish
    if new_coarse_edge_target == coarse_node {
        return;
    }

    let edge_pos = edge_positions[new_coarse_edge_target];
    if edge_pos == UNDEFINED_EDGE {
        let coarse_edge = coarser.new_edge(coarse_node, new_coarse_edge_target);
        coarser.set_edge_weight(coarse_edge, finer.edge_weight(e));
        edge_positions[new_coarse_edge_target] = coarse_edge;
    } else {
        let weight = coarser.edge_weight(edge_pos) + finer.edge_weight(e);
        coarser.set_edge_weight(edge_pos, weight);
    }
}

/// Merges every matched pair into one coarse node.
///
/// Coarse nodes are emitted while walking the permutation, so the coarse mapping has
/// to number coarse nodes in the order their first fine node appears in it.
pub fn contract_matching(finer: &Graph, result: &MatchResult, combine: bool) -> Result<Graph, Error> {
    let matching = result
        .matching
        .as_ref()
        .ok_or(Error::InvalidParameter("pairwise contraction needs a matching"))?;
    let coarse_mapping = &result.coarse_mapping;
    let no_of_coarse_vertices = result.no_of_coarse_vertices;

    let new_edge_targets: Vec<NodeId> = finer
        .edges()
        .map(|e| coarse_mapping[finer.edge_target(e)])
        .collect();
    let mut edge_positions = vec![UNDEFINED_EDGE; no_of_coarse_vertices];

    let mut coarser = Graph::new();
    coarser.start_construction(no_of_coarse_vertices, finer.number_of_edges());

    let mut cur_no_vertices = 0;
    for &node in &result.permutation {
        if coarse_mapping[node] != cur_no_vertices {
            continue;
        }

        let coarse_node = coarser.new_node();
        coarser.set_node_weight(coarse_node, finer.node_weight(node));
        coarser.set_feature_vec(coarse_node, finer.feature_vec(node).clone());
        coarser.set_partition_index(coarse_node, finer.partition_index(node));
        if combine {
            coarser.set_second_partition_index(coarse_node, finer.second_partition_index(node));
        }

        let first_coarse_edge = coarser.number_of_edges_so_far();
        for e in finer.out_edges(node) {
            visit_edge(finer, &mut coarser, &mut edge_positions, coarse_node, e, &new_edge_targets);
        }

        let matched_neighbor = matching[node];
        if node != matched_neighbor {
            let node_weight = finer.node_weight(node);
            let neighbor_weight = finer.node_weight(matched_neighbor);
            coarser.set_node_weight(coarse_node, node_weight + neighbor_weight);
            coarser.set_feature_vec(
                coarse_node,
                combine_feature_vec(
                    finer.feature_vec(node),
                    node_weight,
                    finer.feature_vec(matched_neighbor),
                    neighbor_weight,
                ),
            );

            for e in finer.out_edges(matched_neighbor) {
                visit_edge(finer, &mut coarser, &mut edge_positions, coarse_node, e, &new_edge_targets);
            }
        }

        // reset the scratch positions touched by this coarse node
        for coarse_edge in first_coarse_edge..coarser.number_of_edges_so_far() {
            edge_positions[coarser.edge_target(coarse_edge)] = UNDEFINED_EDGE;
        }
        cur_no_vertices += 1;
    }

    if cur_no_vertices != no_of_coarse_vertices {
        return Err(Error::CoarseVertexCountMismatch {
            expected: no_of_coarse_vertices,
            actual: cur_no_vertices,
        });
    }
    debug_assert!(edge_positions.iter().all(|&pos| pos == UNDEFINED_EDGE));

    coarser.finish_construction();
    coarser.set_partition_count(finer.partition_count());
    Ok(coarser)
}

/// Contracts every cluster into one node of the quotient graph.
///
/// Coarse node weights are cluster weights and coarse features weighted averages of
/// the cluster's features. Coarse edges connect adjacent clusters and are weighted by
/// the inverse Euclidean distance of their features; distances below
/// `min_feature_distance` are raised to it. The partition indices of `finer` are
/// used as scratch and restored before returning.
pub fn contract_clustering(
    finer: &mut Graph,
    result: &MatchResult,
    combine: bool,
    min_feature_distance: f64,
) -> Result<Graph, Error> {
    let coarse_mapping = &result.coarse_mapping;
    let no_of_coarse_vertices = result.no_of_coarse_vertices;

    let k = finer.partition_count();
    let saved_partition: Vec<PartitionId> = finer.nodes().map(|node| finer.partition_index(node)).collect();
    for node in finer.nodes() {
        finer.set_partition_index(node, coarse_mapping[node]);
    }
    finer.set_partition_count(no_of_coarse_vertices);

    let mut coarser = {
        let mut boundary = QuotientBoundary::new(finer);
        boundary.build();
        boundary.underlying_quotient_graph()
    };

    finer.set_partition_count(k);
    for (node, &partition) in saved_partition.iter().enumerate() {
        finer.set_partition_index(node, partition);
    }

    if coarser.number_of_nodes() != no_of_coarse_vertices {
        return Err(Error::CoarseVertexCountMismatch {
            expected: no_of_coarse_vertices,
            actual: coarser.number_of_nodes(),
        });
    }
    coarser.set_partition_count(k);

    let num_features = finer.feature_dimension();
    let mut block_size: Vec<NodeWeight> = vec![0; no_of_coarse_vertices];
    let mut combined_feature_vecs = vec![FeatureVec::zeros(num_features); no_of_coarse_vertices];
    for node in finer.nodes() {
        let coarse_node = coarse_mapping[node];
        let weight = finer.node_weight(node);
        coarser.set_partition_index(coarse_node, finer.partition_index(node));
        combined_feature_vecs[coarse_node].axpy(weight as f64, finer.feature_vec(node), 1.0);
        block_size[coarse_node] += weight;
        if combine {
            coarser.set_second_partition_index(coarse_node, finer.second_partition_index(node));
        }
    }
    for (coarse_node, mut features) in combined_feature_vecs.into_iter().enumerate() {
        features /= block_size[coarse_node] as f64;
        coarser.set_feature_vec(coarse_node, features);
    }

    let mut floored = 0usize;
    for node in coarser.nodes() {
        for e in coarser.out_edges(node) {
            let target = coarser.edge_target(e);
            let mut distance = (coarser.feature_vec(node) - coarser.feature_vec(target)).norm();
            if !(distance >= min_feature_distance) {
                distance = min_feature_distance;
                floored += 1;
            }
            coarser.set_edge_weight(e, 1.0 / distance);
        }
    }
    if floored > 0 {
        warn!(
            "{} quotient edges join clusters closer than {}, their distance was floored",
            floored, min_feature_distance
        );
    }
    debug!(
        "quotient graph: {} clusters, {} edges",
        coarser.number_of_nodes(),
        coarser.number_of_edges()
    );

    Ok(coarser)
}
