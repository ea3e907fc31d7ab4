use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::algorithms::{contract, rate, Error, Matcher, MatchingStrategy, SimpleFixedStopRule, StopRule};
use crate::config::CoarseningConfig;
use crate::graph::Graph;
use crate::hierarchy::Hierarchy;
use crate::imbalance::ClusterStatistics;

/// Coarsens `graph` until the stop rule says otherwise and returns all levels.
///
/// The random generator is seeded once from `config.seed`, so the same graph and
/// configuration always produce the same hierarchy.
pub fn build_hierarchy(graph: Graph, config: &CoarseningConfig) -> Result<Hierarchy, Error> {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    build_hierarchy_with_rng(graph, config, &mut rng)
}

/// Like [`build_hierarchy`], drawing all random choices from `rng`.
pub fn build_hierarchy_with_rng(
    graph: Graph,
    config: &CoarseningConfig,
    rng: &mut SmallRng,
) -> Result<Hierarchy, Error> {
    config.validate()?;
    graph.validate()?;
    let stop_rule = SimpleFixedStopRule::from_config(config)?;

    info!(
        "coarsening {} nodes and {} edges",
        graph.number_of_nodes(),
        graph.number_of_edges()
    );

    let mut no_of_coarser_vertices = graph.number_of_nodes();
    let mut no_of_finer_vertices = usize::MAX;
    let mut hierarchy = Hierarchy::new(graph);
    let mut level = 0u32;

    while stop_rule.should_continue(no_of_finer_vertices, no_of_coarser_vertices) {
        no_of_finer_vertices = no_of_coarser_vertices;

        let strategy = MatchingStrategy::configure(config, level);
        let finer = hierarchy.coarsest_mut();
        rate(finer, config.edge_rating);

        let result = strategy.compute_matching(finer, rng)?;
        result.validate(finer.number_of_nodes())?;
        let statistics = ClusterStatistics::new(finer, &result);
        debug!(
            "level {}: {} grouped {} nodes into {} (largest {}, heaviest {}, singletons {}, imbalance {:.3})",
            level,
            strategy.name(),
            finer.number_of_nodes(),
            result.no_of_coarse_vertices,
            statistics.largest(),
            statistics.heaviest(),
            statistics.singletons(),
            statistics.imbalance()
        );

        let coarser = contract(finer, &result, strategy.is_clustering(), config)?;
        no_of_coarser_vertices = coarser.number_of_nodes();
        info!(
            "no of coarser vertices {} and no of edges {}",
            no_of_coarser_vertices,
            coarser.number_of_edges()
        );

        hierarchy.push(result.coarse_mapping, coarser)?;
        level += 1;
    }

    info!("hierarchy has {} levels", hierarchy.number_of_levels());
    Ok(hierarchy)
}

#[cfg(test)]
mod tests {
    use crate::config::MatchingType;
    use crate::graph::{make_edges_bidirectional, FeatureVec, NodeId};
    use super::*;

    /// `rows x cols` grid with unit edges and the coordinates as features.
    fn grid(rows: usize, cols: usize) -> Graph {
        let mut adjacency: Vec<Vec<(NodeId, f64)>> = vec![Vec::new(); rows * cols];
        for row in 0..rows {
            for col in 0..cols {
                let node = row * cols + col;
                if col + 1 < cols {
                    adjacency[node].push((node + 1, 1.0));
                }
                if row + 1 < rows {
                    adjacency[node].push((node + cols, 1.0));
                }
            }
        }
        make_edges_bidirectional(&mut adjacency);
        let mut graph = Graph::from_adjacency(&adjacency);
        for node in graph.nodes() {
            let (row, col) = (node / cols, node % cols);
            graph.set_feature_vec(node, FeatureVec::from_vec(vec![row as f64, col as f64]));
        }
        graph
    }

    fn config(matching_type: MatchingType) -> CoarseningConfig {
        CoarseningConfig {
            matching_type,
            fix_num_vert_stop: 20,
            cluster_upperbound: 8,
            seed: 3,
            ..Default::default()
        }
    }

    fn assert_consistent(hierarchy: &Hierarchy, total_weight: i64) {
        for i in 0..hierarchy.number_of_levels() - 1 {
            let finer = hierarchy.level(i).unwrap();
            let coarser = hierarchy.level(i + 1).unwrap();
            let mapping = hierarchy.mapping(i).unwrap();
            assert_eq!(mapping.len(), finer.number_of_nodes());
            assert!(mapping.iter().all(|&coarse_node| coarse_node < coarser.number_of_nodes()));
            assert!(coarser.number_of_nodes() <= finer.number_of_nodes());
            assert_eq!(coarser.total_node_weight(), total_weight);
        }
    }

    #[test]
    fn test_every_strategy_builds_a_consistent_hierarchy() {
        for matching_type in [
            MatchingType::Random,
            MatchingType::Gpa,
            MatchingType::RandomGpa,
            MatchingType::LpClustering,
            MatchingType::SimpleClustering,
            MatchingType::LowDiameter,
        ] {
            // Arrange
            let graph = grid(10, 10);

            // Act
            let hierarchy = build_hierarchy(graph, &config(matching_type)).unwrap();

            // Assert
            assert!(hierarchy.number_of_levels() >= 2, "{:?} did not coarsen", matching_type);
            assert_consistent(&hierarchy, 100);
        }
    }

    #[test]
    fn test_same_seed_same_hierarchy() {
        let first = build_hierarchy(grid(8, 8), &config(MatchingType::LpClustering)).unwrap();
        let second = build_hierarchy(grid(8, 8), &config(MatchingType::LpClustering)).unwrap();

        assert_eq!(first.number_of_levels(), second.number_of_levels());
        for i in 0..first.number_of_levels() - 1 {
            assert_eq!(first.mapping(i), second.mapping(i));
        }
    }

    #[test]
    fn test_stop_size_bounds_the_number_of_levels() {
        // Arrange
        let too_small = CoarseningConfig { fix_num_vert_stop: 100, ..config(MatchingType::Random) };
        let one_level = CoarseningConfig { fix_num_vert_stop: 24, ..config(MatchingType::Random) };

        // Act
        let untouched = build_hierarchy(grid(5, 5), &too_small).unwrap();
        let coarsened = build_hierarchy(grid(5, 5), &one_level).unwrap();

        // Assert
        assert_eq!(untouched.number_of_levels(), 1);
        assert!(untouched.is_empty());
        // any matching leaves fewer than 24 nodes or shrinks by less than 5%
        assert_eq!(coarsened.number_of_levels(), 2);
        assert_eq!(coarsened.size(), 1);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let no_features = Graph::from_adjacency(&[vec![(1, 1.0)], vec![(0, 1.0)]]);
        let bad_config = CoarseningConfig { beta: 0.0, ..Default::default() };

        assert!(matches!(
            build_hierarchy(no_features, &CoarseningConfig::default()),
            Err(Error::EmptyFeatureVector)
        ));
        assert!(matches!(build_hierarchy(grid(2, 2), &bad_config), Err(Error::InvalidParameter(_))));
        assert!(matches!(build_hierarchy(Graph::new(), &CoarseningConfig::default()), Err(Error::EmptyGraph)));
    }
}
