use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::config::NodeOrderingType;
use crate::graph::{Graph, NodeId};

/// The order in which a sweep visits the nodes of `graph`.
///
/// Computed once per level so that a fixed seed reproduces the same sweep.
pub fn order_nodes(graph: &Graph, ordering: NodeOrderingType, rng: &mut SmallRng) -> Vec<NodeId> {
    let mut permutation: Vec<NodeId> = graph.nodes().collect();
    permutation.shuffle(rng);

    if ordering == NodeOrderingType::Degree {
        permutation.sort_by_key(|&node| graph.node_degree(node));
    }
    permutation
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use super::*;

    #[test]
    fn test_order_nodes_is_a_permutation() {
        // Arrange
        let graph = Graph::from_adjacency(&[vec![(1, 1.0)], vec![(0, 1.0), (2, 1.0)], vec![(1, 1.0)], vec![]]);
        let mut rng = SmallRng::seed_from_u64(5);

        // Act
        let mut permutation = order_nodes(&graph, NodeOrderingType::Random, &mut rng);

        // Assert
        permutation.sort_unstable();
        assert_eq!(permutation, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_degree_ordering() {
        // Arrange
        let graph = Graph::from_adjacency(&[vec![(1, 1.0)], vec![(0, 1.0), (2, 1.0)], vec![(1, 1.0)], vec![]]);
        let mut rng = SmallRng::seed_from_u64(5);

        // Act
        let permutation = order_nodes(&graph, NodeOrderingType::Degree, &mut rng);

        // Assert
        assert_eq!(permutation[0], 3);
        assert_eq!(permutation[3], 1);
        let degrees: Vec<usize> = permutation.iter().map(|&node| graph.node_degree(node)).collect();
        assert!(degrees.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_same_seed_same_order() {
        let adjacency: Vec<Vec<(NodeId, f64)>> = vec![Vec::new(); 50];
        let graph = Graph::from_adjacency(&adjacency);

        let first = order_nodes(&graph, NodeOrderingType::Random, &mut SmallRng::seed_from_u64(7));
        let second = order_nodes(&graph, NodeOrderingType::Random, &mut SmallRng::seed_from_u64(7));

        assert_eq!(first, second);
    }
}
