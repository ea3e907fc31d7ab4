use num_traits::ToPrimitive;

use crate::algorithms::MatchResult;
use crate::graph::{Graph, NodeWeight};

/// Weight and node count of every coarse node a matching or clustering would produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterStatistics {
    pub loads: Vec<NodeWeight>,
    pub sizes: Vec<usize>,
}

impl ClusterStatistics {
    pub fn new(graph: &Graph, result: &MatchResult) -> Self {
        let mut loads = vec![0; result.no_of_coarse_vertices];
        let mut sizes = vec![0; result.no_of_coarse_vertices];
        for (node, &coarse_node) in result.coarse_mapping.iter().enumerate().take(graph.number_of_nodes()) {
            if coarse_node < result.no_of_coarse_vertices {
                loads[coarse_node] += graph.node_weight(node);
                sizes[coarse_node] += 1;
            }
        }
        ClusterStatistics { loads, sizes }
    }

    pub fn heaviest(&self) -> NodeWeight {
        self.loads.iter().copied().max().unwrap_or(0)
    }

    /// Most fine nodes in one coarse node.
    pub fn largest(&self) -> usize {
        self.sizes.iter().copied().max().unwrap_or(0)
    }

    /// Coarse nodes holding a single fine node.
    pub fn singletons(&self) -> usize {
        self.sizes.iter().filter(|&&size| size == 1).count()
    }

    /// Relative deviation of the heaviest coarse node from the average weight.
    pub fn imbalance(&self) -> f64 {
        if self.loads.is_empty() {
            return 0.0;
        }
        let total_weight: NodeWeight = self.loads.iter().sum();
        let ideal_weight = total_weight.to_f64().unwrap_or(0.0) / self.loads.len().to_f64().unwrap_or(1.0);
        if ideal_weight == 0.0 {
            return 0.0;
        }
        let heaviest = self.heaviest().to_f64().unwrap_or(0.0);
        (heaviest - ideal_weight) / ideal_weight
    }
}
