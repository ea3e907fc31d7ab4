// Low diameter decomposition by exponentially shifted shortest paths.
//
// # Reference
//
// Miller, Gary L., Richard Peng, and Shen Chen Xu. "Parallel graph decompositions using random shifts."
// Proceedings of the 25th ACM Symposium on Parallelism in Algorithms and Architectures (2013): 196-203.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use log::debug;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::algorithms::label_propagation::remap_cluster_ids;
use crate::algorithms::{Error, MatchResult, Matcher};
use crate::config::CoarseningConfig;
use crate::graph::{Graph, NodeId, UNDEFINED_NODE};

#[derive(Debug, Clone, Copy)]
pub struct LowDiameterClustering {
    /// Upper bound on the hop diameter of a cluster.
    pub diameter_upperbound: f64,
    /// Rate of the exponential shifts; larger values give smaller clusters.
    pub beta: f64,
    pub combine: bool,
}

impl LowDiameterClustering {
    pub fn from_config(config: &CoarseningConfig) -> Self {
        LowDiameterClustering {
            diameter_upperbound: config.diameter_upperbound,
            beta: config.beta,
            combine: config.combine,
        }
    }

    fn radius(&self) -> usize {
        (self.diameter_upperbound / 2.0).floor().max(0.0) as usize
    }
}

/// A center reaching a node at some time.
#[derive(Debug, Clone, Copy)]
struct Arrival {
    time: f64,
    center: NodeId,
    node: NodeId,
    hops: usize,
}

impl PartialEq for Arrival {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Arrival {}

impl PartialOrd for Arrival {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Arrival {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.center.cmp(&other.center))
            .then(self.node.cmp(&other.node))
    }
}

impl Matcher for LowDiameterClustering {
    fn compute_matching(&self, graph: &Graph, rng: &mut SmallRng) -> Result<MatchResult, Error> {
        let n = graph.number_of_nodes();
        let radius = self.radius();

        // delta ~ Exp(beta), every node starts growing at max_delta - delta
        let shifts: Vec<f64> = (0..n)
            .map(|_| -(1.0 - rng.gen::<f64>()).ln() / self.beta)
            .collect();
        let max_shift = shifts.iter().copied().fold(0.0, f64::max);

        let mut queue: BinaryHeap<Reverse<Arrival>> = graph
            .nodes()
            .map(|node| {
                Reverse(Arrival {
                    time: max_shift - shifts[node],
                    center: node,
                    node,
                    hops: 0,
                })
            })
            .collect();

        let mut cluster_id = vec![UNDEFINED_NODE; n];
        while let Some(Reverse(arrival)) = queue.pop() {
            if cluster_id[arrival.node] != UNDEFINED_NODE {
                continue;
            }
            cluster_id[arrival.node] = arrival.center;
            if arrival.hops >= radius {
                continue;
            }

            for target in graph.out_edges(arrival.node).map(|e| graph.edge_target(e)) {
                if cluster_id[target] != UNDEFINED_NODE {
                    continue;
                }
                if self.combine
                    && graph.second_partition_index(arrival.center) != graph.second_partition_index(target)
                {
                    continue;
                }
                queue.push(Reverse(Arrival {
                    time: arrival.time + 1.0,
                    center: arrival.center,
                    node: target,
                    hops: arrival.hops + 1,
                }));
            }
        }

        let no_of_coarse_vertices = remap_cluster_ids(&mut cluster_id);
        debug!("low diameter clustering: {} nodes in {} clusters (radius {})", n, no_of_coarse_vertices, radius);

        Ok(MatchResult {
            coarse_mapping: cluster_id,
            no_of_coarse_vertices,
            matching: None,
            permutation: graph.nodes().collect(),
        })
    }
}
