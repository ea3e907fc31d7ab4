use rand::rngs::SmallRng;

use crate::algorithms::{spanning_tree, Error, MatchResult, Matcher};
use crate::config::CoarseningConfig;
use crate::graph::{Graph, NodeId, UNDEFINED_NODE};

/// Packs the nodes of a maximum spanning tree into clusters of `cluster_upperbound`
/// nodes, in depth first order from the tree's root.
#[derive(Debug, Clone, Copy)]
pub struct SpanningTreeClustering {
    pub cluster_upperbound: usize,
}

impl SpanningTreeClustering {
    pub fn from_config(config: &CoarseningConfig) -> Self {
        SpanningTreeClustering {
            cluster_upperbound: config.cluster_upperbound,
        }
    }
}

impl Matcher for SpanningTreeClustering {
    fn compute_matching(&self, graph: &Graph, rng: &mut SmallRng) -> Result<MatchResult, Error> {
        let n = graph.number_of_nodes();
        let permutation: Vec<NodeId> = graph.nodes().collect();
        if n == 0 {
            return Ok(MatchResult {
                coarse_mapping: Vec::new(),
                no_of_coarse_vertices: 0,
                matching: None,
                permutation,
            });
        }

        let (tree, root) = spanning_tree(graph, rng);
        let mut coarse_mapping = vec![UNDEFINED_NODE; n];

        let mut cur_cluster = 0usize;
        let mut cur_cluster_nodes = 0usize;
        let mut stack = vec![root];
        while let Some(cur_node) = stack.pop() {
            if cur_cluster_nodes >= self.cluster_upperbound {
                cur_cluster += 1;
                cur_cluster_nodes = 0;
            }
            coarse_mapping[cur_node] = cur_cluster;
            cur_cluster_nodes += 1;

            stack.extend(tree.out_edges(cur_node).map(|e| tree.edge_target(e)));
        }

        // outside the root's component: singletons
        for coarse_node in coarse_mapping.iter_mut().filter(|coarse_node| **coarse_node == UNDEFINED_NODE) {
            cur_cluster += 1;
            *coarse_node = cur_cluster;
        }

        Ok(MatchResult {
            coarse_mapping,
            no_of_coarse_vertices: cur_cluster + 1,
            matching: None,
            permutation,
        })
    }
}
