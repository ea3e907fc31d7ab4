use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{EdgeWeight, Graph, NodeId, NodeWeight, PartitionId};

/// Unordered pair of adjacent blocks, stored as `lhs < rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryPair {
    pub lhs: PartitionId,
    pub rhs: PartitionId,
}

impl BoundaryPair {
    pub fn new(a: PartitionId, b: PartitionId) -> Self {
        debug_assert_ne!(a, b, "a boundary pair joins two distinct blocks");
        BoundaryPair {
            lhs: a.min(b),
            rhs: a.max(b),
        }
    }
}

#[derive(Debug, Clone)]
struct DataBoundaryPair {
    pair: BoundaryPair,
    edge_cut: EdgeWeight,
    lhs_boundary: FxHashSet<NodeId>,
    rhs_boundary: FxHashSet<NodeId>,
}

impl DataBoundaryPair {
    fn boundary(&self, block: PartitionId) -> &FxHashSet<NodeId> {
        if block == self.pair.lhs {
            &self.lhs_boundary
        } else {
            &self.rhs_boundary
        }
    }

    fn boundary_mut(&mut self, block: PartitionId) -> &mut FxHashSet<NodeId> {
        if block == self.pair.lhs {
            &mut self.lhs_boundary
        } else {
            &mut self.rhs_boundary
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BlockInformation {
    block_weight: NodeWeight,
    block_no_nodes: usize,
}

/// Per block pair cut weights and boundary nodes of a partitioned graph, read
/// from the graph's partition indices.
///
/// Block pairs are kept in the order they are first met, so everything derived from
/// them (in particular the quotient graph) is deterministic.
#[derive(Debug)]
pub struct QuotientBoundary<'a> {
    graph: &'a Graph,
    pairs: Vec<DataBoundaryPair>,
    pair_index: FxHashMap<BoundaryPair, usize>,
    // successive cut edges of one node mostly hit the same pair
    last_pair: Option<(BoundaryPair, usize)>,
    block_infos: Vec<BlockInformation>,
    singletons: Vec<NodeId>,
}

impl<'a> QuotientBoundary<'a> {
    /// An empty boundary over the `partition_count()` blocks of `graph`; call [`build`](Self::build).
    pub fn new(graph: &'a Graph) -> Self {
        QuotientBoundary {
            graph,
            pairs: Vec::new(),
            pair_index: FxHashMap::default(),
            last_pair: None,
            block_infos: vec![BlockInformation::default(); graph.partition_count()],
            singletons: Vec::new(),
        }
    }

    /// One pass over all nodes and edges: block weights and sizes, cut weight per
    /// block pair, and boundary nodes per block pair.
    pub fn build(&mut self) {
        let graph = self.graph;
        self.pairs.clear();
        self.pair_index.clear();
        self.last_pair = None;
        self.singletons.clear();
        for info in self.block_infos.iter_mut() {
            *info = BlockInformation::default();
        }

        for node in graph.nodes() {
            let source_partition = graph.partition_index(node);
            debug_assert!(source_partition < self.block_infos.len());
            self.block_infos[source_partition].block_weight += graph.node_weight(node);
            self.block_infos[source_partition].block_no_nodes += 1;

            if graph.node_degree(node) == 0 {
                self.singletons.push(node);
            }

            for e in graph.out_edges(node) {
                let target = graph.edge_target(e);
                let target_partition = graph.partition_index(target);
                if source_partition == target_partition {
                    continue;
                }
                let pair = BoundaryPair::new(source_partition, target_partition);
                let slot = self.pair_slot(pair);
                self.pairs[slot].edge_cut += graph.edge_weight(e);
                self.pairs[slot].boundary_mut(source_partition).insert(node);
                self.pairs[slot].boundary_mut(target_partition).insert(target);
            }
        }

        // every cut edge was seen from both endpoints
        for data in self.pairs.iter_mut() {
            data.edge_cut /= 2.0;
        }
    }

    fn pair_slot(&mut self, pair: BoundaryPair) -> usize {
        if let Some((last, slot)) = self.last_pair {
            if last == pair {
                return slot;
            }
        }
        let next = self.pairs.len();
        let slot = *self.pair_index.entry(pair).or_insert(next);
        if slot == next {
            self.pairs.push(DataBoundaryPair {
                pair,
                edge_cut: 0.0,
                lhs_boundary: FxHashSet::default(),
                rhs_boundary: FxHashSet::default(),
            });
        }
        self.last_pair = Some((pair, slot));
        slot
    }

    fn lookup(&self, pair: BoundaryPair) -> Option<&DataBoundaryPair> {
        match self.last_pair {
            Some((last, slot)) if last == pair => self.pairs.get(slot),
            _ => self.pair_index.get(&pair).map(|&slot| &self.pairs[slot]),
        }
    }

    /// Records `node` as a boundary node of `block` towards the other block of `pair`.
    pub fn insert(&mut self, node: NodeId, block: PartitionId, pair: BoundaryPair) {
        debug_assert!(block == pair.lhs || block == pair.rhs);
        debug_assert_eq!(self.graph.partition_index(node), block);
        let slot = self.pair_slot(pair);
        self.pairs[slot].boundary_mut(block).insert(node);
    }

    pub fn contains(&self, node: NodeId, block: PartitionId, pair: BoundaryPair) -> bool {
        self.lookup(pair)
            .map_or(false, |data| data.boundary(block).contains(&node))
    }

    /// Number of boundary nodes of `block` towards the other block of `pair`.
    pub fn size(&self, block: PartitionId, pair: BoundaryPair) -> usize {
        self.lookup(pair).map_or(0, |data| data.boundary(block).len())
    }

    /// Total weight of the edges between the two blocks of `pair`.
    pub fn edge_cut(&self, pair: BoundaryPair) -> EdgeWeight {
        self.lookup(pair).map_or(0.0, |data| data.edge_cut)
    }

    /// All adjacent block pairs.
    pub fn quotient_graph_edges(&self) -> Vec<BoundaryPair> {
        self.pairs.iter().map(|data| data.pair).collect()
    }

    pub fn block_weight(&self, block: PartitionId) -> NodeWeight {
        self.block_infos[block].block_weight
    }

    pub fn block_no_nodes(&self, block: PartitionId) -> usize {
        self.block_infos[block].block_no_nodes
    }

    /// Nodes without any edges.
    pub fn singletons(&self) -> &[NodeId] {
        &self.singletons
    }

    /// The quotient graph: one node per block weighted by the block weight, and for
    /// every pair with a positive cut both directed edges weighted by the cut.
    pub fn underlying_quotient_graph(&self) -> Graph {
        let mut building_tool: Vec<Vec<(PartitionId, EdgeWeight)>> = vec![Vec::new(); self.block_infos.len()];
        for data in self.pairs.iter().filter(|data| data.edge_cut > 0.0) {
            building_tool[data.pair.lhs].push((data.pair.rhs, data.edge_cut));
            building_tool[data.pair.rhs].push((data.pair.lhs, data.edge_cut));
        }

        let mut quotient = Graph::new();
        quotient.start_construction(building_tool.len(), 2 * self.pairs.len());
        for (block, edges) in building_tool.iter().enumerate() {
            let node = quotient.new_node();
            quotient.set_node_weight(node, self.block_infos[block].block_weight);
            for &(target, weight) in edges {
                let e = quotient.new_edge(node, target);
                quotient.set_edge_weight(e, weight);
            }
        }
        quotient.finish_construction();
        quotient
    }

    /// Recomputes everything by brute force and compares. Meant for tests and debug checks.
    pub fn check_consistency(&self) -> bool {
        let graph = self.graph;
        let k = self.block_infos.len();
        let mut block_weights = vec![0; k];
        let mut block_sizes = vec![0usize; k];
        let mut cuts: FxHashMap<BoundaryPair, EdgeWeight> = FxHashMap::default();

        for node in graph.nodes() {
            let partition = graph.partition_index(node);
            block_weights[partition] += graph.node_weight(node);
            block_sizes[partition] += 1;
            for (target, weight) in graph.neighbors(node) {
                let target_partition = graph.partition_index(target);
                if partition == target_partition {
                    continue;
                }
                let pair = BoundaryPair::new(partition, target_partition);
                if !self.contains(node, partition, pair) || !self.contains(target, target_partition, pair) {
                    return false;
                }
                *cuts.entry(pair).or_insert(0.0) += weight;
            }
        }

        let blocks_agree = (0..k).all(|block| {
            self.block_weight(block) == block_weights[block] && self.block_no_nodes(block) == block_sizes[block]
        });
        let cuts_agree = cuts.len() == self.pairs.len()
            && cuts
                .iter()
                .all(|(&pair, &cut)| (self.edge_cut(pair) - cut / 2.0).abs() <= 1e-9 * cut.abs().max(1.0));
        blocks_agree && cuts_agree
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use crate::graph::make_edges_bidirectional;
    use super::*;

    /// Three triangles {0,1,2}, {3,4,5}, {6,7,8} in a ring, plus isolated node 9.
    fn ring_of_triangles(partition: &[PartitionId], count: PartitionId) -> Graph {
        let mut adjacency = vec![
            vec![(1, 1.0), (2, 1.0)],
            vec![(2, 1.0), (3, 2.0)],
            vec![(0, 1.0)],
            vec![(4, 1.0), (5, 1.0)],
            vec![(5, 1.0), (6, 3.0)],
            vec![(3, 1.0), (7, 0.5)],
            vec![(7, 1.0), (8, 1.0)],
            vec![(8, 1.0)],
            vec![(6, 1.0), (0, 4.0)],
            vec![],
        ];
        make_edges_bidirectional(&mut adjacency);
        let mut graph = Graph::from_adjacency(&adjacency);
        for node in graph.nodes() {
            graph.set_partition_index(node, partition[node]);
        }
        graph.set_partition_count(count);
        graph
    }

    fn brute_force_cut(graph: &Graph, lhs: PartitionId, rhs: PartitionId) -> EdgeWeight {
        let mut cut = 0.0;
        for node in graph.nodes() {
            for (target, weight) in graph.neighbors(node) {
                if graph.partition_index(node) == lhs && graph.partition_index(target) == rhs {
                    cut += weight;
                }
            }
        }
        cut
    }

    #[test]
    fn test_build_matches_brute_force() {
        // Arrange
        let graph = ring_of_triangles(&[0, 0, 0, 1, 1, 1, 2, 2, 2, 3], 4);
        let mut boundary = QuotientBoundary::new(&graph);

        // Act
        boundary.build();

        // Assert
        assert!(boundary.check_consistency());
        assert_eq!(boundary.quotient_graph_edges().len(), 3);
        for pair in boundary.quotient_graph_edges() {
            assert_relative_eq!(boundary.edge_cut(pair), brute_force_cut(&graph, pair.lhs, pair.rhs));
        }
        assert_relative_eq!(boundary.edge_cut(BoundaryPair::new(1, 0)), 2.0);
        assert_relative_eq!(boundary.edge_cut(BoundaryPair::new(2, 1)), 3.5);
        assert_relative_eq!(boundary.edge_cut(BoundaryPair::new(0, 2)), 4.0);
        assert_relative_eq!(boundary.edge_cut(BoundaryPair::new(0, 3)), 0.0);
        assert_eq!(boundary.block_no_nodes(0), 3);
        assert_eq!(boundary.block_weight(3), 1);
        assert_eq!(boundary.singletons(), &[9]);
    }

    #[test]
    fn test_boundary_nodes_per_pair() {
        // Arrange
        let graph = ring_of_triangles(&[0, 0, 0, 1, 1, 1, 2, 2, 2, 3], 4);
        let mut boundary = QuotientBoundary::new(&graph);

        // Act
        boundary.build();

        // Assert
        let pair = BoundaryPair::new(1, 2);
        assert!(boundary.contains(4, 1, pair));
        assert!(boundary.contains(5, 1, pair));
        assert!(!boundary.contains(3, 1, pair));
        assert_eq!(boundary.size(1, pair), 2);
        assert_eq!(boundary.size(2, pair), 2);
        assert_eq!(boundary.size(0, BoundaryPair::new(0, 3)), 0);
    }

    #[test]
    fn test_insert_adds_boundary_node() {
        let graph = ring_of_triangles(&[0, 0, 0, 1, 1, 1, 2, 2, 2, 3], 4);
        let mut boundary = QuotientBoundary::new(&graph);
        boundary.build();
        let pair = BoundaryPair::new(0, 1);

        boundary.insert(0, 0, pair);

        assert!(boundary.contains(0, 0, pair));
        assert_eq!(boundary.size(0, pair), 2);
    }

    #[test]
    fn test_underlying_quotient_graph() {
        // Arrange
        let mut graph = ring_of_triangles(&[0, 0, 0, 1, 1, 1, 2, 2, 2, 3], 4);
        graph.set_node_weight(9, 7);
        let mut boundary = QuotientBoundary::new(&graph);
        boundary.build();

        // Act
        let quotient = boundary.underlying_quotient_graph();

        // Assert
        let k = 4;
        assert_eq!(quotient.number_of_nodes(), k);
        assert!(quotient.number_of_edges() / 2 <= k * (k - 1) / 2);
        assert_eq!(quotient.number_of_edges(), 6);
        assert_eq!(quotient.total_node_weight(), graph.total_node_weight());
        assert_eq!(quotient.node_weight(3), 7);
        assert_eq!(quotient.node_degree(3), 0);
        for block in quotient.nodes() {
            for (target, weight) in quotient.neighbors(block) {
                assert_relative_eq!(weight, brute_force_cut(&graph, block, target));
            }
        }
    }
}
