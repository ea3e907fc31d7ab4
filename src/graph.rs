use std::ops::Range;

use nalgebra::DVector;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator as _;
use rustc_hash::FxHashSet;

use crate::algorithms::Error;

pub type NodeId = usize;
pub type EdgeId = usize;
pub type NodeWeight = i64;
pub type EdgeWeight = f64;
pub type EdgeRating = f64;
pub type PartitionId = usize;

/// Per-node feature vector. All nodes of one graph share its dimensionality.
pub type FeatureVec = DVector<f64>;

pub const UNDEFINED_NODE: NodeId = NodeId::MAX;
pub const UNDEFINED_EDGE: EdgeId = EdgeId::MAX;

#[derive(Debug, Clone, Copy)]
struct Node {
    first_edge: EdgeId,
    weight: NodeWeight,
}

impl Default for Node {
    fn default() -> Self {
        Node { first_edge: 0, weight: 1 }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Edge {
    target: NodeId,
    weight: EdgeWeight,
}

#[derive(Debug, Clone)]
struct RefinementNode {
    partition_index: PartitionId,
    feature_vector: FeatureVec,
}

impl Default for RefinementNode {
    fn default() -> Self {
        RefinementNode {
            partition_index: 0,
            feature_vector: FeatureVec::zeros(0),
        }
    }
}

/// Struct that represents a directed, weighted graph in a compact (CSR-like) layout.
///
/// Nodes are `0..n`. The out edges of node `v` are the edge ids
/// `get_first_edge(v)..get_first_invalid_edge(v)`. An undirected relation is stored
/// as two directed edges; nothing in here makes edges symmetric implicitly.
///
/// Construction is append only:
///
/// ```
/// use graph_hierarchy::graph::Graph;
///
/// let mut graph = Graph::new();
/// graph.start_construction(3, 2);
/// let a = graph.new_node();
/// let b = graph.new_node();
/// let _c = graph.new_node();
/// let e = graph.new_edge(a, b);
/// graph.set_edge_weight(e, 2.0);
/// graph.new_edge(b, a);
/// graph.finish_construction();
///
/// assert_eq!(graph.number_of_nodes(), 3);
/// assert_eq!(graph.node_degree(2), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    // one trailing sentinel so that `first_invalid_edge(n - 1)` is defined
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    refinement_node_props: Vec<RefinementNode>,
    edge_ratings: Vec<EdgeRating>,
    second_partition_index: Vec<PartitionId>,
    partition_count: PartitionId,

    building_graph: bool,
    last_source: Option<NodeId>,
    current_node: NodeId,
    current_edge: EdgeId,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {

    /// Create a new, empty graph
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            edges: Vec::new(),
            refinement_node_props: Vec::new(),
            edge_ratings: Vec::new(),
            second_partition_index: Vec::new(),
            partition_count: 0,
            building_graph: false,
            last_source: None,
            current_node: 0,
            current_edge: 0,
        }
    }

    /// Builds a graph from per-node lists of `(target, edge weight)`.
    ///
    /// Every node gets weight 1 and partition index 0.
    pub fn from_adjacency(adjacency: &[Vec<(NodeId, EdgeWeight)>]) -> Self {
        let num_of_edges = adjacency.iter().map(Vec::len).sum();
        let mut graph = Graph::new();
        graph.start_construction(adjacency.len(), num_of_edges);

        for node_data in adjacency {
            let node = graph.new_node();
            graph.set_partition_index(node, 0);
            graph.set_node_weight(node, 1);

            for &(target, weight) in node_data {
                let e = graph.new_edge(node, target);
                graph.set_edge_weight(e, weight);
            }
        }

        graph.finish_construction();
        graph
    }

    /// Reset all buffers for a graph of at most `n` nodes and `m` edges.
    pub fn start_construction(&mut self, n: usize, m: usize) {
        self.building_graph = true;
        self.current_node = 0;
        self.current_edge = 0;
        self.last_source = None;

        self.nodes = vec![Node::default(); n + 1];
        self.refinement_node_props = vec![RefinementNode::default(); n];
        self.second_partition_index = vec![0; n];
        self.edges = vec![Edge::default(); m];
        self.edge_ratings = vec![0.0; m];

        self.nodes[0].first_edge = 0;
    }

    /// Appends the next node and returns its id (ids are handed out as 0, 1, 2, ...).
    pub fn new_node(&mut self) -> NodeId {
        assert!(self.building_graph, "new_node called outside of construction");
        assert!(self.current_node < self.refinement_node_props.len(), "node capacity exceeded");
        let node = self.current_node;
        self.current_node += 1;
        node
    }

    /// Appends an edge `source -> target`.
    ///
    /// Sources must arrive in non-decreasing order.
    pub fn new_edge(&mut self, source: NodeId, target: NodeId) -> EdgeId {
        assert!(self.building_graph, "new_edge called outside of construction");
        assert!(self.current_edge < self.edges.len(), "edge capacity exceeded");
        assert!(source + 1 < self.nodes.len(), "edge source out of range");
        if let Some(last) = self.last_source {
            assert!(source >= last, "edge sources must be appended in non-decreasing order");
        }

        let e_bar = self.current_edge;
        self.edges[e_bar].target = target;
        self.current_edge += 1;

        self.nodes[source + 1].first_edge = self.current_edge;

        // nodes skipped since the last source had no out edges
        let fill_from = self.last_source.map_or(0, |last| last + 1);
        if fill_from < source {
            let first = self.nodes[fill_from].first_edge;
            for node in self.nodes[fill_from + 1..=source].iter_mut() {
                node.first_edge = first;
            }
        }
        self.last_source = Some(source);
        e_bar
    }

    /// Trim buffers to what was appended and backfill trailing isolated nodes.
    pub fn finish_construction(&mut self) {
        let n = self.current_node;
        self.nodes.truncate(n + 1);
        self.refinement_node_props.truncate(n);
        self.second_partition_index.truncate(n);
        self.edges.truncate(self.current_edge);
        self.edge_ratings.truncate(self.current_edge);

        self.building_graph = false;

        let fill_from = self.last_source.map_or(0, |last| last + 1);
        if fill_from < n {
            let first = self.nodes[fill_from].first_edge;
            for node in self.nodes[fill_from + 1..=n].iter_mut() {
                node.first_edge = first;
            }
        }
    }

    /// The number of vertices in the graph.
    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edges appended since `start_construction`. Equals `number_of_edges` once finished.
    pub fn number_of_edges_so_far(&self) -> usize {
        if self.building_graph {
            self.current_edge
        } else {
            self.edges.len()
        }
    }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.number_of_nodes() == 0
    }

    pub fn nodes(&self) -> Range<NodeId> {
        0..self.number_of_nodes()
    }

    pub fn edges(&self) -> Range<EdgeId> {
        0..self.number_of_edges()
    }

    pub fn get_first_edge(&self, node: NodeId) -> EdgeId {
        debug_assert!(node < self.nodes.len());
        self.nodes[node].first_edge
    }

    pub fn get_first_invalid_edge(&self, node: NodeId) -> EdgeId {
        debug_assert!(node + 1 < self.nodes.len());
        self.nodes[node + 1].first_edge
    }

    /// The ids of the out edges of `node`.
    pub fn out_edges(&self, node: NodeId) -> Range<EdgeId> {
        self.get_first_edge(node)..self.get_first_invalid_edge(node)
    }

    /// An iterator over `(target, edge weight)` of the out edges of `node`.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, EdgeWeight)> + '_ {
        self.edges[self.out_edges(node)].iter().map(|edge| (edge.target, edge.weight))
    }

    pub fn partition_count(&self) -> PartitionId {
        self.partition_count
    }

    pub fn set_partition_count(&mut self, count: PartitionId) {
        self.partition_count = count;
    }

    pub fn partition_index(&self, node: NodeId) -> PartitionId {
        debug_assert!(node < self.refinement_node_props.len());
        self.refinement_node_props[node].partition_index
    }

    pub fn set_partition_index(&mut self, node: NodeId, id: PartitionId) {
        debug_assert!(node < self.refinement_node_props.len());
        self.refinement_node_props[node].partition_index = id;
    }

    /// Secondary partition index, only meaningful in combine mode.
    pub fn second_partition_index(&self, node: NodeId) -> PartitionId {
        debug_assert!(node < self.second_partition_index.len());
        self.second_partition_index[node]
    }

    pub fn set_second_partition_index(&mut self, node: NodeId, id: PartitionId) {
        debug_assert!(node < self.second_partition_index.len());
        self.second_partition_index[node] = id;
    }

    pub fn feature_vec(&self, node: NodeId) -> &FeatureVec {
        debug_assert!(node < self.refinement_node_props.len());
        &self.refinement_node_props[node].feature_vector
    }

    pub fn set_feature_vec(&mut self, node: NodeId, vec: FeatureVec) {
        debug_assert!(node < self.refinement_node_props.len());
        self.refinement_node_props[node].feature_vector = vec;
    }

    pub fn node_weight(&self, node: NodeId) -> NodeWeight {
        debug_assert!(node < self.nodes.len() - 1);
        self.nodes[node].weight
    }

    pub fn set_node_weight(&mut self, node: NodeId, weight: NodeWeight) {
        debug_assert!(node < self.nodes.len() - 1);
        self.nodes[node].weight = weight;
    }

    pub fn node_degree(&self, node: NodeId) -> usize {
        self.get_first_invalid_edge(node) - self.get_first_edge(node)
    }

    pub fn weighted_node_degree(&self, node: NodeId) -> EdgeWeight {
        self.neighbors(node).map(|(_, weight)| weight).sum()
    }

    pub fn edge_weight(&self, edge: EdgeId) -> EdgeWeight {
        debug_assert!(edge < self.edges.len());
        self.edges[edge].weight
    }

    pub fn set_edge_weight(&mut self, edge: EdgeId, weight: EdgeWeight) {
        debug_assert!(edge < self.edges.len());
        self.edges[edge].weight = weight;
    }

    pub fn edge_target(&self, edge: EdgeId) -> NodeId {
        debug_assert!(edge < self.edges.len());
        self.edges[edge].target
    }

    pub fn edge_rating(&self, edge: EdgeId) -> EdgeRating {
        debug_assert!(edge < self.edge_ratings.len());
        self.edge_ratings[edge]
    }

    pub fn set_edge_rating(&mut self, edge: EdgeId, rating: EdgeRating) {
        debug_assert!(edge < self.edge_ratings.len());
        self.edge_ratings[edge] = rating;
    }

    /// Replace all edge ratings at once, in edge id order.
    pub(crate) fn set_edge_ratings(&mut self, ratings: Vec<EdgeRating>) {
        debug_assert_eq!(ratings.len(), self.edges.len());
        self.edge_ratings = ratings;
    }

    pub fn total_node_weight(&self) -> NodeWeight {
        self.nodes().map(|node| self.node_weight(node)).sum()
    }

    /// Dimensionality of the feature vectors (taken from node 0).
    pub fn feature_dimension(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.feature_vec(0).len()
        }
    }

    /// All feature vectors in node order, i.e. one data row per node.
    pub fn feature_rows(&self) -> Vec<FeatureVec> {
        self.refinement_node_props
            .iter()
            .map(|props| props.feature_vector.clone())
            .collect()
    }

    /// Rejects graphs a coarsening run cannot work with: no nodes, non-positive
    /// node weights, empty or ragged feature vectors.
    pub fn validate(&self) -> Result<(), Error> {
        if self.is_empty() {
            return Err(Error::EmptyGraph);
        }
        let dimension = self.feature_dimension();
        if dimension == 0 {
            return Err(Error::EmptyFeatureVector);
        }
        for node in self.nodes() {
            if self.node_weight(node) <= 0 {
                return Err(Error::ZeroNodeWeight { node });
            }
            let actual = self.feature_vec(node).len();
            if actual != dimension {
                return Err(Error::FeatureDimensionMismatch {
                    node,
                    expected: dimension,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// The edge cut of a partition.
    ///
    /// Every directed edge whose endpoints lie in different parts contributes its
    /// weight; the total is halved since an undirected cut edge is seen from both
    /// endpoints.
    ///
    /// ```text
    ///   0 ---- 1 | 2
    ///    \       |/
    ///     `------3        parts {0, 1} and {2, 3}, unit weights: edge cut = 2
    /// ```
    pub fn edge_cut(&self, partition: &[PartitionId]) -> EdgeWeight {
        debug_assert_eq!(self.number_of_nodes(), partition.len());

        let directed_cut: EdgeWeight = (0..self.number_of_nodes())
            .into_par_iter()
            .map(|node| {
                let node_part = partition[node];
                self.neighbors(node)
                    .filter(|(target, _)| partition[*target] != node_part)
                    .map(|(_, weight)| weight)
                    .sum::<EdgeWeight>()
            })
            .sum();
        directed_cut / 2.0
    }
}

/// Adds every missing reverse edge (with the weight of its forward edge) and
/// returns the resulting number of edges.
pub fn make_edges_bidirectional(adjacency: &mut [Vec<(NodeId, EdgeWeight)>]) -> usize {
    let mut neighbors: Vec<FxHashSet<NodeId>> = adjacency
        .iter()
        .map(|edges| edges.iter().map(|&(target, _)| target).collect())
        .collect();

    for from in 0..adjacency.len() {
        // edges appended below land on other nodes, so index instead of iterating
        let mut index = 0;
        while index < adjacency[from].len() {
            let (target, weight) = adjacency[from][index];
            if !neighbors[target].contains(&from) {
                adjacency[target].push((from, weight));
                neighbors[target].insert(from);
            }
            index += 1;
        }
    }

    adjacency.iter().map(Vec::len).sum()
}
