use thiserror::Error;

mod coarsening;
mod contraction;
mod edge_rating;
mod gpa_matching;
mod label_propagation;
mod low_diameter;
mod matching;
mod node_ordering;
mod quotient_boundary;
mod random_matching;
mod simple_clustering;
mod spanning_tree;
mod stop_rule;

pub use coarsening::{build_hierarchy, build_hierarchy_with_rng};
pub use contraction::{contract, contract_clustering, contract_matching};
pub use edge_rating::rate;
pub use gpa_matching::GpaMatching;
pub use label_propagation::{ensemble_two_clusterings, SizeConstraintLabelPropagation};
pub use low_diameter::LowDiameterClustering;
pub use matching::{CoarseMapping, MatchResult, Matcher, Matching, MatchingStrategy, NodePermutation};
pub use node_ordering::order_nodes;
pub use quotient_boundary::{BoundaryPair, QuotientBoundary};
pub use random_matching::RandomMatching;
pub use simple_clustering::SpanningTreeClustering;
pub use spanning_tree::spanning_tree;
pub use stop_rule::{SimpleFixedStopRule, StopRule};

/// Errors of the coarsening / uncoarsening engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The stop rule selector is not supported.
    #[error("unsupported stop rule {0:?}, only \"simple-fix\" is supported")]
    UnsupportedStopRule(String),

    #[error("unsupported matching type {0:?}")]
    UnsupportedMatching(String),

    #[error("unsupported edge rating {0:?}")]
    UnsupportedEdgeRating(String),

    #[error("unsupported node ordering {0:?}")]
    UnsupportedNodeOrdering(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Input sets don't have matching lengths.
    #[error("input sets don't have the same length (expected {expected} items, got {actual})")]
    InputLenMismatch { expected: usize, actual: usize },

    /// A coarse mapping leaves gaps in `0..no_of_coarse_vertices` or points past it.
    #[error("coarse mapping is not dense: coarse node {coarse_node} ({reason})")]
    NonDenseMapping { coarse_node: usize, reason: &'static str },

    #[error("contraction emitted {actual} coarse nodes, the mapping announced {expected}")]
    CoarseVertexCountMismatch { expected: usize, actual: usize },

    /// Popping past the finest level of a hierarchy.
    #[error("hierarchy has no finer level left")]
    HierarchyExhausted,

    #[error("support index {index} out of range for {len} data rows")]
    SupportOutOfRange { index: usize, len: usize },

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("node {node} has a non-positive weight")]
    ZeroNodeWeight { node: usize },

    #[error("feature vectors are empty")]
    EmptyFeatureVector,

    #[error("node {node} has {actual} features, expected {expected}")]
    FeatureDimensionMismatch { node: usize, expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("matrix market: {0}")]
    MatrixMarket(#[from] sprs::io::IoError),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}
