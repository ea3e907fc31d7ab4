use rand::rngs::SmallRng;

use crate::algorithms::{
    Error, GpaMatching, LowDiameterClustering, RandomMatching, SizeConstraintLabelPropagation,
    SpanningTreeClustering,
};
use crate::config::{CoarseningConfig, MatchingType};
use crate::graph::{Graph, NodeId};

/// Maps every fine node to its coarse node. Values are dense in `0..no_of_coarse_vertices`.
pub type CoarseMapping = Vec<NodeId>;

/// Partner of every node in a pairwise matching; unmatched nodes are their own partner.
pub type Matching = Vec<NodeId>;

/// Order in which contraction visits the fine nodes.
pub type NodePermutation = Vec<NodeId>;

/// Output of one matching / clustering invocation on one level.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub coarse_mapping: CoarseMapping,
    pub no_of_coarse_vertices: usize,
    /// Only pairwise strategies produce a partner array.
    pub matching: Option<Matching>,
    pub permutation: NodePermutation,
}

impl MatchResult {
    /// Checks that the mapping covers `no_of_nodes` fine nodes and that its values are
    /// exactly `0..no_of_coarse_vertices`.
    pub fn validate(&self, no_of_nodes: usize) -> Result<(), Error> {
        if self.coarse_mapping.len() != no_of_nodes {
            return Err(Error::InputLenMismatch {
                expected: no_of_nodes,
                actual: self.coarse_mapping.len(),
            });
        }
        if self.permutation.len() != no_of_nodes {
            return Err(Error::InputLenMismatch {
                expected: no_of_nodes,
                actual: self.permutation.len(),
            });
        }
        if let Some(matching) = &self.matching {
            if matching.len() != no_of_nodes {
                return Err(Error::InputLenMismatch {
                    expected: no_of_nodes,
                    actual: matching.len(),
                });
            }
        }

        let mut used = vec![false; self.no_of_coarse_vertices];
        for &coarse_node in &self.coarse_mapping {
            if coarse_node >= self.no_of_coarse_vertices {
                return Err(Error::NonDenseMapping { coarse_node, reason: "out of range" });
            }
            used[coarse_node] = true;
        }
        if let Some(coarse_node) = used.iter().position(|&is_used| !is_used) {
            return Err(Error::NonDenseMapping { coarse_node, reason: "no fine node maps to it" });
        }
        Ok(())
    }
}

/// Computes the coarse node of every node of one level.
pub trait Matcher {
    fn compute_matching(&self, graph: &Graph, rng: &mut SmallRng) -> Result<MatchResult, Error>;
}

/// The closed set of coarsening strategies.
#[derive(Debug, Clone)]
pub enum MatchingStrategy {
    Random(RandomMatching),
    Gpa(GpaMatching),
    LabelPropagation(SizeConstraintLabelPropagation),
    SpanningTree(SpanningTreeClustering),
    LowDiameter(LowDiameterClustering),
}

impl MatchingStrategy {
    /// The strategy used to coarsen level `level`.
    pub fn configure(config: &CoarseningConfig, level: u32) -> Self {
        match config.matching_type {
            MatchingType::RandomGpa if level < config.aggressive_random_levels => {
                MatchingStrategy::Random(RandomMatching::from_config(config))
            }
            MatchingType::Random => MatchingStrategy::Random(RandomMatching::from_config(config)),
            MatchingType::Gpa | MatchingType::RandomGpa => {
                MatchingStrategy::Gpa(GpaMatching::from_config(config))
            }
            MatchingType::LpClustering => {
                MatchingStrategy::LabelPropagation(SizeConstraintLabelPropagation::from_config(config))
            }
            MatchingType::SimpleClustering => {
                MatchingStrategy::SpanningTree(SpanningTreeClustering::from_config(config))
            }
            MatchingType::LowDiameter => {
                MatchingStrategy::LowDiameter(LowDiameterClustering::from_config(config))
            }
        }
    }

    /// Whether the result is contracted through the quotient graph.
    pub fn is_clustering(&self) -> bool {
        !matches!(self, MatchingStrategy::Random(_) | MatchingStrategy::Gpa(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            MatchingStrategy::Random(_) => "random matching",
            MatchingStrategy::Gpa(_) => "gpa matching",
            MatchingStrategy::LabelPropagation(_) => "label propagation clustering",
            MatchingStrategy::SpanningTree(_) => "spanning tree clustering",
            MatchingStrategy::LowDiameter(_) => "low diameter clustering",
        }
    }
}

impl Matcher for MatchingStrategy {
    fn compute_matching(&self, graph: &Graph, rng: &mut SmallRng) -> Result<MatchResult, Error> {
        match self {
            MatchingStrategy::Random(matcher) => matcher.compute_matching(graph, rng),
            MatchingStrategy::Gpa(matcher) => matcher.compute_matching(graph, rng),
            MatchingStrategy::LabelPropagation(matcher) => matcher.compute_matching(graph, rng),
            MatchingStrategy::SpanningTree(matcher) => matcher.compute_matching(graph, rng),
            MatchingStrategy::LowDiameter(matcher) => matcher.compute_matching(graph, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(coarse_mapping: Vec<NodeId>, no_of_coarse_vertices: usize) -> MatchResult {
        let n = coarse_mapping.len();
        MatchResult {
            coarse_mapping,
            no_of_coarse_vertices,
            matching: None,
            permutation: (0..n).collect(),
        }
    }

    #[test]
    fn test_validate_dense_mapping() {
        assert!(result(vec![0, 1, 1, 2, 0], 3).validate(5).is_ok());
    }

    #[test]
    fn test_validate_rejects_gaps_and_overflow() {
        assert!(matches!(
            result(vec![0, 2, 2], 3).validate(3),
            Err(Error::NonDenseMapping { coarse_node: 1, .. })
        ));
        assert!(matches!(
            result(vec![0, 3, 1], 3).validate(3),
            Err(Error::NonDenseMapping { coarse_node: 3, .. })
        ));
        assert!(matches!(
            result(vec![0, 1], 2).validate(3),
            Err(Error::InputLenMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_configure_random_gpa_levels() {
        // Arrange
        let config = CoarseningConfig {
            matching_type: MatchingType::RandomGpa,
            aggressive_random_levels: 2,
            ..Default::default()
        };

        // Act
        let strategies: Vec<MatchingStrategy> = (0..4).map(|level| MatchingStrategy::configure(&config, level)).collect();

        // Assert
        assert!(matches!(strategies[0], MatchingStrategy::Random(_)));
        assert!(matches!(strategies[1], MatchingStrategy::Random(_)));
        assert!(matches!(strategies[2], MatchingStrategy::Gpa(_)));
        assert!(matches!(strategies[3], MatchingStrategy::Gpa(_)));
        assert!(!strategies[3].is_clustering());
    }

    #[test]
    fn test_configure_clusterings() {
        for (matching_type, name) in [
            (MatchingType::LpClustering, "label propagation clustering"),
            (MatchingType::SimpleClustering, "spanning tree clustering"),
            (MatchingType::LowDiameter, "low diameter clustering"),
        ] {
            let config = CoarseningConfig { matching_type, ..Default::default() };

            let strategy = MatchingStrategy::configure(&config, 0);

            assert!(strategy.is_clustering());
            assert_eq!(strategy.name(), name);
        }
    }
}
