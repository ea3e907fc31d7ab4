use std::str::FromStr;

use crate::algorithms::Error;
use crate::graph::NodeWeight;

/// Which matching / clustering algorithm coarsens a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingType {
    Random,
    Gpa,
    /// Random matching for the first `aggressive_random_levels` levels, GPA afterwards.
    RandomGpa,
    LpClustering,
    SimpleClustering,
    LowDiameter,
}

impl MatchingType {
    /// Clustering strategies are contracted through the quotient graph, matchings pairwise.
    pub fn is_clustering(&self) -> bool {
        matches!(
            self,
            MatchingType::LpClustering | MatchingType::SimpleClustering | MatchingType::LowDiameter
        )
    }
}

impl FromStr for MatchingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(MatchingType::Random),
            "gpa" => Ok(MatchingType::Gpa),
            "randomgpa" => Ok(MatchingType::RandomGpa),
            "lp_clustering" => Ok(MatchingType::LpClustering),
            "simple_clustering" => Ok(MatchingType::SimpleClustering),
            "low_diameter" => Ok(MatchingType::LowDiameter),
            other => Err(Error::UnsupportedMatching(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRuleType {
    SimpleFixed,
}

impl FromStr for StopRuleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple-fix" => Ok(StopRuleType::SimpleFixed),
            other => Err(Error::UnsupportedStopRule(other.to_string())),
        }
    }
}

/// How the scratch rating of an edge `(u, v)` with weight `w` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRatingType {
    /// `w`
    Weight,
    /// `w / (c(u) + c(v))`
    Expansion,
    /// `w / (c(u) * c(v))`
    ExpansionStar,
    /// `w^2 / (c(u) * c(v))`
    ExpansionStar2,
}

impl FromStr for EdgeRatingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(EdgeRatingType::Weight),
            "expansion" => Ok(EdgeRatingType::Expansion),
            "expansion_star" => Ok(EdgeRatingType::ExpansionStar),
            "expansion_star2" => Ok(EdgeRatingType::ExpansionStar2),
            other => Err(Error::UnsupportedEdgeRating(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOrderingType {
    Random,
    /// Random order, then stable sorted by increasing degree.
    Degree,
}

impl FromStr for NodeOrderingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(NodeOrderingType::Random),
            "degree" => Ok(NodeOrderingType::Degree),
            other => Err(Error::UnsupportedNodeOrdering(other.to_string())),
        }
    }
}

/// Configuration of one coarsening run.
#[derive(Debug, Clone)]
pub struct CoarseningConfig {
    /// Matching or clustering algorithm used per level.
    pub matching_type: MatchingType,

    pub stop_rule: StopRuleType,

    pub edge_rating: EdgeRatingType,

    /// Node visiting order of label propagation and path growing.
    pub node_ordering: NodeOrderingType,

    /// Number of leading levels coarsened with random matching under `RandomGpa`.
    pub aggressive_random_levels: u32,

    /// Coarsening stops once a level has fewer nodes than this.
    pub fix_num_vert_stop: usize,

    /// Weight bound of a block; label propagation clusters stay below
    /// `ceil(upper_bound_partition / cluster_coarsening_factor)`.
    pub upper_bound_partition: NodeWeight,

    /// Maximum number of fine nodes in one cluster.
    pub cluster_upperbound: usize,

    pub cluster_coarsening_factor: u32,

    /// Number of label propagation sweeps.
    pub label_iterations: u32,

    /// Merge several label propagation runs into one clustering.
    pub ensemble_clusterings: bool,

    pub number_of_clusterings: u32,

    /// Only nodes with equal secondary partition index may end up in the same coarse node.
    pub combine: bool,

    /// Hop diameter bound of low diameter clusters.
    pub diameter_upperbound: f64,

    /// Rate of the exponential shifts drawn by low diameter clustering.
    pub beta: f64,

    /// Floor applied to the feature distance before it is inverted into a
    /// quotient edge weight.
    pub min_feature_distance: f64,

    pub seed: u64,
}

impl Default for CoarseningConfig {
    fn default() -> Self {
        CoarseningConfig {
            matching_type: MatchingType::LpClustering,
            stop_rule: StopRuleType::SimpleFixed,
            edge_rating: EdgeRatingType::Weight,
            node_ordering: NodeOrderingType::Degree,
            aggressive_random_levels: 3,
            fix_num_vert_stop: 500,
            upper_bound_partition: NodeWeight::MAX / 2,
            cluster_upperbound: usize::MAX / 2,
            cluster_coarsening_factor: 1,
            label_iterations: 10,
            ensemble_clusterings: false,
            number_of_clusterings: 1,
            combine: false,
            diameter_upperbound: 20.0,
            beta: 0.4,
            min_feature_distance: 1e-6,
            seed: 0,
        }
    }
}

impl CoarseningConfig {
    /// Checks the numeric parameters a coarsening run divides by or bounds with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.cluster_coarsening_factor == 0 {
            return Err(Error::InvalidParameter("cluster_coarsening_factor must be positive"));
        }
        if self.cluster_upperbound == 0 {
            return Err(Error::InvalidParameter("cluster_upperbound must be positive"));
        }
        if self.upper_bound_partition <= 0 {
            return Err(Error::InvalidParameter("upper_bound_partition must be positive"));
        }
        if self.ensemble_clusterings && self.number_of_clusterings == 0 {
            return Err(Error::InvalidParameter("number_of_clusterings must be positive"));
        }
        if !(self.beta > 0.0) {
            return Err(Error::InvalidParameter("beta must be positive"));
        }
        if !(self.diameter_upperbound > 0.0) {
            return Err(Error::InvalidParameter("diameter_upperbound must be positive"));
        }
        if !(self.min_feature_distance > 0.0) {
            return Err(Error::InvalidParameter("min_feature_distance must be positive"));
        }
        Ok(())
    }
}
