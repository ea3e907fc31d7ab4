//! Multilevel graph hierarchies for support vector refinement.
//!
//! A feature graph is coarsened level by level (matching or clustering, then
//! contraction) into a [`Hierarchy`]; classifier support found on a coarse level is
//! then projected back down level by level, re-materialising only the fine nodes below
//! it ([`uncoarsening`]).
pub mod algorithms;
pub mod config;
pub mod graph;
pub mod hierarchy;
pub mod imbalance;
pub mod io;
pub mod uncoarsening;

pub use algorithms::{build_hierarchy, build_hierarchy_with_rng, CoarseMapping, Error};
pub use config::CoarseningConfig;
pub use graph::Graph;
pub use hierarchy::Hierarchy;
pub use uncoarsening::{uncoarsen_support, MultilevelRefinement, SelectiveUncoarsener, SupportOracle, SupportVectors};
