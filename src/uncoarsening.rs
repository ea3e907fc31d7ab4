use log::trace;
use rustc_hash::FxHashSet;

use crate::algorithms::{CoarseMapping, Error};
use crate::graph::{FeatureVec, Graph, NodeId};
use crate::hierarchy::Hierarchy;

/// One feature vector per data row.
pub type DataRows = Vec<FeatureVec>;

/// Translates the support rows of a coarse level onto the next finer level.
///
/// `support` holds row indices of the coarse level's data; `data_mapping` maps those
/// rows to coarse node ids. Every node of `graph` (the finer level) whose coarse node
/// is a support node becomes a new data row. Returns the new rows and the new data
/// mapping, both in node order.
pub fn uncoarsen_support(
    graph: &Graph,
    coarse_mapping: &CoarseMapping,
    support: &[usize],
    data_mapping: &[NodeId],
) -> Result<(DataRows, Vec<NodeId>), Error> {
    if coarse_mapping.len() != graph.number_of_nodes() {
        return Err(Error::InputLenMismatch {
            expected: graph.number_of_nodes(),
            actual: coarse_mapping.len(),
        });
    }

    let mut support_set: FxHashSet<NodeId> = FxHashSet::default();
    support_set.reserve(support.len());
    for &index in support {
        let coarse_node = data_mapping.get(index).ok_or(Error::SupportOutOfRange {
            index,
            len: data_mapping.len(),
        })?;
        support_set.insert(*coarse_node);
    }

    let new_data_mapping: Vec<NodeId> = graph
        .nodes()
        .filter(|&node| support_set.contains(&coarse_mapping[node]))
        .collect();
    let new_rows: DataRows = new_data_mapping
        .iter()
        .map(|&node| graph.feature_vec(node).clone())
        .collect();

    trace!(
        "uncoarsened nodes {} support {} resulting rows {}",
        graph.number_of_nodes(),
        support.len(),
        new_rows.len()
    );
    Ok((new_rows, new_data_mapping))
}

/// Data mapping of one side of a multilevel refinement.
#[derive(Debug, Clone)]
pub struct SelectiveUncoarsener {
    data_mapping: Vec<NodeId>,
}

impl SelectiveUncoarsener {
    /// At the coarsest level every node is its own data row.
    pub fn new(coarsest: &Graph) -> Self {
        SelectiveUncoarsener {
            data_mapping: coarsest.nodes().collect(),
        }
    }

    /// Node id of every current data row.
    pub fn data_mapping(&self) -> &[NodeId] {
        &self.data_mapping
    }

    /// Moves to `finer`, keeping only the nodes below the support rows.
    pub fn uncoarsen(&mut self, finer: &Graph, coarse_mapping: &CoarseMapping, support: &[usize]) -> Result<DataRows, Error> {
        let (rows, data_mapping) = uncoarsen_support(finer, coarse_mapping, support, &self.data_mapping)?;
        self.data_mapping = data_mapping;
        Ok(rows)
    }
}

/// Support rows reported by a classifier, as indices into the rows it was trained on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportVectors {
    pub min: Vec<usize>,
    pub maj: Vec<usize>,
}

/// The classifier trained on every level of a refinement.
pub trait SupportOracle {
    fn train(&mut self, min_rows: &[FeatureVec], maj_rows: &[FeatureVec]) -> Result<SupportVectors, Error>;
}

/// Declares every row a support row, which makes the refinement re-materialise each
/// level completely.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullSupport;

impl SupportOracle for FullSupport {
    fn train(&mut self, min_rows: &[FeatureVec], maj_rows: &[FeatureVec]) -> Result<SupportVectors, Error> {
        Ok(SupportVectors {
            min: (0..min_rows.len()).collect(),
            maj: (0..maj_rows.len()).collect(),
        })
    }
}

/// Walks a minority and a majority hierarchy down together, keeping only the data
/// below the support rows of the previous level.
#[derive(Debug)]
pub struct MultilevelRefinement {
    min_hierarchy: Hierarchy,
    maj_hierarchy: Hierarchy,
    min_uncoarsener: SelectiveUncoarsener,
    maj_uncoarsener: SelectiveUncoarsener,
    min_rows: DataRows,
    maj_rows: DataRows,
}

impl MultilevelRefinement {
    /// Starts at the current level of both hierarchies with all of their nodes as data.
    pub fn new(min_hierarchy: Hierarchy, maj_hierarchy: Hierarchy) -> Self {
        let min_rows = min_hierarchy.current().feature_rows();
        let maj_rows = maj_hierarchy.current().feature_rows();
        MultilevelRefinement {
            min_uncoarsener: SelectiveUncoarsener::new(min_hierarchy.current()),
            maj_uncoarsener: SelectiveUncoarsener::new(maj_hierarchy.current()),
            min_hierarchy,
            maj_hierarchy,
            min_rows,
            maj_rows,
        }
    }

    pub fn is_done(&self) -> bool {
        self.min_hierarchy.is_empty() && self.maj_hierarchy.is_empty()
    }

    /// Levels left on the deeper side.
    pub fn level(&self) -> usize {
        self.min_hierarchy.size().max(self.maj_hierarchy.size())
    }

    /// One step down. The minority side waits until the majority side is no deeper
    /// than it is.
    pub fn uncoarsen(&mut self, sv_min: &[usize], sv_maj: &[usize]) -> Result<(), Error> {
        if !self.min_hierarchy.is_empty() && self.min_hierarchy.size() >= self.maj_hierarchy.size() {
            let (finer, mapping) = self.min_hierarchy.pop_finer_and_project()?;
            self.min_rows = self.min_uncoarsener.uncoarsen(finer, mapping, sv_min)?;
            trace!("minority uncoarsened to {} rows", self.min_rows.len());
        }
        if !self.maj_hierarchy.is_empty() {
            let (finer, mapping) = self.maj_hierarchy.pop_finer_and_project()?;
            self.maj_rows = self.maj_uncoarsener.uncoarsen(finer, mapping, sv_maj)?;
            trace!("majority uncoarsened to {} rows", self.maj_rows.len());
        }
        Ok(())
    }

    /// Trains on every level from the current one down to the finest and returns the
    /// support rows of the last training.
    pub fn refine<O: SupportOracle>(&mut self, oracle: &mut O) -> Result<SupportVectors, Error> {
        loop {
            let support = oracle.train(&self.min_rows, &self.maj_rows)?;
            if self.is_done() {
                return Ok(support);
            }
            self.uncoarsen(&support.min, &support.maj)?;
        }
    }

    pub fn min_rows(&self) -> &[FeatureVec] {
        &self.min_rows
    }

    pub fn maj_rows(&self) -> &[FeatureVec] {
        &self.maj_rows
    }

    pub fn min_data_mapping(&self) -> &[NodeId] {
        self.min_uncoarsener.data_mapping()
    }

    pub fn maj_data_mapping(&self) -> &[NodeId] {
        self.maj_uncoarsener.data_mapping()
    }

    pub fn min_hierarchy(&self) -> &Hierarchy {
        &self.min_hierarchy
    }

    pub fn maj_hierarchy(&self) -> &Hierarchy {
        &self.maj_hierarchy
    }
}
