use crate::algorithms::{CoarseMapping, Error};
use crate::graph::Graph;

/// The levels of one coarsening run, finest first, and the coarse mapping between
/// every two consecutive levels.
///
/// Levels are owned by the hierarchy; walking down with
/// [`pop_finer_and_project`](Hierarchy::pop_finer_and_project) moves a cursor
/// instead of dropping graphs, so every level stays inspectable.
///
/// ```
/// use graph_hierarchy::graph::Graph;
/// use graph_hierarchy::hierarchy::Hierarchy;
///
/// let finest = Graph::from_adjacency(&[vec![(1, 1.0)], vec![(0, 1.0)]]);
/// let coarse = Graph::from_adjacency(&[vec![]]);
///
/// let mut hierarchy = Hierarchy::new(finest);
/// hierarchy.push(vec![0, 0], coarse).unwrap();
/// assert_eq!(hierarchy.size(), 1);
///
/// let (finer, mapping) = hierarchy.pop_finer_and_project().unwrap();
/// assert_eq!(finer.number_of_nodes(), 2);
/// assert_eq!(mapping, &vec![0, 0]);
/// assert!(hierarchy.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Hierarchy {
    levels: Vec<Graph>,
    // mappings[i] maps the nodes of levels[i] onto levels[i + 1]
    mappings: Vec<CoarseMapping>,
    cursor: usize,
}

impl Hierarchy {
    pub fn new(finest: Graph) -> Self {
        Hierarchy {
            levels: vec![finest],
            mappings: Vec::new(),
            cursor: 0,
        }
    }

    /// Appends `coarser` as the new coarsest level; `mapping` maps the nodes of the
    /// previous coarsest level onto it.
    pub fn push(&mut self, mapping: CoarseMapping, coarser: Graph) -> Result<(), Error> {
        let finer = self.coarsest();
        if mapping.len() != finer.number_of_nodes() {
            return Err(Error::InputLenMismatch {
                expected: finer.number_of_nodes(),
                actual: mapping.len(),
            });
        }
        if let Some(&coarse_node) = mapping.iter().find(|&&coarse_node| coarse_node >= coarser.number_of_nodes()) {
            return Err(Error::NonDenseMapping {
                coarse_node,
                reason: "out of range",
            });
        }

        self.mappings.push(mapping);
        self.levels.push(coarser);
        self.cursor = self.levels.len() - 1;
        debug_assert_eq!(self.levels.len(), self.mappings.len() + 1);
        Ok(())
    }

    /// Moves one level down: copies the partition index of every coarse node onto
    /// the fine nodes mapped to it, and returns the finer level together with the
    /// mapping that was used.
    pub fn pop_finer_and_project(&mut self) -> Result<(&Graph, &CoarseMapping), Error> {
        if self.cursor == 0 {
            return Err(Error::HierarchyExhausted);
        }
        let finer_index = self.cursor - 1;
        let (finer_levels, coarser_levels) = self.levels.split_at_mut(self.cursor);
        let finer = &mut finer_levels[finer_index];
        let coarser = &coarser_levels[0];
        let mapping = &self.mappings[finer_index];

        for node in finer.nodes() {
            finer.set_partition_index(node, coarser.partition_index(mapping[node]));
        }
        finer.set_partition_count(coarser.partition_count());

        self.cursor = finer_index;
        Ok((&self.levels[finer_index], &self.mappings[finer_index]))
    }

    /// Number of levels below the current one.
    pub fn size(&self) -> usize {
        self.cursor
    }

    /// Whether the current level is the finest one.
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn number_of_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn coarsest(&self) -> &Graph {
        &self.levels[self.levels.len() - 1]
    }

    pub(crate) fn coarsest_mut(&mut self) -> &mut Graph {
        let last = self.levels.len() - 1;
        &mut self.levels[last]
    }

    pub fn finest(&self) -> &Graph {
        &self.levels[0]
    }

    /// The level the cursor is on.
    pub fn current(&self) -> &Graph {
        &self.levels[self.cursor]
    }

    /// The mapping from the level below the cursor onto the current level.
    pub fn mapping_of_current_finer(&self) -> Option<&CoarseMapping> {
        self.cursor.checked_sub(1).map(|finer| &self.mappings[finer])
    }

    /// Level `i`, 0 being the finest.
    pub fn level(&self, i: usize) -> Option<&Graph> {
        self.levels.get(i)
    }

    /// Mapping from level `i` onto level `i + 1`.
    pub fn mapping(&self, i: usize) -> Option<&CoarseMapping> {
        self.mappings.get(i)
    }
}

#[cfg(test)]
mod tests {
    use itertools::assert_equal;
    use super::*;

    fn path(n: usize) -> Graph {
        let mut adjacency = vec![Vec::new(); n];
        for node in 0..n - 1 {
            adjacency[node].push((node + 1, 1.0));
            adjacency[node + 1].push((node, 1.0));
        }
        Graph::from_adjacency(&adjacency)
    }

    fn three_levels() -> Hierarchy {
        let mut hierarchy = Hierarchy::new(path(6));
        hierarchy.push(vec![0, 0, 1, 1, 2, 2], path(3)).unwrap();
        hierarchy.push(vec![0, 0, 1], path(2)).unwrap();
        hierarchy
    }

    #[test]
    fn test_push_tracks_levels() {
        // Arrange & Act
        let hierarchy = three_levels();

        // Assert
        assert_eq!(hierarchy.number_of_levels(), 3);
        assert_eq!(hierarchy.size(), 2);
        assert_eq!(hierarchy.coarsest().number_of_nodes(), 2);
        assert_eq!(hierarchy.finest().number_of_nodes(), 6);
        assert_eq!(hierarchy.current().number_of_nodes(), 2);
        assert_eq!(hierarchy.mapping_of_current_finer(), Some(&vec![0, 0, 1]));
        assert_eq!(hierarchy.mapping(0).map(Vec::len), Some(6));
        assert!(hierarchy.level(3).is_none());
    }

    #[test]
    fn test_push_rejects_bad_mappings() {
        let mut hierarchy = Hierarchy::new(path(4));

        assert!(matches!(
            hierarchy.push(vec![0, 0, 1], path(2)),
            Err(Error::InputLenMismatch { expected: 4, actual: 3 })
        ));
        assert!(matches!(
            hierarchy.push(vec![0, 0, 1, 2], path(2)),
            Err(Error::NonDenseMapping { coarse_node: 2, .. })
        ));
        assert_eq!(hierarchy.number_of_levels(), 1);
    }

    #[test]
    fn test_projection_round_trips_identity_labels() {
        // Arrange
        let mut hierarchy = Hierarchy::new(path(4));
        let mut coarse = path(2);
        coarse.set_partition_index(0, 0);
        coarse.set_partition_index(1, 1);
        coarse.set_partition_count(2);
        hierarchy.push(vec![0, 0, 1, 1], coarse).unwrap();

        // Act
        let (finer, mapping) = hierarchy.pop_finer_and_project().unwrap();

        // Assert
        assert_equal(finer.nodes().map(|node| finer.partition_index(node)), mapping.iter().copied());
        assert_eq!(finer.partition_count(), 2);
    }

    #[test]
    fn test_pop_walks_down_to_the_finest_level() {
        // Arrange
        let mut hierarchy = three_levels();
        hierarchy.coarsest_mut().set_partition_index(1, 5);

        // Act
        let first_level = hierarchy.pop_finer_and_project().unwrap().0.number_of_nodes();
        let second_level = hierarchy.pop_finer_and_project().unwrap().0.number_of_nodes();
        let exhausted = hierarchy.pop_finer_and_project();

        // Assert
        assert_eq!((first_level, second_level), (3, 6));
        assert!(matches!(exhausted, Err(Error::HierarchyExhausted)));
        assert!(hierarchy.is_empty());
        let finest = hierarchy.finest();
        assert_equal(finest.nodes().map(|node| finest.partition_index(node)), [0, 0, 0, 0, 5, 5]);
    }
}
