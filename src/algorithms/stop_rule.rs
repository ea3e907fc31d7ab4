use crate::algorithms::Error;
use crate::config::{CoarseningConfig, StopRuleType};

/// Contraction rate below which another level is not worth building.
const MIN_CONTRACTION_RATE: f64 = 1.05;

/// Termination predicate of the coarsening loop.
pub trait StopRule {
    /// Whether coarsening should go on after a level shrank from
    /// `no_of_finer_vertices` to `no_of_coarser_vertices`.
    fn should_continue(&self, no_of_finer_vertices: usize, no_of_coarser_vertices: usize) -> bool;
}

/// Keep coarsening while levels shrink by at least 5% and the coarser level still
/// has at least `num_stop` nodes.
#[derive(Debug, Clone, Copy)]
pub struct SimpleFixedStopRule {
    pub num_stop: usize,
}

impl SimpleFixedStopRule {
    pub fn from_config(config: &CoarseningConfig) -> Result<Self, Error> {
        match config.stop_rule {
            StopRuleType::SimpleFixed => Ok(SimpleFixedStopRule { num_stop: config.fix_num_vert_stop }),
        }
    }
}

impl StopRule for SimpleFixedStopRule {
    fn should_continue(&self, no_of_finer_vertices: usize, no_of_coarser_vertices: usize) -> bool {
        if no_of_coarser_vertices == 0 {
            return false;
        }
        let contraction_rate = no_of_finer_vertices as f64 / no_of_coarser_vertices as f64;
        contraction_rate >= MIN_CONTRACTION_RATE && no_of_coarser_vertices >= self.num_stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_fixed_stop_rule() {
        // Arrange
        let rule = SimpleFixedStopRule { num_stop: 100 };

        // Act & Assert
        // first level: nothing coarsened yet
        assert!(rule.should_continue(usize::MAX, 1000));
        assert!(rule.should_continue(1000, 500));
        // below the size target
        assert!(!rule.should_continue(200, 99));
        // shrinking by less than 5%
        assert!(!rule.should_continue(1000, 990));
        assert!(rule.should_continue(1050, 1000));
        assert!(!rule.should_continue(10, 0));
    }

    #[test]
    fn test_from_config() {
        let config = CoarseningConfig { fix_num_vert_stop: 42, ..Default::default() };

        let rule = SimpleFixedStopRule::from_config(&config).unwrap();

        assert_eq!(rule.num_stop, 42);
    }
}
