//! NSGA-II survivor selection by rank, then crowding distance.

use itertools::Itertools;
use log::trace;
use rand::Rng;

use super::{take_indices, Truncation};
use crate::{
  dominance::{DominanceComparator, ParetoDominanceComparator},
  error::Result,
  population::Population,
  sorting::{assign_front_crowding, rank_then_crowding, NondominatedSorting},
};

/// Keeps the best ranked solutions, breaking ties within the critical front
/// by crowding distance.
///
/// In pruning mode the least crowded member of the critical front is removed
/// one at a time and crowding is recomputed after every removal, which keeps
/// survivors better spread at the cost of `O(K^2)` crowding passes.
#[derive(Clone, Copy, Debug, Default)]
pub struct CrowdingTruncation<C = ParetoDominanceComparator> {
  sorting: NondominatedSorting<C>,
  pruning: bool,
}

impl CrowdingTruncation {
  /// Creates truncation that cuts the sorted population at once.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates truncation that prunes the critical front iteratively.
  pub fn pruning() -> Self {
    Self {
      sorting: NondominatedSorting::new(),
      pruning: true,
    }
  }
}

impl<C> CrowdingTruncation<C> {
  /// Replaces the dominance comparator used for ranking.
  pub fn with_comparator<D>(self, comparator: D) -> CrowdingTruncation<D> {
    CrowdingTruncation {
      sorting: NondominatedSorting::with_comparator(comparator),
      pruning: self.pruning,
    }
  }

  /// Returns `true` in pruning mode.
  pub fn is_pruning(&self) -> bool {
    self.pruning
  }
}

impl<V, C> Truncation<V> for CrowdingTruncation<C>
where
  C: DominanceComparator<V>,
{
  fn truncate<R: Rng>(
    &mut self,
    population: Population<V>,
    size: usize,
    _rng: &mut R,
  ) -> Result<Population<V>> {
    if let Some(objective_num) = population.number_of_objectives() {
      population.check_objectives(objective_num)?;
    }

    let mut solutions = population.into_vec();
    let fronts = self.sorting.evaluate(&mut solutions);

    let mut selected: Vec<usize> = if self.pruning {
      let mut selected = Vec::with_capacity(size.min(solutions.len()));
      for front in fronts {
        if selected.len() + front.len() <= size {
          selected.extend(front);
          continue;
        }
        let mut critical = front;
        while selected.len() + critical.len() > size {
          assign_front_crowding(&mut solutions, &critical);
          let key =
            |idx: usize| solutions[idx].crowding_distance().unwrap_or(0.0);
          let Some(worst) = critical
            .iter()
            .position_min_by(|&&a, &&b| key(a).total_cmp(&key(b)))
          else {
            break;
          };
          trace!("pruning {} from the critical front", critical[worst]);
          critical.remove(worst);
        }
        assign_front_crowding(&mut solutions, &critical);
        selected.extend(critical);
        break;
      }
      selected
    } else {
      (0..solutions.len()).collect()
    };

    // stable, so equally good solutions keep population order
    selected.sort_by(|&a, &b| rank_then_crowding(&solutions[a], &solutions[b]));
    selected.truncate(size);

    Ok(take_indices(solutions, selected))
  }
}
