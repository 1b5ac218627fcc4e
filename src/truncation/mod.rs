//! Survivor selection: reducing an oversized population to a target size.

pub mod crowding;
pub mod reference_point;
pub mod reference_vector;

use rand::Rng;

use crate::{error::Result, population::Population, solution::Solution};

/// A strategy that reduces a population to at most `size` solutions.
///
/// Implementations rank the population themselves and leave their
/// annotations on the survivors.
pub trait Truncation<V> {
  /// Returns at most `size` solutions of `population`. Rank based
  /// truncations keep a population of at most `size` solutions whole.
  ///
  /// # Errors
  ///
  /// Returns an error if solutions disagree on the number of objectives.
  fn truncate<R: Rng>(
    &mut self,
    population: Population<V>,
    size: usize,
    rng: &mut R,
  ) -> Result<Population<V>>;
}

/// Moves solutions at `indices` out of `solutions`, in the order of
/// `indices`. Repeated indices are taken once.
pub(crate) fn take_indices<V>(
  solutions: Vec<Solution<V>>,
  indices: impl IntoIterator<Item = usize>,
) -> Population<V> {
  let mut some_solutions: Vec<_> = solutions.into_iter().map(Some).collect();
  indices
    .into_iter()
    .filter_map(|idx| some_solutions.get_mut(idx).and_then(Option::take))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_take_indices() {
    let solutions: Vec<_> = (0..5).map(|i| Solution::of([i as f64])).collect();
    let taken = take_indices(solutions, [3, 1, 3, 9]);
    let objectives: Vec<_> = taken.iter().map(|s| s.objective(0)).collect();
    assert_eq!(objectives, vec![3.0, 1.0]);
  }
}
