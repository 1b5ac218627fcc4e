//! Unbounded archive of mutually non-dominated solutions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{is_rejected, purge_dominated, Archive};
use crate::{
  dominance::{DominanceComparator, ParetoDominanceComparator},
  population::Population,
  solution::Solution,
};

/// How an archive treats an entrant whose objectives equal a member's.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DuplicateMode {
  /// Reject entrants within [`EPS`](crate::EPS) objective distance of a
  /// member.
  #[default]
  NoDuplicates,
  /// Accept such entrants.
  AllowDuplicates,
}

/// Unbounded archive keeping every non-dominated solution it was offered.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NondominatedArchive<V = (), C = ParetoDominanceComparator> {
  solutions: Population<V>,
  comparator: C,
  duplicate_mode: DuplicateMode,
}

impl<V> Default for NondominatedArchive<V> {
  fn default() -> Self {
    Self::with_comparator(ParetoDominanceComparator)
  }
}

impl<V> NondominatedArchive<V> {
  /// Creates an empty archive using [`ParetoDominanceComparator`].
  pub fn new() -> Self {
    Self::default()
  }
}

impl<V, C> NondominatedArchive<V, C> {
  /// Creates an empty archive using a custom comparator.
  pub fn with_comparator(comparator: C) -> Self {
    Self {
      solutions: Population::new(),
      comparator,
      duplicate_mode: DuplicateMode::default(),
    }
  }

  /// Sets duplicate handling.
  pub fn with_duplicate_mode(mut self, duplicate_mode: DuplicateMode) -> Self {
    self.duplicate_mode = duplicate_mode;
    self
  }

  /// Returns duplicate handling.
  pub fn duplicate_mode(&self) -> DuplicateMode {
    self.duplicate_mode
  }

  /// Moves members out of the archive.
  pub fn into_population(self) -> Population<V> {
    self.solutions
  }
}

impl<V, C> Archive<V> for NondominatedArchive<V, C>
where
  C: DominanceComparator<V>,
{
  fn add(&mut self, solution: Solution<V>) -> bool {
    if solution.has_undefined_objectives()
      || is_rejected(
        &self.comparator,
        &self.solutions,
        &solution,
        self.duplicate_mode,
      )
    {
      return false;
    }
    purge_dominated(&self.comparator, &mut self.solutions, &solution);
    self.solutions.push(solution);
    true
  }

  fn solutions(&self) -> &[Solution<V>] {
    &self.solutions
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_keeps_nondominated() {
    let mut archive = NondominatedArchive::new();
    assert!(archive.add(Solution::of([2.0, 2.0])));
    assert!(archive.add(Solution::of([1.0, 3.0])));
    assert!(!archive.add(Solution::of([3.0, 3.0])));
    assert!(archive.add(Solution::of([1.0, 1.0])));
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.solutions()[0].objectives(), &[1.0, 1.0]);
  }

  #[test]
  fn test_duplicates() {
    let mut archive = NondominatedArchive::new();
    assert!(archive.add(Solution::of([1.0, 2.0])));
    assert!(!archive.add(Solution::of([1.0, 2.0])));

    let mut archive = NondominatedArchive::new()
      .with_duplicate_mode(DuplicateMode::AllowDuplicates);
    assert!(archive.add(Solution::of([1.0, 2.0])));
    assert!(archive.add(Solution::of([1.0, 2.0])));
    assert_eq!(archive.len(), 2);
  }

  #[test]
  fn test_undefined_objectives_are_rejected() {
    let mut archive = NondominatedArchive::new();
    assert!(!archive.add(Solution::of([f64::NAN, 0.0])));
    assert!(archive.is_empty());
  }

  #[test]
  fn test_feasible_replaces_infeasible() {
    let mut archive = NondominatedArchive::new();
    assert!(archive.add(Solution::of([0.0, 0.0]).with_constraints([1.0])));
    assert!(archive.add(Solution::of([5.0, 5.0])));
    assert_eq!(archive.len(), 1);
    assert!(archive.solutions()[0].is_feasible());
  }
}
