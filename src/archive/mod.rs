//! Elite archives that persist good solutions across generations.
//!
//! Every archive refuses solutions with undefined (NaN) objectives and keeps
//! its members mutually non-dominated.

pub mod adaptive_grid;
pub mod epsilon;
pub mod nondominated;

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
  dominance::DominanceComparator,
  population::Population,
  solution::{objective_distance, Solution},
  EPS,
};
pub use nondominated::DuplicateMode;

/// A collection of solutions maintained under an acceptance policy.
pub trait Archive<V> {
  /// Offers `solution` to the archive. Returns `true` if it was accepted.
  fn add(&mut self, solution: Solution<V>) -> bool;

  /// Returns archive members.
  fn solutions(&self) -> &[Solution<V>];

  /// Returns the number of members.
  fn len(&self) -> usize {
    self.solutions().len()
  }

  /// Returns `true` if the archive has no members.
  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Offers every solution in turn and returns how many were accepted.
  fn add_all(
    &mut self,
    solutions: impl IntoIterator<Item = Solution<V>>,
  ) -> usize
  where
    Self: Sized,
  {
    solutions
      .into_iter()
      .map(|s| self.add(s))
      .filter(|accepted| *accepted)
      .count()
  }
}

/// An archive that accepts nothing, for algorithms that keep no elite set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoArchive;

impl<V> Archive<V> for NoArchive {
  fn add(&mut self, _solution: Solution<V>) -> bool {
    false
  }

  fn solutions(&self) -> &[Solution<V>] {
    &[]
  }
}

/// Returns `true` if some member dominates `entrant` or, unless duplicates
/// are allowed, duplicates its objectives.
pub(crate) fn is_rejected<V, C>(
  comparator: &C,
  members: &[Solution<V>],
  entrant: &Solution<V>,
  duplicate_mode: DuplicateMode,
) -> bool
where
  C: DominanceComparator<V>,
{
  members.iter().any(|member| match comparator.compare(entrant, member) {
    Ordering::Greater => true,
    Ordering::Equal => {
      duplicate_mode == DuplicateMode::NoDuplicates
        && objective_distance(entrant, member) < EPS
    }
    Ordering::Less => false,
  })
}

/// Removes members dominated by `entrant` and returns them.
pub(crate) fn purge_dominated<V, C>(
  comparator: &C,
  members: &mut Population<V>,
  entrant: &Solution<V>,
) -> Vec<Solution<V>>
where
  C: DominanceComparator<V>,
{
  let mut purged = Vec::new();
  let mut idx = 0;
  while idx < members.len() {
    if comparator.compare(entrant, &members[idx]) == Ordering::Less {
      purged.push(members.remove(idx));
    } else {
      idx += 1;
    }
  }
  purged
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dominance::ParetoDominanceComparator;

  #[test]
  fn test_no_archive() {
    let mut archive = NoArchive;
    assert!(!archive.add(Solution::of([1.0])));
    assert_eq!(Archive::<()>::len(&archive), 0);
    assert_eq!(archive.add_all([Solution::of([1.0]), Solution::of([2.0])]), 0);
  }

  #[test]
  fn test_rejection_and_purge() {
    let c = ParetoDominanceComparator;
    let mut members: Population = [[1.0, 4.0], [3.0, 3.0], [4.0, 1.0]]
      .into_iter()
      .map(Solution::of)
      .collect();

    let dominated = Solution::of([5.0, 5.0]);
    let duplicate = Solution::of([3.0, 3.0]);
    let strict = DuplicateMode::NoDuplicates;
    assert!(is_rejected(&c, &members, &dominated, strict));
    assert!(is_rejected(&c, &members, &duplicate, strict));
    let lenient = DuplicateMode::AllowDuplicates;
    assert!(!is_rejected(&c, &members, &duplicate, lenient));

    let entrant = Solution::of([2.0, 2.0]);
    assert!(!is_rejected(&c, &members, &entrant, DuplicateMode::NoDuplicates));
    let purged = purge_dominated(&c, &mut members, &entrant);
    assert_eq!(purged.len(), 1);
    assert_eq!(purged[0].objectives(), &[3.0, 3.0]);
    assert_eq!(members.len(), 2);
  }
}
