//! Pareto dominance and constraint-aware comparators.
//!
//! Every comparator returns an [`Ordering`]: `Less` if the first solution
//! dominates the second one, `Greater` if it is dominated, otherwise `Equal`.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::solution::Solution;

/// Describes pareto dominance for objective vectors.
pub trait ParetoDominance {
  /// Returns `Less` if `self` dominates `other`, `Greater` if `other`
  /// dominates `self`, otherwise `Equal`. `self` dominates `other` if no
  /// value of `self` is greater than the respective `other` value and at
  /// least one is smaller. Incomparable values (NaN) make the vectors
  /// mutually non-dominated.
  fn dominance(&self, other: &Self) -> Ordering;
}

impl ParetoDominance for [f64] {
  fn dominance(&self, other: &Self) -> Ordering {
    let mut ord = Ordering::Equal;
    for (a, b) in self.iter().zip(other) {
      let Some(next_ord) = a.partial_cmp(b) else {
        return Ordering::Equal;
      };
      match (ord, next_ord) {
        (Ordering::Equal, next_ord) => ord = next_ord,
        (Ordering::Greater, Ordering::Less)
        | (Ordering::Less, Ordering::Greater) => return Ordering::Equal,
        _ => {}
      }
    }
    ord
  }
}

impl ParetoDominance for [i64] {
  fn dominance(&self, other: &Self) -> Ordering {
    let mut ord = Ordering::Equal;
    for (a, b) in self.iter().zip(other) {
      match (ord, a.cmp(b)) {
        (Ordering::Equal, next_ord) => ord = next_ord,
        (Ordering::Greater, Ordering::Less)
        | (Ordering::Less, Ordering::Greater) => return Ordering::Equal,
        _ => {}
      }
    }
    ord
  }
}

/// Compares two solutions by dominance.
///
/// Implemented for closures of type `Fn(&Solution<V>, &Solution<V>) ->
/// Ordering` as well, so a custom relation needs no new type.
pub trait DominanceComparator<V> {
  /// Returns `Less` if `a` dominates `b`, `Greater` if `b` dominates `a`,
  /// otherwise `Equal`.
  fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering;
}

impl<V, F> DominanceComparator<V> for F
where
  F: Fn(&Solution<V>, &Solution<V>) -> Ordering,
{
  fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
    self(a, b)
  }
}

/// Prefers feasible solutions, then solutions with a smaller sum of
/// absolute constraint violations. Two feasible solutions are `Equal`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AggregateConstraintComparator;

impl<V> DominanceComparator<V> for AggregateConstraintComparator {
  fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
    let (va, vb) = (a.aggregate_violation(), b.aggregate_violation());
    match (va == 0.0, vb == 0.0) {
      (true, true) => Ordering::Equal,
      (true, false) => Ordering::Less,
      (false, true) => Ordering::Greater,
      (false, false) => va.partial_cmp(&vb).unwrap_or(Ordering::Equal),
    }
  }
}

/// Plain Pareto dominance on objectives, constraints are ignored.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectiveDominanceComparator;

impl<V> DominanceComparator<V> for ObjectiveDominanceComparator {
  fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
    a.objectives().dominance(b.objectives())
  }
}

/// The default comparator of the crate. If either solution violates
/// constraints and their aggregate violations differ, the one with the
/// smaller violation wins without looking at objectives. Otherwise solutions
/// are compared by Pareto dominance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParetoDominanceComparator;

impl<V> DominanceComparator<V> for ParetoDominanceComparator {
  fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
    AggregateConstraintComparator
      .compare(a, b)
      .then_with(|| ObjectiveDominanceComparator.compare(a, b))
  }
}

#[cfg(test)]
mod tests {
  use std::cmp::Ordering;

  use super::*;

  #[test]
  fn test_pareto_dominance() {
    assert_eq!([1.0, 2.0, 3.0].dominance(&[1.0, 2.0, 3.0]), Ordering::Equal);
    assert_eq!([1.0, 2.0, 3.0].dominance(&[3.0, 2.0, 1.0]), Ordering::Equal);
    assert_eq!(
      [-2.0, 1.0, 3.0].dominance(&[2.0, -1.0, -3.0]),
      Ordering::Equal
    );

    assert_eq!(
      [10.0, 2.0, 3.0].dominance(&[1.0, 2.0, 3.0]),
      Ordering::Greater
    );
    assert_eq!(
      [1.0, 2.0, 30.0].dominance(&[1.0, 2.0, 3.0]),
      Ordering::Greater
    );

    assert_eq!([1.0, 2.0, 3.0].dominance(&[10.0, 2.0, 3.0]), Ordering::Less);
    assert_eq!(
      [-1.0, 2.0, -3.0].dominance(&[2.0, 2.0, 4.0]),
      Ordering::Less
    );

    assert_eq!([1.0f64; 0].dominance(&[0.0; 0]), Ordering::Equal);
  }

  #[test]
  fn test_pareto_dominance_with_nan() {
    assert_eq!([f64::NAN, 1.0].dominance(&[2.0, 2.0]), Ordering::Equal);
    assert_eq!([1.0, 1.0].dominance(&[2.0, f64::NAN]), Ordering::Equal);
  }

  #[test]
  fn test_box_dominance() {
    assert_eq!([0i64, 1].dominance(&[1, 1]), Ordering::Less);
    assert_eq!([0i64, 2].dominance(&[1, 1]), Ordering::Equal);
    assert_eq!([3i64, 3].dominance(&[1, 1]), Ordering::Greater);
  }

  #[test]
  fn test_constraints_take_precedence() {
    let feasible = Solution::of([5.0, 5.0]);
    let infeasible = Solution::of([0.0, 0.0]).with_constraints([1.0]);
    let c = ParetoDominanceComparator;
    assert_eq!(c.compare(&feasible, &infeasible), Ordering::Less);
    assert_eq!(c.compare(&infeasible, &feasible), Ordering::Greater);

    let less_violating = Solution::of([9.0, 9.0]).with_constraints([0.5]);
    assert_eq!(c.compare(&less_violating, &infeasible), Ordering::Less);
  }

  #[test]
  fn test_equal_violations_fall_back_to_objectives() {
    let a = Solution::of([1.0, 1.0]).with_constraints([1.0]);
    let b = Solution::of([2.0, 2.0]).with_constraints([-1.0]);
    assert_eq!(ParetoDominanceComparator.compare(&a, &b), Ordering::Less);
  }

  #[test]
  fn test_comparator_from_closure() {
    fn takes_comparator<C: DominanceComparator<()>>(c: &C) -> Ordering {
      c.compare(&Solution::of([1.0]), &Solution::of([2.0]))
    }
    let reversed =
      |a: &Solution, b: &Solution| ObjectiveDominanceComparator.compare(b, a);
    assert_eq!(takes_comparator(&reversed), Ordering::Greater);
    assert_eq!(takes_comparator(&ParetoDominanceComparator), Ordering::Less);
  }
}
