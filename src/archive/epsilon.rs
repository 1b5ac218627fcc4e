//! Epsilon-box dominance archive.
//!
//! Objective space is divided into boxes of size `epsilon_i` along each
//! objective. The archive keeps at most one solution per box, which bounds
//! its size while preserving spread along the Pareto front. The number of
//! accepted improvements serves as a convergence signal for restarts.

use std::cmp::Ordering;

use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Archive;
use crate::{
  dominance::{
    AggregateConstraintComparator,
    DominanceComparator,
    ParetoDominance,
  },
  error::{Error, Result},
  population::Population,
  solution::Solution,
};

/// Per-objective box sizes. Objectives past the last given value reuse it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<f64>"))]
pub struct Epsilons(Vec<f64>);

impl Epsilons {
  /// Creates box sizes from positive finite values.
  ///
  /// # Errors
  ///
  /// Returns an error if `values` is empty or any of them is not positive
  /// and finite.
  pub fn new(values: impl Into<Vec<f64>>) -> Result<Self> {
    let values = values.into();
    if values.is_empty() {
      return Err(Error::InvalidArgument("no epsilon values given".into()));
    }
    if let Some((objective, &value)) = values
      .iter()
      .enumerate()
      .find(|(_, v)| !(v.is_finite() && **v > 0.0))
    {
      return Err(Error::InvalidEpsilon { objective, value });
    }
    Ok(Self(values))
  }

  /// Creates the same box size for every objective.
  pub fn uniform(value: f64) -> Result<Self> {
    Self::new(vec![value])
  }

  /// Returns the box size of `objective`.
  pub fn get(&self, objective: usize) -> f64 {
    self.0[objective.min(self.0.len() - 1)]
  }

  /// Returns the coordinates of the box containing `objectives`.
  pub fn box_index(&self, objectives: &[f64]) -> Vec<i64> {
    objectives
      .iter()
      .enumerate()
      .map(|(i, o)| (o / self.get(i)).floor() as i64)
      .collect()
  }
}

impl TryFrom<Vec<f64>> for Epsilons {
  type Error = Error;

  fn try_from(values: Vec<f64>) -> Result<Self> {
    Self::new(values)
  }
}

/// Decides between two solutions sharing a box.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SameBoxPolicy {
  /// The entrant wins only if it Pareto-dominates the incumbent.
  #[default]
  Dominance,
  /// The solution closer to the lower corner of the box wins.
  CornerDistance,
}

/// Constraint-aware epsilon-box dominance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EpsilonBoxComparator {
  epsilons: Epsilons,
  policy: SameBoxPolicy,
}

impl EpsilonBoxComparator {
  /// Creates a comparator with [`SameBoxPolicy::Dominance`].
  pub fn new(epsilons: Epsilons) -> Self {
    Self {
      epsilons,
      policy: SameBoxPolicy::default(),
    }
  }

  /// Sets the same-box policy.
  pub fn with_policy(mut self, policy: SameBoxPolicy) -> Self {
    self.policy = policy;
    self
  }

  /// Returns box sizes.
  pub fn epsilons(&self) -> &Epsilons {
    &self.epsilons
  }

  /// Returns the same-box policy.
  pub fn policy(&self) -> SameBoxPolicy {
    self.policy
  }

  /// Compares `a` to `b`, also reporting whether both occupy the same box.
  ///
  /// Constraint violations are compared first. Then box coordinates are
  /// compared by Pareto dominance and, if the boxes are identical, the
  /// [`SameBoxPolicy`] decides. The box report does not depend on which of
  /// these steps decided.
  pub fn compare_boxes<V>(
    &self,
    a: &Solution<V>,
    b: &Solution<V>,
  ) -> (Ordering, bool) {
    let a_box = self.epsilons.box_index(a.objectives());
    let b_box = self.epsilons.box_index(b.objectives());
    let same_box = a_box == b_box;

    let ord = AggregateConstraintComparator.compare(a, b);
    if ord.is_ne() {
      return (ord, same_box);
    }

    let ord = a_box.dominance(&b_box);
    if ord.is_ne() || !same_box {
      return (ord, false);
    }

    let ord = match self.policy {
      SameBoxPolicy::Dominance => a.objectives().dominance(b.objectives()),
      SameBoxPolicy::CornerDistance => {
        let corner_distance = |s: &Solution<V>| {
          s.objectives()
            .iter()
            .zip(&a_box)
            .enumerate()
            .map(|(i, (o, idx))| {
              (o - *idx as f64 * self.epsilons.get(i)).powi(2)
            })
            .sum::<f64>()
        };
        corner_distance(a)
          .partial_cmp(&corner_distance(b))
          .unwrap_or(Ordering::Equal)
      }
    };
    (ord, true)
  }
}

impl<V> DominanceComparator<V> for EpsilonBoxComparator {
  fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
    self.compare_boxes(a, b).0
  }
}

/// Unbounded archive holding at most one solution per epsilon box.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EpsilonBoxArchive<V = ()> {
  comparator: EpsilonBoxComparator,
  solutions: Population<V>,
  improvements: usize,
  dominating_improvements: usize,
}

impl<V> EpsilonBoxArchive<V> {
  /// Creates an empty archive with [`SameBoxPolicy::Dominance`].
  pub fn new(epsilons: Epsilons) -> Self {
    Self::with_comparator(EpsilonBoxComparator::new(epsilons))
  }

  /// Creates an empty archive using `comparator`.
  pub fn with_comparator(comparator: EpsilonBoxComparator) -> Self {
    Self {
      comparator,
      solutions: Population::new(),
      improvements: 0,
      dominating_improvements: 0,
    }
  }

  /// Returns the comparator in use.
  pub fn comparator(&self) -> &EpsilonBoxComparator {
    &self.comparator
  }

  /// Number of accepted solutions that occupied a new box or replaced the
  /// occupant of their box, since creation or the last reset.
  pub fn number_of_improvements(&self) -> usize {
    self.improvements
  }

  /// Number of accepted solutions that purged members of other boxes,
  /// since creation or the last reset.
  pub fn number_of_dominating_improvements(&self) -> usize {
    self.dominating_improvements
  }

  /// Zeroes both improvement counters.
  pub fn reset_improvements(&mut self) {
    self.improvements = 0;
    self.dominating_improvements = 0;
  }

  /// Moves members out of the archive.
  pub fn into_population(self) -> Population<V> {
    self.solutions
  }
}

impl<V> Archive<V> for EpsilonBoxArchive<V> {
  fn add(&mut self, solution: Solution<V>) -> bool {
    if solution.has_undefined_objectives() {
      return false;
    }

    let rejected = self.solutions.iter().any(|member| {
      match self.comparator.compare_boxes(&solution, member) {
        (Ordering::Greater, _) => true,
        // an incomparable solution in the same box never evicts the incumbent
        (Ordering::Equal, same_box) => same_box,
        (Ordering::Less, _) => false,
      }
    });
    if rejected {
      return false;
    }

    let mut purged_other_box = false;
    let comparator = &self.comparator;
    self.solutions.retain(|member| {
      match comparator.compare_boxes(&solution, member) {
        (Ordering::Less, same_box) => {
          purged_other_box |= !same_box;
          false
        }
        _ => true,
      }
    });

    self.improvements += 1;
    if purged_other_box {
      self.dominating_improvements += 1;
    }
    trace!(
      "epsilon archive accepted a solution, {} members",
      self.solutions.len() + 1
    );
    self.solutions.push(solution);
    true
  }

  fn solutions(&self) -> &[Solution<V>] {
    &self.solutions
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use proptest::prelude::*;

  use super::*;

  fn archive(epsilon: f64) -> EpsilonBoxArchive {
    EpsilonBoxArchive::new(Epsilons::uniform(epsilon).unwrap())
  }

  #[test]
  fn test_invalid_epsilons() {
    assert_eq!(
      Epsilons::new([0.1, 0.0]),
      Err(Error::InvalidEpsilon {
        objective: 1,
        value: 0.0
      })
    );
    assert!(Epsilons::new([f64::NAN]).is_err());
    assert!(Epsilons::new([f64::INFINITY]).is_err());
    assert!(Epsilons::new(Vec::<f64>::new()).is_err());
  }

  #[test]
  fn test_last_epsilon_is_reused() {
    let epsilons = Epsilons::new([0.5, 2.0]).unwrap();
    assert_eq!(epsilons.get(0), 0.5);
    assert_eq!(epsilons.get(5), 2.0);
    assert_eq!(epsilons.box_index(&[1.2, 3.0, -0.5]), vec![2, 1, -1]);
  }

  #[test]
  fn test_same_box_keeps_preferred() {
    let mut archive = archive(1.0);
    assert!(archive.add(Solution::of([0.1, 0.1])));
    assert!(!archive.add(Solution::of([0.9, 0.9])));
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.solutions()[0].objectives(), &[0.1, 0.1]);
    assert_eq!(archive.number_of_improvements(), 1);
  }

  #[test]
  fn test_same_box_tie_keeps_incumbent() {
    let mut archive = archive(1.0);
    assert!(archive.add(Solution::of([0.2, 0.6])));
    assert!(!archive.add(Solution::of([0.6, 0.2])));
    assert_eq!(archive.solutions()[0].objectives(), &[0.2, 0.6]);
  }

  #[test]
  fn test_same_box_replacement() {
    let mut archive = archive(1.0);
    assert!(archive.add(Solution::of([0.9, 0.9])));
    assert!(archive.add(Solution::of([0.1, 0.1])));
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.solutions()[0].objectives(), &[0.1, 0.1]);
    assert_eq!(archive.number_of_improvements(), 2);
    assert_eq!(archive.number_of_dominating_improvements(), 0);
  }

  #[test]
  fn test_corner_distance_policy() {
    let comparator = EpsilonBoxComparator::new(Epsilons::uniform(1.0).unwrap())
      .with_policy(SameBoxPolicy::CornerDistance);
    let mut archive = EpsilonBoxArchive::with_comparator(comparator);
    assert!(archive.add(Solution::of([0.2, 0.6])));
    assert!(archive.add(Solution::of([0.3, 0.1])));
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.solutions()[0].objectives(), &[0.3, 0.1]);
  }

  #[test]
  fn test_box_dominated_entrant_is_rejected() {
    let mut archive = archive(1.0);
    assert!(archive.add(Solution::of([0.5, 0.5])));
    assert!(!archive.add(Solution::of([1.5, 0.9])));
    assert_eq!(archive.len(), 1);
  }

  #[test]
  fn test_purges_dominated_members_of_other_boxes() {
    let mut archive = archive(1.0);
    assert!(archive.add(Solution::of([2.5, 0.5])));
    assert!(archive.add(Solution::of([0.5, 2.5])));
    assert!(archive.add(Solution::of([1.5, 1.5])));
    assert_eq!(archive.len(), 3);

    assert!(archive.add(Solution::of([0.2, 0.2])));
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.number_of_improvements(), 4);
    assert_eq!(archive.number_of_dominating_improvements(), 1);

    archive.reset_improvements();
    assert_eq!(archive.number_of_improvements(), 0);
    assert_eq!(archive.number_of_dominating_improvements(), 0);
  }

  #[test]
  fn test_feasibility_replacement_within_box() {
    let mut archive = archive(1.0);
    assert!(archive.add(Solution::of([0.5, 0.5]).with_constraints([2.0])));
    assert!(archive.add(Solution::of([0.6, 0.6]).with_constraints([1.0])));
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.solutions()[0].objectives(), &[0.6, 0.6]);
    assert_eq!(archive.number_of_improvements(), 2);
    assert_eq!(archive.number_of_dominating_improvements(), 0);

    // a feasible entrant from another box does count
    assert!(archive.add(Solution::of([3.5, 3.5])));
    assert_eq!(archive.number_of_dominating_improvements(), 1);
  }

  #[test]
  fn test_same_box_report_ignores_deciding_step() {
    let comparator = EpsilonBoxComparator::new(Epsilons::uniform(1.0).unwrap());
    let infeasible = Solution::of([0.2, 0.2]).with_constraints([1.0]);
    let feasible = Solution::of([0.8, 0.8]);
    assert_eq!(
      comparator.compare_boxes(&feasible, &infeasible),
      (Ordering::Less, true)
    );
    assert_eq!(
      comparator.compare_boxes(&Solution::of([1.5, 0.5]), &infeasible),
      (Ordering::Less, false)
    );
  }

  #[cfg(feature = "serde")]
  #[test]
  fn test_deserialized_epsilons_are_validated() {
    assert!(serde_json::from_str::<Epsilons>("[]").is_err());
    assert!(serde_json::from_str::<Epsilons>("[0.5, -1.0]").is_err());
    let epsilons: Epsilons = serde_json::from_str("[0.5, 2.0]").unwrap();
    assert_eq!(epsilons, Epsilons::new([0.5, 2.0]).unwrap());
    assert_eq!(serde_json::to_string(&epsilons).unwrap(), "[0.5,2.0]");
  }

  #[test]
  fn test_undefined_objectives_are_rejected() {
    let mut archive = archive(1.0);
    assert!(archive.add(Solution::of([0.5, 0.5])));
    assert!(!archive.add(Solution::of([f64::NAN, 0.0])));
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.number_of_improvements(), 1);
  }

  proptest! {
    #[test]
    fn test_one_solution_per_box(
      points in
        prop::collection::vec(prop::array::uniform2(0.0f64..10.0), 1..60),
      epsilon in 0.1f64..3.0,
    ) {
      let mut archive = archive(epsilon);
      for point in points {
        let before = archive.len();
        let dominated = archive.solutions().iter().any(|m| {
          m.objectives().dominance(&point[..]) == Ordering::Less
        });
        archive.add(Solution::of(point));
        if dominated {
          prop_assert!(archive.len() <= before);
        }
      }
      let boxes: HashSet<_> = archive
        .solutions()
        .iter()
        .map(|s| archive.comparator().epsilons().box_index(s.objectives()))
        .collect();
      prop_assert_eq!(boxes.len(), archive.len());
    }
  }
}
