//! Candidate solutions and the attributes the core annotates them with.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Attributes computed by the core. None of them is part of a solution's
/// identity: every ranking, truncation or niching pass overwrites them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
  /// Index of the non-dominated front, `0` is the best one.
  pub rank: Option<usize>,
  /// Crowding distance within the solution's front. Larger is better.
  pub crowding_distance: Option<f64>,
  /// Objectives translated by the ideal point and, for reference point
  /// truncation, divided by the intercepts.
  pub normalized_objectives: Option<Vec<f64>>,
  /// Index of the reference direction or vector the solution is associated
  /// with.
  pub niche: Option<usize>,
  /// Perpendicular distance to the associated reference direction.
  pub niche_distance: Option<f64>,
}

/// A candidate solution: objective values, constraint violations and the
/// caller's decision variables of type `V`.
///
/// All objectives are minimized. Constraint values are violation magnitudes,
/// `0.0` meaning the constraint is satisfied.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution<V = ()> {
  variables: V,
  objectives: Vec<f64>,
  constraints: Vec<f64>,
  #[cfg_attr(feature = "serde", serde(skip))]
  attributes: Attributes,
}

impl Solution<()> {
  /// Creates a solution without decision variables from its objectives.
  pub fn of(objectives: impl Into<Vec<f64>>) -> Self {
    Self::new((), objectives)
  }
}

impl<V> Solution<V> {
  /// Creates a feasible solution.
  pub fn new(variables: V, objectives: impl Into<Vec<f64>>) -> Self {
    Self {
      variables,
      objectives: objectives.into(),
      constraints: Vec::new(),
      attributes: Attributes::default(),
    }
  }

  /// Replaces constraint violations of this solution.
  pub fn with_constraints(mut self, constraints: impl Into<Vec<f64>>) -> Self {
    self.constraints = constraints.into();
    self
  }

  /// Returns a reference to decision variables.
  pub fn variables(&self) -> &V {
    &self.variables
  }

  /// Returns a mutable reference to decision variables.
  pub fn variables_mut(&mut self) -> &mut V {
    &mut self.variables
  }

  /// Moves decision variables out of the solution.
  pub fn into_variables(self) -> V {
    self.variables
  }

  /// Returns all objective values.
  pub fn objectives(&self) -> &[f64] {
    &self.objectives
  }

  /// Returns objective value at `index`.
  ///
  /// # Panics
  ///
  /// Panics if `index` is out of bounds.
  pub fn objective(&self, index: usize) -> f64 {
    self.objectives[index]
  }

  /// Replaces all objective values.
  pub fn set_objectives(&mut self, objectives: impl Into<Vec<f64>>) {
    self.objectives = objectives.into();
  }

  /// Returns the number of objectives.
  pub fn number_of_objectives(&self) -> usize {
    self.objectives.len()
  }

  /// Returns all constraint violations.
  pub fn constraints(&self) -> &[f64] {
    &self.constraints
  }

  /// Replaces all constraint violations.
  pub fn set_constraints(&mut self, constraints: impl Into<Vec<f64>>) {
    self.constraints = constraints.into();
  }

  /// Returns `true` if no constraint is violated.
  pub fn is_feasible(&self) -> bool {
    self.constraints.iter().all(|c| *c == 0.0)
  }

  /// Returns the sum of absolute constraint violations.
  pub fn aggregate_violation(&self) -> f64 {
    self.constraints.iter().map(|c| c.abs()).sum()
  }

  /// Returns `true` if any objective is NaN. Archives refuse such solutions.
  pub fn has_undefined_objectives(&self) -> bool {
    self.objectives.iter().any(|o| o.is_nan())
  }

  /// Returns computed attributes.
  pub fn attributes(&self) -> &Attributes {
    &self.attributes
  }

  /// Returns computed attributes for modification.
  pub fn attributes_mut(&mut self) -> &mut Attributes {
    &mut self.attributes
  }

  /// Drops every computed attribute.
  pub fn clear_attributes(&mut self) {
    self.attributes = Attributes::default();
  }

  /// Shorthand for `attributes().rank`.
  pub fn rank(&self) -> Option<usize> {
    self.attributes.rank
  }

  /// Shorthand for `attributes().crowding_distance`.
  pub fn crowding_distance(&self) -> Option<f64> {
    self.attributes.crowding_distance
  }

  /// Shorthand for `attributes().niche`.
  pub fn niche(&self) -> Option<usize> {
    self.attributes.niche
  }

  /// Shorthand for `attributes().normalized_objectives`.
  pub fn normalized_objectives(&self) -> Option<&[f64]> {
    self.attributes.normalized_objectives.as_deref()
  }
}

/// Euclidean distance between objective vectors of two solutions.
pub(crate) fn objective_distance<V>(a: &Solution<V>, b: &Solution<V>) -> f64 {
  a.objectives()
    .iter()
    .zip(b.objectives())
    .map(|(x, y)| (x - y).powi(2))
    .sum::<f64>()
    .sqrt()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_feasibility() {
    let s = Solution::of([1.0, 2.0]);
    assert!(s.is_feasible());
    assert_eq!(s.aggregate_violation(), 0.0);

    let s = s.with_constraints([0.0, -2.0, 0.5]);
    assert!(!s.is_feasible());
    assert_eq!(s.aggregate_violation(), 2.5);
  }

  #[test]
  fn test_attributes_are_not_identity() {
    let mut s = Solution::new("x", [1.0]);
    s.attributes_mut().rank = Some(3);
    assert_eq!(s.rank(), Some(3));
    s.clear_attributes();
    assert_eq!(s.attributes(), &Attributes::default());
    assert_eq!(s.into_variables(), "x");
  }

  #[test]
  fn test_undefined_objectives() {
    assert!(Solution::of([1.0, f64::NAN]).has_undefined_objectives());
    assert!(!Solution::of([1.0, f64::INFINITY]).has_undefined_objectives());
  }

  #[test]
  fn test_objective_distance() {
    let a = Solution::of([0.0, 0.0]);
    let b = Solution::of([3.0, 4.0]);
    assert_eq!(objective_distance(&a, &b), 5.0);
  }
}
