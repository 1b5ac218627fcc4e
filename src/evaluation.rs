//! Objective evaluation, the boundary between problem definitions and the
//! selection core.
//!
//! The core never evaluates solutions on its own. A driver evaluates new
//! solutions with [`evaluate_population`] before handing them over to
//! sorting, truncation or archives.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
  error::{check_objective_count, Result},
  population::Population,
};

/// Objective values and constraint violations of one solution.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Evaluation {
  /// Objective values, lower is better.
  pub objectives: Vec<f64>,
  /// Constraint violation magnitudes, `0.0` meaning satisfied.
  pub constraints: Vec<f64>,
}

impl Evaluation {
  /// Creates an evaluation of a constrained problem.
  pub fn new(
    objectives: impl Into<Vec<f64>>,
    constraints: impl Into<Vec<f64>>,
  ) -> Self {
    Self {
      objectives: objectives.into(),
      constraints: constraints.into(),
    }
  }
}

impl From<Vec<f64>> for Evaluation {
  fn from(objectives: Vec<f64>) -> Self {
    Self {
      objectives,
      constraints: Vec::new(),
    }
  }
}

impl<const N: usize> From<[f64; N]> for Evaluation {
  fn from(objectives: [f64; N]) -> Self {
    Self::from(objectives.to_vec())
  }
}

/// Evaluates decision variables of type `V`.
///
/// All objectives are minimized. If an objective should be maximized, flip
/// it with [`Direction::canonicalize`] before returning it.
///
/// # Examples
/// ```
/// # use moea_core::evaluation::{Evaluate, Evaluation};
/// // one closure for every objective at once
/// let e = |x: &f64| Evaluation::from([x * x, (x - 2.0) * (x - 2.0)]);
/// assert_eq!(e.evaluate(&1.0).objectives, vec![1.0, 1.0]);
/// // or an array of closures returning a single value each
/// let e = [|x: &f64| x + 1.0, |x: &f64| x * 3.0];
/// assert_eq!(e.evaluate(&1.0).objectives, vec![2.0, 3.0]);
/// ```
///
/// **Note that you always can implement this trait instead of using closures.**
pub trait Evaluate<V> {
  /// Returns objective values and constraint violations of `variables`.
  fn evaluate(&self, variables: &V) -> Evaluation;
}

impl<V, F> Evaluate<V> for F
where
  F: Fn(&V) -> Evaluation,
{
  fn evaluate(&self, variables: &V) -> Evaluation {
    self(variables)
  }
}

impl<V, const N: usize, F> Evaluate<V> for [F; N]
where
  F: Fn(&V) -> f64,
{
  fn evaluate(&self, variables: &V) -> Evaluation {
    Evaluation::from(self.each_ref().map(|f| f(variables)))
  }
}

/// Whether an objective is minimized or maximized.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
  /// Lower values are better.
  #[default]
  Minimize,
  /// Higher values are better.
  Maximize,
}

impl Direction {
  /// Converts `value` to the minimization convention used by the core.
  /// Applying it twice restores the original value.
  pub fn canonicalize(self, value: f64) -> f64 {
    match self {
      Self::Minimize => value,
      Self::Maximize => -value,
    }
  }
}

/// Evaluates every solution of `population` in order, overwriting its
/// objectives and constraints.
///
/// # Errors
///
/// Returns an error as soon as an evaluation yields other than `objectives`
/// objective values. Solutions before the offending one stay evaluated.
pub fn evaluate_population<V, E>(
  population: &mut Population<V>,
  evaluator: &E,
  objectives: usize,
) -> Result<()>
where
  E: Evaluate<V> + ?Sized,
{
  for solution in population.iter_mut() {
    let evaluation = evaluator.evaluate(solution.variables());
    check_objective_count(objectives, evaluation.objectives.len())?;
    solution.set_objectives(evaluation.objectives);
    solution.set_constraints(evaluation.constraints);
    solution.clear_attributes();
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{error::Error, solution::Solution};

  fn population() -> Population<f64> {
    [0.0, 1.0, 2.0]
      .into_iter()
      .map(|x| Solution::new(x, Vec::<f64>::new()))
      .collect()
  }

  #[test]
  fn test_evaluate_with_closure() {
    let mut p = population();
    let evaluator = |x: &f64| {
      Evaluation::new([x * x, (x - 2.0).powi(2)], [(x - 1.5).max(0.0)])
    };
    evaluate_population(&mut p, &evaluator, 2).unwrap();
    assert_eq!(p[1].objectives(), &[1.0, 1.0]);
    assert!(p[1].is_feasible());
    assert_eq!(p[2].constraints(), &[0.5]);
  }

  #[test]
  fn test_evaluate_with_array_of_closures() {
    let mut p = population();
    let evaluator = [|x: &f64| x + 1.0, |x: &f64| -x];
    evaluate_population(&mut p, &evaluator, 2).unwrap();
    assert_eq!(p[2].objectives(), &[3.0, -2.0]);
  }

  #[test]
  fn test_wrong_number_of_objectives() {
    let mut p = population();
    let evaluator = |x: &f64| Evaluation::from(vec![*x]);
    assert_eq!(
      evaluate_population(&mut p, &evaluator, 2),
      Err(Error::ObjectiveCount {
        expected: 2,
        found: 1
      })
    );
  }

  #[test]
  fn test_maximized_objectives() {
    let profit = 7.5;
    assert_eq!(Direction::Maximize.canonicalize(profit), -7.5);
    assert_eq!(Direction::Minimize.canonicalize(profit), 7.5);
    let negated = Direction::Maximize.canonicalize(profit);
    assert_eq!(Direction::Maximize.canonicalize(negated), profit);
  }
}
