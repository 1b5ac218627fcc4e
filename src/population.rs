//! An ordered, mutable collection of solutions.

use std::ops::{Deref, DerefMut};

use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
  error::{check_objective_count, Result},
  solution::Solution,
};

/// An ordered sequence of solutions. Order is insertion order unless it is
/// re-sorted explicitly. Identity is never checked: the same objective
/// vector may appear several times.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Population<V = ()> {
  solutions: Vec<Solution<V>>,
}

impl<V> Default for Population<V> {
  fn default() -> Self {
    Self {
      solutions: Vec::new(),
    }
  }
}

impl<V> Population<V> {
  /// Creates an empty population.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates an empty population with space for `capacity` solutions.
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      solutions: Vec::with_capacity(capacity),
    }
  }

  /// Appends a solution.
  pub fn push(&mut self, solution: Solution<V>) {
    self.solutions.push(solution);
  }

  /// Removes and returns the solution at `index`, shifting later ones.
  ///
  /// # Panics
  ///
  /// Panics if `index` is out of bounds.
  pub fn remove(&mut self, index: usize) -> Solution<V> {
    self.solutions.remove(index)
  }

  /// Replaces the solution at `index`, returning the old one.
  ///
  /// # Panics
  ///
  /// Panics if `index` is out of bounds.
  pub fn replace(
    &mut self,
    index: usize,
    solution: Solution<V>,
  ) -> Solution<V> {
    std::mem::replace(&mut self.solutions[index], solution)
  }

  /// Keeps only the solutions matching `predicate`.
  pub fn retain(&mut self, predicate: impl FnMut(&Solution<V>) -> bool) {
    self.solutions.retain(predicate);
  }

  /// Removes every solution.
  pub fn clear(&mut self) {
    self.solutions.clear();
  }

  /// Moves solutions out of the population.
  pub fn into_vec(self) -> Vec<Solution<V>> {
    self.solutions
  }

  /// Returns the number of objectives of the first solution, if any.
  pub fn number_of_objectives(&self) -> Option<usize> {
    self.solutions.first().map(Solution::number_of_objectives)
  }

  /// Checks that every solution has exactly `objectives` objectives.
  pub fn check_objectives(&self, objectives: usize) -> Result<()> {
    self
      .solutions
      .iter()
      .try_for_each(|s| {
        check_objective_count(objectives, s.number_of_objectives())
      })
  }

  /// Returns per-objective minima, or `None` if the population is empty.
  pub fn lower_bounds(&self) -> Option<Vec<f64>> {
    self.bounds(f64::min)
  }

  /// Returns per-objective maxima, or `None` if the population is empty.
  pub fn upper_bounds(&self) -> Option<Vec<f64>> {
    self.bounds(f64::max)
  }

  fn bounds(&self, pick: fn(f64, f64) -> f64) -> Option<Vec<f64>> {
    let (first, rest) = self.solutions.split_first()?;
    Some(rest.iter().fold(first.objectives().to_vec(), |acc, s| {
      acc
        .into_iter()
        .zip(s.objectives())
        .map(|(a, b)| pick(a, *b))
        .collect_vec()
    }))
  }
}

impl<V> Deref for Population<V> {
  type Target = [Solution<V>];

  fn deref(&self) -> &Self::Target {
    &self.solutions
  }
}

impl<V> DerefMut for Population<V> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.solutions
  }
}

impl<V> From<Vec<Solution<V>>> for Population<V> {
  fn from(solutions: Vec<Solution<V>>) -> Self {
    Self { solutions }
  }
}

impl<V> FromIterator<Solution<V>> for Population<V> {
  fn from_iter<I: IntoIterator<Item = Solution<V>>>(iter: I) -> Self {
    Self {
      solutions: iter.into_iter().collect(),
    }
  }
}

impl<V> Extend<Solution<V>> for Population<V> {
  fn extend<I: IntoIterator<Item = Solution<V>>>(&mut self, iter: I) {
    self.solutions.extend(iter);
  }
}

impl<V> IntoIterator for Population<V> {
  type Item = Solution<V>;
  type IntoIter = std::vec::IntoIter<Solution<V>>;

  fn into_iter(self) -> Self::IntoIter {
    self.solutions.into_iter()
  }
}

impl<'a, V> IntoIterator for &'a Population<V> {
  type Item = &'a Solution<V>;
  type IntoIter = std::slice::Iter<'a, Solution<V>>;

  fn into_iter(self) -> Self::IntoIter {
    self.solutions.iter()
  }
}
