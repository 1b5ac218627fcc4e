//! One generation of environmental selection.
//!
//! A driver owning the generational loop creates offspring, evaluates them
//! and calls [`Survival::advance`], which offers offspring to the archive and
//! reduces parents plus offspring to the population size.

use log::debug;
use rand::Rng;
use typed_builder::TypedBuilder;

use crate::{
  archive::{Archive, NoArchive},
  error::{Error, Result},
  population::Population,
  truncation::Truncation,
};

/// Survivor selection strategy of an algorithm, composed of a truncation
/// and an archive.
///
/// # Examples
/// ```
/// # use moea_core::{
/// #   archive::{Archive, NoArchive, nondominated::NondominatedArchive},
/// #   population::Population,
/// #   solution::Solution,
/// #   survival::Survival,
/// #   truncation::crowding::CrowdingTruncation,
/// # };
/// # use rand::{rngs::StdRng, SeedableRng};
/// let mut survival = Survival::builder()
///   .population_size(2)
///   .truncation(CrowdingTruncation::new())
///   .archive(NondominatedArchive::new())
///   .build();
/// let parents: Population =
///   [[1.0, 4.0], [4.0, 1.0]].into_iter().map(Solution::of).collect();
/// let offspring: Population =
///   [[2.0, 2.0], [5.0, 5.0]].into_iter().map(Solution::of).collect();
/// let survivors = survival
///   .advance(parents, offspring, &mut StdRng::seed_from_u64(0))
///   .unwrap();
/// assert_eq!(survivors.len(), 2);
/// assert_eq!(survival.archive().len(), 1);
/// ```
#[derive(TypedBuilder, Clone, Debug)]
pub struct Survival<T, A = NoArchive> {
  /// Number of solutions surviving each generation.
  population_size: usize,
  /// Reduces merged parents and offspring.
  truncation: T,
  /// Receives every offspring.
  archive: A,
}

impl<T, A> Survival<T, A> {
  /// Returns the number of solutions surviving each generation.
  pub fn population_size(&self) -> usize {
    self.population_size
  }

  /// Returns the truncation strategy.
  pub fn truncation(&self) -> &T {
    &self.truncation
  }

  /// Returns the archive.
  pub fn archive(&self) -> &A {
    &self.archive
  }

  /// Returns the archive for modification.
  pub fn archive_mut(&mut self) -> &mut A {
    &mut self.archive
  }

  /// Splits the strategy into its truncation and archive.
  pub fn into_parts(self) -> (T, A) {
    (self.truncation, self.archive)
  }

  /// Offers copies of `offspring` to the archive, then truncates parents
  /// and offspring to the population size and returns the survivors.
  ///
  /// # Errors
  ///
  /// Returns an error if the population size is `0` or the truncation
  /// fails.
  pub fn advance<V, R>(
    &mut self,
    parents: Population<V>,
    offspring: Population<V>,
    rng: &mut R,
  ) -> Result<Population<V>>
  where
    V: Clone,
    T: Truncation<V>,
    A: Archive<V>,
    R: Rng,
  {
    if self.population_size == 0 {
      return Err(Error::InvalidArgument(
        "population size must be positive".into(),
      ));
    }

    let accepted = self.archive.add_all(offspring.iter().cloned());

    let mut merged = parents;
    merged.extend(offspring);
    let survivors =
      self.truncation.truncate(merged, self.population_size, rng)?;
    debug!(
      "{} solutions survived, archive accepted {} and holds {}",
      survivors.len(),
      accepted,
      self.archive.len()
    );
    Ok(survivors)
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::{
    archive::epsilon::{EpsilonBoxArchive, Epsilons},
    solution::Solution,
    truncation::{
      crowding::CrowdingTruncation, reference_point::ReferencePointTruncation,
    },
    weights::NormalBoundaryDivisions,
  };

  fn population(objectives: &[[f64; 2]]) -> Population {
    objectives.iter().map(|o| Solution::of(*o)).collect()
  }

  #[test]
  fn test_without_archive() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut survival = Survival::builder()
      .population_size(3)
      .truncation(CrowdingTruncation::new())
      .archive(NoArchive)
      .build();
    let parents = population(&[[1.0, 5.0], [5.0, 1.0], [4.0, 4.0]]);
    let offspring = population(&[[2.0, 2.0], [6.0, 6.0]]);
    let survivors = survival.advance(parents, offspring, &mut rng).unwrap();

    let mut objectives: Vec<_> =
      survivors.iter().map(|s| s.objectives().to_vec()).collect();
    objectives.sort_by(|a, b| a[0].total_cmp(&b[0]));
    assert_eq!(
      objectives,
      vec![vec![1.0, 5.0], vec![2.0, 2.0], vec![5.0, 1.0]]
    );
  }

  #[test]
  fn test_offspring_reach_archive() {
    let mut rng = StdRng::seed_from_u64(1);
    let divisions = NormalBoundaryDivisions::new(4);
    let truncation =
      ReferencePointTruncation::with_divisions(2, divisions).unwrap();
    let mut survival = Survival::builder()
      .population_size(4)
      .truncation(truncation)
      .archive(EpsilonBoxArchive::new(Epsilons::uniform(0.5).unwrap()))
      .build();

    let mut parents =
      population(&[[0.0, 4.0], [4.0, 0.0], [3.0, 3.0], [5.0, 5.0]]);
    for generation in 0..3 {
      let shift = generation as f64 * 0.1;
      let offspring =
        population(&[[1.0 - shift, 1.0 - shift], [2.0, 2.5 - shift]]);
      parents = survival.advance(parents, offspring, &mut rng).unwrap();
      assert_eq!(parents.len(), 4);
    }
    assert!(survival.archive().number_of_improvements() > 0);
    assert!(survival
      .archive()
      .solutions()
      .iter()
      .any(|s| s.objectives().iter().all(|v| (v - 0.8).abs() < 1e-12)));
  }

  #[test]
  fn test_zero_population_size() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut survival = Survival::builder()
      .population_size(0)
      .truncation(CrowdingTruncation::new())
      .archive(NoArchive)
      .build();
    assert!(survival
      .advance(population(&[[1.0, 1.0]]), Population::new(), &mut rng)
      .is_err());
  }
}
