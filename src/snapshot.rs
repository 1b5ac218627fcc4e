//! Resumable state of a run.
//!
//! A snapshot bundles everything needed to continue a run bit for bit: the
//! population, the archive, the reference directions and the random number
//! generator. With the `serde` feature enabled it can be written in any
//! serde format that reproduces `f64` values exactly. Text formats may need
//! to opt in, e.g. `serde_json` with its `float_roundtrip` feature. Derived
//! attributes (rank, crowding distance, niche, normalized objectives) are
//! not stored, they are recomputed by the next sorting or truncation.
//!
//! Deserialized epsilons and adaptive grids are validated the same way as
//! their constructors validate them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
  error::{check_objective_count, Error, Result},
  population::Population,
};

/// Version of the snapshot layout written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// State of a run between two generations.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot<V, A, R> {
  /// Layout version, [`SNAPSHOT_VERSION`] for snapshots created by
  /// [`Snapshot::new`].
  pub version: u32,
  /// Current population.
  pub population: Population<V>,
  /// Archive state, including its counters.
  pub archive: A,
  /// Reference directions, empty if the run does not use any.
  pub reference_directions: Vec<Vec<f64>>,
  /// Random number generator state.
  pub rng: R,
}

impl<V, A, R> Snapshot<V, A, R> {
  /// Captures the state of a run.
  pub fn new(
    population: Population<V>,
    archive: A,
    reference_directions: Vec<Vec<f64>>,
    rng: R,
  ) -> Self {
    Self {
      version: SNAPSHOT_VERSION,
      population,
      archive,
      reference_directions,
      rng,
    }
  }

  /// Checks that the snapshot can be resumed by this build.
  ///
  /// # Errors
  ///
  /// Returns [`Error::SnapshotVersion`] for a foreign layout version and
  /// [`Error::ObjectiveCount`] if the population or reference directions
  /// disagree on the number of objectives.
  pub fn validate(&self) -> Result<()> {
    if self.version != SNAPSHOT_VERSION {
      return Err(Error::SnapshotVersion {
        expected: SNAPSHOT_VERSION,
        found: self.version,
      });
    }

    let objectives = match self.population.number_of_objectives() {
      Some(objectives) => objectives,
      None => match self.reference_directions.first() {
        Some(direction) => direction.len(),
        None => return Ok(()),
      },
    };
    self.population.check_objectives(objectives)?;
    for direction in &self.reference_directions {
      check_objective_count(objectives, direction.len())?;
    }
    Ok(())
  }

  /// Validates the snapshot and splits it into population, archive,
  /// reference directions and random number generator.
  ///
  /// # Errors
  ///
  /// See [`Snapshot::validate`].
  pub fn restore(self) -> Result<(Population<V>, A, Vec<Vec<f64>>, R)> {
    self.validate()?;
    Ok((
      self.population,
      self.archive,
      self.reference_directions,
      self.rng,
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    archive::NoArchive, solution::Solution,
    weights::generate_reference_directions,
  };

  fn population() -> Population {
    [[0.0, 1.0, 2.0], [2.0, 1.0, 0.0]]
      .into_iter()
      .map(Solution::of)
      .collect()
  }

  #[test]
  fn test_validate() {
    let directions = generate_reference_directions(3, 2).unwrap();
    let snapshot =
      Snapshot::new(population(), NoArchive, directions.clone(), ());
    assert_eq!(snapshot.validate(), Ok(()));

    let mut foreign = snapshot.clone();
    foreign.version = 7;
    assert_eq!(
      foreign.validate(),
      Err(Error::SnapshotVersion {
        expected: SNAPSHOT_VERSION,
        found: 7
      })
    );

    let mismatched = Snapshot::new(
      population(),
      NoArchive,
      generate_reference_directions(2, 2).unwrap(),
      (),
    );
    assert_eq!(
      mismatched.validate(),
      Err(Error::ObjectiveCount {
        expected: 3,
        found: 2
      })
    );

    let empty =
      Snapshot::new(Population::<()>::new(), NoArchive, directions, ());
    assert!(empty.restore().is_ok());
  }

  #[cfg(feature = "serde")]
  #[test]
  fn test_resume_reproduces_run() {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use crate::archive::{
      epsilon::{EpsilonBoxArchive, Epsilons},
      Archive,
    };

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let epsilons = Epsilons::new([0.1, 0.1, 0.1]).unwrap();
    let mut archive = EpsilonBoxArchive::new(epsilons);
    for _ in 0..20 {
      let x: f64 = rng.gen_range(0.0..1.0);
      archive.add(Solution::of([x, 1.0 - x, 0.5]));
    }

    let snapshot = Snapshot::new(
      population(),
      archive,
      generate_reference_directions(3, 4).unwrap(),
      rng,
    );
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: Snapshot<(), EpsilonBoxArchive, ChaCha8Rng> =
      serde_json::from_str(&json).unwrap();
    let (population, archive, directions, mut rng) =
      restored.restore().unwrap();
    let (
      expected_population,
      expected_archive,
      expected_directions,
      mut expected_rng,
    ) = snapshot.restore().unwrap();

    assert_eq!(population, expected_population);
    assert_eq!(directions, expected_directions);
    assert_eq!(archive.solutions(), expected_archive.solutions());
    assert_eq!(
      archive.number_of_improvements(),
      expected_archive.number_of_improvements()
    );
    for _ in 0..10 {
      assert_eq!(rng.gen::<u64>(), expected_rng.gen::<u64>());
    }
  }
}
