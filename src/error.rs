//! Error type shared by every fallible operation of the crate.

use thiserror::Error;

/// Violations of an operation's input contract.
///
/// Numeric degeneracies (singular hyperplanes, zero-width objective ranges)
/// are never reported through this type, they have deterministic fallbacks.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
  /// A solution carries a different number of objectives than expected.
  #[error("expected {expected} objectives, found {found}")]
  ObjectiveCount {
    /// Number of objectives the operation was configured with.
    expected: usize,
    /// Number of objectives the offending solution has.
    found: usize,
  },

  /// An operation that needs at least one solution received none.
  #[error("population is empty")]
  EmptyPopulation,

  /// An epsilon value is not a positive finite number.
  #[error(
    "epsilon for objective {objective} must be positive and finite, \
     got {value}"
  )]
  InvalidEpsilon {
    /// Index of the offending objective.
    objective: usize,
    /// The rejected value.
    value: f64,
  },

  /// The adaptive grid would need more cells than can be indexed.
  #[error(
    "{bisections} bisections over {objectives} objectives overflow the \
     grid index"
  )]
  GridTooLarge {
    /// Requested bisection depth.
    bisections: u32,
    /// Number of objectives.
    objectives: usize,
  },

  /// A snapshot was written by an incompatible version.
  #[error("unsupported snapshot version {found}, expected {expected}")]
  SnapshotVersion {
    /// Version this build reads.
    expected: u32,
    /// Version found in the snapshot.
    found: u32,
  },

  /// Any other invalid configuration value.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),
}

/// An alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Checks that `found` objectives match the `expected` count.
pub(crate) fn check_objective_count(
  expected: usize,
  found: usize,
) -> Result<()> {
  if expected == found {
    Ok(())
  } else {
    Err(Error::ObjectiveCount { expected, found })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_messages() {
    let err = Error::ObjectiveCount {
      expected: 3,
      found: 2,
    };
    assert_eq!(err.to_string(), "expected 3 objectives, found 2");
    assert_eq!(Error::EmptyPopulation.to_string(), "population is empty");
  }

  #[test]
  fn test_check_objective_count() {
    assert!(check_objective_count(2, 2).is_ok());
    assert_eq!(
      check_objective_count(2, 3),
      Err(Error::ObjectiveCount {
        expected: 2,
        found: 3
      })
    );
  }
}
