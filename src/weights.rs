//! Reference directions spread uniformly over the unit simplex, generated
//! with the normal-boundary intersection method of Das and Dennis.

use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{Error, Result};

/// Generates every point of the unit simplex in `objectives` dimensions whose
/// coordinates are multiples of `1 / divisions`, in lexicographic order.
///
/// There are `C(objectives + divisions - 1, divisions)` such points and the
/// coordinates of each one sum to `1`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `objectives` or `divisions` is `0`.
pub fn generate_reference_directions(
  objectives: usize,
  divisions: usize,
) -> Result<Vec<Vec<f64>>> {
  if objectives == 0 {
    return Err(Error::InvalidArgument(
      "number of objectives must be positive".into(),
    ));
  }
  if divisions == 0 {
    return Err(Error::InvalidArgument(
      "number of divisions must be positive".into(),
    ));
  }

  let mut directions = Vec::new();
  let mut prefix = Vec::with_capacity(objectives);
  compose(&mut prefix, objectives, divisions, divisions, &mut directions);
  Ok(directions)
}

// extends `prefix` with every composition of `remaining` into the missing parts
fn compose(
  prefix: &mut Vec<usize>,
  objectives: usize,
  divisions: usize,
  remaining: usize,
  out: &mut Vec<Vec<f64>>,
) {
  if prefix.len() == objectives - 1 {
    out.push(
      prefix
        .iter()
        .chain(std::iter::once(&remaining))
        .map(|&part| part as f64 / divisions as f64)
        .collect(),
    );
    return;
  }
  for part in 0..=remaining {
    prefix.push(part);
    compose(prefix, objectives, divisions, remaining - part, out);
    prefix.pop();
  }
}

/// Binomial coefficient `C(n, k)`, saturating at `usize::MAX`.
pub fn binomial(n: usize, k: usize) -> usize {
  if k > n {
    return 0;
  }
  let k = k.min(n - k);
  let mut result: u128 = 1;
  for i in 0..k {
    result = result * (n - i) as u128 / (i + 1) as u128;
    if result > usize::MAX as u128 {
      return usize::MAX;
    }
  }
  result as usize
}

/// Number of divisions of the outer and, optionally, inner layer of
/// reference directions.
///
/// A single layer (`inner == 0`) places points on the simplex boundary and,
/// given enough divisions, in its interior. With many objectives a single
/// layer either has no interior points or far too many points, so a second
/// layer shrunk towards the simplex centre is added instead.
#[derive(TypedBuilder, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalBoundaryDivisions {
  /// Divisions of the outer layer.
  pub outer: usize,
  /// Divisions of the inner layer, `0` for a single layer.
  #[builder(default)]
  pub inner: usize,
}

impl NormalBoundaryDivisions {
  /// Creates single layer divisions.
  pub fn new(divisions: usize) -> Self {
    Self {
      outer: divisions,
      inner: 0,
    }
  }

  /// Creates two layer divisions.
  pub fn two_layer(outer: usize, inner: usize) -> Self {
    Self { outer, inner }
  }

  /// Returns recommended divisions for the given number of objectives.
  pub fn for_objectives(objectives: usize) -> Self {
    match objectives {
      0 | 1 => Self::new(100),
      2 => Self::new(99),
      3 => Self::new(12),
      4 => Self::new(8),
      5 => Self::new(6),
      6 => Self::two_layer(4, 1),
      7..=10 => Self::two_layer(3, 2),
      _ => Self::two_layer(2, 1),
    }
  }

  /// Returns `true` if there is an inner layer.
  pub fn is_two_layer(&self) -> bool {
    self.inner > 0
  }

  /// Returns the number of reference directions [`Self::generate`] makes.
  pub fn number_of_reference_points(&self, objectives: usize) -> usize {
    let layer = |divisions: usize| {
      binomial((objectives + divisions).saturating_sub(1), divisions)
    };
    let outer = layer(self.outer);
    if self.is_two_layer() {
      outer.saturating_add(layer(self.inner))
    } else {
      outer
    }
  }

  /// Generates reference directions: the outer layer, followed by the inner
  /// layer with each coordinate `w` mapped to `(1 / objectives + w) / 2`.
  ///
  /// # Errors
  ///
  /// Returns [`Error::InvalidArgument`] if `objectives` or `outer` is `0`.
  pub fn generate(&self, objectives: usize) -> Result<Vec<Vec<f64>>> {
    let mut directions = generate_reference_directions(objectives, self.outer)?;

    if self.is_two_layer() {
      if self.outer >= objectives {
        warn!(
          "{} outer divisions over {} objectives produce interior reference \
           points, consider fewer outer divisions",
          self.outer, objectives
        );
      }
      let centre = 1.0 / objectives as f64;
      let inner = generate_reference_directions(objectives, self.inner)?;
      directions.extend(inner.into_iter().map(|w| {
        w.into_iter().map(|v| (centre + v) / 2.0).collect::<Vec<_>>()
      }));
    } else if self.outer < objectives {
      warn!(
        "{} divisions over {} objectives produce no interior reference \
         points, consider more divisions",
        self.outer, objectives
      );
    }

    Ok(directions)
  }
}
