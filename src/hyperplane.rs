//! Hyperplane normalization used by reference-point niching.
//!
//! Objectives translated by the ideal point are divided by the intercepts of
//! the hyperplane passing through the extreme points of the population. When
//! that hyperplane is degenerate, per-objective maxima are used instead.

use itertools::Itertools;
use log::debug;

use crate::EPS;

/// Weight of the non-extreme axes in the achievement scalarizing function.
const ASF_EPSILON: f64 = 1e-3;

/// Solves `a * x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` if the matrix is singular, i.e. some pivot is not greater
/// than [`EPS`] in magnitude.
pub fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
  let n = b.len();

  for p in 0..n {
    let max = (p..n)
      .max_by(|&i, &j| a[i][p].abs().total_cmp(&a[j][p].abs()))
      .unwrap_or(p);
    a.swap(p, max);
    b.swap(p, max);

    if !(a[p][p].abs() > EPS) {
      return None;
    }

    for i in p + 1..n {
      let alpha = a[i][p] / a[p][p];
      b[i] -= alpha * b[p];
      for j in p..n {
        a[i][j] -= alpha * a[p][j];
      }
    }
  }

  let mut x = vec![0.0; n];
  for i in (0..n).rev() {
    let sum: f64 = (i + 1..n).map(|j| a[i][j] * x[j]).sum();
    x[i] = (b[i] - sum) / a[i][i];
  }
  Some(x)
}

/// Intercepts of the normalizing hyperplane with each objective axis.
#[derive(Clone, Debug, PartialEq)]
pub enum Intercepts {
  /// Intercepts of the hyperplane through the extreme points.
  Hyperplane(Vec<f64>),
  /// The hyperplane was degenerate: per-objective maxima of the translated
  /// objectives are used instead.
  Nadir(Vec<f64>),
}

impl Intercepts {
  /// Computes intercepts for objective vectors already translated by the
  /// ideal point. Every intercept is at least [`EPS`].
  pub fn compute(translated: &[Vec<f64>]) -> Self {
    let objective_num = translated.first().map_or(0, Vec::len);
    let extremes = extreme_points(translated);

    let hyperplane = solve(extremes, vec![1.0; objective_num])
      .map(|x| x.into_iter().map(|v| 1.0 / v).collect_vec())
      .filter(|intercepts| {
        intercepts.iter().all(|v| v.is_finite() && *v > 0.0)
      });

    match hyperplane {
      Some(intercepts) => Self::Hyperplane(clamp(intercepts)),
      None => {
        debug!("degenerate hyperplane, normalizing by nadir point");
        let nadir = (0..objective_num)
          .map(|i| {
            translated
              .iter()
              .map(|o| o[i])
              .fold(f64::NEG_INFINITY, f64::max)
          })
          .collect();
        Self::Nadir(clamp(nadir))
      }
    }
  }

  /// Returns intercept values regardless of how they were found.
  pub fn values(&self) -> &[f64] {
    match self {
      Self::Hyperplane(v) | Self::Nadir(v) => v,
    }
  }

  /// Returns `true` if the nadir fallback was used.
  pub fn is_degenerate(&self) -> bool {
    matches!(self, Self::Nadir(_))
  }
}

fn clamp(intercepts: Vec<f64>) -> Vec<f64> {
  intercepts.into_iter().map(|v| v.max(EPS)).collect()
}

/// Achievement scalarizing function `max_j x_j / w_j` with weights favoring
/// `axis`.
pub fn achievement_scalarizing(point: &[f64], axis: usize) -> f64 {
  let m = point.len();
  point
    .iter()
    .enumerate()
    .map(|(j, x)| {
      let w = if j == axis {
        1.0 - ASF_EPSILON * (m - 1) as f64
      } else {
        ASF_EPSILON
      };
      x / w
    })
    .fold(f64::NEG_INFINITY, f64::max)
}

/// For each axis, returns the translated objective vector minimizing the
/// achievement scalarizing function of that axis. The first minimum wins.
pub fn extreme_points(translated: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let objective_num = translated.first().map_or(0, Vec::len);
  (0..objective_num)
    .filter_map(|axis| {
      translated
        .iter()
        .position_min_by(|a, b| {
          achievement_scalarizing(a, axis)
            .total_cmp(&achievement_scalarizing(b, axis))
        })
        .map(|idx| translated[idx].clone())
    })
    .collect()
}
