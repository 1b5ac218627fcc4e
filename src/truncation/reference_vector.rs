//! RVEA survivor selection by angle-penalized distance.
//!
//! Objectives are translated by the ideal point and every solution is
//! associated with the reference vector it makes the smallest angle with.
//! Each occupied vector keeps one solution, the one with the smallest
//! angle-penalized distance
//!
//! `|x| * (1 + M * t^alpha * angle(x, v) / gamma_v)`
//!
//! where `t` is the scaling factor, usually the fraction of the run that
//! has elapsed, and `gamma_v` is the smallest angle between `v` and any other
//! vector. Small scaling factors favor convergence, large ones diversity.

use itertools::Itertools;
use log::{debug, trace};
use rand::{seq::index, Rng};

use super::{take_indices, Truncation};
use crate::{
  error::{Error, Result},
  population::Population,
  solution::Solution,
  weights::NormalBoundaryDivisions,
  EPS,
};

/// Reference vector guided truncation.
///
/// Unlike the other truncations it never keeps more than one solution per
/// reference vector, so survivors may be fewer than the requested size even
/// if the population fits.
#[derive(Clone, Debug)]
pub struct ReferenceVectorTruncation {
  objectives: usize,
  divisions: NormalBoundaryDivisions,
  alpha: f64,
  scaling_factor: f64,
  // unit vectors as generated, before any adaptation
  original_vectors: Vec<Vec<f64>>,
  vectors: Vec<Vec<f64>>,
  // smallest angle between each vector and any other one
  min_angles: Vec<f64>,
}

impl ReferenceVectorTruncation {
  /// Default rate of change of the angle penalty.
  pub const DEFAULT_ALPHA: f64 = 2.0;

  /// Creates truncation guided by reference vectors generated from
  /// `divisions`.
  ///
  /// # Errors
  ///
  /// Returns an error if `objectives` is less than `2` or `divisions`
  /// cannot generate any vector.
  pub fn new(
    objectives: usize,
    divisions: NormalBoundaryDivisions,
  ) -> Result<Self> {
    if objectives < 2 {
      return Err(Error::InvalidArgument(
        "reference vector guidance needs at least 2 objectives".into(),
      ));
    }
    let original_vectors = divisions
      .generate(objectives)?
      .into_iter()
      .map(unit)
      .collect_vec();
    let min_angles = smallest_angles(&original_vectors);

    Ok(Self {
      objectives,
      divisions,
      alpha: Self::DEFAULT_ALPHA,
      scaling_factor: 0.0,
      vectors: original_vectors.clone(),
      original_vectors,
      min_angles,
    })
  }

  /// Sets the rate of change of the angle penalty.
  ///
  /// # Errors
  ///
  /// Returns an error if `alpha` is negative or not finite.
  pub fn with_alpha(mut self, alpha: f64) -> Result<Self> {
    if !(alpha.is_finite() && alpha >= 0.0) {
      return Err(Error::InvalidArgument(format!(
        "alpha must be non-negative and finite, got {alpha}"
      )));
    }
    self.alpha = alpha;
    Ok(self)
  }

  /// Returns the number of objectives.
  pub fn objectives(&self) -> usize {
    self.objectives
  }

  /// Returns divisions the reference vectors were generated from.
  pub fn divisions(&self) -> NormalBoundaryDivisions {
    self.divisions
  }

  /// Returns the rate of change of the angle penalty.
  pub fn alpha(&self) -> f64 {
    self.alpha
  }

  /// Returns the scaling factor of the angle penalty.
  pub fn scaling_factor(&self) -> f64 {
    self.scaling_factor
  }

  /// Sets the scaling factor of the angle penalty, usually
  /// `generation / max_generations`. Values are clamped to `[0, 1]`, NaN
  /// becomes `0`.
  pub fn set_scaling_factor(&mut self, scaling_factor: f64) {
    self.scaling_factor = if scaling_factor.is_nan() {
      0.0
    } else {
      scaling_factor.clamp(0.0, 1.0)
    };
  }

  /// Returns current unit reference vectors.
  pub fn vectors(&self) -> &[Vec<f64>] {
    &self.vectors
  }

  /// Rescales the generated reference vectors by the objective ranges of
  /// `solutions`, so they spread over fronts of uneven scale. Ranges below
  /// `0.01` count as `0.01`. Does nothing for an empty slice.
  pub fn adapt<V>(&mut self, solutions: &[Solution<V>]) {
    let Some(first) = solutions.first() else {
      return;
    };
    let mut lower = first.objectives().to_vec();
    let mut upper = lower.clone();
    for solution in &solutions[1..] {
      let objectives = solution.objectives().iter().take(self.objectives);
      for (i, &value) in objectives.enumerate() {
        lower[i] = lower[i].min(value);
        upper[i] = upper[i].max(value);
      }
    }

    self.vectors = self
      .original_vectors
      .iter()
      .map(|v| {
        let scaled = v
          .iter()
          .zip(lower.iter().zip(&upper))
          .map(|(w, (lo, hi))| w * (hi - lo).max(0.01))
          .collect();
        unit(scaled)
      })
      .collect();
    self.min_angles = smallest_angles(&self.vectors);
    debug!("adapted reference vectors to ranges {:?} {:?}", lower, upper);
  }

  /// Translates `solutions` by their ideal point, stores the result as the
  /// `normalized_objectives` attribute and associates every solution with
  /// the reference vector of the largest cosine, stored as `niche`. A
  /// solution at the ideal point goes to the first vector.
  pub fn associate<V>(&self, solutions: &mut [Solution<V>]) {
    let ideal = (0..self.objectives)
      .map(|i| {
        solutions
          .iter()
          .map(|s| s.objective(i))
          .fold(f64::INFINITY, f64::min)
      })
      .collect_vec();

    for solution in solutions.iter_mut() {
      let translated = solution
        .objectives()
        .iter()
        .zip(&ideal)
        .map(|(o, z)| o - z)
        .collect_vec();
      let niche = self
        .vectors
        .iter()
        .map(|v| cosine(v, &translated))
        .enumerate()
        .filter(|(_, cos)| !cos.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (i, cos)| match best {
          Some((_, best_cos)) if cos <= best_cos => best,
          _ => Some((i, cos)),
        })
        .map_or(0, |(i, _)| i);

      let attributes = solution.attributes_mut();
      attributes.normalized_objectives = Some(translated);
      attributes.niche = Some(niche);
    }
  }

  /// Angle-penalized distance of `point` to the reference vector `niche`.
  pub fn penalized_distance(&self, niche: usize, point: &[f64]) -> f64 {
    let angle = angle(&self.vectors[niche], point);
    let weight = self.objectives as f64 * self.scaling_factor.powf(self.alpha);
    let penalty = weight * angle / self.min_angles[niche].max(EPS);
    magnitude(point) * (1.0 + penalty)
  }

  // member of `candidates` kept for vector `niche`. feasible solutions are
  // compared by penalized distance, infeasible ones only matter if no
  // candidate is feasible
  fn elect<V>(
    &self,
    solutions: &[Solution<V>],
    niche: usize,
    candidates: &[usize],
  ) -> usize {
    let feasible = candidates
      .iter()
      .copied()
      .filter(|&idx| solutions[idx].is_feasible())
      .min_by(|&a, &b| {
        let distance = |idx: usize| {
          let point = solutions[idx]
            .normalized_objectives()
            .unwrap_or_else(|| solutions[idx].objectives());
          self.penalized_distance(niche, point)
        };
        distance(a).total_cmp(&distance(b))
      });
    feasible
      .or_else(|| {
        candidates.iter().copied().min_by(|&a, &b| {
          solutions[a]
            .aggregate_violation()
            .total_cmp(&solutions[b].aggregate_violation())
        })
      })
      .unwrap_or(candidates[0])
  }
}

impl<V> Truncation<V> for ReferenceVectorTruncation {
  /// Keeps the best solution of every occupied reference vector, in vector
  /// order. If more than `size` vectors are occupied, `size` of their
  /// solutions are drawn at random.
  fn truncate<R: Rng>(
    &mut self,
    population: Population<V>,
    size: usize,
    rng: &mut R,
  ) -> Result<Population<V>> {
    population.check_objectives(self.objectives)?;

    let mut solutions = population.into_vec();
    for solution in solutions.iter_mut() {
      solution.clear_attributes();
    }
    self.associate(&mut solutions);

    let mut members = vec![Vec::new(); self.vectors.len()];
    for (idx, solution) in solutions.iter().enumerate() {
      if let Some(niche) = solution.niche() {
        members[niche].push(idx);
      }
    }

    let mut elected = members
      .iter()
      .enumerate()
      .filter(|(_, candidates)| !candidates.is_empty())
      .map(|(niche, candidates)| self.elect(&solutions, niche, candidates))
      .collect_vec();
    trace!("{} reference vectors are occupied", elected.len());

    if elected.len() > size {
      let mut picked = index::sample(rng, elected.len(), size).into_vec();
      picked.sort_unstable();
      elected = picked.into_iter().map(|i| elected[i]).collect();
    }

    Ok(take_indices(solutions, elected))
  }
}

fn magnitude(v: &[f64]) -> f64 {
  v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn unit(v: Vec<f64>) -> Vec<f64> {
  let norm = magnitude(&v);
  if norm > 0.0 {
    v.into_iter().map(|x| x / norm).collect()
  } else {
    v
  }
}

/// Cosine of the angle between the unit vector `line` and `point`. NaN for
/// a point at the origin.
pub fn cosine(line: &[f64], point: &[f64]) -> f64 {
  line.iter().zip(point).map(|(l, p)| l * p).sum::<f64>() / magnitude(point)
}

/// Angle between the unit vector `line` and `point`, in radians.
pub fn angle(line: &[f64], point: &[f64]) -> f64 {
  let cos = cosine(line, point);
  if cos.is_nan() {
    0.0
  } else {
    cos.clamp(-1.0, 1.0).acos()
  }
}

fn smallest_angles(vectors: &[Vec<f64>]) -> Vec<f64> {
  (0..vectors.len())
    .map(|i| {
      (0..vectors.len())
        .filter(|&j| j != i)
        .map(|j| angle(&vectors[i], &vectors[j]))
        .fold(f64::INFINITY, f64::min)
    })
    .collect()
}
