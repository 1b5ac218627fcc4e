//! NSGA-III survivor selection: non-dominated sorting followed by niching
//! around a fixed set of reference directions.
//!
//! Whole fronts are kept while they fit. The front that would overflow the
//! target size is the critical front. Kept and critical solutions are
//! normalized by the ideal point and the hyperplane intercepts, each one is
//! associated with the nearest reference direction, and critical solutions
//! are then picked one at a time for the least represented directions.

use itertools::Itertools;
use log::{debug, trace};
use rand::Rng;

use super::{take_indices, Truncation};
use crate::{
  dominance::{DominanceComparator, ParetoDominanceComparator},
  error::{Error, Result},
  hyperplane::Intercepts,
  population::Population,
  solution::Solution,
  sorting::NondominatedSorting,
  weights::NormalBoundaryDivisions,
};

/// Reference-point niched truncation.
#[derive(Clone, Debug)]
pub struct ReferencePointTruncation<C = ParetoDominanceComparator> {
  objectives: usize,
  directions: Vec<Vec<f64>>,
  sorting: NondominatedSorting<C>,
}

impl ReferencePointTruncation {
  /// Creates truncation niching around the given reference directions.
  ///
  /// # Errors
  ///
  /// Returns an error if there are no directions, `objectives` is `0`, or a
  /// direction's dimension differs from `objectives`.
  pub fn new(objectives: usize, directions: Vec<Vec<f64>>) -> Result<Self> {
    if objectives == 0 {
      return Err(Error::InvalidArgument(
        "number of objectives must be positive".into(),
      ));
    }
    if directions.is_empty() {
      return Err(Error::InvalidArgument(
        "at least one reference direction is required".into(),
      ));
    }
    for direction in &directions {
      if direction.len() != objectives {
        return Err(Error::ObjectiveCount {
          expected: objectives,
          found: direction.len(),
        });
      }
    }

    Ok(Self {
      objectives,
      directions,
      sorting: NondominatedSorting::new(),
    })
  }

  /// Creates truncation with reference directions generated from
  /// `divisions`.
  pub fn with_divisions(
    objectives: usize,
    divisions: NormalBoundaryDivisions,
  ) -> Result<Self> {
    Self::new(objectives, divisions.generate(objectives)?)
  }
}

impl<C> ReferencePointTruncation<C> {
  /// Replaces the dominance comparator used for ranking.
  pub fn with_comparator<D>(
    self,
    comparator: D,
  ) -> ReferencePointTruncation<D> {
    ReferencePointTruncation {
      objectives: self.objectives,
      directions: self.directions,
      sorting: NondominatedSorting::with_comparator(comparator),
    }
  }

  /// Returns the number of objectives.
  pub fn objectives(&self) -> usize {
    self.objectives
  }

  /// Returns reference directions.
  pub fn directions(&self) -> &[Vec<f64>] {
    &self.directions
  }

  /// Normalizes objectives of `members` and stores them as the
  /// `normalized_objectives` attribute. The ideal point is computed over
  /// `members` only.
  pub fn normalize<V>(
    &self,
    solutions: &mut [Solution<V>],
    members: &[usize],
  ) -> Intercepts {
    let ideal = (0..self.objectives)
      .map(|i| {
        members
          .iter()
          .map(|&idx| solutions[idx].objective(i))
          .fold(f64::INFINITY, f64::min)
      })
      .collect_vec();

    let translated = members
      .iter()
      .map(|&idx| {
        solutions[idx]
          .objectives()
          .iter()
          .zip(&ideal)
          .map(|(o, z)| o - z)
          .collect_vec()
      })
      .collect_vec();

    let intercepts = Intercepts::compute(&translated);
    trace!("normalizing by {:?}", intercepts);

    for (&idx, point) in members.iter().zip(translated) {
      let normalized = point
        .into_iter()
        .zip(intercepts.values())
        .map(|(x, a)| x / a)
        .collect();
      solutions[idx].attributes_mut().normalized_objectives = Some(normalized);
    }
    intercepts
  }

  /// Associates each of `members` with the reference direction nearest to
  /// its normalized objectives, storing `niche` and `niche_distance`. Ties go
  /// to the first direction.
  ///
  /// Members are expected to be normalized already, see [`Self::normalize`].
  pub fn associate<V>(&self, solutions: &mut [Solution<V>], members: &[usize]) {
    for &idx in members {
      let attributes = solutions[idx].attributes_mut();
      let Some(point) = attributes.normalized_objectives.as_deref() else {
        continue;
      };
      let nearest = self
        .directions
        .iter()
        .map(|d| perpendicular_distance(d, point))
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b));
      if let Some((niche, distance)) = nearest {
        attributes.niche = Some(niche);
        attributes.niche_distance = Some(distance);
      }
    }
  }
}

/// Distance from `point` to the line through the origin along `direction`.
pub fn perpendicular_distance(direction: &[f64], point: &[f64]) -> f64 {
  let norm = direction.iter().map(|d| d * d).sum::<f64>();
  if norm == 0.0 {
    return point.iter().map(|p| p * p).sum::<f64>().sqrt();
  }
  let dot = direction.iter().zip(point).map(|(d, p)| d * p).sum::<f64>();
  let scale = dot / norm;
  direction
    .iter()
    .zip(point)
    .map(|(d, p)| (p - scale * d).powi(2))
    .sum::<f64>()
    .sqrt()
}

impl<V, C> Truncation<V> for ReferencePointTruncation<C>
where
  C: DominanceComparator<V>,
{
  fn truncate<R: Rng>(
    &mut self,
    population: Population<V>,
    size: usize,
    rng: &mut R,
  ) -> Result<Population<V>> {
    population.check_objectives(self.objectives)?;

    let mut solutions = population.into_vec();
    let fronts = self.sorting.evaluate(&mut solutions);

    if solutions.len() <= size {
      let members = (0..solutions.len()).collect_vec();
      if !members.is_empty() {
        self.normalize(&mut solutions, &members);
        self.associate(&mut solutions, &members);
      }
      return Ok(solutions.into());
    }

    let mut kept = Vec::with_capacity(size);
    let mut critical = Vec::new();
    for front in fronts {
      if kept.len() + front.len() <= size {
        kept.extend(front);
      } else {
        critical = front;
        break;
      }
    }

    let members = kept.iter().chain(&critical).copied().collect_vec();
    self.normalize(&mut solutions, &members);
    self.associate(&mut solutions, &members);

    let mut niche_counts = vec![0usize; self.directions.len()];
    for &idx in &kept {
      if let Some(niche) = solutions[idx].niche() {
        niche_counts[niche] += 1;
      }
    }

    let mut exhausted = vec![false; self.directions.len()];
    let mut selected = Vec::with_capacity(size - kept.len());
    while kept.len() + selected.len() < size && !critical.is_empty() {
      let Some(min_count) = (0..self.directions.len())
        .filter(|&d| !exhausted[d])
        .map(|d| niche_counts[d])
        .min()
      else {
        break;
      };
      let least_represented = (0..self.directions.len())
        .filter(|&d| !exhausted[d] && niche_counts[d] == min_count)
        .collect_vec();
      let niche = least_represented[rng.gen_range(0..least_represented.len())];

      let candidates = (0..critical.len())
        .filter(|&pos| solutions[critical[pos]].niche() == Some(niche))
        .collect_vec();
      if candidates.is_empty() {
        exhausted[niche] = true;
        continue;
      }

      let pos = if niche_counts[niche] == 0 {
        let distance = |pos: &usize| {
          solutions[critical[*pos]]
            .attributes()
            .niche_distance
            .unwrap_or(f64::INFINITY)
        };
        candidates
          .iter()
          .copied()
          .min_by(|a, b| distance(a).total_cmp(&distance(b)))
          .unwrap_or(candidates[0])
      } else {
        candidates[rng.gen_range(0..candidates.len())]
      };

      selected.push(critical.remove(pos));
      niche_counts[niche] += 1;
    }

    debug!(
      "kept {} solutions, selected {} of the critical front by niching",
      kept.len(),
      selected.len()
    );

    Ok(take_indices(solutions, kept.into_iter().chain(selected)))
  }
}
