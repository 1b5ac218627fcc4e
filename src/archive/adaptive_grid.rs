//! Bounded archive that thins crowded regions of objective space, as used by
//! PAES and PESA-II.
//!
//! The archive's bounding box is split `2^B` times along every objective,
//! `B` being the number of bisections. When the archive overflows, a member
//! of the most populated cell is evicted, unless the entrant itself landed
//! in such a cell, in which case the entrant is dropped.

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{is_rejected, purge_dominated, Archive, DuplicateMode};
use crate::{
  dominance::{DominanceComparator, ParetoDominanceComparator},
  error::{Error, Result},
  population::Population,
  solution::Solution,
};

/// Adaptive grid archive.
///
/// With the `serde` feature, only members and configuration are written.
/// Reading them back validates the configuration like
/// [`AdaptiveGridArchive::with_comparator`] and rebuilds the grid.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GridState<V, C>"))]
pub struct AdaptiveGridArchive<V = (), C = ParetoDominanceComparator> {
  solutions: Population<V>,
  comparator: C,
  capacity: usize,
  objectives: usize,
  bisections: u32,
  duplicate_mode: DuplicateMode,
  // lower and upper bounds of the grid, `None` while the archive is empty
  #[cfg_attr(feature = "serde", serde(skip_serializing))]
  bounds: Option<(Vec<f64>, Vec<f64>)>,
  // number of members per occupied cell
  #[cfg_attr(feature = "serde", serde(skip_serializing))]
  density: HashMap<usize, usize>,
}

// serialized form of the archive, validated before it becomes one
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct GridState<V, C> {
  solutions: Population<V>,
  comparator: C,
  capacity: usize,
  objectives: usize,
  bisections: u32,
  #[serde(default)]
  duplicate_mode: DuplicateMode,
}

#[cfg(feature = "serde")]
impl<V, C> TryFrom<GridState<V, C>> for AdaptiveGridArchive<V, C> {
  type Error = Error;

  fn try_from(state: GridState<V, C>) -> Result<Self> {
    let mut archive = Self::with_comparator(
      state.capacity,
      state.objectives,
      state.bisections,
      state.comparator,
    )?
    .with_duplicate_mode(state.duplicate_mode);
    if state.solutions.len() > archive.capacity {
      return Err(Error::InvalidArgument(format!(
        "{} members exceed capacity {}",
        state.solutions.len(),
        archive.capacity
      )));
    }
    if state.solutions.iter().any(Solution::has_undefined_objectives) {
      return Err(Error::InvalidArgument(
        "members with undefined objectives".into(),
      ));
    }
    state.solutions.check_objectives(archive.objectives)?;

    archive.solutions = state.solutions;
    archive.adapt_grid();
    Ok(archive)
  }
}

impl<V> AdaptiveGridArchive<V> {
  /// Creates an empty archive holding at most `capacity` solutions with
  /// `objectives` objectives, splitting every objective `2^bisections` times.
  ///
  /// # Errors
  ///
  /// Returns an error if `capacity` or `objectives` is `0`, or if the grid
  /// would have more cells than `usize` can index, see
  /// [`maximum_bisections`].
  pub fn new(
    capacity: usize,
    objectives: usize,
    bisections: u32,
  ) -> Result<Self> {
    Self::with_comparator(
      capacity,
      objectives,
      bisections,
      ParetoDominanceComparator,
    )
  }
}

impl<V, C> AdaptiveGridArchive<V, C> {
  /// Creates an empty archive using a custom dominance comparator. See
  /// [`AdaptiveGridArchive::new`].
  pub fn with_comparator(
    capacity: usize,
    objectives: usize,
    bisections: u32,
    comparator: C,
  ) -> Result<Self> {
    if capacity == 0 {
      return Err(Error::InvalidArgument("capacity must be positive".into()));
    }
    if objectives == 0 {
      return Err(Error::InvalidArgument(
        "number of objectives must be positive".into(),
      ));
    }
    if bisections > maximum_bisections(objectives) {
      return Err(Error::GridTooLarge {
        bisections,
        objectives,
      });
    }

    Ok(Self {
      solutions: Population::with_capacity(capacity + 1),
      comparator,
      capacity,
      objectives,
      bisections,
      duplicate_mode: DuplicateMode::default(),
      bounds: None,
      density: HashMap::new(),
    })
  }

  /// Sets duplicate handling, [`DuplicateMode::NoDuplicates`] by default.
  pub fn with_duplicate_mode(mut self, duplicate_mode: DuplicateMode) -> Self {
    self.duplicate_mode = duplicate_mode;
    self
  }

  /// Returns duplicate handling.
  pub fn duplicate_mode(&self) -> DuplicateMode {
    self.duplicate_mode
  }

  /// Returns the maximum number of members.
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Returns the number of bisections per objective.
  pub fn bisections(&self) -> u32 {
    self.bisections
  }

  /// Returns the number of cells per objective, `2^bisections`.
  pub fn divisions(&self) -> usize {
    1 << self.bisections
  }

  /// Returns the current lower and upper grid bounds.
  pub fn bounds(&self) -> Option<(&[f64], &[f64])> {
    self
      .bounds
      .as_ref()
      .map(|(lower, upper)| (lower.as_slice(), upper.as_slice()))
  }

  /// Returns the index of the cell containing `solution`, or `None` if it
  /// lies outside the grid. Values on the upper bound belong to the last
  /// cell.
  pub fn find_index(&self, solution: &Solution<V>) -> Option<usize> {
    let (lower, upper) = self.bounds.as_ref()?;
    let divisions = self.divisions();
    let mut index = 0;
    let mut stride = 1;

    let objectives = solution.objectives().iter().take(self.objectives);
    for (i, &value) in objectives.enumerate() {
      if !(lower[i] <= value && value <= upper[i]) {
        return None;
      }
      let range = upper[i] - lower[i];
      let cell = if range > 0.0 {
        let cell = divisions as f64 * (value - lower[i]) / range;
        (cell as usize).min(divisions - 1)
      } else {
        0
      };
      index += cell * stride;
      stride *= divisions;
    }
    Some(index)
  }

  /// Returns the number of members in cell `index`.
  pub fn density(&self, index: usize) -> usize {
    self.density.get(&index).copied().unwrap_or(0)
  }

  /// Moves members out of the archive.
  pub fn into_population(self) -> Population<V> {
    self.solutions
  }

  // recomputes bounds from current members and recounts every cell
  fn adapt_grid(&mut self) {
    self.bounds = self
      .solutions
      .lower_bounds()
      .zip(self.solutions.upper_bounds());
    self.density.clear();
    let cells = self
      .solutions
      .iter()
      .filter_map(|s| self.find_index(s))
      .collect_vec();
    for cell in cells {
      *self.density.entry(cell).or_insert(0) += 1;
    }
    debug!("adapted grid bounds to {:?}", self.bounds);
  }

  // decrements density of the cell `solution` occupied. returns `true` if the
  // cell became empty
  fn leave_cell(&mut self, solution: &Solution<V>) -> bool {
    let Some(cell) = self.find_index(solution) else {
      return true;
    };
    match self.density.get_mut(&cell) {
      Some(count) if *count > 1 => {
        *count -= 1;
        false
      }
      _ => {
        self.density.remove(&cell);
        true
      }
    }
  }

  // index of the first member in a cell of maximum density
  fn densest_member(&self) -> Option<usize> {
    self
      .solutions
      .iter()
      .map(|s| self.find_index(s).map_or(0, |cell| self.density(cell)))
      .enumerate()
      .fold(None, |best: Option<(usize, usize)>, (idx, density)| match best {
        Some((_, best_density)) if best_density >= density => best,
        _ => Some((idx, density)),
      })
      .map(|(idx, _)| idx)
  }
}

/// Returns the largest number of bisections for which `(2^B)^objectives`
/// cells can be indexed by `usize`.
pub fn maximum_bisections(objectives: usize) -> u32 {
  (usize::BITS - 1) / objectives.max(1) as u32
}

impl<V, C> Archive<V> for AdaptiveGridArchive<V, C>
where
  C: DominanceComparator<V>,
{
  fn add(&mut self, solution: Solution<V>) -> bool {
    if solution.has_undefined_objectives()
      || solution.number_of_objectives() != self.objectives
      || is_rejected(
        &self.comparator,
        &self.solutions,
        &solution,
        self.duplicate_mode,
      )
    {
      return false;
    }

    let purged =
      purge_dominated(&self.comparator, &mut self.solutions, &solution);
    let mut emptied = false;
    for member in &purged {
      emptied |= self.leave_cell(member);
    }

    let cell = self.find_index(&solution);
    self.solutions.push(solution);
    match cell {
      Some(cell) if !emptied => *self.density.entry(cell).or_insert(0) += 1,
      _ => self.adapt_grid(),
    }

    if self.solutions.len() <= self.capacity {
      return true;
    }

    let last = self.solutions.len() - 1;
    let Some(densest) = self.densest_member() else {
      return true;
    };
    let density_of = |archive: &Self, idx: usize| {
      archive
        .find_index(&archive.solutions[idx])
        .map_or(0, |cell| archive.density(cell))
    };
    let accepted = density_of(self, last) < density_of(self, densest);
    let evicted = if accepted { densest } else { last };

    let removed = self.solutions.remove(evicted);
    if self.leave_cell(&removed) {
      self.adapt_grid();
    }
    accepted
  }

  fn solutions(&self) -> &[Solution<V>] {
    &self.solutions
  }
}
