//! Implementation of the [Fast Non-Dominated Sort Algorithm][1].
//! Time complexity is `O(M * N^2)`, where `M` is the number of objectives
//! and `N` the number of solutions.
//!
//! Sorting partitions solutions into ranked fronts: rank `0` holds every
//! solution no other solution dominates, rank `1` those dominated only by
//! rank `0` members, and so on. Ranking also assigns crowding distance
//! within each front.
//!
//! [1]: https://www.iitk.ac.in/kangal/Deb_NSGA-II.pdf

use std::cmp::Ordering;

use crate::{
  crowding,
  dominance::{DominanceComparator, ParetoDominanceComparator},
  solution::{objective_distance, Solution},
  EPS,
};

/// Indices of solutions belonging to one front.
pub type Front = Vec<usize>;

// index of solution in a slice of solutions
type SolutionIndex = usize;
// number of solution's dominators
type DominanceCounter = usize;
// dominated by each solution solutions' indices
type DominanceList = Vec<SolutionIndex>;

/// Fast non-dominated sorting parametrized by a dominance comparator.
#[derive(Clone, Copy, Debug, Default)]
pub struct NondominatedSorting<C = ParetoDominanceComparator> {
  comparator: C,
}

impl NondominatedSorting {
  /// Creates sorting with [`ParetoDominanceComparator`].
  pub fn new() -> Self {
    Self::default()
  }
}

impl<C> NondominatedSorting<C> {
  /// Creates sorting with a custom comparator.
  pub fn with_comparator(comparator: C) -> Self {
    Self { comparator }
  }

  /// Returns the comparator in use.
  pub fn comparator(&self) -> &C {
    &self.comparator
  }

  /// Partitions `solutions` into fronts without annotating them. Front `i`
  /// holds indices of solutions of rank `i`, in increasing index order.
  pub fn fronts<V>(&self, solutions: &[Solution<V>]) -> Vec<Front>
  where
    C: DominanceComparator<V>,
  {
    let n = solutions.len();
    let mut dominance_lists: Vec<DominanceList> = vec![Vec::new(); n];
    let mut dominance_counters: Vec<DominanceCounter> = vec![0; n];

    // for each unique pair of solutions `p` and `q`...
    for p_idx in 0..n {
      for q_idx in p_idx + 1..n {
        match self.comparator.compare(&solutions[p_idx], &solutions[q_idx]) {
          // `p` dominates `q`
          Ordering::Less => {
            dominance_lists[p_idx].push(q_idx);
            dominance_counters[q_idx] += 1;
          }
          // `q` dominates `p`
          Ordering::Greater => {
            dominance_lists[q_idx].push(p_idx);
            dominance_counters[p_idx] += 1;
          }
          Ordering::Equal => {}
        }
      }
    }

    let mut assigned = vec![false; n];
    let mut remaining = n;
    let mut fronts = Vec::new();
    let mut current: Front =
      (0..n).filter(|&idx| dominance_counters[idx] == 0).collect();

    while remaining > 0 {
      if current.is_empty() {
        // only reachable with a cyclic (non-transitive) comparator: break the
        // cycle by promoting the least dominated of the remaining solutions
        let min = (0..n)
          .filter(|&idx| !assigned[idx])
          .map(|idx| dominance_counters[idx])
          .min()
          .unwrap_or(0);
        current = (0..n)
          .filter(|&idx| !assigned[idx] && dominance_counters[idx] == min)
          .collect();
      }

      let mut next = Vec::new();
      for &p_idx in &current {
        assigned[p_idx] = true;
        remaining -= 1;
      }
      for &p_idx in &current {
        for &q_idx in &dominance_lists[p_idx] {
          if assigned[q_idx] || dominance_counters[q_idx] == 0 {
            continue;
          }
          dominance_counters[q_idx] -= 1;
          if dominance_counters[q_idx] == 0 {
            next.push(q_idx);
          }
        }
      }
      next.sort_unstable();
      fronts.push(std::mem::replace(&mut current, next));
    }

    fronts
  }

  /// Ranks `solutions`, assigning rank and crowding distance to every one
  /// of them, and returns the fronts.
  ///
  /// Within a front, a solution whose objectives duplicate an earlier
  /// member's gets crowding distance `0` and is left out of the crowding
  /// computation of that front.
  pub fn evaluate<V>(&self, solutions: &mut [Solution<V>]) -> Vec<Front>
  where
    C: DominanceComparator<V>,
  {
    let fronts = self.fronts(solutions);

    for (rank, front) in fronts.iter().enumerate() {
      for &idx in front {
        solutions[idx].attributes_mut().rank = Some(rank);
      }
      assign_front_crowding(solutions, front);
    }

    fronts
  }
}

/// Assigns crowding distance within `front`. Duplicates of an earlier member
/// get `0` and take no part in the computation.
pub(crate) fn assign_front_crowding<V>(
  solutions: &mut [Solution<V>],
  front: &[usize],
) {
  let mut unique: Front = Vec::with_capacity(front.len());
  for &idx in front {
    let is_duplicate = unique
      .iter()
      .any(|&u| objective_distance(&solutions[idx], &solutions[u]) < EPS);
    if is_duplicate {
      solutions[idx].attributes_mut().crowding_distance = Some(0.0);
    } else {
      unique.push(idx);
    }
  }
  crowding::assign(solutions, &unique);
}

/// Ranks `solutions` with [`ParetoDominanceComparator`]. See
/// [`NondominatedSorting::evaluate`].
pub fn rank<V>(solutions: &mut [Solution<V>]) -> Vec<Front> {
  NondominatedSorting::new().evaluate(solutions)
}

/// Orders solutions by rank, then by crowding distance, larger first.
/// Unranked solutions come last.
pub fn rank_then_crowding<V>(a: &Solution<V>, b: &Solution<V>) -> Ordering {
  let key = |s: &Solution<V>| s.rank().unwrap_or(usize::MAX);
  key(a).cmp(&key(b)).then_with(|| crowding::descending(a, b))
}
