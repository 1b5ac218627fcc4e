//! Crowding distance, a density estimate used to break ties within a front.

use std::cmp::Ordering;

use crate::solution::Solution;

/// Assigns crowding distance to each solution whose index is in `front`.
///
/// Fronts of less than three solutions are all assigned `+infinity`. For
/// larger fronts, for each objective the extreme solutions get `+infinity`
/// and every interior solution accumulates `(next - previous) / (max - min)`,
/// with no contribution when `max == min`. Ties on an objective are ordered
/// by the remaining objectives, so the result does not depend on the order
/// of `front`.
pub fn assign<V>(solutions: &mut [Solution<V>], front: &[usize]) {
  let n = front.len();
  if n < 3 {
    for &idx in front {
      solutions[idx].attributes_mut().crowding_distance = Some(f64::INFINITY);
    }
    return;
  }

  let objective_num = solutions[front[0]].number_of_objectives();
  // distances are indexed by position in `front`
  let mut distances = vec![0.0; n];
  let mut order: Vec<usize> = (0..n).collect();

  for o_idx in 0..objective_num {
    let value = |pos: usize| solutions[front[pos]].objective(o_idx);
    order.sort_by(|&a, &b| {
      value(a).total_cmp(&value(b)).then_with(|| {
        lexicographic(
          solutions[front[a]].objectives(),
          solutions[front[b]].objectives(),
        )
      })
    });

    let first = order[0];
    let last = order[n - 1];
    distances[first] = f64::INFINITY;
    distances[last] = f64::INFINITY;

    let range = value(last) - value(first);
    if range > 0.0 && range.is_finite() {
      for k in 1..n - 1 {
        let gap = value(order[k + 1]) - value(order[k - 1]);
        distances[order[k]] += gap / range;
      }
    }
  }

  for (pos, &idx) in front.iter().enumerate() {
    solutions[idx].attributes_mut().crowding_distance = Some(distances[pos]);
  }
}

fn lexicographic(a: &[f64], b: &[f64]) -> Ordering {
  a.iter()
    .zip(b)
    .map(|(x, y)| x.total_cmp(y))
    .find(|ord| ord.is_ne())
    .unwrap_or(Ordering::Equal)
}

/// Orders solutions by crowding distance, larger first. Solutions without
/// a computed distance come last.
pub fn descending<V>(a: &Solution<V>, b: &Solution<V>) -> Ordering {
  let key =
    |s: &Solution<V>| s.crowding_distance().unwrap_or(f64::NEG_INFINITY);
  key(b).total_cmp(&key(a))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::population::Population;

  fn line() -> Population {
    [[1.0, 5.0], [2.0, 4.0], [3.0, 3.0], [4.0, 2.0], [5.0, 1.0]]
      .into_iter()
      .map(Solution::of)
      .collect()
  }

  #[test]
  fn test_boundaries_are_infinite() {
    let mut p = line();
    assign(&mut p, &[0, 1, 2, 3, 4]);
    assert_eq!(p[0].crowding_distance(), Some(f64::INFINITY));
    assert_eq!(p[4].crowding_distance(), Some(f64::INFINITY));

    let middle = p[2].crowding_distance().unwrap();
    assert!(middle.is_finite());
    for idx in [1, 3] {
      assert!(middle >= p[idx].crowding_distance().unwrap());
    }
    assert!((middle - 1.0).abs() < 1e-12);
  }

  #[test]
  fn test_small_fronts() {
    let mut p = line();
    assign(&mut p, &[1, 3]);
    assert_eq!(p[1].crowding_distance(), Some(f64::INFINITY));
    assert_eq!(p[3].crowding_distance(), Some(f64::INFINITY));
    assert_eq!(p[0].crowding_distance(), None);
  }

  #[test]
  fn test_zero_range_contributes_nothing() {
    let mut p: Population = [[1.0, 2.0], [2.0, 2.0], [3.0, 2.0], [4.0, 2.0]]
      .into_iter()
      .map(Solution::of)
      .collect();
    assign(&mut p, &[0, 1, 2, 3]);
    assert_eq!(p[1].crowding_distance(), Some(2.0 / 3.0));
    assert_eq!(p[2].crowding_distance(), Some(2.0 / 3.0));
  }

  #[test]
  fn test_idempotent_and_order_invariant() {
    let mut p = line();
    assign(&mut p, &[0, 1, 2, 3, 4]);
    let first: Vec<_> = p.iter().map(|s| s.crowding_distance()).collect();
    assign(&mut p, &[4, 2, 0, 3, 1]);
    let second: Vec<_> = p.iter().map(|s| s.crowding_distance()).collect();
    assert_eq!(first, second);

    let mut reversed: Population = line().into_iter().rev().collect();
    assign(&mut reversed, &[0, 1, 2, 3, 4]);
    let third: Vec<_> =
      reversed.iter().rev().map(|s| s.crowding_distance()).collect();
    assert_eq!(first, third);
  }

  #[test]
  fn test_descending_order() {
    let mut p = line();
    assign(&mut p, &[0, 1, 2, 3, 4]);
    p.sort_by(descending);
    assert!(p[0].crowding_distance().unwrap().is_infinite());
    assert!(p[1].crowding_distance().unwrap().is_infinite());
  }
}
