//! Matching utilities between tracked objects and new centroids.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tracker::centroid::Centroid;

/// How tracked objects are paired with new centroids each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStrategy {
    /// Rows ordered by their nearest distance, each taking its nearest free column.
    #[default]
    Greedy,
    /// Minimum total distance, solved with LAPJV.
    Optimal,
}

/// Compute the Euclidean distance matrix between tracked and new centroids.
///
/// Rows follow `tracked`, columns follow `detected`.
pub fn distance_matrix(tracked: &[Centroid], detected: &[Centroid]) -> Array2<f64> {
    let mut dists = Array2::zeros((tracked.len(), detected.len()));
    for (i, t) in tracked.iter().enumerate() {
        for (j, d) in detected.iter().enumerate() {
            dists[[i, j]] = t.distance(d);
        }
    }
    dists
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// Accepted (row, column) pairs, in acceptance order.
    pub matches: Vec<(usize, usize)>,
    /// Rows left without a column, ascending.
    pub unmatched_rows: Vec<usize>,
    /// Columns left without a row, ascending.
    pub unmatched_cols: Vec<usize>,
}

impl AssignmentResult {
    fn from_matches(matches: Vec<(usize, usize)>, num_rows: usize, num_cols: usize) -> Self {
        let mut used_rows = vec![false; num_rows];
        let mut used_cols = vec![false; num_cols];
        for &(row, col) in &matches {
            used_rows[row] = true;
            used_cols[col] = true;
        }
        Self {
            matches,
            unmatched_rows: unused(&used_rows),
            unmatched_cols: unused(&used_cols),
        }
    }
}

fn unused(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { None } else { Some(i) })
        .collect()
}

/// Run the requested assignment strategy on a cost matrix.
pub fn assign(
    cost_matrix: &Array2<f64>,
    strategy: AssignmentStrategy,
) -> Result<AssignmentResult> {
    match strategy {
        AssignmentStrategy::Greedy => Ok(greedy_assignment(cost_matrix)),
        AssignmentStrategy::Optimal => linear_assignment(cost_matrix),
    }
}

/// Greedy minimum-distance assignment.
///
/// Each row proposes only its nearest column (first one on ties). Rows are
/// visited by ascending nearest distance with a stable sort, so equal
/// distances keep the lower row first. A proposal is dropped when its row or
/// column was already taken, so a row whose nearest column is gone stays
/// unmatched even if other columns are free.
pub fn greedy_assignment(cost_matrix: &Array2<f64>) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::from_matches(vec![], num_rows, num_cols);
    }

    let mut proposals: Vec<(usize, usize, f64)> = cost_matrix
        .outer_iter()
        .enumerate()
        .map(|(row, costs)| {
            let mut best_col = 0;
            let mut best = costs[0];
            for (col, &c) in costs.iter().enumerate().skip(1) {
                if c < best {
                    best = c;
                    best_col = col;
                }
            }
            (row, best_col, best)
        })
        .collect();

    proposals.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut used_rows = vec![false; num_rows];
    let mut used_cols = vec![false; num_cols];
    let mut matches = Vec::new();

    for (row, col, _) in proposals {
        if used_rows[row] || used_cols[col] {
            continue;
        }
        used_rows[row] = true;
        used_cols[col] = true;
        matches.push((row, col));
    }

    AssignmentResult::from_matches(matches, num_rows, num_cols)
}

/// Minimum total-cost assignment via LAPJV on a padded square matrix.
///
/// Every row is matched when `rows <= cols` and every column when
/// `cols <= rows`. Matches are reported in row order.
///
/// A solver failure is returned as [`Error::Assignment`]. A square matrix of
/// finite costs always has a solution, so this only happens on NaN or
/// infinite input, which validated centroids never produce.
pub fn linear_assignment(cost_matrix: &Array2<f64>) -> Result<AssignmentResult> {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return Ok(AssignmentResult::from_matches(vec![], num_rows, num_cols));
    }

    let max_cost = cost_matrix.iter().cloned().fold(0.0_f64, f64::max);
    let pad = max_cost * 2.0 + 1.0;

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), pad);
    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = cost_matrix[[i, j]];
        }
    }

    let (row_to_col, _) =
        lapjv::lapjv(&padded).map_err(|e| Error::Assignment(format!("{e:?}")))?;

    let matches = row_to_col
        .iter()
        .enumerate()
        .take(num_rows)
        .filter(|&(_, &col)| col < num_cols)
        .map(|(row, &col)| (row, col))
        .collect();

    Ok(AssignmentResult::from_matches(matches, num_rows, num_cols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_distance_matrix_shape_and_values() {
        let tracked = [Centroid::new(0, 0), Centroid::new(10, 0)];
        let detected = [Centroid::new(3, 4), Centroid::new(10, 0), Centroid::new(0, 0)];
        let d = distance_matrix(&tracked, &detected);
        assert_eq!(d.dim(), (2, 3));
        assert_eq!(d[[0, 0]], 5.0);
        assert_eq!(d[[1, 1]], 0.0);
        assert_eq!(d[[0, 2]], 0.0);
        assert_eq!(d[[1, 2]], 10.0);
    }

    #[test]
    fn test_greedy_orders_by_row_minimum() {
        let cost = array![
            [0.5, 0.9, 0.8],
            [0.9, 0.3, 0.7],
            [0.8, 0.7, 0.4],
        ];
        let result = greedy_assignment(&cost);
        assert_eq!(result.matches, vec![(1, 1), (2, 2), (0, 0)]);
        assert!(result.unmatched_rows.is_empty());
        assert!(result.unmatched_cols.is_empty());
    }

    #[test]
    fn test_greedy_loser_stays_unmatched() {
        // Both rows prefer column 0; row 1 does not fall back to column 1.
        let cost = array![[1.0, 50.0], [2.0, 3.0]];
        let result = greedy_assignment(&cost);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_rows, vec![1]);
        assert_eq!(result.unmatched_cols, vec![1]);
    }

    #[test]
    fn test_greedy_row_tie_prefers_lower_row() {
        let cost = array![[4.0, 9.0], [4.0, 9.0]];
        let result = greedy_assignment(&cost);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_rows, vec![1]);
    }

    #[test]
    fn test_greedy_column_tie_prefers_lower_column() {
        let cost = array![[2.0, 2.0, 2.0]];
        let result = greedy_assignment(&cost);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_cols, vec![1, 2]);
    }

    #[test]
    fn test_greedy_more_columns() {
        let cost = array![[0.5, 2.0, 3.0, 1.0], [1.8, 0.6, 2.5, 2.2]];
        let result = greedy_assignment(&cost);
        assert_eq!(result.matches, vec![(0, 0), (1, 1)]);
        assert_eq!(result.unmatched_cols, vec![2, 3]);
    }

    #[test]
    fn test_empty_matrices() {
        let rows_only = Array2::<f64>::zeros((3, 0));
        let result = greedy_assignment(&rows_only);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_rows, vec![0, 1, 2]);
        assert!(result.unmatched_cols.is_empty());

        let cols_only = Array2::<f64>::zeros((0, 2));
        let result = linear_assignment(&cols_only).unwrap();
        assert!(result.matches.is_empty());
        assert!(result.unmatched_rows.is_empty());
        assert_eq!(result.unmatched_cols, vec![0, 1]);
    }

    #[test]
    fn test_optimal_differs_from_greedy() {
        // Greedy: row 0 takes col 0 (1.0), row 1 loses col 0 -> one match.
        // Optimal: 2.0 + 2.0 beats 1.0 + 10.0.
        let cost = array![[1.0, 2.0], [2.0, 10.0]];
        let greedy = greedy_assignment(&cost);
        assert_eq!(greedy.matches, vec![(0, 0)]);

        // The optimal strategy must never quietly hand back the greedy pairing.
        let optimal = assign(&cost, AssignmentStrategy::Optimal).unwrap();
        assert_ne!(optimal, greedy);
        assert_eq!(optimal.matches, vec![(0, 1), (1, 0)]);
        assert!(optimal.unmatched_rows.is_empty());
        assert!(optimal.unmatched_cols.is_empty());
    }

    #[test]
    fn test_optimal_rectangular() {
        let cost = array![[5.0, 1.0, 9.0], [1.0, 5.0, 9.0]];
        let result = assign(&cost, AssignmentStrategy::Optimal).unwrap();
        assert_eq!(result.matches, vec![(0, 1), (1, 0)]);
        assert_eq!(result.unmatched_cols, vec![2]);

        let tall = array![[5.0], [1.0], [3.0]];
        let result = assign(&tall, AssignmentStrategy::Optimal).unwrap();
        assert_eq!(result.matches, vec![(1, 0)]);
        assert_eq!(result.unmatched_rows, vec![0, 2]);
    }

}
