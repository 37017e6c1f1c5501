//! Optimal one-to-one speaker mapping.

/// Finds the one-to-one assignment of rows to columns that maximizes the sum of the selected
/// entries of `overlap` (Hungarian algorithm).
///
/// `overlap` is a row-major matrix with `rows` rows; all rows must have the same length.
/// Returns `(row, column)` pairs, sorted by row. Pairs whose overlap is zero are left out, so
/// rows or columns without any co-activity stay unmapped.
pub fn optimal_mapping(overlap: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let rows = overlap.len();
    let columns = overlap.first().map_or(0, Vec::len);
    if rows == 0 || columns == 0 {
        return Vec::new();
    }

    // Square cost matrix, 1-based, padded with zeros. Minimizing -overlap maximizes overlap.
    let size = rows.max(columns);
    let cost = |i: usize, j: usize| -> f64 {
        overlap
            .get(i - 1)
            .and_then(|row| row.get(j - 1))
            .map_or(0.0, |value| -value)
    };

    let mut u = vec![0.0; size + 1];
    let mut v = vec![0.0; size + 1];
    let mut assigned_row = vec![0usize; size + 1];
    let mut way = vec![0usize; size + 1];

    for i in 1..=size {
        assigned_row[0] = i;
        let mut j0 = 0;
        let mut min_slack = vec![f64::INFINITY; size + 1];
        let mut used = vec![false; size + 1];

        loop {
            used[j0] = true;
            let i0 = assigned_row[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=size {
                if used[j] {
                    continue;
                }
                let slack = cost(i0, j) - u[i0] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=size {
                if used[j] {
                    u[assigned_row[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if assigned_row[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            assigned_row[j0] = assigned_row[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs: Vec<_> = (1..=size)
        .filter_map(|j| {
            let i = assigned_row[j];
            (i >= 1 && i <= rows && j <= columns && overlap[i - 1][j - 1] > 0.0)
                .then_some((i - 1, j - 1))
        })
        .collect();
    pairs.sort_unstable();
    pairs
}
