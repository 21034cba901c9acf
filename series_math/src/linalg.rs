//! Dense linear system solver
//!
//! Small systems only: the AR normal equations and the Yule-Walker systems
//! behind the partial autocorrelation are at most a few dozen unknowns.

use crate::{MathError, Result};

/// Pivots with a magnitude below this are treated as zero.
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Outcome of a numerical fit that may not have a usable solution.
///
/// A singular system is not an input error: it is reported as `Degenerate` so
/// callers can fall back to a simpler model instead of aborting.
#[derive(Debug, Clone, PartialEq)]
pub enum FitOutcome<T> {
    Success(T),
    Degenerate,
}

impl<T> FitOutcome<T> {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, FitOutcome::Degenerate)
    }

    /// Convert into an `Option`, dropping the degenerate case.
    pub fn success(self) -> Option<T> {
        match self {
            FitOutcome::Success(value) => Some(value),
            FitOutcome::Degenerate => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FitOutcome<U> {
        match self {
            FitOutcome::Success(value) => FitOutcome::Success(f(value)),
            FitOutcome::Degenerate => FitOutcome::Degenerate,
        }
    }

    pub fn and_then<U, F: FnOnce(T) -> FitOutcome<U>>(self, f: F) -> FitOutcome<U> {
        match self {
            FitOutcome::Success(value) => f(value),
            FitOutcome::Degenerate => FitOutcome::Degenerate,
        }
    }
}

impl FitOutcome<Vec<f64>> {
    /// The lenient solver contract: a degenerate system reads as all zeros.
    pub fn unwrap_or_zeros(self, len: usize) -> Vec<f64> {
        match self {
            FitOutcome::Success(values) => values,
            FitOutcome::Degenerate => vec![0.0; len],
        }
    }
}

/// Solve `A·x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `FitOutcome::Degenerate` when some column has no pivot larger than
/// [`PIVOT_EPSILON`]. Shape mismatches are input errors.
pub fn solve(a: &[Vec<f64>], b: &[f64]) -> Result<FitOutcome<Vec<f64>>> {
    let n = b.len();
    if n == 0 {
        return Err(MathError::InvalidInput(
            "Cannot solve an empty linear system".to_string(),
        ));
    }
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Matrix must be {}x{} to match the right-hand side",
            n, n
        )));
    }

    // Augmented matrix [A | b]
    let mut aug: Vec<Vec<f64>> = a
        .iter()
        .zip(b.iter())
        .map(|(row, &rhs)| {
            let mut r = row.clone();
            r.push(rhs);
            r
        })
        .collect();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| aug[i][col].abs().total_cmp(&aug[j][col].abs()))
            .unwrap_or(col);

        if aug[pivot_row][col].abs() < PIVOT_EPSILON {
            return Ok(FitOutcome::Degenerate);
        }
        aug.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = aug[row][col] / aug[col][col];
            if factor == 0.0 {
                continue;
            }
            for j in col..=n {
                aug[row][j] -= factor * aug[col][j];
            }
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| aug[i][j] * x[j]).sum();
        x[i] = (aug[i][n] - tail) / aug[i][i];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Ok(FitOutcome::Degenerate);
    }

    Ok(FitOutcome::Success(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_solve_two_by_two() {
        // 2x + y = 5, x + 3y = 10  =>  x = 1, y = 3
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];

        let x = solve(&a, &b).unwrap().success().unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_needs_row_swap() {
        // Zero in the leading position forces a pivot swap
        let a = vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ];
        let b = vec![5.0, 4.0, 3.0];

        let x = solve(&a, &b).unwrap().success().unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_system_is_degenerate() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let b = vec![3.0, 6.0];

        let outcome = solve(&a, &b).unwrap();
        assert!(outcome.is_degenerate());
        assert_eq!(outcome.unwrap_or_zeros(2), vec![0.0, 0.0]);
    }

    #[test]
    fn test_zero_solution_is_not_degenerate() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let b = vec![0.0, 0.0];

        let outcome = solve(&a, &b).unwrap();
        assert_eq!(outcome, FitOutcome::Success(vec![0.0, 0.0]));
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let a = vec![vec![1.0, 0.0]];
        let b = vec![1.0, 2.0];
        assert!(solve(&a, &b).is_err());
        assert!(solve(&[], &[]).is_err());
    }
}
