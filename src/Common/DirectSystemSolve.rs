//! Dense direct solvers for small systems (N is the number of primary species or of
//! reactions, usually well below 30). The Jacobians assembled by the equilibrium and kinetic
//! solvers land here once per Newton iteration.
use crate::Common::errors::ReactionsError;
use nalgebra::{DMatrix, DVector};

fn check_square_system(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<usize, ReactionsError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(ReactionsError::DimensionMismatch(format!(
            "matrix must be square, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }
    if b.len() != n {
        return Err(ReactionsError::DimensionMismatch(format!(
            "right-hand side has length {}, matrix has {} rows",
            b.len(),
            n
        )));
    }
    Ok(n)
}

/// Solves `A x = b` by Gaussian elimination with partial pivoting.
///
/// Rows are never moved in memory: the elimination order is kept in a permutation array and
/// every row access goes through it. `A` and `b` are copied since elimination overwrites them.
pub fn solve_nxn_pivoted(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<DVector<f64>, ReactionsError> {
    let n = check_square_system(a, b)?;
    let mut a = a.clone();
    let mut b = b.clone();
    let mut pivot: Vec<usize> = (0..n).collect();

    //////////////////////////////FORWARD ELIMINATION//////////////////////////////
    for k in 0..n.saturating_sub(1) {
        let mut max_row = k;
        let mut max_val = a[(pivot[k], k)].abs();
        for i in (k + 1)..n {
            let candidate = a[(pivot[i], k)].abs();
            if candidate > max_val {
                max_val = candidate;
                max_row = i;
            }
        }
        pivot.swap(k, max_row);

        let pk = pivot[k];
        let diagonal = a[(pk, k)];
        if diagonal == 0.0 {
            return Err(ReactionsError::SingularMatrix { row: k });
        }
        for i in (k + 1)..n {
            let pi = pivot[i];
            let factor = a[(pi, k)] / diagonal;
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                let a_kj = a[(pk, j)];
                a[(pi, j)] -= factor * a_kj;
            }
            let b_k = b[pk];
            b[pi] -= factor * b_k;
        }
    }

    //////////////////////////////BACK SUBSTITUTION//////////////////////////////
    let mut x = DVector::zeros(n);
    for i in (0..n).rev() {
        let pi = pivot[i];
        let diagonal = a[(pi, i)];
        if diagonal == 0.0 {
            return Err(ReactionsError::SingularMatrix { row: i });
        }
        let mut sum = b[pi];
        for j in (i + 1)..n {
            sum -= a[(pi, j)] * x[j];
        }
        x[i] = sum / diagonal;
    }
    Ok(x)
}

/// Solves `A x = b` for symmetric positive definite `A`.
///
/// The lower triangle of a copy of `A` is overwritten with the Cholesky factor `L`, then
/// `L y = b` and `L^T x = y` are solved. Only the lower triangle of `A` is read.
pub fn solve_nxn_cholesky(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<DVector<f64>, ReactionsError> {
    let n = check_square_system(a, b)?;
    let mut l = a.clone();

    for j in 0..n {
        let mut diagonal = l[(j, j)];
        for k in 0..j {
            diagonal -= l[(j, k)] * l[(j, k)];
        }
        if !(diagonal > 0.0) || !diagonal.is_finite() {
            return Err(ReactionsError::NotPositiveDefinite { row: j });
        }
        let l_jj = diagonal.sqrt();
        l[(j, j)] = l_jj;
        for i in (j + 1)..n {
            let mut sum = l[(i, j)];
            for k in 0..j {
                sum -= l[(i, k)] * l[(j, k)];
            }
            l[(i, j)] = sum / l_jj;
        }
    }

    // L y = b
    let mut y = DVector::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[(i, k)] * y[k];
        }
        y[i] = sum / l[(i, i)];
    }
    // L^T x = y
    let mut x = DVector::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= l[(k, i)] * x[k];
        }
        x[i] = sum / l[(i, i)];
    }
    Ok(x)
}

/// Leading-minor test through Gaussian elimination without pivoting: a symmetric matrix is
/// positive definite when every pivot stays strictly positive.
///
/// Diagnostic only, the solvers never branch on it.
pub fn is_positive_definite(a: &DMatrix<f64>) -> bool {
    let n = a.nrows();
    if a.ncols() != n {
        return false;
    }
    let mut work = a.clone();
    for k in 0..n {
        let pivot = work[(k, k)];
        if !(pivot > 0.0) || !pivot.is_finite() {
            return false;
        }
        for i in (k + 1)..n {
            let factor = work[(i, k)] / pivot;
            for j in k..n {
                let a_kj = work[(k, j)];
                work[(i, j)] -= factor * a_kj;
            }
        }
    }
    true
}
