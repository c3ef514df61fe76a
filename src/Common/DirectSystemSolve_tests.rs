#[cfg(test)]
mod tests {
    use crate::Common::DirectSystemSolve::{
        is_positive_definite, solve_nxn_cholesky, solve_nxn_pivoted,
    };
    use crate::Common::errors::ReactionsError;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    #[test]
    fn test_pivoted_solve_3x3() {
        let a = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 2.0, -1.0, 1.0, 3.0, 4.0, 5.0]);
        let b = DVector::from_vec(vec![14.0, 3.0, 24.0]);
        let x = solve_nxn_pivoted(&a, &b).unwrap();
        assert_relative_eq!(x[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 4.0, epsilon = 1e-12);
        // inputs are untouched
        assert_eq!(a[(0, 0)], 1.0);
        assert_eq!(b[2], 24.0);
    }

    #[test]
    fn test_pivoted_solve_needs_pivoting() {
        // zero in the leading position forces a row exchange
        let a = DMatrix::from_row_slice(3, 3, &[0.0, 2.0, 1.0, 1.0, 1.0, 1.0, 4.0, -1.0, 2.0]);
        let x_expected = DVector::from_vec(vec![1.0, -2.0, 3.0]);
        let b = &a * &x_expected;
        let x = solve_nxn_pivoted(&a, &b).unwrap();
        for i in 0..3 {
            assert_relative_eq!(x[i], x_expected[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_pivoted_solve_singular() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        let result = solve_nxn_pivoted(&a, &b);
        assert!(matches!(result, Err(ReactionsError::SingularMatrix { .. })));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = DMatrix::<f64>::identity(3, 3);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(matches!(
            solve_nxn_pivoted(&a, &b),
            Err(ReactionsError::DimensionMismatch(_))
        ));
        assert!(matches!(
            solve_nxn_cholesky(&a, &b),
            Err(ReactionsError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_cholesky_solve_spd() {
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0],
        );
        let x_expected = DVector::from_vec(vec![0.5, -1.0, 2.0]);
        let b = &a * &x_expected;
        let x = solve_nxn_cholesky(&a, &b).unwrap();
        for i in 0..3 {
            assert_relative_eq!(x[i], x_expected[i], epsilon = 1e-10);
        }
        let x_pivoted = solve_nxn_pivoted(&a, &b).unwrap();
        for i in 0..3 {
            assert_relative_eq!(x[i], x_pivoted[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_cholesky_badly_scaled_diagonal() {
        // shape of the log-ratio extent Jacobian when a species sits at 1e-16
        let a = DMatrix::from_row_slice(2, 2, &[1.0e16, -2.0, -2.0, 4.0e16]);
        let b = DVector::from_vec(vec![37.5, 73.0]);
        let x = solve_nxn_cholesky(&a, &b).unwrap();
        let r = &a * &x - &b;
        assert!(r.norm() < 1e-12);
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        assert!(matches!(
            solve_nxn_cholesky(&a, &b),
            Err(ReactionsError::NotPositiveDefinite { row: 1 })
        ));
    }

    #[test]
    fn test_is_positive_definite() {
        let spd = DMatrix::from_row_slice(2, 2, &[2.0, -1.0, -1.0, 2.0]);
        assert!(is_positive_definite(&spd));
        let indefinite = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(!is_positive_definite(&indefinite));
        let negative = DMatrix::from_row_slice(1, 1, &[-3.0]);
        assert!(!is_positive_definite(&negative));
        let rectangular = DMatrix::<f64>::zeros(2, 3);
        assert!(!is_positive_definite(&rectangular));
    }
}
