#[cfg(test)]
mod tests {
    use crate::Common::NonlinearSolvers::{NewtonConfig, NewtonStatus, newton_raphson};
    use crate::Common::errors::ReactionsError;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    #[test]
    fn test_newton_scalar_sqrt2() {
        let mut x = DVector::from_vec(vec![1.0]);
        let report = newton_raphson(
            &mut x,
            |x, r, j| {
                r[0] = x[0] * x[0] - 2.0;
                j[(0, 0)] = 2.0 * x[0];
                Ok(())
            },
            &NewtonConfig::default(),
        )
        .unwrap();
        assert!(report.is_converged());
        assert!(report.iterations <= 6);
        assert_relative_eq!(x[0], 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_newton_2x2_system() {
        // x^2 + y^2 = 4, x - y = 0
        let mut x = DVector::from_vec(vec![1.0, 0.5]);
        let report = newton_raphson(
            &mut x,
            |x, r, j| {
                r[0] = x[0] * x[0] + x[1] * x[1] - 4.0;
                r[1] = x[0] - x[1];
                j[(0, 0)] = 2.0 * x[0];
                j[(0, 1)] = 2.0 * x[1];
                j[(1, 0)] = 1.0;
                j[(1, 1)] = -1.0;
                Ok(())
            },
            &NewtonConfig::new(25, 1e-12),
        )
        .unwrap();
        assert_eq!(report.status, NewtonStatus::Converged);
        assert_relative_eq!(x[0], 2.0_f64.sqrt(), epsilon = 1e-10);
        assert_relative_eq!(x[1], 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_newton_reports_max_iterations() {
        // exp(x) = 0 has no root: the iterate keeps drifting left
        let mut x = DVector::from_vec(vec![0.0]);
        let config = NewtonConfig::new(5, 1e-14);
        let report = newton_raphson(
            &mut x,
            |x, r, j| {
                r[0] = x[0].exp();
                j[(0, 0)] = x[0].exp();
                Ok(())
            },
            &config,
        )
        .unwrap();
        assert_eq!(report.status, NewtonStatus::MaxIterationsReached);
        assert_eq!(report.iterations, 5);
        assert_relative_eq!(x[0], -5.0, epsilon = 1e-12);
        // the norm belongs to the returned iterate
        assert_relative_eq!(report.residual_norm, (-5.0f64).exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_newton_checks_the_last_update() {
        // one update solves x - 3 = 0 exactly; it must be reported as converged
        let mut x = DVector::from_vec(vec![0.0]);
        let mut evaluations = 0;
        let report = newton_raphson(
            &mut x,
            |x, r, j| {
                evaluations += 1;
                r[0] = x[0] - 3.0;
                j[(0, 0)] = 1.0;
                Ok(())
            },
            &NewtonConfig::new(1, 1e-10),
        )
        .unwrap();
        assert_eq!(report.status, NewtonStatus::Converged);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.residual_norm, 0.0);
        assert_eq!(x[0], 3.0);
        assert_eq!(evaluations, 2);
    }

    #[test]
    fn test_newton_propagates_callback_error() {
        let mut x = DVector::from_vec(vec![0.0]);
        let result = newton_raphson(
            &mut x,
            |_, _, _| Err(ReactionsError::InvalidConfiguration("boom".to_string())),
            &NewtonConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_newton_singular_jacobian_is_error() {
        let mut x = DVector::from_vec(vec![1.0]);
        let result = newton_raphson(
            &mut x,
            |_, r: &mut DVector<f64>, j: &mut DMatrix<f64>| {
                r[0] = 1.0;
                j[(0, 0)] = 0.0;
                Ok(())
            },
            &NewtonConfig::default(),
        );
        assert!(matches!(result, Err(ReactionsError::SingularMatrix { .. })));
    }

    #[test]
    fn test_newton_config_validate() {
        assert!(NewtonConfig::default().validate().is_ok());
        assert!(NewtonConfig::new(0, 1e-10).validate().is_err());
        assert!(NewtonConfig::new(10, 0.0).validate().is_err());
        assert!(NewtonConfig::new(10, f64::NAN).validate().is_err());
    }
}
