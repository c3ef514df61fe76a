#[cfg(test)]
mod tests {
    use crate::Common::errors::ReactionsError;
    use crate::Examples::example_systems::{carbonate_mixed, simple_test_system};
    use crate::Reactions::KineticReactions::RateLaw;
    use crate::Reactions::MixedReactions::MixedReactionsSolver;
    use crate::Reactions::Parameters::ReactionsParameters;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::DVector;

    const T: f64 = 298.15;

    /// S1 = 2 P1 at equilibrium, S1 -> P2 kinetic
    fn secondary_driven_system() -> ReactionsParameters {
        let rows = vec![vec![-1.0, 2.0, 0.0], vec![-1.0, 0.0, 1.0]];
        ReactionsParameters::from_rows(&rows, &[2.0, 3.0], &[1.0, 0.5], &[0.0, 0.0], 1).unwrap()
    }

    fn carbonate_initial_aggregate() -> DVector<f64> {
        DVector::from_vec(vec![0.376, 0.376, 0.0387, 0.0321, 1.89, 0.0165, 1.09])
    }

    #[test]
    fn test_effective_stoichiometry() {
        let solver = MixedReactionsSolver::new(&secondary_driven_system()).unwrap();
        let e = solver.effective_stoichiometry();
        assert_eq!(e.shape(), (1, 2));
        assert_eq!(e[(0, 0)], -2.0);
        assert_eq!(e[(0, 1)], 1.0);

        let solver = MixedReactionsSolver::new(&carbonate_mixed().unwrap()).unwrap();
        let expected = [-1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        for i in 0..7 {
            assert_eq!(solver.effective_stoichiometry()[(0, i)], expected[i]);
        }
    }

    #[test]
    fn test_update_mixed_system_against_finite_differences() {
        for rate_law in [RateLaw::MassActionDifference, RateLaw::Quotient] {
            let solver = MixedReactionsSolver::new(&secondary_driven_system())
                .unwrap()
                .with_rate_law(rate_law);
            let x = DVector::from_vec(vec![0.4f64, 0.3]).map(f64::ln);
            let state = solver.update_mixed_system(T, &x).unwrap();
            let h = 1e-6;
            for j in 0..2 {
                let mut plus = x.clone();
                let mut minus = x.clone();
                plus[j] += h;
                minus[j] -= h;
                let sp = solver.update_mixed_system(T, &plus).unwrap();
                let sm = solver.update_mixed_system(T, &minus).unwrap();
                let d_rate = (sp.reaction_rates[0] - sm.reaction_rates[0]) / (2.0 * h);
                assert_abs_diff_eq!(
                    state.d_reaction_rates_d_log_primary[(0, j)],
                    d_rate,
                    epsilon = 1e-7
                );
                for i in 0..2 {
                    let d_agg = (sp.aggregate[i] - sm.aggregate[i]) / (2.0 * h);
                    let d_agg_rate = (sp.aggregate_rates[i] - sm.aggregate_rates[i]) / (2.0 * h);
                    assert_abs_diff_eq!(state.d_aggregate_d_log_primary[(i, j)], d_agg, epsilon = 1e-7);
                    assert_abs_diff_eq!(
                        state.d_aggregate_rates_d_log_primary[(i, j)],
                        d_agg_rate,
                        epsilon = 1e-7
                    );
                }
            }
        }
    }

    #[test]
    fn test_carbonate_jacobian_against_finite_differences() {
        let solver = MixedReactionsSolver::new(&carbonate_mixed().unwrap()).unwrap();
        let x = carbonate_initial_aggregate().map(f64::ln);
        let state = solver.update_mixed_system(T, &x).unwrap();
        let h = 1e-6;
        for j in 0..7 {
            let mut plus = x.clone();
            let mut minus = x.clone();
            plus[j] += h;
            minus[j] -= h;
            let sp = solver.update_mixed_system(T, &plus).unwrap();
            let sm = solver.update_mixed_system(T, &minus).unwrap();
            for i in 0..7 {
                let numeric = (sp.aggregate_rates[i] - sm.aggregate_rates[i]) / (2.0 * h);
                let analytic = state.d_aggregate_rates_d_log_primary[(i, j)];
                assert_abs_diff_eq!(
                    analytic,
                    numeric,
                    epsilon = 1e-6 * (1.0 + analytic.abs())
                );
            }
        }
    }

    #[test]
    fn test_advance_relaxes_secondary_driven_system() {
        let solver = MixedReactionsSolver::new(&secondary_driven_system()).unwrap();
        let initial = DVector::from_vec(vec![1.0, 0.1]);
        let run = solver.advance(T, 1.0, 40, &initial).unwrap();
        assert!(run.equilibrium_report.is_converged());
        assert_eq!(run.reports.len(), 40);
        assert!(run.reports.iter().all(|r| r.is_converged()));
        assert_relative_eq!(run.time, 40.0, max_relative = 1e-12);

        // the kinetic reaction moves P1 and P2 along (-2, 1)
        assert_relative_eq!(
            run.aggregate[0] + 2.0 * run.aggregate[1],
            1.2,
            max_relative = 1e-8
        );
        // S1 -> P2 approaches K = c_P2 / c_S1
        let ratio = (run.log_primary[1] - run.log_secondary[0]).exp();
        assert_relative_eq!(ratio, 3.0, max_relative = 1e-4);
        // S1 stays at equilibrium with P1 throughout
        assert_relative_eq!(
            (2.0 * run.log_primary[0] - run.log_secondary[0]).exp(),
            2.0,
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_advance_carbonate_calcite_dissolution() {
        let solver = MixedReactionsSolver::new(&carbonate_mixed().unwrap()).unwrap();
        let initial = carbonate_initial_aggregate();
        let run = solver.advance(T, 0.2, 5, &initial).unwrap();
        assert!(run.equilibrium_report.is_converged());
        assert!(run.reports.iter().all(|r| r.is_converged()));

        let agg = &run.aggregate;
        let agg0 = &initial;
        // dissolution consumes H+ and releases HCO3- and Ca+2 in equal amounts
        assert_relative_eq!(agg[2] - agg[1], agg0[2] - agg0[1], max_relative = 1e-8);
        assert_relative_eq!(agg[0] + agg[2], agg0[0] + agg0[2], max_relative = 1e-8);
        for i in 3..7 {
            assert_relative_eq!(agg[i], agg0[i], max_relative = 1e-8);
        }
        assert!(agg[2] > agg0[2]);

        let expected = [
            6.767392466978576e-07,
            0.16603622871193088,
            0.034468078665484736,
            0.002008097477732835,
            1.8192739634558077,
            0.010715599767395181,
            1.0756947031770938,
        ];
        for i in 0..7 {
            assert_relative_eq!(run.log_primary[i].exp(), expected[i], max_relative = 1e-6);
        }
    }

    #[test]
    fn test_zero_step_keeps_aggregates() {
        let solver = MixedReactionsSolver::new(&carbonate_mixed().unwrap()).unwrap();
        let initial = carbonate_initial_aggregate();
        let run = solver.advance(T, 0.0, 2, &initial).unwrap();
        for i in 0..7 {
            assert_relative_eq!(run.aggregate[i], initial[i], max_relative = 1e-8);
        }
        assert!(run.reports.iter().all(|r| r.iterations == 0));
    }

    #[test]
    fn test_step_input_errors() {
        let solver = MixedReactionsSolver::new(&secondary_driven_system()).unwrap();
        let mut x = DVector::from_vec(vec![0.0, 0.0]);
        let wrong = DVector::from_vec(vec![1.0]);
        assert!(matches!(
            solver.step(T, 1.0, &mut x, &wrong),
            Err(ReactionsError::DimensionMismatch(_))
        ));
        let agg = DVector::from_vec(vec![1.0, 1.0]);
        assert!(matches!(
            solver.step(T, -1.0, &mut x, &agg),
            Err(ReactionsError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            solver.with_surface_area(DVector::from_vec(vec![1.0, 1.0])),
            Err(ReactionsError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_requires_secondary_structure() {
        // in the simple system the first reaction consumes two units of A
        let params = simple_test_system().unwrap();
        assert!(matches!(
            MixedReactionsSolver::new(&params),
            Err(ReactionsError::InvalidStoichiometry(_))
        ));
    }
}
