use crate::Activity::ActivityModels::Bdot;
use crate::Common::errors::ReactionsError;
use crate::Common::printers::concentration_table;
use crate::Examples::example_systems::*;
use crate::Reactions::EquilibriumReactions::EquilibriumSolver;
use crate::Reactions::KineticReactions::KineticReactions;
use crate::Reactions::MixedReactions::MixedReactionsSolver;
use nalgebra::DVector;

const T: f64 = 298.15;

const CARBONATE_AGGREGATE: [f64; 7] = [3.76e-1, 3.76e-1, 3.87e-2, 3.21e-2, 1.89, 1.65e-2, 1.09];

fn secondary_then_primary(
    log_secondary: &DVector<f64>,
    log_primary: &DVector<f64>,
) -> DVector<f64> {
    let mut c: Vec<f64> = log_secondary.iter().map(|x| x.exp()).collect();
    c.extend(log_primary.iter().map(|x| x.exp()));
    DVector::from_vec(c)
}

pub fn reaction_examples(task: usize) -> Result<(), ReactionsError> {
    match task {
        0 => {
            // 2A <=> B + C, C + D <=> 2E by reaction extents
            let params = simple_test_system()?.equilibrium_reactions_parameters();
            let solver = EquilibriumSolver::new(&params);
            let c0 = DVector::from_vec(vec![1.0, 1.0e-16, 0.5, 1.0, 1.0e-16]);
            let (c, report) = solver.enforce_equilibrium_extents(&c0)?;
            println!("{:?}", report);
            concentration_table(&["A", "B", "C", "D", "E"], &c).printstd();
        }
        1 => {
            // carbonate system from aggregate concentrations
            let params = carbonate_all_equilibrium()?.equilibrium_reactions_parameters();
            let solver = EquilibriumSolver::new(&params);
            let target = DVector::from_column_slice(&CARBONATE_AGGREGATE);
            let solution = solver.enforce_equilibrium_aggregate(T, &target, &target.map(f64::ln))?;
            println!("{:?}", solution.report);
            let c = secondary_then_primary(&solution.log_secondary, &solution.log_primary);
            concentration_table(&CARBONATE_SPECIES, &c).printstd();
        }
        2 => {
            // the same carbonate system with B-dot activity coefficients
            let params = carbonate_all_equilibrium()?.equilibrium_reactions_parameters();
            let charge = vec![
                -1.0, 0.0, -2.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, -1.0, 0.0, 1.0, -1.0, 2.0, -2.0,
                -1.0, 2.0, 1.0,
            ];
            let model = Bdot::new(
                DVector::from_vec(charge),
                DVector::from_element(18, 4.0),
                DVector::from_element(18, 0.04),
            )?;
            let solver = EquilibriumSolver::new(&params).with_activity_model(model);
            let target = DVector::from_column_slice(&CARBONATE_AGGREGATE);
            let solution = solver.enforce_equilibrium_aggregate(T, &target, &target.map(f64::ln))?;
            println!("{:?}", solution.report);
            let c = secondary_then_primary(&solution.log_secondary, &solution.log_primary);
            concentration_table(&CARBONATE_SPECIES, &c).printstd();
            let gamma = solution.log_activity_coefficients.map(f64::exp);
            println!("activity coefficients:");
            concentration_table(&CARBONATE_SPECIES, &gamma).printstd();
        }
        3 => {
            // kinetic relaxation of the simple system by backward Euler steps
            let params = simple_kinetic_test_system()?.kinetic_reactions_parameters();
            let kinetics = KineticReactions::new(&params);
            let c0 = vec![0.592138294, 0.203930853, 0.305945481, 0.602014628, 0.795970745];
            let mut log_c = DVector::from_vec(c0).map(f64::ln);
            for step in 0..10 {
                let (next, report) = kinetics.time_step(2.0, T, &log_c)?;
                println!("step {}: {:?}", step, report);
                log_c = next;
            }
            concentration_table(&["A", "B", "C", "D", "E"], &log_c.map(f64::exp)).printstd();
        }
        4 => {
            // bicarbonate buffer, all reactions kinetic
            let params = bicarbonate_buffer()?.kinetic_reactions_parameters();
            let kinetics = KineticReactions::new(&params);
            let c0 = vec![1.0e-3, 1.0e-7, 2.0e-3, 1.0e-5, 1.0e-7];
            let mut log_c = DVector::from_vec(c0).map(f64::ln);
            for step in 0..10 {
                let (next, report) = kinetics.time_step(1.0e-3, T, &log_c)?;
                println!("step {}: {:?}", step, report);
                log_c = next;
            }
            concentration_table(&BICARBONATE_BUFFER_SPECIES, &log_c.map(f64::exp)).printstd();
        }
        5 => {
            // calcite dissolution coupled to the aqueous carbonate equilibria
            let params = carbonate_mixed()?;
            let solver = MixedReactionsSolver::new(&params)?;
            let initial = DVector::from_column_slice(&CARBONATE_AGGREGATE);
            let run = solver.advance(T, 0.2, 5, &initial)?;
            for (step, report) in run.reports.iter().enumerate() {
                println!("step {}: {:?}", step, report);
            }
            println!("time = {}", run.time);
            let c = secondary_then_primary(&run.log_secondary, &run.log_primary);
            concentration_table(&CARBONATE_NOSOLID_SPECIES, &c).printstd();
        }
        _ => println!("no example with number {}", task),
    }
    Ok(())
}
