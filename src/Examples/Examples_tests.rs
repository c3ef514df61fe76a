#[cfg(test)]
mod tests {
    use crate::Examples::example_systems::*;
    use crate::Examples::reaction_examples::reaction_examples;

    #[test]
    fn test_predefined_systems_dimensions() {
        let p = carbonate_all_equilibrium().unwrap();
        assert_eq!((p.num_reactions(), p.num_species()), (11, 18));
        assert_eq!(p.num_primary_species(), 7);
        assert_eq!(p.num_species(), CARBONATE_SPECIES.len());

        let p = carbonate_mixed().unwrap();
        assert_eq!((p.num_equilibrium_reactions(), p.num_kinetic_reactions()), (10, 1));
        assert_eq!(p.num_species(), CARBONATE_NOSOLID_SPECIES.len());

        let p = bicarbonate_buffer().unwrap();
        assert_eq!(p.num_kinetic_reactions(), 5);
        assert_eq!(p.num_species(), BICARBONATE_BUFFER_SPECIES.len());
    }

    #[test]
    fn test_carbonate_reverse_rates_are_derived() {
        let p = carbonate_all_kinetic().unwrap();
        for r in 0..p.num_reactions() {
            let k = p.rate_constant_forward(r) / p.rate_constant_reverse(r);
            approx::assert_relative_eq!(k, p.equilibrium_constant(r), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_examples_run() {
        for task in 0..6 {
            assert!(reaction_examples(task).is_ok(), "example {} failed", task);
        }
    }
}
