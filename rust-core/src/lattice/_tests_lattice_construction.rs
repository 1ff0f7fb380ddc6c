#[cfg(test)]
mod _tests_lattice_construction {
    use super::super::lattice_algorithms::shortest_vector_length;
    use super::super::lattice_construction::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_presets() {
        let a = basis_a();
        assert_eq!(a.as_arrays(), ([1.0, 0.0], [0.4, 1.0]));
        let b = basis_b();
        assert_eq!(b.as_arrays(), ([1.0, 0.3], [-0.2, 1.0]));
        assert_eq!(BasisPreset::A.basis(), a);
        assert_eq!(BasisPreset::B.basis(), b);
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("A".parse::<BasisPreset>().unwrap(), BasisPreset::A);
        assert_eq!("basis_b".parse::<BasisPreset>().unwrap(), BasisPreset::B);
        assert_eq!("square".parse::<BasisPreset>().unwrap(), BasisPreset::Identity);
        assert!("c".parse::<BasisPreset>().is_err());
    }

    #[test]
    fn test_non_reduced_basis_spans_integer_lattice() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let basis = generate_non_reduced_basis(&mut rng);
            assert_eq!(basis.b1.x, 1.0);
            assert_eq!(basis.b1.y, 0.0);
            assert_eq!(basis.b2.y, 1.0);

            let k = basis.b2.x;
            assert_eq!(k, k.round());
            assert!((2.0..=5.0).contains(&k.abs()), "shear out of range: {}", k);

            // Unimodular shear: still Z^2 with covolume 1 and shortest length 1.
            assert_abs_diff_eq!(basis.determinant(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(shortest_vector_length(&basis, 10), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_non_reduced_basis_uses_both_signs() {
        let mut rng = StdRng::seed_from_u64(42);
        let shears: Vec<f64> = (0..200)
            .map(|_| generate_non_reduced_basis(&mut rng).b2.x)
            .collect();
        assert!(shears.iter().any(|k| *k > 0.0));
        assert!(shears.iter().any(|k| *k < 0.0));
    }
}
