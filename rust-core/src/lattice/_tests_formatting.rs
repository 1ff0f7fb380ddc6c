#[cfg(test)]
mod _tests_formatting {
    use super::super::formatting::{format_basis_text, format_cvp_outcome, format_cvp_text};
    use super::super::lattice_algorithms::evaluate_cvp;
    use super::super::lattice_construction::basis_a;

    #[test]
    fn test_basis_text_uses_two_decimals() {
        assert_eq!(
            format_basis_text(&basis_a()),
            "b1 = (1.00, 0.00), b2 = (0.40, 1.00)"
        );
    }

    #[test]
    fn test_cvp_text_within_cap() {
        assert_eq!(
            format_cvp_text(0.5, 0.6, false),
            "CVP cap |v_shortest|/2 = 0.50, d = 0.30 (factor 0.60)"
        );
    }

    #[test]
    fn test_cvp_text_above_cap() {
        assert_eq!(
            format_cvp_text(0.5, 1.2, true),
            "CVP cap |v_shortest|/2 = 0.50, d = 0.60 (factor 1.20) -- above cap, CVP undefined"
        );
    }

    #[test]
    fn test_outcome_formatting_matches_components() {
        let outcome = evaluate_cvp(&basis_a(), None, 1.0, 10);
        assert_eq!(
            format_cvp_outcome(&outcome),
            "CVP cap |v_shortest|/2 = 0.50, d = 0.50 (factor 1.00)"
        );
    }
}
