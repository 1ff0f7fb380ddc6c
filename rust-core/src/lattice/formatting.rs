use crate::lattice::lattice_algorithms::CvpOutcome;
use crate::lattice::Basis2D;

/// Human-readable basis summary, e.g. `b1 = (1.00, 0.00), b2 = (0.40, 1.00)`.
pub fn format_basis_text(basis: &Basis2D) -> String {
    format!(
        "b1 = ({:.2}, {:.2}), b2 = ({:.2}, {:.2})",
        basis.b1.x, basis.b1.y, basis.b2.x, basis.b2.y
    )
}

/// CVP status line: the cap, the current radius and whether the query is defined.
pub fn format_cvp_text(half_shortest: f64, radius_factor: f64, over_cap: bool) -> String {
    let d = radius_factor * half_shortest;
    let cap_text = format!("CVP cap |v_shortest|/2 = {:.2}", half_shortest);
    let d_text = format!("d = {:.2} (factor {:.2})", d, radius_factor);
    if over_cap {
        format!("{}, {} -- above cap, CVP undefined", cap_text, d_text)
    } else {
        format!("{}, {}", cap_text, d_text)
    }
}

pub fn format_cvp_outcome(outcome: &CvpOutcome) -> String {
    format_cvp_text(outcome.half_shortest, outcome.radius_factor, outcome.over_cap)
}
