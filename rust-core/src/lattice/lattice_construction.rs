use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::lattice::Basis2D;

/// Standard bases used throughout the lecture demos

/// Nearly reduced oblique basis `b1 = (1, 0)`, `b2 = (0.4, 1)`.
pub fn basis_a() -> Basis2D {
    Basis2D::from_arrays([1.0, 0.0], [0.4, 1.0])
}

/// Slightly rotated basis `b1 = (1, 0.3)`, `b2 = (-0.2, 1)`.
pub fn basis_b() -> Basis2D {
    Basis2D::from_arrays([1.0, 0.3], [-0.2, 1.0])
}

/// Named basis presets selectable from the CLI and the browser bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasisPreset {
    A,
    B,
    Identity,
}

impl BasisPreset {
    pub fn basis(&self) -> Basis2D {
        match self {
            BasisPreset::A => basis_a(),
            BasisPreset::B => basis_b(),
            BasisPreset::Identity => Basis2D::default(),
        }
    }
}

impl FromStr for BasisPreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" | "basis_a" => Ok(BasisPreset::A),
            "b" | "basis_b" => Ok(BasisPreset::B),
            "identity" | "square" => Ok(BasisPreset::Identity),
            other => Err(anyhow::anyhow!("Unknown basis preset: {}", other)),
        }
    }
}

/// Utility functions for bases that hide the lattice structure

/// Shear the standard basis into `b1 = e1`, `b2 = e2 + k*e1` with `|k|` in `2..=5`
/// and a random sign. The lattice is still `Z^2`, but the basis is far from reduced.
pub fn generate_non_reduced_basis<R: Rng>(rng: &mut R) -> Basis2D {
    let k_mag: i32 = rng.gen_range(2..=5);
    let k = if rng.gen_bool(0.5) { k_mag } else { -k_mag };
    shear_basis(k)
}

/// `b1 = e1`, `b2 = e2 + k*e1`.
pub fn shear_basis(k: i32) -> Basis2D {
    let e1 = Vector2::new(1.0, 0.0);
    let e2 = Vector2::new(0.0, 1.0);
    Basis2D::new(e1, e2 + e1 * k as f64)
}
