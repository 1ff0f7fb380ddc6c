use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::config::BASIS_TOLERANCE;

/// A pair of basis vectors spanning the lattice `{ i*b1 + j*b2 : i, j in Z }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Basis2D {
    pub b1: Vector2<f64>,
    pub b2: Vector2<f64>,
}

impl Basis2D {
    pub fn new(b1: Vector2<f64>, b2: Vector2<f64>) -> Self {
        Self { b1, b2 }
    }

    pub fn from_arrays(b1: [f64; 2], b2: [f64; 2]) -> Self {
        Self::new(Vector2::new(b1[0], b1[1]), Vector2::new(b2[0], b2[1]))
    }

    pub fn zero() -> Self {
        Self::new(Vector2::zeros(), Vector2::zeros())
    }

    /// Matrix with the basis vectors as columns.
    pub fn matrix(&self) -> Matrix2<f64> {
        Matrix2::from_columns(&[self.b1, self.b2])
    }

    pub fn determinant(&self) -> f64 {
        self.b1.x * self.b2.y - self.b1.y * self.b2.x
    }

    pub fn is_degenerate(&self) -> bool {
        self.determinant().abs() < BASIS_TOLERANCE
    }

    /// All four components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.b1.iter().chain(self.b2.iter()).all(|c| c.is_finite())
    }

    /// Area of the fundamental parallelogram.
    pub fn covolume(&self) -> f64 {
        self.determinant().abs()
    }

    /// Cartesian position of the lattice point with integer coordinates `(i, j)`.
    pub fn point(&self, i: i32, j: i32) -> Vector2<f64> {
        self.combine(i as f64, j as f64)
    }

    /// Real-coefficient combination `a*b1 + b*b2`.
    pub fn combine(&self, a: f64, b: f64) -> Vector2<f64> {
        self.b1 * a + self.b2 * b
    }

    /// Coefficients `(a, b)` with `v = a*b1 + b*b2` by Cramer's rule.
    /// `None` for a degenerate basis.
    pub fn coefficients(&self, v: Vector2<f64>) -> Option<(f64, f64)> {
        let det = self.determinant();
        if det.abs() < BASIS_TOLERANCE {
            return None;
        }
        let inv_det = 1.0 / det;
        let a = inv_det * (self.b2.y * v.x - self.b2.x * v.y);
        let b = inv_det * (-self.b1.y * v.x + self.b1.x * v.y);
        Some((a, b))
    }

    /// Vertices of the fundamental parallelogram `0, b1, b1 + b2, b2`.
    pub fn fundamental_domain(&self) -> [Vector2<f64>; 4] {
        [Vector2::zeros(), self.b1, self.b1 + self.b2, self.b2]
    }

    pub fn as_arrays(&self) -> ([f64; 2], [f64; 2]) {
        ([self.b1.x, self.b1.y], [self.b2.x, self.b2.y])
    }

    /// Flat `[b1.x, b1.y, b2.x, b2.y]`, column-major like the basis matrix.
    pub fn to_flat(&self) -> Vec<f64> {
        self.matrix().as_slice().to_vec()
    }
}

impl Default for Basis2D {
    fn default() -> Self {
        Self::from_arrays([1.0, 0.0], [0.0, 1.0])
    }
}
