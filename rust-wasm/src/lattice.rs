//! Lattice math for WASM bindings
//!
//! Wraps the core Basis2D and the stateless lattice algorithms with
//! JavaScript-friendly signatures. Vectors cross the boundary as flat arrays.

use lattice_viz::lattice::{
    compute_dual_basis, compute_shortest_primitive_vectors, evaluate_cvp, format_basis_text,
    generate_non_reduced_basis, lagrange_gauss_reduce, reduce_vector_mod_lattice, Basis2D,
    BasisPreset,
};
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::common::{BasisData, CvpData, Point, ShortVectorData};
use crate::utils::to_js_error;

/// WASM-compatible wrapper for a 2D lattice basis
#[wasm_bindgen]
#[derive(Clone, Copy, Debug)]
pub struct Basis {
    inner: Basis2D,
}

impl Basis {
    pub fn from_core(inner: Basis2D) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Basis2D {
        &self.inner
    }
}

#[wasm_bindgen]
impl Basis {
    #[wasm_bindgen(constructor)]
    pub fn new(b1x: f64, b1y: f64, b2x: f64, b2y: f64) -> Basis {
        Basis::from_core(Basis2D::from_arrays([b1x, b1y], [b2x, b2y]))
    }

    /// Named preset: "a", "b" or "identity"
    #[wasm_bindgen(js_name = fromPreset)]
    pub fn from_preset(name: &str) -> Result<Basis, JsValue> {
        let preset: BasisPreset = name
            .parse()
            .map_err(|e| to_js_error("Failed to parse preset", e))?;
        Ok(Basis::from_core(preset.basis()))
    }

    /// Sheared standard basis hiding the square lattice; seeded when a seed is given
    #[wasm_bindgen(js_name = randomNonReduced)]
    pub fn random_non_reduced(seed: Option<u32>) -> Basis {
        let basis = match seed {
            Some(seed) => generate_non_reduced_basis(&mut StdRng::seed_from_u64(seed as u64)),
            None => generate_non_reduced_basis(&mut rand::thread_rng()),
        };
        Basis::from_core(basis)
    }

    /// Basis as [b1x, b1y, b2x, b2y]
    #[wasm_bindgen(js_name = getFlat)]
    pub fn get_flat(&self) -> Vec<f64> {
        self.inner.to_flat()
    }

    /// Basis as `{ b1: {x, y}, b2: {x, y} }`
    #[wasm_bindgen(js_name = toObject)]
    pub fn to_object(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&BasisData::from(self.inner))
            .map_err(|e| to_js_error("Failed to serialize basis", e))
    }

    pub fn determinant(&self) -> f64 {
        self.inner.determinant()
    }

    #[wasm_bindgen(js_name = isDegenerate)]
    pub fn is_degenerate(&self) -> bool {
        self.inner.is_degenerate()
    }

    /// Inverse transpose; the zero basis when degenerate
    pub fn dual(&self) -> Basis {
        Basis::from_core(compute_dual_basis(&self.inner))
    }

    /// Lagrange-Gauss reduced basis of the same lattice
    pub fn reduced(&self) -> Basis {
        Basis::from_core(lagrange_gauss_reduce(&self.inner))
    }

    /// "b1 = (x, y), b2 = (x, y)" with two decimals
    pub fn text(&self) -> String {
        format_basis_text(&self.inner)
    }

    #[wasm_bindgen(js_name = shortestVectors)]
    pub fn shortest_vectors(&self, max_coeff: i32) -> Result<JsValue, JsValue> {
        let vectors: Vec<ShortVectorData> = compute_shortest_primitive_vectors(&self.inner, max_coeff)
            .iter()
            .map(|v| ShortVectorData::new(v, &self.inner))
            .collect();

        serde_wasm_bindgen::to_value(&vectors)
            .map_err(|e| to_js_error("Failed to serialize shortest vectors", e))
    }

    /// [x, y, c1, c2]: the reduced vector and its coefficients in [0, 1)
    #[wasm_bindgen(js_name = reduceMod)]
    pub fn reduce_mod(&self, x: f64, y: f64) -> Vec<f64> {
        let reduction = reduce_vector_mod_lattice(Vector2::new(x, y), &self.inner);
        vec![
            reduction.vec.x,
            reduction.vec.y,
            reduction.coeffs[0],
            reduction.coeffs[1],
        ]
    }

    /// Bounded closest-vector query around `(x, y)`
    #[wasm_bindgen(js_name = evaluateCvp)]
    pub fn evaluate_cvp(&self, x: f64, y: f64, radius_factor: f64, max_coeff: i32) -> Result<JsValue, JsValue> {
        let outcome = evaluate_cvp(&self.inner, Some(Vector2::new(x, y)), radius_factor, max_coeff);
        serde_wasm_bindgen::to_value(&CvpData::from(&outcome))
            .map_err(|e| to_js_error("Failed to serialize CVP outcome", e))
    }

    /// Lattice point `i*b1 + j*b2`
    pub fn point(&self, i: i32, j: i32) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&Point::from(self.inner.point(i, j)))
            .map_err(|e| to_js_error("Failed to serialize point", e))
    }
}
