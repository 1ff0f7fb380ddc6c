// Lattice module: 2D lattice bases and the geometry used by the visualization engine
// This module provides pure, stateless functions; nothing here keeps state between calls

// ======================== MODULE DECLARATIONS ========================
pub mod basis;
pub mod formatting;
pub mod lattice_algorithms;
pub mod lattice_construction;

mod _tests_formatting;
mod _tests_lattice_construction;

// ======================== BASIS ========================
pub use basis::Basis2D; // struct - pair of 2D basis vectors (b1, b2)
// Basis2D impl methods:
//   new(b1, b2) / from_arrays([f64; 2], [f64; 2]) -> Self  - constructs a basis
//   determinant(&self) -> f64                               - b1.x*b2.y - b1.y*b2.x
//   is_degenerate(&self) -> bool                            - |det| below BASIS_TOLERANCE
//   is_finite(&self) -> bool                                - no NaN or infinite component
//   point(&self, i, j) -> Vector2<f64>                      - lattice point i*b1 + j*b2
//   coefficients(&self, v) -> Option<(f64, f64)>            - Cramer's rule, None if degenerate
//   fundamental_domain(&self) -> [Vector2<f64>; 4]          - parallelogram 0, b1, b1+b2, b2

// ======================== LATTICE ALGORITHMS ========================
pub use lattice_algorithms::{
    CvpOutcome,                         // struct - bounded CVP query result (cap, radius, nearest point)
    LatticeHit,                         // struct - nearest lattice point with its index and distance
    LatticeIndex,                       // struct - integer coordinates (i, j)
    Reduction,                          // struct - reduced vector and its [0,1) coefficients
    ShortVector,                        // struct - shortest-vector candidate (i, j, len2)
    closest_lattice_point,              // fn(basis, target, max_coeff) -> Option<LatticeHit>
    compute_dual_basis,                 // fn(basis) -> Basis2D - inverse transpose, zero basis if singular
    compute_shortest_primitive_vectors, // fn(basis, max_coeff) -> Vec<ShortVector> - up to two, ascending
    evaluate_cvp,                       // fn(basis, target, radius_factor, max_coeff) -> CvpOutcome
    gcd,                                // fn(i64, i64) -> i64
    lagrange_gauss_reduce,              // fn(basis) -> Basis2D - 2D lattice reduction
    lattice_indices,                    // fn(range) -> Vec<LatticeIndex> - row-major index window
    reduce_vector_mod_lattice,          // fn(vec, basis) -> Reduction - wrap into the fundamental domain
    shortest_vector_length,             // fn(basis, max_coeff) -> f64
    wrap_unit,                          // fn(f64) -> f64 - wrap into [0, 1) with epsilon snap
};

// ======================== LATTICE CONSTRUCTION ========================
pub use lattice_construction::{
    BasisPreset,                // enum - A, B, Identity
    basis_a,                    // fn() -> Basis2D - b1 = (1, 0), b2 = (0.4, 1)
    basis_b,                    // fn() -> Basis2D - b1 = (1, 0.3), b2 = (-0.2, 1)
    generate_non_reduced_basis, // fn(&mut impl Rng) -> Basis2D - sheared standard basis
    shear_basis,                // fn(k) -> Basis2D - b1 = e1, b2 = e2 + k*e1
};

// ======================== FORMATTING ========================
pub use formatting::{
    format_basis_text,  // fn(&Basis2D) -> String
    format_cvp_outcome, // fn(&CvpOutcome) -> String
    format_cvp_text,    // fn(half_shortest, radius_factor, over_cap) -> String
};
