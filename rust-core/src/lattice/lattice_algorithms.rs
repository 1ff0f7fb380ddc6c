use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::config::{BASIS_TOLERANCE, CVP_RADIUS_CAP, MAX_GAUSS_STEPS, WRAP_TOLERANCE};
use crate::lattice::Basis2D;

/// Integer coordinates of a lattice point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LatticeIndex {
    pub i: i32,
    pub j: i32,
}

impl LatticeIndex {
    pub fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Euclidean distance of the index pair from `(0, 0)`.
    pub fn index_norm(&self) -> f64 {
        ((self.i * self.i + self.j * self.j) as f64).sqrt()
    }
}

/// A candidate from the shortest-vector search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortVector {
    pub i: i32,
    pub j: i32,
    /// Squared Euclidean length under the basis the search ran on.
    pub len2: f64,
}

impl ShortVector {
    pub fn length(&self) -> f64 {
        self.len2.sqrt()
    }

    pub fn index(&self) -> LatticeIndex {
        LatticeIndex::new(self.i, self.j)
    }
}

/// A vector reduced into the fundamental domain together with its basis coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reduction {
    pub vec: Vector2<f64>,
    pub coeffs: [f64; 2],
}

/// Nearest lattice point found by a brute-force scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeHit {
    pub index: LatticeIndex,
    pub point: Vector2<f64>,
    pub distance: f64,
}

/// Result of a closest vector query with a bounded radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CvpOutcome {
    /// Half the length of the shortest primitive vector.
    pub half_shortest: f64,
    /// `radius_factor * half_shortest`.
    pub radius: f64,
    pub radius_factor: f64,
    /// The radius is above `|v_shortest| / 2`: the query is undefined.
    pub over_cap: bool,
    pub nearest: Option<LatticeHit>,
}

/// Greatest common divisor on absolute values. `gcd(0, 0)` is 1 so that the
/// zero pair is never mistaken for a non-primitive one by callers dividing by it.
pub fn gcd(a: i64, b: i64) -> i64 {
    let mut x = a.abs();
    let mut y = b.abs();
    while y != 0 {
        let t = y;
        y = x % y;
        x = t;
    }
    if x == 0 {
        1
    } else {
        x
    }
}

/// All index pairs in `[-range, range]^2`, row-major in `i`.
pub fn lattice_indices(range: i32) -> Vec<LatticeIndex> {
    let side = (2 * range.max(0) + 1) as usize;
    let mut indices = Vec::with_capacity(side * side);
    for i in -range..=range {
        for j in -range..=range {
            indices.push(LatticeIndex::new(i, j));
        }
    }
    indices
}

/// Dual basis: the columns of the inverse transpose of `[b1 | b2]`, so that
/// `<b_i*, b_j> = delta_ij`.
///
/// A singular basis yields the zero basis rather than an error; callers
/// drawing it must expect collapsed geometry.
pub fn compute_dual_basis(basis: &Basis2D) -> Basis2D {
    let (a, b) = (basis.b1.x, basis.b1.y);
    let (c, d) = (basis.b2.x, basis.b2.y);
    let det = a * d - b * c;

    if det.abs() < BASIS_TOLERANCE {
        log::warn!("Singular basis (det = {:e}), dual basis collapses to zero", det);
        return Basis2D::zero();
    }

    Basis2D::new(
        Vector2::new(d / det, -c / det),
        Vector2::new(-b / det, a / det),
    )
}

/// Exhaustive search for the (at most) two shortest primitive lattice vectors
/// with coefficients in `[-max_coeff, max_coeff]`.
///
/// Pairs are canonicalized so that `i > 0`, or `i == 0 && j > 0`, and ranked by
/// squared length. The sort is stable, so equal lengths keep row-major order.
pub fn compute_shortest_primitive_vectors(basis: &Basis2D, max_coeff: i32) -> Vec<ShortVector> {
    let mut candidates = Vec::new();

    for i in -max_coeff..=max_coeff {
        for j in -max_coeff..=max_coeff {
            if i == 0 && j == 0 {
                continue;
            }
            if gcd(i as i64, j as i64) != 1 {
                continue;
            }

            let (ci, cj) = if i < 0 || (i == 0 && j < 0) {
                (-i, -j)
            } else {
                (i, j)
            };

            let len2 = basis.point(ci, cj).norm_squared();
            candidates.push(ShortVector { i: ci, j: cj, len2 });
        }
    }

    candidates.sort_by(|a, b| a.len2.total_cmp(&b.len2));

    let mut result: Vec<ShortVector> = Vec::with_capacity(2);
    for v in candidates {
        if !result.iter().any(|w| w.i == v.i && w.j == v.j) {
            result.push(v);
            if result.len() == 2 {
                break;
            }
        }
    }
    result
}

/// Length of the shortest primitive vector, 0 for an empty window.
pub fn shortest_vector_length(basis: &Basis2D, max_coeff: i32) -> f64 {
    compute_shortest_primitive_vectors(basis, max_coeff)
        .first()
        .map(ShortVector::length)
        .unwrap_or(0.0)
}

/// Wrap a coefficient into `[0, 1)`. Values within tolerance of either end snap to 0.
pub fn wrap_unit(t: f64) -> f64 {
    let frac = t - t.floor();
    if (frac - 1.0).abs() < WRAP_TOLERANCE || frac.abs() < WRAP_TOLERANCE {
        0.0
    } else {
        frac
    }
}

/// Reduce `vec` into the fundamental domain of `basis`.
///
/// Solves `vec = a*b1 + b*b2`, wraps both coefficients into `[0, 1)` and
/// reconstructs the vector. A degenerate basis yields the zero vector.
pub fn reduce_vector_mod_lattice(vec: Vector2<f64>, basis: &Basis2D) -> Reduction {
    let Some((a, b)) = basis.coefficients(vec) else {
        return Reduction {
            vec: Vector2::zeros(),
            coeffs: [0.0, 0.0],
        };
    };

    let a_mod = wrap_unit(a);
    let b_mod = wrap_unit(b);

    Reduction {
        vec: basis.combine(a_mod, b_mod),
        coeffs: [a_mod, b_mod],
    }
}

/// Nearest lattice point to `target` among the indices in `[-max_coeff, max_coeff]^2`.
/// Ties keep the first index in row-major order.
pub fn closest_lattice_point(
    basis: &Basis2D,
    target: Vector2<f64>,
    max_coeff: i32,
) -> Option<LatticeHit> {
    let mut best: Option<(LatticeIndex, Vector2<f64>, f64)> = None;

    for index in lattice_indices(max_coeff) {
        let point = basis.point(index.i, index.j);
        let dist2 = (point - target).norm_squared();
        match best {
            Some((_, _, best_dist2)) if dist2 >= best_dist2 => {}
            _ => best = Some((index, point, dist2)),
        }
    }

    best.map(|(index, point, dist2)| LatticeHit {
        index,
        point,
        distance: dist2.sqrt(),
    })
}

/// Bounded closest vector query.
///
/// The radius is `radius_factor * |v_shortest| / 2`. Beyond that cap several
/// lattice points may sit inside the ball, so the query is reported as
/// undefined instead of returning a nearest point. The cap test compares the
/// factor itself so that `radius_factor == 1.0` is never over the cap.
pub fn evaluate_cvp(
    basis: &Basis2D,
    target: Option<Vector2<f64>>,
    radius_factor: f64,
    max_coeff: i32,
) -> CvpOutcome {
    let half_shortest = 0.5 * shortest_vector_length(basis, max_coeff);
    let radius = radius_factor * half_shortest;
    let over_cap = radius_factor > CVP_RADIUS_CAP;

    let nearest = match target {
        Some(target) if !over_cap => closest_lattice_point(basis, target, max_coeff)
            .filter(|hit| hit.distance <= radius),
        _ => None,
    };

    CvpOutcome {
        half_shortest,
        radius,
        radius_factor,
        over_cap,
        nearest,
    }
}

/// Lagrange-Gauss reduction of a 2D basis.
///
/// Returns a basis of the same lattice with `|b1| <= |b2|` and
/// `|<b1, b2>| <= |b1|^2 / 2`; `b1` is a shortest nonzero lattice vector.
/// A degenerate or non-finite basis is returned unchanged.
pub fn lagrange_gauss_reduce(basis: &Basis2D) -> Basis2D {
    if !basis.is_finite() || !basis.determinant().is_finite() || basis.is_degenerate() {
        log::warn!("Gauss reduction skipped for {:?}", basis);
        return *basis;
    }

    let mut u = basis.b1;
    let mut v = basis.b2;
    if u.norm_squared() > v.norm_squared() {
        std::mem::swap(&mut u, &mut v);
    }

    for _ in 0..MAX_GAUSS_STEPS {
        let mu = (u.dot(&v) / u.norm_squared()).round();
        v -= u * mu;
        if v.norm_squared() >= u.norm_squared() {
            break;
        }
        std::mem::swap(&mut u, &mut v);
    }

    Basis2D::new(u, v)
}
