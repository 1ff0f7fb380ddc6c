/// Walk through the lattice toolkit: dual basis, shortest vectors, reduction
/// modulo the lattice, bounded CVP, and an SVG snapshot from the engine.
use lattice_viz::config::EngineConfig;
use lattice_viz::lattice::{
    basis_a, compute_dual_basis, compute_shortest_primitive_vectors, evaluate_cvp,
    format_basis_text, format_cvp_outcome, lagrange_gauss_reduce, reduce_vector_mod_lattice,
    shear_basis,
};
use lattice_viz::render::{EngineEvent, EngineOptions, HeadlessSurface, LatticeEngine};
use nalgebra::Vector2;

fn main() -> lattice_viz::Result<()> {
    println!("=== Lattice tour ===\n");

    // 1. Basis and dual basis
    let basis = basis_a();
    let dual = compute_dual_basis(&basis);
    println!("1. Basis A and its dual:");
    println!("   {}", format_basis_text(&basis));
    println!("   {}", format_basis_text(&dual));
    println!("   <b1*, b1> = {:.3}, <b1*, b2> = {:.3}\n", dual.b1.dot(&basis.b1), dual.b1.dot(&basis.b2));

    // 2. Shortest primitive vectors
    println!("2. Shortest primitive vectors (R = 10):");
    for v in compute_shortest_primitive_vectors(&basis, 10) {
        println!("   ({:>2}, {:>2})  |v| = {:.4}", v.i, v.j, v.length());
    }

    // 3. A sheared basis hides the square lattice
    let sheared = shear_basis(4);
    let reduced = lagrange_gauss_reduce(&sheared);
    println!("\n3. Sheared basis and its Gauss reduction:");
    println!("   {}", format_basis_text(&sheared));
    println!("   {}", format_basis_text(&reduced));

    // 4. Reduction modulo the lattice
    let v = Vector2::new(2.3, -0.7);
    let r = reduce_vector_mod_lattice(v, &basis);
    println!("\n4. ({}, {}) mod L = ({:.3}, {:.3})", v.x, v.y, r.vec.x, r.vec.y);

    // 5. Bounded CVP on both sides of the cap
    println!("\n5. Bounded CVP for target (1.1, 0.05):");
    for factor in [0.6, 1.0, 1.2] {
        let outcome = evaluate_cvp(&basis, Some(Vector2::new(1.1, 0.05)), factor, 10);
        println!("   {}", format_cvp_outcome(&outcome));
    }

    // 6. Engine snapshot
    let surface = HeadlessSurface::new(640.0, 480.0);
    let handle = surface.handle();
    let options = EngineOptions {
        show_dual: true,
        ..EngineOptions::default()
    };
    let mut engine = LatticeEngine::new(surface, EngineConfig::default(), options);
    engine.set_observer(|event| {
        if let EngineEvent::CvpText(text) = event {
            println!("\n6. Engine reports: {}", text);
        }
    });
    handle.run_animations(&mut engine, 16.0, 5_000.0);
    if let Some(frame) = engine.current_frame() {
        println!("   Snapshot: {} elements, {} bytes of SVG", frame.elements.len(), frame.to_svg().len());
    }
    engine.destroy();

    Ok(())
}
