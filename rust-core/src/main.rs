use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use lattice_viz::config::{EngineConfig, DEFAULT_CVP_RADIUS_FACTOR, DEFAULT_SCALE, POINT_RANGE};
use lattice_viz::interfaces::{PointVariant, Space};
use lattice_viz::lattice::{
    compute_dual_basis, compute_shortest_primitive_vectors, evaluate_cvp, format_basis_text,
    format_cvp_outcome, generate_non_reduced_basis, lagrange_gauss_reduce,
    reduce_vector_mod_lattice, Basis2D, BasisPreset,
};
use lattice_viz::render::{EngineOptions, HeadlessSurface, LatticeEngine, SurfaceEvent};
use lattice_viz::Result;

#[derive(Parser)]
#[command(name = "lattice-viz")]
#[command(about = "2D lattice geometry and SVG snapshots of the lattice visualization")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine configuration (JSON); missing fields use defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an SVG snapshot of the lattice view
    Render(RenderArgs),
    /// Print the two shortest primitive vectors
    Shortest {
        #[command(flatten)]
        basis: BasisArgs,
        /// Coefficient window [-range, range]
        #[arg(long, default_value_t = POINT_RANGE)]
        range: i32,
    },
    /// Print the dual basis
    Dual {
        #[command(flatten)]
        basis: BasisArgs,
    },
    /// Reduce a vector into the fundamental domain
    Reduce {
        #[command(flatten)]
        basis: BasisArgs,
        /// Vector as "x,y"
        #[arg(long, value_parser = parse_vec2, allow_hyphen_values = true)]
        vector: Vector2<f64>,
    },
    /// Bounded closest vector query
    Cvp {
        #[command(flatten)]
        basis: BasisArgs,
        /// Target as "x,y" in lattice coordinates
        #[arg(long, value_parser = parse_vec2, allow_hyphen_values = true)]
        target: Vector2<f64>,
        /// Radius as a multiple of |v_shortest| / 2
        #[arg(long, default_value_t = DEFAULT_CVP_RADIUS_FACTOR)]
        factor: f64,
        #[arg(long, default_value_t = POINT_RANGE)]
        range: i32,
    },
    /// Lagrange-Gauss reduction and basic invariants of a basis
    Analyze {
        #[command(flatten)]
        basis: BasisArgs,
    },
}

#[derive(Args, Clone)]
struct BasisArgs {
    /// Named basis: a, b or identity
    #[arg(long, default_value = "a")]
    preset: BasisPreset,
    /// First basis vector as "x,y" (overrides the preset, needs --b2)
    #[arg(long, value_parser = parse_vec2, allow_hyphen_values = true, requires = "b2")]
    b1: Option<Vector2<f64>>,
    /// Second basis vector as "x,y"
    #[arg(long, value_parser = parse_vec2, allow_hyphen_values = true, requires = "b1")]
    b2: Option<Vector2<f64>>,
    /// Random sheared (non-reduced) basis
    #[arg(long, conflicts_with_all = ["b1", "b2"])]
    random: bool,
    /// Seed for --random
    #[arg(long)]
    seed: Option<u64>,
}

impl BasisArgs {
    fn resolve(&self) -> Basis2D {
        if let (Some(b1), Some(b2)) = (self.b1, self.b2) {
            return Basis2D::new(b1, b2);
        }
        if self.random {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            return generate_non_reduced_basis(&mut rng);
        }
        self.preset.basis()
    }
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    basis: BasisArgs,
    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, default_value_t = 800.0)]
    width: f64,
    #[arg(long, default_value_t = 600.0)]
    height: f64,
    /// Pixels per lattice unit
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: f64,
    /// Hide the primal lattice
    #[arg(long)]
    no_primal: bool,
    /// Show the dual lattice
    #[arg(long)]
    dual: bool,
    /// Draw dual points filled instead of hollow
    #[arg(long)]
    solid_dual: bool,
    /// Hide the shortest vectors
    #[arg(long)]
    no_shortest: bool,
    #[arg(long, default_value = "primal")]
    shortest_space: Space,
    /// CVP target as "x,y" in lattice coordinates
    #[arg(long, value_parser = parse_vec2, allow_hyphen_values = true)]
    cvp_target: Option<Vector2<f64>>,
    #[arg(long, default_value_t = DEFAULT_CVP_RADIUS_FACTOR)]
    cvp_factor: f64,
    #[arg(long, default_value = "primal")]
    cvp_space: Space,
    /// Draw the x' residual arrow
    #[arg(long)]
    residual: bool,
    /// Dashed circle of CVP radius around the origin
    #[arg(long)]
    origin_circle: bool,
    /// Shade the fundamental domain of this space
    #[arg(long)]
    fundamental: Option<Space>,
    /// Mod vector as "x,y" in lattice coordinates
    #[arg(long, value_parser = parse_vec2, allow_hyphen_values = true)]
    mod_vector: Option<Vector2<f64>>,
    /// Snapshot this many milliseconds into the animated intro
    #[arg(long)]
    at_ms: Option<f64>,
}

fn parse_vec2(s: &str) -> std::result::Result<Vector2<f64>, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return Err(format!("expected \"x,y\", got \"{}\"", s));
    }
    let x = parts[0].parse::<f64>().map_err(|e| e.to_string())?;
    let y = parts[1].parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Vector2::new(x, y))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    info!("Starting lattice-viz v{}", lattice_viz::VERSION);

    match cli.command {
        Commands::Render(args) => render(args, config),
        Commands::Shortest { basis, range } => {
            let basis = basis.resolve();
            println!("basis: {}", format_basis_text(&basis));
            for (idx, v) in compute_shortest_primitive_vectors(&basis, range).iter().enumerate() {
                let p = basis.point(v.i, v.j);
                println!(
                    "v{} = ({}, {}) -> ({:.4}, {:.4}), |v| = {:.6}",
                    idx + 1,
                    v.i,
                    v.j,
                    p.x,
                    p.y,
                    v.length()
                );
            }
            Ok(())
        }
        Commands::Dual { basis } => {
            let basis = basis.resolve();
            if basis.is_degenerate() {
                warn!("Basis is degenerate, the dual collapses to zero");
            }
            println!("basis: {}", format_basis_text(&basis));
            println!("dual:  {}", format_basis_text(&compute_dual_basis(&basis)));
            Ok(())
        }
        Commands::Reduce { basis, vector } => {
            let basis = basis.resolve();
            if basis.is_degenerate() {
                return Err(anyhow!("cannot reduce modulo a degenerate basis"));
            }
            let reduced = reduce_vector_mod_lattice(vector, &basis);
            println!(
                "({:.4}, {:.4}) mod L = ({:.6}, {:.6}), coefficients [{:.6}, {:.6}]",
                vector.x, vector.y, reduced.vec.x, reduced.vec.y, reduced.coeffs[0], reduced.coeffs[1]
            );
            Ok(())
        }
        Commands::Cvp { basis, target, factor, range } => {
            let basis = basis.resolve();
            let outcome = evaluate_cvp(&basis, Some(target), factor, range);
            println!("{}", format_cvp_outcome(&outcome));
            match outcome.nearest {
                Some(hit) => println!(
                    "nearest ({}, {}) -> ({:.4}, {:.4}), distance {:.6}",
                    hit.index.i, hit.index.j, hit.point.x, hit.point.y, hit.distance
                ),
                None if outcome.over_cap => println!("no answer: radius above the cap"),
                None => println!("no lattice point within the radius"),
            }
            Ok(())
        }
        Commands::Analyze { basis } => {
            let basis = basis.resolve();
            let reduced = lagrange_gauss_reduce(&basis);
            println!("basis:    {}", format_basis_text(&basis));
            println!("det:      {:.6}", basis.determinant());
            println!("reduced:  {}", format_basis_text(&reduced));
            println!("|b1|:     {:.6}", reduced.b1.norm());
            println!("dual:     {}", format_basis_text(&compute_dual_basis(&basis)));
            Ok(())
        }
    }
}

fn render(args: RenderArgs, config: EngineConfig) -> Result<()> {
    let basis = args.basis.resolve();
    let options = EngineOptions {
        basis,
        show_primal: !args.no_primal,
        show_dual: args.dual,
        show_shortest: !args.no_shortest,
        shortest_space: args.shortest_space,
        cvp_enabled: args.cvp_target.is_some(),
        cvp_radius_factor: args.cvp_factor,
        cvp_space: args.cvp_space,
        scale: args.scale,
        show_origin_circle: args.origin_circle,
        dual_point_variant: if args.solid_dual { PointVariant::Solid } else { PointVariant::Hollow },
        show_cvp_residual_arrow: args.residual,
        show_fundamental_domain: args.fundamental.is_some(),
        fundamental_space: args.fundamental.unwrap_or_default(),
        ..EngineOptions::default()
    };

    let surface = HeadlessSurface::new(args.width, args.height);
    let handle = surface.handle();
    let mut engine = LatticeEngine::new(surface, config, options);

    if let Some(vec) = args.mod_vector {
        engine.set_mod_vector(Some(vec));
    }

    if let Some(target) = args.cvp_target {
        let layout = engine
            .layout()
            .copied()
            .ok_or_else(|| anyhow!("no layout to place the CVP target"))?;
        let p = layout.to_screen(target, args.scale);
        handle.dispatch(&mut engine, SurfaceEvent::Click { x: p.x, y: p.y });
        if engine.state().cvp_target.is_none() {
            warn!("CVP target ({}, {}) lies on a lattice point marker", target.x, target.y);
        }
    }

    match args.at_ms {
        Some(at_ms) => {
            engine.relayout(true);
            handle.advance(at_ms.max(0.0));
        }
        None => handle.run_animations(&mut engine, 16.0, 10_000.0),
    }

    let frame = engine
        .current_frame()
        .ok_or_else(|| anyhow!("nothing was drawn"))?;
    let svg = frame.to_svg();

    match &args.output {
        Some(path) => {
            std::fs::write(path, svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} elements to {}", frame.elements.len(), path.display());
        }
        None => println!("{}", svg),
    }

    engine.destroy();
    Ok(())
}
