//! 2D lattice visualization library
//!
//! This library provides the lattice geometry (dual bases, shortest vectors,
//! reduction modulo a lattice, bounded closest vector queries) and an animated
//! renderer that draws primal and dual lattices onto an abstract surface.

pub mod config;
pub mod display;
pub mod interfaces;
pub mod lattice;
pub mod render;

/// Common result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
