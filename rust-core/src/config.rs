// Constants

// Tolerances
pub const BASIS_TOLERANCE: f64 = 1e-9; // Determinant below this counts as singular
pub const WRAP_TOLERANCE: f64 = 1e-9; // Snap for fractional coefficients near 0 or 1
pub const MAX_GAUSS_STEPS: usize = 1_000; // Iteration bound for Lagrange-Gauss reduction

// Lattice window and screen mapping
pub const POINT_RANGE: i32 = 10; // Index window [-R, R] x [-R, R]
pub const MAX_POINT_RANGE: i32 = 200; // Largest window accepted from a config file
pub const DEFAULT_SCALE: f64 = 160.0; // Pixels per lattice unit

// CVP
pub const DEFAULT_CVP_RADIUS_FACTOR: f64 = 0.6;
pub const CVP_RADIUS_CAP: f64 = 1.0; // Factor above this makes the query undefined
pub const CVP_SLIDER_MAX: f64 = 1.5;
pub const CVP_SOFT_CAP_SNAP: f64 = 0.99;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::render::color::Color;

/// Colour table used by the rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub default_point: Color,
    pub shortest_1: Color,
    pub shortest_2: Color,
    pub cvp_point: Color,
    pub cvp_line: Color,
    pub dual_point: Color,
    pub dual_grid: Color,
    pub dual_basis_1: Color,
    pub dual_basis_2: Color,
    pub basis_1: Color,
    pub basis_2: Color,
    pub grid: Color,
    pub fundamental_fill: Color,
    pub fundamental_stroke: Color,
    pub origin_circle: Color,
    pub mod_line: Color,
    pub mod_point: Color,
    pub label: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            default_point: Color::rgb(0x22, 0x22, 0x22),
            shortest_1: Color::rgb(0xff, 0x7f, 0x0e),
            shortest_2: Color::rgb(0x94, 0x67, 0xbd),
            cvp_point: Color::rgb(0x2c, 0xa0, 0x2c),
            cvp_line: Color::rgb(0x2c, 0xa0, 0x2c),
            dual_point: Color::rgb(0xe3, 0x77, 0xc2),
            dual_grid: Color::rgb(0xc5, 0xb0, 0xd5),
            dual_basis_1: Color::rgb(0x17, 0xbe, 0xcf),
            dual_basis_2: Color::rgb(0xbc, 0xbd, 0x22),
            basis_1: Color::rgb(0xd6, 0x27, 0x28),
            basis_2: Color::rgb(0x1f, 0x77, 0xb4),
            grid: Color::rgb(0xdd, 0xdd, 0xdd),
            fundamental_fill: Color::rgba(0, 0, 0, 0.06),
            fundamental_stroke: Color::rgba(0, 0, 0, 0.15),
            origin_circle: Color::rgb(0x66, 0x66, 0x66),
            mod_line: Color::rgb(0x44, 0x44, 0x44),
            mod_point: Color::rgb(0x55, 0x55, 0x55),
            label: Color::rgb(0x33, 0x33, 0x33),
        }
    }
}

/// Transition durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub basis_transition_ms: f64,
    pub scale_transition_ms: f64,
    pub toggle_dual_ms: f64,
    pub cvp_transition_ms: f64,
    pub intro_points_ms: f64,
    pub intro_point_delay_per_unit_ms: f64,
    pub intro_grid_ms: f64,
    pub intro_basis_ms: f64,
    pub intro_highlight_ms: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            basis_transition_ms: 1200.0,
            scale_transition_ms: 600.0,
            toggle_dual_ms: 600.0,
            cvp_transition_ms: 600.0,
            intro_points_ms: 600.0,
            intro_point_delay_per_unit_ms: 40.0,
            intro_grid_ms: 800.0,
            intro_basis_ms: 800.0,
            intro_highlight_ms: 900.0,
        }
    }
}

/// Radii and stroke widths in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub point_radius: f64,
    pub dual_point_radius: f64,
    pub highlight_radius: f64,
    pub hit_slop: f64,
    pub cvp_center_radius: f64,
    pub cvp_point_radius: f64,
    pub mod_point_radius: f64,
    pub grid_stroke: f64,
    pub dual_grid_stroke: f64,
    pub vector_stroke: f64,
    pub shortest_stroke: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            point_radius: 3.5,
            dual_point_radius: 3.2,
            highlight_radius: 6.0,
            hit_slop: 3.0,
            cvp_center_radius: 4.0,
            cvp_point_radius: 8.0,
            mod_point_radius: 5.0,
            grid_stroke: 0.7,
            dual_grid_stroke: 0.8,
            vector_stroke: 2.0,
            shortest_stroke: 2.5,
        }
    }
}

/// Immutable configuration handed to a [`crate::render::LatticeEngine`] at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub point_range: i32,
    pub palette: Palette,
    pub timings: Timings,
    pub geometry: Geometry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            point_range: POINT_RANGE,
            palette: Palette::default(),
            timings: Timings::default(),
            geometry: Geometry::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file. Missing fields fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.point_range < 1 {
            anyhow::bail!("point_range must be at least 1, got {}", self.point_range);
        }
        if self.point_range > MAX_POINT_RANGE {
            anyhow::bail!(
                "point_range must be at most {}, got {}",
                MAX_POINT_RANGE,
                self.point_range
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "point_range": 6 }"#).unwrap();
        assert_eq!(config.point_range, 6);
        assert_eq!(config.timings, Timings::default());
        assert_eq!(config.palette.shortest_1, Color::rgb(0xff, 0x7f, 0x0e));
    }

    #[test]
    fn test_point_range_bounds() {
        assert!(EngineConfig::from_json_str(r#"{ "point_range": 0 }"#).is_err());
        assert!(EngineConfig::from_json_str(&format!(r#"{{ "point_range": {} }}"#, MAX_POINT_RANGE)).is_ok());
        assert!(EngineConfig::from_json_str(r#"{ "point_range": 100000 }"#).is_err());
    }

    #[test]
    fn test_palette_colors_parse_from_hex() {
        let config =
            EngineConfig::from_json_str(r##"{ "palette": { "grid": "#123456" } }"##).unwrap();
        assert_eq!(config.palette.grid, Color::rgb(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_rejects_empty_window() {
        assert!(EngineConfig::from_json_str(r#"{ "point_range": 0 }"#).is_err());
    }
}
