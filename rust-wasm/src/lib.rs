//! Browser bindings for the lattice visualization engine.
//!
//! `WasmLatticeDisplay` mounts the engine into a DOM container; `Basis`
//! exposes the lattice math to JavaScript.

use wasm_bindgen::prelude::*;

// ======================== MODULE DECLARATIONS ========================
pub mod common;
pub mod display;
pub mod dom_surface;
pub mod lattice;
pub mod utils;


// ======================== RE-EXPORTED PUBLIC API ========================
pub use common::{BasisData, CvpData, EventData, Point, PointSelectionData, ShortVectorData};
pub use display::{WasmLatticeDisplay, WasmRadiusControl};
pub use dom_surface::{DomSurface, EventSink};
pub use lattice::Basis;

// Enable console logging and panic hooks for debugging
#[wasm_bindgen(start)]
pub fn main() {
    utils::set_panic_hook();
    utils::init_console_logger();
    console_log!("lattice-viz {} loaded", lattice_viz::VERSION);
}

#[wasm_bindgen]
pub fn version() -> String {
    lattice_viz::VERSION.to_string()
}
