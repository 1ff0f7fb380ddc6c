// Display module: component-style wrapper owning an engine, and the CVP radius slider model

// ======================== MODULE DECLARATIONS ========================
pub mod lattice_display;
pub mod radius_control;

// Test modules
mod _tests_display;

// ======================== DISPLAY ========================
pub use lattice_display::{
    DisplayProps,   // struct - declarative view description, dual_view() preset
    LatticeDisplay, // struct - mounts an engine, forwards changed props, unmounts once
    PropChange,     // enum - setter forwarded by update()
};
pub use radius_control::RadiusControl; // struct - [0, 1.5] slider with a soft cap at 1.0
