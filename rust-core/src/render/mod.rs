// Render module: retained scene, transitions and the lattice engine driving a drawing surface
// The engine owns all mutable view state; everything below it is plain data

// ======================== MODULE DECLARATIONS ========================
pub mod color;
pub mod engine;
pub mod scene;
pub mod scene_builder;
pub mod surface;
pub mod svg;
pub mod transition;

// Test modules
mod _tests_engine;

// ======================== SCENE ========================
pub use color::Color; // struct - RGBA colour, serialized as CSS
pub use scene::{
    ElementId,  // enum - identity of an element within its layer
    ElementKey, // struct - (layer, id)
    Frame,      // struct - sampled scene handed to a surface
    Layer,      // enum - drawing layers in paint order
    Scene,      // struct - keyed shapes of one engine state
    Shape,      // enum - circle, line, polygon, text
    Style,      // struct - fill, stroke, dash, opacity
};
pub use scene_builder::{
    Layout,        // struct - container size and origin in surface pixels
    SceneFacts,    // struct - dual basis, shortest vectors and CVP outcome of a state
    build_scene,   // fn(config, options, state, layout, facts) -> Scene
    compute_facts, // fn(state, layout, range) -> SceneFacts
};
pub use svg::ARROW_MARKER_ID; // const - id of the arrow-head marker in SVG output
// Frame impl methods:
//   to_svg(&self) -> String  - standalone SVG document, one <g> per layer

// ======================== TRANSITIONS ========================
pub use transition::{
    Transitions,      // struct - in-flight tweens keyed by element
    Tween,            // struct - one element interpolation
    ease_cubic_in_out, // fn(t) -> f64
};

// ======================== SURFACE ========================
pub use surface::{
    HeadlessHandle,  // struct - test/CLI driver of a HeadlessSurface
    HeadlessSurface, // struct - in-memory surface with a manual clock
    ListenerId,      // struct - subscription handle
    ListenerKind,    // enum - Resize, Click
    Size,            // struct - container client size
    Surface,         // trait - drawing surface owned by one engine
    SurfaceEvent,    // enum - host events delivered to the engine
};

// ======================== ENGINE ========================
pub use engine::{
    EngineEvent,    // enum - observer notifications
    EngineOptions,  // struct - initial values and display variants
    LatticeEngine,  // struct - the renderer
    PointSelection, // struct - clicked lattice point
    ViewState,      // struct - mutable view state
    is_valid_scale, // fn(f64) -> bool - positive and finite
};
// LatticeEngine impl methods:
//   new(surface, config, options) -> Self       - subscribes and draws the static layout
//   set_basis / set_show_* / set_cvp_* / set_scale / set_mod_projection / set_mod_vector
//   relayout(animated) / became_visible(animated)
//   handle_event(SurfaceEvent) / tick()
//   destroy(self)                                - releases subscriptions and detaches
