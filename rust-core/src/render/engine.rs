//! Stateful lattice renderer bound to one drawing surface.

use log::{debug, warn};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, DEFAULT_CVP_RADIUS_FACTOR, DEFAULT_SCALE, MAX_POINT_RANGE};
use crate::interfaces::{PointVariant, Space};
use crate::lattice::{
    basis_a, format_basis_text, format_cvp_outcome, reduce_vector_mod_lattice,
    shortest_vector_length, Basis2D, LatticeIndex,
};
use crate::render::color::Color;
use crate::render::scene::{ElementId, ElementKey, Frame, Layer, Scene, Shape};
use crate::render::scene_builder::{build_scene, compute_facts, Layout, SceneFacts};
use crate::render::surface::{ListenerId, ListenerKind, Surface, SurfaceEvent};
use crate::render::transition::{Transitions, Tween};

/// Initial values and per-instance display variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub basis: Basis2D,
    pub show_primal: bool,
    pub show_dual: bool,
    pub show_shortest: bool,
    pub shortest_space: Space,
    pub cvp_enabled: bool,
    pub cvp_radius_factor: f64,
    pub cvp_space: Space,
    pub scale: f64,
    pub show_origin_circle: bool,
    pub dual_point_variant: PointVariant,
    /// Overrides the palette colour of dual points.
    pub dual_point_color: Option<Color>,
    pub show_cvp_residual_arrow: bool,
    pub show_fundamental_domain: bool,
    pub fundamental_space: Space,
    pub enable_mod_projection: bool,
    pub mod_projection_divider: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            basis: basis_a(),
            show_primal: true,
            show_dual: false,
            show_shortest: true,
            shortest_space: Space::Primal,
            cvp_enabled: false,
            cvp_radius_factor: DEFAULT_CVP_RADIUS_FACTOR,
            cvp_space: Space::Primal,
            scale: DEFAULT_SCALE,
            show_origin_circle: false,
            dual_point_variant: PointVariant::Hollow,
            dual_point_color: None,
            show_cvp_residual_arrow: false,
            show_fundamental_domain: false,
            fundamental_space: Space::Primal,
            enable_mod_projection: false,
            mod_projection_divider: 1,
        }
    }
}

/// Mutable view state of an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub basis: Basis2D,
    pub show_primal: bool,
    pub show_dual: bool,
    pub show_shortest: bool,
    pub shortest_space: Space,
    pub cvp_enabled: bool,
    pub cvp_radius_factor: f64,
    pub cvp_space: Space,
    pub scale: f64,
    pub show_origin_circle: bool,
    pub mod_projection_enabled: bool,
    pub mod_projection_divider: u32,
    /// Last background click, in surface coordinates.
    pub cvp_target: Option<Point2<f64>>,
    /// Projected vector in lattice coordinates.
    pub mod_vector: Option<Vector2<f64>>,
}

/// Pixels per lattice unit must be a positive finite number.
pub fn is_valid_scale(scale: f64) -> bool {
    scale.is_finite() && scale > 0.0
}

impl ViewState {
    /// An invalid initial scale falls back to `DEFAULT_SCALE`.
    pub fn from_options(options: &EngineOptions) -> Self {
        let scale = if is_valid_scale(options.scale) {
            options.scale
        } else {
            warn!("Invalid initial scale {}, using {}", options.scale, DEFAULT_SCALE);
            DEFAULT_SCALE
        };
        Self {
            basis: options.basis,
            show_primal: options.show_primal,
            show_dual: options.show_dual,
            show_shortest: options.show_shortest,
            shortest_space: options.shortest_space,
            cvp_enabled: options.cvp_enabled,
            cvp_radius_factor: options.cvp_radius_factor,
            cvp_space: options.cvp_space,
            scale,
            show_origin_circle: options.show_origin_circle,
            mod_projection_enabled: options.enable_mod_projection,
            mod_projection_divider: options.mod_projection_divider.max(1),
            cvp_target: None,
            mod_vector: None,
        }
    }

    pub fn space_visible(&self, space: Space) -> bool {
        match space {
            Space::Primal => self.show_primal,
            Space::Dual => self.show_dual,
        }
    }
}

/// A clicked lattice point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSelection {
    pub space: Space,
    pub index: LatticeIndex,
    /// Lattice coordinates of the point.
    pub position: Vector2<f64>,
    /// Basis of the clicked lattice.
    pub basis: Basis2D,
}

/// Notifications delivered to the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    BasisText(String),
    DualBasisText(String),
    CvpText(String),
    PointSelected(PointSelection),
    BackgroundClick,
    ModVector(Option<Vector2<f64>>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Enter {
    /// Continue from the value on screen; new elements grow out of their own seed.
    FromCurrent,
    /// Start collapsed into the lattice origin.
    FromOrigin { fade: bool },
    /// Start from the element's seed in place.
    Grow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Static,
    Animate {
        duration_ms: f64,
        enter: Enter,
        /// Delay per unit of index distance from (0, 0).
        stagger_ms: f64,
        /// Restart even when the target did not change.
        restart: bool,
    },
}

impl Motion {
    fn animate(duration_ms: f64, enter: Enter) -> Self {
        Motion::Animate {
            duration_ms,
            enter,
            stagger_ms: 0.0,
            restart: false,
        }
    }

    fn intro(duration_ms: f64, enter: Enter, stagger_ms: f64) -> Self {
        Motion::Animate {
            duration_ms,
            enter,
            stagger_ms,
            restart: true,
        }
    }
}

/// Per-layer motion for one scene update.
#[derive(Debug, Clone, Copy)]
struct MotionPlan {
    layers: [Motion; 10],
}

impl MotionPlan {
    fn snap() -> Self {
        Self {
            layers: [Motion::Static; 10],
        }
    }

    fn with(mut self, layer: Layer, motion: Motion) -> Self {
        self.layers[layer as usize] = motion;
        self
    }

    fn with_all(mut self, layers: &[Layer], motion: Motion) -> Self {
        for layer in layers {
            self = self.with(*layer, motion);
        }
        self
    }

    fn get(&self, layer: Layer) -> Motion {
        self.layers[layer as usize]
    }
}

const DUAL_LAYERS: [Layer; 3] = [Layer::DualGrid, Layer::DualLattice, Layer::DualBasis];

type Observer = Box<dyn FnMut(&EngineEvent)>;

/// Lattice renderer. Owns its surface and every subscription it takes on it.
pub struct LatticeEngine<S: Surface> {
    surface: Option<S>,
    config: EngineConfig,
    options: EngineOptions,
    state: ViewState,
    layout: Option<Layout>,
    scene: Scene,
    facts: SceneFacts,
    tweens: Transitions,
    listeners: Vec<ListenerId>,
    observer: Option<Observer>,
    last_texts: [Option<String>; 3],
}

impl<S: Surface> LatticeEngine<S> {
    /// Subscribe to resize and click events and draw the initial static layout.
    pub fn new(mut surface: S, mut config: EngineConfig, options: EngineOptions) -> Self {
        if let Err(err) = config.validate() {
            warn!("{}; clamping point_range", err);
            config.point_range = config.point_range.clamp(1, MAX_POINT_RANGE);
        }
        let listeners = vec![
            surface.subscribe(ListenerKind::Resize),
            surface.subscribe(ListenerKind::Click),
        ];
        let state = ViewState::from_options(&options);
        let facts = compute_facts(&state, None, config.point_range);

        let mut engine = Self {
            surface: Some(surface),
            config,
            options,
            state,
            layout: None,
            scene: Scene::new(),
            facts,
            tweens: Transitions::new(),
            listeners,
            observer: None,
            last_texts: [None, None, None],
        };
        engine.layout_static(false);
        engine
    }

    /// Register the event observer. The current texts are reported immediately.
    pub fn set_observer(&mut self, observer: impl FnMut(&EngineEvent) + 'static) {
        self.observer = Some(Box::new(observer));
        self.last_texts = [None, None, None];
        self.emit_texts();
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    // ======================== ACCESSORS ========================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Target scene of the current state, without transitions applied.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn facts(&self) -> &SceneFacts {
        &self.facts
    }

    pub fn dual_basis(&self) -> Basis2D {
        self.facts.dual
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.tweens.is_animating(self.now())
    }

    /// The scene sampled at the surface clock; `None` without a container.
    pub fn current_frame(&self) -> Option<Frame> {
        let layout = self.layout?;
        let now = self.now();
        let elements = self
            .scene
            .iter()
            .map(|(key, target)| (*key, self.tweens.sample_or(key, target, now)))
            .collect();
        Some(Frame {
            width: layout.width,
            height: layout.height,
            elements,
        })
    }

    // ======================== STATE SETTERS ========================

    pub fn set_basis(&mut self, b1: Vector2<f64>, b2: Vector2<f64>) {
        let basis = Basis2D::new(b1, b2);
        if basis.is_degenerate() {
            warn!("Degenerate basis {:?}, dual lattice collapses", basis.as_arrays());
        }
        debug!("set_basis {:?}", basis.as_arrays());
        self.state.basis = basis;
        self.state.cvp_target = None;

        let d = self.config.timings.basis_transition_ms;
        let plan = MotionPlan::snap()
            .with_all(&[Layer::Lattice, Layer::Basis], Motion::animate(d, Enter::FromCurrent))
            .with_all(&DUAL_LAYERS, Motion::animate(d, Enter::FromOrigin { fade: false }))
            .with(Layer::Shortest, Motion::animate(d, Enter::FromOrigin { fade: false }));
        self.update(plan);
    }

    pub fn set_show_primal(&mut self, flag: bool) {
        debug!("set_show_primal {}", flag);
        self.state.show_primal = flag;
        self.update(MotionPlan::snap());
    }

    pub fn set_show_dual(&mut self, flag: bool) {
        debug!("set_show_dual {}", flag);
        self.state.show_dual = flag;
        let d = self.config.timings.toggle_dual_ms;
        let plan =
            MotionPlan::snap().with_all(&DUAL_LAYERS, Motion::animate(d, Enter::FromOrigin { fade: false }));
        self.update(plan);
    }

    pub fn set_show_shortest(&mut self, flag: bool) {
        debug!("set_show_shortest {}", flag);
        self.state.show_shortest = flag;
        self.update(MotionPlan::snap());
    }

    pub fn set_shortest_space(&mut self, space: Space) {
        debug!("set_shortest_space {}", space);
        self.state.shortest_space = space;
        self.update(MotionPlan::snap());
    }

    /// Disabling drops the target and all CVP annotations.
    pub fn set_cvp_enabled(&mut self, flag: bool) {
        debug!("set_cvp_enabled {}", flag);
        self.state.cvp_enabled = flag;
        if !flag {
            self.state.cvp_target = None;
        }
        self.update(MotionPlan::snap());
    }

    pub fn set_cvp_radius_factor(&mut self, factor: f64) {
        debug!("set_cvp_radius_factor {}", factor);
        self.state.cvp_radius_factor = factor.max(0.0);
        self.update(MotionPlan::snap());
    }

    pub fn set_cvp_space(&mut self, space: Space) {
        debug!("set_cvp_space {}", space);
        self.state.cvp_space = space;
        self.update(MotionPlan::snap());
    }

    pub fn set_show_origin_circle(&mut self, flag: bool) {
        debug!("set_show_origin_circle {}", flag);
        self.state.show_origin_circle = flag;
        self.update(MotionPlan::snap());
    }

    /// Rescale over `duration_ms`. The CVP target is dropped; a mod vector is
    /// kept in lattice coordinates and follows the new scale.
    pub fn set_scale(&mut self, scale: f64, duration_ms: f64) {
        if !is_valid_scale(scale) {
            warn!("Ignoring invalid scale {}", scale);
            return;
        }
        debug!("set_scale {} over {} ms", scale, duration_ms);
        self.state.scale = scale;
        self.state.cvp_target = None;

        let moving = Motion::animate(duration_ms, Enter::FromCurrent);
        let plan = MotionPlan::snap()
            .with_all(&[Layer::Lattice, Layer::DualLattice, Layer::Basis], moving)
            .with(Layer::Shortest, Motion::animate(duration_ms, Enter::FromOrigin { fade: false }));
        self.update(plan);
    }

    /// `set_scale` with the configured default duration.
    pub fn set_scale_default(&mut self, scale: f64) {
        self.set_scale(scale, self.config.timings.scale_transition_ms);
    }

    /// Turning projection off or changing the divider clears the mod vector.
    pub fn set_mod_projection(&mut self, enabled: bool, divider: u32) {
        let divider = divider.max(1);
        let divider_changed = divider != self.state.mod_projection_divider;
        debug!("set_mod_projection {} / {}", enabled, divider);
        self.state.mod_projection_enabled = enabled;
        self.state.mod_projection_divider = divider;
        if !enabled || divider_changed {
            self.state.mod_vector = None;
            self.emit(EngineEvent::ModVector(None));
        }
        self.update(MotionPlan::snap());
    }

    pub fn set_mod_vector(&mut self, vec: Option<Vector2<f64>>) {
        debug!("set_mod_vector {:?}", vec);
        self.state.mod_vector = vec;
        self.update(MotionPlan::snap());
    }

    // ======================== LAYOUT ========================

    /// Re-read the container size and redraw, with the intro reveal when `animated`.
    pub fn relayout(&mut self, animated: bool) {
        self.layout_static(animated);
    }

    /// Host signal that the visualization became visible.
    pub fn became_visible(&mut self, animated: bool) {
        debug!("became_visible (animated = {})", animated);
        self.layout_static(animated);
    }

    fn layout_static(&mut self, animated: bool) {
        self.layout = match self.surface.as_ref().map(|s| s.client_size()) {
            Some(Some(size)) => Some(Layout::centered(size.width, size.height)),
            Some(None) => {
                warn!("Lattice container is missing, nothing will be drawn");
                None
            }
            None => None,
        };

        let plan = if animated {
            let t = &self.config.timings;
            let origin = Enter::FromOrigin { fade: false };
            MotionPlan::snap()
                .with(
                    Layer::Lattice,
                    Motion::intro(
                        t.intro_points_ms,
                        Enter::FromOrigin { fade: true },
                        t.intro_point_delay_per_unit_ms,
                    ),
                )
                .with(Layer::Grid, Motion::intro(t.intro_grid_ms, origin, 0.0))
                .with_all(
                    &[Layer::DualGrid, Layer::DualLattice],
                    Motion::intro(t.intro_grid_ms, origin, 0.0),
                )
                .with(Layer::Basis, Motion::intro(t.intro_basis_ms, origin, 0.0))
                .with_all(
                    &[Layer::DualBasis, Layer::Shortest],
                    Motion::intro(t.intro_highlight_ms, origin, 0.0),
                )
        } else {
            self.tweens.clear();
            MotionPlan::snap()
        };
        self.update(plan);
    }

    // ======================== EVENTS ========================

    pub fn handle_event(&mut self, event: SurfaceEvent) {
        if self.surface.is_none() {
            return;
        }
        match event {
            SurfaceEvent::Resize => self.layout_static(false),
            SurfaceEvent::Click { x, y } => self.handle_click(Point2::new(x, y)),
            SurfaceEvent::AnimationFrame => self.tick(),
            SurfaceEvent::BecameVisible { animated } => self.became_visible(animated),
        }
    }

    /// Advance transitions to the surface clock and draw.
    pub fn tick(&mut self) {
        let now = self.now();
        self.tweens.prune(now, |_| true);
        self.redraw();
    }

    fn handle_click(&mut self, p: Point2<f64>) {
        if self.layout.is_none() {
            return;
        }

        if let Some((space, index)) = self.hit_test(p) {
            self.select_point(space, index);
            return;
        }

        debug!("Background click at ({:.1}, {:.1})", p.x, p.y);
        self.emit(EngineEvent::BackgroundClick);
        if !self.state.cvp_enabled {
            return;
        }
        self.state.cvp_target = Some(p);
        let plan = MotionPlan::snap().with(
            Layer::Cvp,
            Motion::animate(self.config.timings.cvp_transition_ms, Enter::Grow),
        );
        self.update(plan);
    }

    /// Closest visible lattice point whose drawn circle (plus slop) contains
    /// `p`. Dual points are tested first since they paint on top.
    fn hit_test(&self, p: Point2<f64>) -> Option<(Space, LatticeIndex)> {
        let slop = self.config.geometry.hit_slop;
        for (layer, space) in [(Layer::DualLattice, Space::Dual), (Layer::Lattice, Space::Primal)] {
            let mut best: Option<(f64, LatticeIndex)> = None;
            for (key, shape) in self.scene.layer(layer) {
                let (ElementId::Point { i, j }, Shape::Circle { center, radius, .. }) =
                    (key.id, shape)
                else {
                    continue;
                };
                let dist = (*center - p).norm();
                if dist <= *radius + slop && best.map_or(true, |(d, _)| dist < d) {
                    best = Some((dist, LatticeIndex::new(i, j)));
                }
            }
            if let Some((_, index)) = best {
                return Some((space, index));
            }
        }
        None
    }

    fn select_point(&mut self, space: Space, index: LatticeIndex) {
        let basis = match space {
            Space::Primal => self.state.basis,
            Space::Dual => self.facts.dual,
        };
        let selection = PointSelection {
            space,
            index,
            position: basis.point(index.i, index.j),
            basis,
        };
        debug!("Selected {} point ({}, {})", space, index.i, index.j);
        self.emit(EngineEvent::PointSelected(selection));

        if space == Space::Dual && self.state.mod_projection_enabled {
            let vec = self.project_mod(index);
            self.state.mod_vector = vec;
            self.emit(EngineEvent::ModVector(vec));
            self.update(MotionPlan::snap());
        }
    }

    /// Scale the clicked dual point by `1 / divider`; accepted when inside the
    /// CVP ball around the origin, then reduced modulo the dual lattice.
    fn project_mod(&self, index: LatticeIndex) -> Option<Vector2<f64>> {
        let dual = self.facts.dual;
        let div = self.state.mod_projection_divider as f64;
        let raw = dual.combine(index.i as f64 / div, index.j as f64 / div);
        let half_shortest = 0.5 * shortest_vector_length(&dual, self.config.point_range);
        let radius = self.state.cvp_radius_factor * half_shortest;
        if raw.norm() <= radius {
            Some(reduce_vector_mod_lattice(raw, &dual).vec)
        } else {
            None
        }
    }

    // ======================== TEARDOWN ========================

    /// Release every subscription and detach the drawing.
    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(mut surface) = self.surface.take() else {
            return;
        };
        for id in self.listeners.drain(..) {
            surface.unsubscribe(id);
        }
        surface.detach();
        self.tweens.clear();
        debug!("Lattice engine released its surface");
    }

    // ======================== INTERNALS ========================

    fn now(&self) -> f64 {
        self.surface.as_ref().map_or(0.0, |s| s.now_ms())
    }

    /// Recompute facts and the target scene, start tweens per `plan`, notify and draw.
    fn update(&mut self, plan: MotionPlan) {
        self.facts = compute_facts(&self.state, self.layout.as_ref(), self.config.point_range);
        self.emit_texts();

        let Some(layout) = self.layout else {
            self.scene = Scene::new();
            self.tweens.clear();
            return;
        };
        let next = build_scene(&self.config, &self.options, &self.state, &layout, &self.facts);
        self.apply(next, plan, layout.origin);
        self.redraw();
    }

    fn apply(&mut self, next: Scene, plan: MotionPlan, origin: Point2<f64>) {
        let now = self.now();

        for (key, target) in next.iter() {
            let previous = self.scene.get(key);
            let unchanged = previous == Some(target);

            match plan.get(key.layer) {
                Motion::Static => {
                    if !unchanged {
                        self.tweens.cancel(key);
                    }
                }
                Motion::Animate { duration_ms, enter, stagger_ms, restart } => {
                    if unchanged && !restart {
                        continue;
                    }
                    let from = match (enter, previous) {
                        (Enter::FromOrigin { fade }, _) => target.collapsed_to(origin, fade),
                        (Enter::Grow, _) => target.seed(),
                        (Enter::FromCurrent, Some(previous)) => {
                            self.tweens.sample_or(key, previous, now)
                        }
                        (Enter::FromCurrent, None) => target.seed(),
                    };
                    let tween = Tween {
                        from,
                        to: target.clone(),
                        start_ms: now,
                        delay_ms: stagger_ms * index_distance(key),
                        duration_ms,
                    };
                    self.tweens.start(*key, tween);
                }
            }
        }

        self.tweens.prune(now, |key| next.contains(key));
        self.scene = next;
    }

    fn redraw(&mut self) {
        let Some(frame) = self.current_frame() else {
            return;
        };
        let animating = self.is_animating();
        if let Some(surface) = self.surface.as_mut() {
            surface.draw(&frame);
            if animating {
                surface.request_frame();
            }
        }
    }

    fn emit(&mut self, event: EngineEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }

    /// Report basis and CVP texts that changed since the last report.
    fn emit_texts(&mut self) {
        let texts = [
            format_basis_text(&self.state.basis),
            format_basis_text(&self.facts.dual),
            format_cvp_outcome(&self.facts.cvp),
        ];
        for (slot, text) in texts.into_iter().enumerate() {
            if self.last_texts[slot].as_deref() == Some(text.as_str()) {
                continue;
            }
            self.last_texts[slot] = Some(text.clone());
            let event = match slot {
                0 => EngineEvent::BasisText(text),
                1 => EngineEvent::DualBasisText(text),
                _ => EngineEvent::CvpText(text),
            };
            self.emit(event);
        }
    }
}

impl<S: Surface> Drop for LatticeEngine<S> {
    fn drop(&mut self) {
        self.release();
    }
}

fn index_distance(key: &ElementKey) -> f64 {
    match key.id {
        ElementId::Point { i, j } => LatticeIndex::new(i, j).index_norm(),
        _ => 0.0,
    }
}
