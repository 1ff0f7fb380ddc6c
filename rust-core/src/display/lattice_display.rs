use log::{debug, warn};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, DEFAULT_CVP_RADIUS_FACTOR, DEFAULT_SCALE};
use crate::interfaces::{PointVariant, Space};
use crate::lattice::{basis_a, Basis2D};
use crate::render::{
    is_valid_scale, Color, EngineEvent, EngineOptions, LatticeEngine, Surface, SurfaceEvent,
};

/// Declarative description of a mounted lattice view.
///
/// Display variants (`dual_point_variant`, `dual_point_color`,
/// `show_fundamental_domain`, `fundamental_space`, `show_cvp_residual_arrow`)
/// are read at mount only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayProps {
    pub basis: Basis2D,
    pub show_primal: bool,
    pub show_dual: bool,
    pub show_shortest: bool,
    pub shortest_space: Space,
    pub cvp_enabled: bool,
    pub cvp_radius_factor: f64,
    pub cvp_space: Space,
    pub scale: f64,
    pub show_cvp_origin_circle: bool,
    pub enable_mod_projection: bool,
    pub mod_projection_divider: u32,
    pub dual_point_variant: PointVariant,
    pub dual_point_color: Option<Color>,
    pub show_fundamental_domain: bool,
    pub fundamental_space: Space,
    pub show_cvp_residual_arrow: bool,
}

impl Default for DisplayProps {
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
            show_cvp_origin_circle: false,
            enable_mod_projection: false,
            mod_projection_divider: 1,
            dual_point_variant: PointVariant::Hollow,
            dual_point_color: None,
            show_fundamental_domain: false,
            fundamental_space: Space::Primal,
            show_cvp_residual_arrow: false,
        }
    }
}

impl DisplayProps {
    /// Dual lattice only: primal hidden, shortest vectors and CVP in the dual.
    pub fn dual_view() -> Self {
        Self {
            show_primal: false,
            show_dual: true,
            shortest_space: Space::Dual,
            cvp_space: Space::Dual,
            ..Self::default()
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            basis: self.basis,
            show_primal: self.show_primal,
            show_dual: self.show_dual,
            show_shortest: self.show_shortest,
            shortest_space: self.shortest_space,
            cvp_enabled: self.cvp_enabled,
            cvp_radius_factor: self.cvp_radius_factor,
            cvp_space: self.cvp_space,
            scale: self.scale,
            show_origin_circle: self.show_cvp_origin_circle,
            dual_point_variant: self.dual_point_variant,
            dual_point_color: self.dual_point_color,
            show_cvp_residual_arrow: self.show_cvp_residual_arrow,
            show_fundamental_domain: self.show_fundamental_domain,
            fundamental_space: self.fundamental_space,
            enable_mod_projection: self.enable_mod_projection,
            mod_projection_divider: self.mod_projection_divider,
        }
    }
}

/// Setter invoked by [`LatticeDisplay::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropChange {
    Basis,
    ShowPrimal,
    ShowDual,
    ShowShortest,
    ShortestSpace,
    CvpEnabled,
    CvpRadiusFactor,
    CvpSpace,
    Scale,
    OriginCircle,
    ModProjection,
}

/// Owner of one engine for the lifetime of a mounted view.
pub struct LatticeDisplay<S: Surface> {
    engine: Option<LatticeEngine<S>>,
    props: DisplayProps,
}

impl<S: Surface> LatticeDisplay<S> {
    pub fn mount(surface: S, config: EngineConfig, mut props: DisplayProps) -> Self {
        let engine = LatticeEngine::new(surface, config, props.engine_options());
        props.scale = engine.state().scale;
        Self {
            engine: Some(engine),
            props,
        }
    }

    pub fn props(&self) -> &DisplayProps {
        &self.props
    }

    pub fn is_mounted(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&LatticeEngine<S>> {
        self.engine.as_ref()
    }

    pub fn set_observer(&mut self, observer: impl FnMut(&EngineEvent) + 'static) {
        if let Some(engine) = self.engine.as_mut() {
            engine.set_observer(observer);
        }
    }

    /// Forward the props that differ from the current ones to the engine.
    /// Returns the setters that were called, in call order.
    pub fn update(&mut self, mut props: DisplayProps) -> Vec<PropChange> {
        if !is_valid_scale(props.scale) {
            warn!("Ignoring invalid scale {}", props.scale);
            props.scale = self.props.scale;
        }
        let old = std::mem::replace(&mut self.props, props);
        let new = &self.props;
        let Some(engine) = self.engine.as_mut() else {
            return Vec::new();
        };

        let mut changes = Vec::new();
        if new.basis != old.basis {
            engine.set_basis(new.basis.b1, new.basis.b2);
            changes.push(PropChange::Basis);
        }
        if new.show_primal != old.show_primal {
            engine.set_show_primal(new.show_primal);
            changes.push(PropChange::ShowPrimal);
        }
        if new.show_dual != old.show_dual {
            engine.set_show_dual(new.show_dual);
            changes.push(PropChange::ShowDual);
        }
        if new.show_shortest != old.show_shortest {
            engine.set_show_shortest(new.show_shortest);
            changes.push(PropChange::ShowShortest);
        }
        if new.shortest_space != old.shortest_space {
            engine.set_shortest_space(new.shortest_space);
            changes.push(PropChange::ShortestSpace);
        }
        if new.cvp_enabled != old.cvp_enabled {
            engine.set_cvp_enabled(new.cvp_enabled);
            changes.push(PropChange::CvpEnabled);
        }
        if new.cvp_radius_factor != old.cvp_radius_factor {
            engine.set_cvp_radius_factor(new.cvp_radius_factor);
            changes.push(PropChange::CvpRadiusFactor);
        }
        if new.cvp_space != old.cvp_space {
            engine.set_cvp_space(new.cvp_space);
            changes.push(PropChange::CvpSpace);
        }
        if new.scale != old.scale {
            engine.set_scale_default(new.scale);
            changes.push(PropChange::Scale);
        }
        if new.show_cvp_origin_circle != old.show_cvp_origin_circle {
            engine.set_show_origin_circle(new.show_cvp_origin_circle);
            changes.push(PropChange::OriginCircle);
        }
        if new.enable_mod_projection != old.enable_mod_projection
            || new.mod_projection_divider != old.mod_projection_divider
        {
            engine.set_mod_projection(new.enable_mod_projection, new.mod_projection_divider);
            changes.push(PropChange::ModProjection);
        }

        if !changes.is_empty() {
            debug!("Display update: {:?}", changes);
        }
        changes
    }

    // ======================== PASSTHROUGHS ========================

    pub fn relayout(&mut self, animated: bool) {
        if let Some(engine) = self.engine.as_mut() {
            engine.relayout(animated);
        }
    }

    pub fn became_visible(&mut self, animated: bool) {
        if let Some(engine) = self.engine.as_mut() {
            engine.became_visible(animated);
        }
    }

    pub fn set_basis(&mut self, b1: Vector2<f64>, b2: Vector2<f64>) {
        if let Some(engine) = self.engine.as_mut() {
            engine.set_basis(b1, b2);
        }
    }

    pub fn set_scale(&mut self, scale: f64, duration_ms: Option<f64>) {
        if let Some(engine) = self.engine.as_mut() {
            match duration_ms {
                Some(ms) => engine.set_scale(scale, ms),
                None => engine.set_scale_default(scale),
            }
        }
    }

    pub fn set_mod_vector(&mut self, vec: Option<Vector2<f64>>) {
        if let Some(engine) = self.engine.as_mut() {
            engine.set_mod_vector(vec);
        }
    }

    pub fn handle_event(&mut self, event: SurfaceEvent) {
        if let Some(engine) = self.engine.as_mut() {
            engine.handle_event(event);
        }
    }

    pub fn tick(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.tick();
        }
    }

    /// Destroy the engine. Returns `false` when it was already unmounted.
    pub fn unmount(&mut self) -> bool {
        match self.engine.take() {
            Some(engine) => {
                engine.destroy();
                debug!("Lattice display unmounted");
                true
            }
            None => false,
        }
    }
}

impl<S: Surface> Drop for LatticeDisplay<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}
