//! Pure construction of the target [`Scene`] for an engine state.

use nalgebra::{Point2, Vector2};

use crate::config::EngineConfig;
use crate::interfaces::{PointVariant, Space};
use crate::lattice::{
    compute_dual_basis, compute_shortest_primitive_vectors, evaluate_cvp, lattice_indices, Basis2D,
    CvpOutcome, ShortVector,
};
use crate::render::color::Color;
use crate::render::engine::{EngineOptions, ViewState};
use crate::render::scene::{ElementId, Layer, Scene, Shape, Style};

const BASIS_LABEL_SIZE: f64 = 14.0;
const SMALL_LABEL_SIZE: f64 = 13.0;
const NOTE_LABEL_SIZE: f64 = 12.0;
const LABEL_LIFT: f64 = 6.0;
const ORIGIN_CIRCLE_STROKE: f64 = 1.5;
const HOLLOW_STROKE: f64 = 1.6;

/// Screen placement of the lattice: container size and the pixel position of
/// the lattice origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub origin: Point2<f64>,
}

impl Layout {
    /// Origin at the center of a `width x height` container.
    pub fn centered(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            origin: Point2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn to_screen(&self, v: Vector2<f64>, scale: f64) -> Point2<f64> {
        Point2::new(self.origin.x + v.x * scale, self.origin.y - v.y * scale)
    }

    pub fn from_screen(&self, p: Point2<f64>, scale: f64) -> Vector2<f64> {
        if scale == 0.0 {
            return Vector2::zeros();
        }
        Vector2::new((p.x - self.origin.x) / scale, (self.origin.y - p.y) / scale)
    }
}

/// Derived lattice quantities for one state, independent of the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFacts {
    pub dual: Basis2D,
    /// Shortest primitive vectors in the shortest-vector space.
    pub shortest: Vec<ShortVector>,
    /// CVP query in the CVP space; the target is converted from screen coordinates.
    pub cvp: CvpOutcome,
}

pub fn compute_facts(state: &ViewState, layout: Option<&Layout>, range: i32) -> SceneFacts {
    let dual = compute_dual_basis(&state.basis);
    let pick = |space: Space| match space {
        Space::Primal => state.basis,
        Space::Dual => dual,
    };

    let shortest = compute_shortest_primitive_vectors(&pick(state.shortest_space), range);
    let target = match (state.cvp_target, layout) {
        (Some(p), Some(layout)) => Some(layout.from_screen(p, state.scale)),
        _ => None,
    };
    let cvp = evaluate_cvp(&pick(state.cvp_space), target, state.cvp_radius_factor, range);

    SceneFacts { dual, shortest, cvp }
}

/// Everything visible for `state`, in screen coordinates.
pub fn build_scene(
    config: &EngineConfig,
    options: &EngineOptions,
    state: &ViewState,
    layout: &Layout,
    facts: &SceneFacts,
) -> Scene {
    let builder = Builder {
        config,
        options,
        state,
        layout,
        facts,
        range: config.point_range,
    };
    let mut scene = Scene::new();

    if state.show_primal {
        builder.grid(&mut scene, Layer::Grid, &state.basis);
        builder.primal_points(&mut scene);
        builder.basis_arrows(&mut scene, Layer::Basis, &state.basis);
    }
    if state.show_dual {
        builder.grid(&mut scene, Layer::DualGrid, &facts.dual);
        builder.dual_points(&mut scene);
        builder.basis_arrows(&mut scene, Layer::DualBasis, &facts.dual);
    }
    builder.fundamental_domain(&mut scene);
    builder.shortest_vectors(&mut scene);
    builder.cvp(&mut scene);
    builder.mod_vector(&mut scene);

    scene
}

struct Builder<'a> {
    config: &'a EngineConfig,
    options: &'a EngineOptions,
    state: &'a ViewState,
    layout: &'a Layout,
    facts: &'a SceneFacts,
    range: i32,
}

impl Builder<'_> {
    fn screen(&self, v: Vector2<f64>) -> Point2<f64> {
        self.layout.to_screen(v, self.state.scale)
    }

    fn basis_for(&self, space: Space) -> Basis2D {
        match space {
            Space::Primal => self.state.basis,
            Space::Dual => self.facts.dual,
        }
    }

    fn highlight_color(&self, space: Space, i: i32, j: i32) -> Option<Color> {
        if !self.state.show_shortest || self.state.shortest_space != space {
            return None;
        }
        let palette = &self.config.palette;
        self.facts
            .shortest
            .iter()
            .position(|v| v.i == i && v.j == j)
            .map(|idx| if idx == 0 { palette.shortest_1 } else { palette.shortest_2 })
    }

    fn grid(&self, scene: &mut Scene, layer: Layer, basis: &Basis2D) {
        let r = self.range;
        let (color, width) = match layer {
            Layer::DualGrid => (self.config.palette.dual_grid, self.config.geometry.dual_grid_stroke),
            _ => (self.config.palette.grid, self.config.geometry.grid_stroke),
        };
        let mut style = Style::stroked(color, width);
        if layer == Layer::DualGrid {
            style = style.dashed(4.0, 4.0);
        }

        let mut n: u16 = 0;
        for j in -r..=r {
            self.grid_line(scene, layer, n, basis.point(-r, j), basis.point(r, j), &style);
            n += 1;
        }
        for i in -r..=r {
            self.grid_line(scene, layer, n, basis.point(i, -r), basis.point(i, r), &style);
            n += 1;
        }
    }

    fn grid_line(
        &self,
        scene: &mut Scene,
        layer: Layer,
        n: u16,
        from: Vector2<f64>,
        to: Vector2<f64>,
        style: &Style,
    ) {
        scene.insert(
            layer,
            ElementId::GridLine(n),
            Shape::Line {
                from: self.screen(from),
                to: self.screen(to),
                style: style.clone(),
                arrow: false,
            },
        );
    }

    fn primal_points(&self, scene: &mut Scene) {
        let geometry = &self.config.geometry;
        for index in lattice_indices(self.range) {
            let center = self.screen(self.state.basis.point(index.i, index.j));
            let (radius, style) = match self.highlight_color(Space::Primal, index.i, index.j) {
                Some(color) => (
                    geometry.highlight_radius,
                    Style::filled(color).with_stroke(color, 1.0).with_opacity(0.9),
                ),
                None => (
                    geometry.point_radius,
                    Style::filled(self.config.palette.default_point).with_opacity(0.9),
                ),
            };
            scene.insert(
                Layer::Lattice,
                ElementId::Point { i: index.i, j: index.j },
                Shape::Circle { center, radius, style },
            );
        }
    }

    fn dual_points(&self, scene: &mut Scene) {
        let geometry = &self.config.geometry;
        let color = self
            .options
            .dual_point_color
            .unwrap_or(self.config.palette.dual_point);

        for index in lattice_indices(self.range) {
            let center = self.screen(self.facts.dual.point(index.i, index.j));
            let (radius, style) = match self.highlight_color(Space::Dual, index.i, index.j) {
                Some(hl) => (
                    geometry.highlight_radius,
                    Style::filled(hl).with_stroke(hl, 1.0).with_opacity(0.9),
                ),
                None => match self.options.dual_point_variant {
                    PointVariant::Solid => {
                        (geometry.dual_point_radius, Style::filled(color).with_opacity(0.9))
                    }
                    PointVariant::Hollow => (
                        geometry.dual_point_radius,
                        Style::filled(Color::WHITE)
                            .with_stroke(color, HOLLOW_STROKE)
                            .with_opacity(0.8),
                    ),
                },
            };
            scene.insert(
                Layer::DualLattice,
                ElementId::Point { i: index.i, j: index.j },
                Shape::Circle { center, radius, style },
            );
        }
    }

    fn basis_arrows(&self, scene: &mut Scene, layer: Layer, basis: &Basis2D) {
        let palette = &self.config.palette;
        let dual = layer == Layer::DualBasis;
        let entries = if dual {
            [(basis.b1, palette.dual_basis_1, "b1*"), (basis.b2, palette.dual_basis_2, "b2*")]
        } else {
            [(basis.b1, palette.basis_1, "b1"), (basis.b2, palette.basis_2, "b2")]
        };

        for (idx, (v, color, label)) in entries.into_iter().enumerate() {
            let end = self.screen(v);
            let mut style = Style::stroked(color, self.config.geometry.vector_stroke);
            if dual {
                style = style.dashed(6.0, 4.0);
            }
            scene.insert(
                layer,
                ElementId::Arrow(idx as u8),
                Shape::Line {
                    from: self.layout.origin,
                    to: end,
                    style,
                    arrow: true,
                },
            );
            scene.insert(
                layer,
                ElementId::Label(idx as u8),
                Shape::Text {
                    anchor: Point2::new(end.x, end.y - LABEL_LIFT),
                    content: label.to_string(),
                    font_size: if dual { SMALL_LABEL_SIZE } else { BASIS_LABEL_SIZE },
                    fill: palette.label,
                    opacity: 1.0,
                },
            );
        }
    }

    fn fundamental_domain(&self, scene: &mut Scene) {
        let space = self.options.fundamental_space;
        if !self.options.show_fundamental_domain || !self.state.space_visible(space) {
            return;
        }
        let palette = &self.config.palette;
        let points = self
            .basis_for(space)
            .fundamental_domain()
            .iter()
            .map(|v| self.screen(*v))
            .collect();
        scene.insert(
            Layer::Fundamental,
            ElementId::Domain,
            Shape::Polygon {
                points,
                style: Style::filled(palette.fundamental_fill)
                    .with_stroke(palette.fundamental_stroke, 1.0),
            },
        );
    }

    fn shortest_vectors(&self, scene: &mut Scene) {
        let space = self.state.shortest_space;
        if !self.state.show_shortest || !self.state.space_visible(space) {
            return;
        }
        let palette = &self.config.palette;
        let basis = self.basis_for(space);
        for (idx, v) in self.facts.shortest.iter().enumerate() {
            let color = if idx == 0 { palette.shortest_1 } else { palette.shortest_2 };
            scene.insert(
                Layer::Shortest,
                ElementId::Arrow(idx as u8),
                Shape::Line {
                    from: self.layout.origin,
                    to: self.screen(basis.point(v.i, v.j)),
                    style: Style::stroked(color, self.config.geometry.shortest_stroke),
                    arrow: false,
                },
            );
        }
    }

    fn cvp(&self, scene: &mut Scene) {
        let state = self.state;
        if !state.space_visible(state.cvp_space) {
            return;
        }
        let palette = &self.config.palette;
        let geometry = &self.config.geometry;
        let outcome = &self.facts.cvp;
        let radius = outcome.radius * state.scale;

        if state.show_origin_circle {
            scene.insert(
                Layer::Cvp,
                ElementId::CvpOriginCircle,
                Shape::Circle {
                    center: self.layout.origin,
                    radius,
                    style: Style::stroked(palette.origin_circle, ORIGIN_CIRCLE_STROKE).dashed(6.0, 4.0),
                },
            );
        }

        let Some(target) = state.cvp_target.filter(|_| state.cvp_enabled) else {
            return;
        };

        scene.insert(
            Layer::Cvp,
            ElementId::CvpRadius,
            Shape::Circle {
                center: target,
                radius,
                style: Style::stroked(palette.cvp_point, geometry.vector_stroke).dashed(4.0, 4.0),
            },
        );
        scene.insert(
            Layer::Cvp,
            ElementId::CvpCenter,
            Shape::Circle {
                center: target,
                radius: geometry.cvp_center_radius,
                style: Style::filled(palette.cvp_point),
            },
        );
        scene.insert(
            Layer::Cvp,
            ElementId::CvpTargetArrow,
            Shape::Line {
                from: self.layout.origin,
                to: target,
                style: Style::stroked(palette.cvp_point, geometry.vector_stroke),
                arrow: true,
            },
        );
        scene.insert(
            Layer::Cvp,
            ElementId::CvpTargetLabel,
            text(target.x + 8.0, target.y - LABEL_LIFT, "x", SMALL_LABEL_SIZE, palette.cvp_point),
        );

        if outcome.over_cap {
            return;
        }
        let Some(hit) = outcome.nearest else {
            return;
        };
        let best = self.screen(hit.point);

        if self.options.show_cvp_residual_arrow {
            scene.insert(
                Layer::Cvp,
                ElementId::CvpResidualArrow,
                Shape::Line {
                    from: best,
                    to: target,
                    style: Style::stroked(palette.cvp_line, geometry.vector_stroke),
                    arrow: true,
                },
            );
            scene.insert(
                Layer::Cvp,
                ElementId::CvpResidualLabel,
                text(
                    (best.x + target.x) / 2.0 + 6.0,
                    (best.y + target.y) / 2.0 - LABEL_LIFT,
                    "x'",
                    SMALL_LABEL_SIZE,
                    palette.cvp_line,
                ),
            );
        }

        scene.insert(
            Layer::Cvp,
            ElementId::CvpNearest,
            Shape::Circle {
                center: best,
                radius: geometry.cvp_point_radius,
                style: Style::stroked(palette.cvp_point, geometry.vector_stroke),
            },
        );
        scene.insert(
            Layer::Cvp,
            ElementId::CvpNearestLabel,
            text(best.x + 8.0, best.y - LABEL_LIFT, "K_{L*}(x)", NOTE_LABEL_SIZE, palette.label),
        );
    }

    fn mod_vector(&self, scene: &mut Scene) {
        let Some(vec) = self.state.mod_vector else {
            return;
        };
        let palette = &self.config.palette;
        let geometry = &self.config.geometry;
        let end = self.screen(vec);

        scene.insert(
            Layer::Mod,
            ElementId::ModLine,
            Shape::Line {
                from: self.layout.origin,
                to: end,
                style: Style::stroked(palette.mod_line, geometry.vector_stroke),
                arrow: true,
            },
        );
        scene.insert(
            Layer::Mod,
            ElementId::ModPoint,
            Shape::Circle {
                center: end,
                radius: geometry.mod_point_radius,
                style: Style::filled(palette.mod_point),
            },
        );
        scene.insert(
            Layer::Mod,
            ElementId::ModLabel,
            text(end.x + 6.0, end.y - LABEL_LIFT, "mod P(L*)", NOTE_LABEL_SIZE, palette.label),
        );
    }
}

fn text(x: f64, y: f64, content: &str, font_size: f64, fill: Color) -> Shape {
    Shape::Text {
        anchor: Point2::new(x, y),
        content: content.to_string(),
        font_size,
        fill,
        opacity: 1.0,
    }
}
