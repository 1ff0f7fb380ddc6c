//! Retained scene description: layered, keyed shapes in screen space.
//!
//! The engine rebuilds a complete [`Scene`] after every state change and
//! tweens between the previous and the new shapes per [`ElementKey`].

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::render::color::Color;

/// Drawing layers, declared in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Grid,
    DualGrid,
    Fundamental,
    Lattice,
    DualLattice,
    Basis,
    DualBasis,
    Shortest,
    Cvp,
    Mod,
}

impl Layer {
    pub const ALL: [Layer; 10] = [
        Layer::Grid,
        Layer::DualGrid,
        Layer::Fundamental,
        Layer::Lattice,
        Layer::DualLattice,
        Layer::Basis,
        Layer::DualBasis,
        Layer::Shortest,
        Layer::Cvp,
        Layer::Mod,
    ];

    /// CSS class of the SVG group holding the layer.
    pub fn class_name(&self) -> &'static str {
        match self {
            Layer::Grid => "grid",
            Layer::DualGrid => "dualGrid",
            Layer::Fundamental => "fundamental",
            Layer::Lattice => "lattice",
            Layer::DualLattice => "dualLattice",
            Layer::Basis => "basis",
            Layer::DualBasis => "dualBasis",
            Layer::Shortest => "shortest",
            Layer::Cvp => "cvp",
            Layer::Mod => "mod",
        }
    }
}

/// Identity of an element within its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementId {
    Point { i: i32, j: i32 },
    GridLine(u16),
    Domain,
    Arrow(u8),
    Label(u8),
    CvpOriginCircle,
    CvpRadius,
    CvpCenter,
    CvpTargetArrow,
    CvpTargetLabel,
    CvpResidualArrow,
    CvpResidualLabel,
    CvpNearest,
    CvpNearestLabel,
    ModLine,
    ModPoint,
    ModLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementKey {
    pub layer: Layer,
    pub id: ElementId,
}

impl ElementKey {
    pub fn new(layer: Layer, id: ElementId) -> Self {
        Self { layer, id }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub dash: Option<[f64; 2]>,
    pub opacity: f64,
}

impl Style {
    pub fn filled(fill: Color) -> Self {
        Self {
            fill: Some(fill),
            stroke: None,
            stroke_width: 0.0,
            dash: None,
            opacity: 1.0,
        }
    }

    pub fn stroked(stroke: Color, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(stroke),
            stroke_width: width,
            dash: None,
            opacity: 1.0,
        }
    }

    pub fn dashed(mut self, on: f64, off: f64) -> Self {
        self.dash = Some([on, off]);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_stroke(mut self, stroke: Color, width: f64) -> Self {
        self.stroke = Some(stroke);
        self.stroke_width = width;
        self
    }

    fn lerp(&self, other: &Style, t: f64) -> Style {
        Style {
            fill: lerp_color(self.fill, other.fill, t),
            stroke: lerp_color(self.stroke, other.stroke, t),
            stroke_width: lerp(self.stroke_width, other.stroke_width, t),
            dash: other.dash,
            opacity: lerp(self.opacity, other.opacity, t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle {
        center: Point2<f64>,
        radius: f64,
        style: Style,
    },
    Line {
        from: Point2<f64>,
        to: Point2<f64>,
        style: Style,
        arrow: bool,
    },
    Polygon {
        points: Vec<Point2<f64>>,
        style: Style,
    },
    Text {
        anchor: Point2<f64>,
        content: String,
        font_size: f64,
        fill: Color,
        opacity: f64,
    },
}

impl Shape {
    /// Interpolate towards `other`. Shapes of different kinds (or polygons with
    /// different vertex counts) jump to `other`.
    pub fn lerp(&self, other: &Shape, t: f64) -> Shape {
        match (self, other) {
            (
                Shape::Circle { center: c0, radius: r0, style: s0 },
                Shape::Circle { center: c1, radius: r1, style: s1 },
            ) => Shape::Circle {
                center: lerp_point(c0, c1, t),
                radius: lerp(*r0, *r1, t),
                style: s0.lerp(s1, t),
            },
            (
                Shape::Line { from: f0, to: t0, style: s0, .. },
                Shape::Line { from: f1, to: t1, style: s1, arrow },
            ) => Shape::Line {
                from: lerp_point(f0, f1, t),
                to: lerp_point(t0, t1, t),
                style: s0.lerp(s1, t),
                arrow: *arrow,
            },
            (
                Shape::Polygon { points: p0, style: s0 },
                Shape::Polygon { points: p1, style: s1 },
            ) if p0.len() == p1.len() => Shape::Polygon {
                points: p0.iter().zip(p1).map(|(a, b)| lerp_point(a, b, t)).collect(),
                style: s0.lerp(s1, t),
            },
            (
                Shape::Text { anchor: a0, fill: f0, opacity: o0, font_size: fs0, .. },
                Shape::Text { anchor: a1, content, fill: f1, opacity: o1, font_size: fs1 },
            ) => Shape::Text {
                anchor: lerp_point(a0, a1, t),
                content: content.clone(),
                font_size: lerp(*fs0, *fs1, t),
                fill: f0.lerp(f1, t),
                opacity: lerp(*o0, *o1, t),
            },
            _ => other.clone(),
        }
    }

    /// The same shape pulled into `origin`. With `fade` circles also shrink to
    /// radius 0 and everything becomes transparent.
    pub fn collapsed_to(&self, origin: Point2<f64>, fade: bool) -> Shape {
        match self {
            Shape::Circle { radius, style, .. } => Shape::Circle {
                center: origin,
                radius: if fade { 0.0 } else { *radius },
                style: if fade { style.clone().with_opacity(0.0) } else { style.clone() },
            },
            Shape::Line { style, arrow, .. } => Shape::Line {
                from: origin,
                to: origin,
                style: style.clone(),
                arrow: *arrow,
            },
            Shape::Polygon { points, style } => Shape::Polygon {
                points: vec![origin; points.len()],
                style: style.clone(),
            },
            Shape::Text { content, font_size, fill, opacity, .. } => Shape::Text {
                anchor: origin,
                content: content.clone(),
                font_size: *font_size,
                fill: *fill,
                opacity: if fade { 0.0 } else { *opacity },
            },
        }
    }

    /// Zero-size version of the shape in place: circles with radius 0, lines
    /// ending at their start, invisible text.
    pub fn seed(&self) -> Shape {
        match self {
            Shape::Circle { center, style, .. } => Shape::Circle {
                center: *center,
                radius: 0.0,
                style: style.clone(),
            },
            Shape::Line { from, style, arrow, .. } => Shape::Line {
                from: *from,
                to: *from,
                style: style.clone(),
                arrow: *arrow,
            },
            Shape::Polygon { points, style } => {
                let first = points.first().copied().unwrap_or_else(Point2::origin);
                Shape::Polygon {
                    points: vec![first; points.len()],
                    style: style.clone(),
                }
            }
            Shape::Text { anchor, content, font_size, fill, .. } => Shape::Text {
                anchor: *anchor,
                content: content.clone(),
                font_size: *font_size,
                fill: *fill,
                opacity: 0.0,
            },
        }
    }
}

/// Complete set of shapes for one engine state, ordered by layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    elements: BTreeMap<ElementKey, Shape>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, layer: Layer, id: ElementId, shape: Shape) {
        self.elements.insert(ElementKey::new(layer, id), shape);
    }

    pub fn get(&self, key: &ElementKey) -> Option<&Shape> {
        self.elements.get(key)
    }

    pub fn contains(&self, key: &ElementKey) -> bool {
        self.elements.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ElementKey, &Shape)> {
        self.elements.iter()
    }

    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = (&ElementKey, &Shape)> {
        self.elements.iter().filter(move |(key, _)| key.layer == layer)
    }

    pub fn count(&self, layer: Layer) -> usize {
        self.layer(layer).count()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// What a surface is asked to draw: the sampled scene at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<(ElementKey, Shape)>,
}

impl Frame {
    pub fn get(&self, key: &ElementKey) -> Option<&Shape> {
        self.elements.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    pub fn count(&self, layer: Layer) -> usize {
        self.elements.iter().filter(|(k, _)| k.layer == layer).count()
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_point(a: &Point2<f64>, b: &Point2<f64>, t: f64) -> Point2<f64> {
    Point2::from(a.coords.lerp(&b.coords, t))
}

fn lerp_color(a: Option<Color>, b: Option<Color>, t: f64) -> Option<Color> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.lerp(&b, t)),
        (_, b) => b,
    }
}
