use lattice_viz::lattice::{Basis2D, ShortVector};
use lattice_viz::lattice::CvpOutcome;
use lattice_viz::render::{EngineEvent, PointSelection};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Point structure for JavaScript interop
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<Vector2<f64>> for Point {
    fn from(v: Vector2<f64>) -> Self {
        Point { x: v.x, y: v.y }
    }
}

impl From<Point> for Vector2<f64> {
    fn from(p: Point) -> Self {
        Vector2::new(p.x, p.y)
    }
}

/// Basis as two `{x, y}` objects
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BasisData {
    pub b1: Point,
    pub b2: Point,
}

impl From<Basis2D> for BasisData {
    fn from(basis: Basis2D) -> Self {
        BasisData {
            b1: basis.b1.into(),
            b2: basis.b2.into(),
        }
    }
}

impl From<BasisData> for Basis2D {
    fn from(data: BasisData) -> Self {
        Basis2D::new(data.b1.into(), data.b2.into())
    }
}

/// Shortest-vector entry for JavaScript
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ShortVectorData {
    pub i: i32,
    pub j: i32,
    pub len2: f64,
    pub vector: Point,
}

impl ShortVectorData {
    pub fn new(v: &ShortVector, basis: &Basis2D) -> Self {
        ShortVectorData {
            i: v.i,
            j: v.j,
            len2: v.len2,
            vector: basis.point(v.i, v.j).into(),
        }
    }
}

/// Bounded CVP result for JavaScript
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CvpData {
    pub half_shortest: f64,
    pub radius: f64,
    pub over_cap: bool,
    pub nearest: Option<Point>,
    pub nearest_index: Option<(i32, i32)>,
    pub text: String,
}

impl From<&CvpOutcome> for CvpData {
    fn from(outcome: &CvpOutcome) -> Self {
        CvpData {
            half_shortest: outcome.half_shortest,
            radius: outcome.radius,
            over_cap: outcome.over_cap,
            nearest: outcome.nearest.map(|hit| hit.point.into()),
            nearest_index: outcome.nearest.map(|hit| (hit.index.i, hit.index.j)),
            text: lattice_viz::lattice::format_cvp_outcome(outcome),
        }
    }
}

/// Clicked point, shaped like the `onPointSelected` payload of the JS component
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PointSelectionData {
    #[serde(rename = "type")]
    pub space: String,
    pub i: i32,
    pub j: i32,
    pub x: f64,
    pub y: f64,
    pub basis: BasisData,
}

impl From<&PointSelection> for PointSelectionData {
    fn from(selection: &PointSelection) -> Self {
        PointSelectionData {
            space: selection.space.to_string(),
            i: selection.index.i,
            j: selection.index.j,
            x: selection.position.x,
            y: selection.position.y,
            basis: selection.basis.into(),
        }
    }
}

/// Engine notification as `{ kind, ... }`
#[derive(Serialize, Clone, Debug)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventData {
    BasisText { text: String },
    DualBasisText { text: String },
    CvpText { text: String },
    PointSelected { point: PointSelectionData },
    BackgroundClick,
    ModVector { vector: Option<Point> },
}

impl From<&EngineEvent> for EventData {
    fn from(event: &EngineEvent) -> Self {
        match event {
            EngineEvent::BasisText(text) => EventData::BasisText { text: text.clone() },
            EngineEvent::DualBasisText(text) => EventData::DualBasisText { text: text.clone() },
            EngineEvent::CvpText(text) => EventData::CvpText { text: text.clone() },
            EngineEvent::PointSelected(selection) => EventData::PointSelected {
                point: selection.into(),
            },
            EngineEvent::BackgroundClick => EventData::BackgroundClick,
            EngineEvent::ModVector(vec) => EventData::ModVector {
                vector: vec.map(Point::from),
            },
        }
    }
}
