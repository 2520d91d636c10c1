//! Typed geometric model built from a construction document.
//!
//! The model is the intermediate representation between the classifier and
//! the TikZ generator. It is built once per translation and never mutated
//! while rendering.

pub mod classify;
mod conics;

pub use classify::build_model;

use crate::document::Style;
use crate::expr::Expr;
use crate::solve::{ConicShape, LineCoeffs};
use glam::DVec2;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Visibility and style shared by every drawable entity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Appearance {
    pub visible: bool,
    pub label_visible: bool,
    pub style: Style,
    pub caption: Option<String>,
}

// ============================================================================
// Points
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Provenance {
    Free,
    OnObject,
    Intersection,
    Midpoint,
    Center,
    Derived,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub pos: DVec2,
    pub provenance: Provenance,
    /// Producing command and its labeled inputs
    pub command: Option<String>,
    pub inputs: Vec<String>,
    pub look: Appearance,
}

/// A point used by another entity: a labeled point or an inline literal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PointRef {
    Named { label: String, pos: DVec2 },
    Literal(DVec2),
}

impl PointRef {
    pub fn pos(&self) -> DVec2 {
        match self {
            PointRef::Named { pos, .. } => *pos,
            PointRef::Literal(pos) => *pos,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            PointRef::Named { label, .. } => Some(label),
            PointRef::Literal(_) => None,
        }
    }
}

// ============================================================================
// Lines, rays, segments, vectors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Line,
    Ray,
    Segment,
    Vector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LineRelation {
    Tangent { conic: String, point: Option<DVec2> },
    Orthogonal { through: String, target: String, foot: Option<DVec2> },
    Bisector { points: Vec<String> },
    Parallel { through: String, target: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub label: String,
    pub kind: LineKind,
    /// Defining points. For segments and vectors these are the endpoints,
    /// for rays the start and a point along it.
    pub start: PointRef,
    pub end: PointRef,
    /// General form, when the file stored one
    pub coeffs: Option<LineCoeffs>,
    pub relation: Option<LineRelation>,
    /// Polygon whose command produced this edge
    pub polygon: Option<String>,
    pub look: Appearance,
}

impl Line {
    /// General form from the stored coefficients, else from the two points
    pub fn general_form(&self) -> Option<LineCoeffs> {
        self.coeffs
            .filter(|c| !c.is_degenerate())
            .or_else(|| LineCoeffs::through(self.start.pos(), self.end.pos()))
    }

    pub fn direction(&self) -> Option<DVec2> {
        (self.end.pos() - self.start.pos()).try_normalize()
    }
}

// ============================================================================
// Conics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    CenterRadius,
    CenterPoint,
    ThreePoints,
    FociAxis,
    FociPoint,
    FocusDirectrix,
    Equation,
    Matrix,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::CenterRadius => "center_radius",
            Method::CenterPoint => "center_point",
            Method::ThreePoints => "three_points",
            Method::FociAxis => "foci_axis",
            Method::FociPoint => "foci_point",
            Method::FocusDirectrix => "focus_directrix",
            Method::Equation => "equation",
            Method::Matrix => "matrix",
        }
    }
}

/// How a conic was defined, e.g. `circle_by_three_points`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SemanticType {
    pub kind: &'static str,
    pub method: Method,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_by_{}", self.kind, self.method.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConicSource {
    Command(String),
    Equation(String),
    Matrix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conic {
    pub label: String,
    pub shape: ConicShape,
    /// Input point sitting on the center of a circle or ellipse
    pub center: Option<PointRef>,
    #[serde(serialize_with = "serialize_display")]
    pub semantic: SemanticType,
    /// Every definition the file offered, whether or not it was used
    pub sources: Vec<ConicSource>,
    pub look: Appearance,
}

fn serialize_display<T, S>(v: &T, s: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: serde::Serializer,
{
    s.collect_str(v)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConicPartKind {
    Semicircle,
    CircleArc,
    CircleSector,
    CircumcircleArc,
    CircumcircleSector,
}

impl ConicPartKind {
    pub fn is_sector(self) -> bool {
        matches!(self, ConicPartKind::CircleSector | ConicPartKind::CircumcircleSector)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConicPart {
    pub label: String,
    pub kind: ConicPartKind,
    /// `[A, B]` for semicircles, `[M, A, B]` for arcs and sectors,
    /// `[A, B, C]` for the circumcircle variants
    pub points: Vec<PointRef>,
    pub look: Appearance,
}

// ============================================================================
// Angles, polygons, functions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AngleForm {
    ThreePoint { first: PointRef, vertex: PointRef, second: PointRef },
    TwoLine { first: String, second: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Angle {
    pub label: String,
    pub form: AngleForm,
    /// Radians, as measured by the authoring tool
    pub value: Option<f64>,
    /// Arc radius in screen pixels
    pub arc_size: f64,
    pub look: Appearance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    pub label: String,
    pub vertices: Vec<PointRef>,
    pub look: Appearance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub label: String,
    pub source: String,
    /// Resolved body in `x`, or why there is none
    pub body: Result<Expr, String>,
    pub domain: Option<(f64, f64)>,
    pub look: Appearance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unsupported {
    pub label: String,
    pub kind: String,
    pub reason: String,
}

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Default, Serialize)]
pub struct Model {
    pub points: Vec<Point>,
    pub lines: Vec<Line>,
    pub conics: Vec<Conic>,
    pub conic_parts: Vec<ConicPart>,
    pub angles: Vec<Angle>,
    pub polygons: Vec<Polygon>,
    pub functions: Vec<Function>,
    pub unsupported: Vec<Unsupported>,
    /// Numeric elements (sliders, free angles) by label
    pub parameters: BTreeMap<String, f64>,
    pub diagnostics: Vec<String>,
    #[serde(skip)]
    point_index: HashMap<String, usize>,
    #[serde(skip)]
    line_index: HashMap<String, usize>,
}

impl Model {
    pub fn point(&self, label: &str) -> Option<&Point> {
        self.point_index.get(label).map(|&i| &self.points[i])
    }

    pub fn line(&self, label: &str) -> Option<&Line> {
        self.line_index.get(label).map(|&i| &self.lines[i])
    }

    pub fn conic(&self, label: &str) -> Option<&Conic> {
        self.conics.iter().find(|c| c.label == label)
    }

    pub fn visible_points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter().filter(|p| p.look.visible)
    }

    pub(crate) fn push_point(&mut self, point: Point) {
        self.point_index.insert(point.label.clone(), self.points.len());
        self.points.push(point);
    }

    pub(crate) fn push_line(&mut self, line: Line) {
        self.line_index.insert(line.label.clone(), self.lines.len());
        self.lines.push(line);
    }
}
