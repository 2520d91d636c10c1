//! Semantic classifier: document elements and commands to the typed model.
//!
//! The document only stores numeric results and raw command arguments. The
//! classifier recovers which command produced each object and what canonical
//! parameters that implies. Anything it cannot model becomes an
//! `Unsupported` entry; nothing here fails the translation.

use super::conics::{self, ConicInput};
use super::*;
use crate::document::{Arg, Command, CommandKind, Document, Element, ElementKind, ExpressionValue};
use crate::expr::eval::Poly2;
use crate::expr::{self, Scope};
use crate::log::{debug, warn};
use crate::solve::{self, QuadraticForm, heading, tol};
use glam::{DVec2, dvec2};
use std::f64::consts::TAU;

/// Build the model for a whole document.
pub fn build_model(doc: &Document) -> Model {
    let mut classifier = Classifier::new(doc);
    classifier.collect_parameters();
    classifier.collect_points();
    classifier.collect_conics();
    classifier.collect_polygons();
    classifier.collect_lines();
    classifier.collect_conic_parts();
    classifier.collect_angles();
    classifier.collect_functions();
    classifier.collect_unsupported();
    classifier.model
}

struct Classifier<'a> {
    doc: &'a Document,
    model: Model,
    /// Parsed but unresolved function bodies, for inlining
    raw_functions: HashMap<String, Expr>,
    /// Segment label to its polygon edge endpoints
    polygon_edges: HashMap<String, (PointRef, PointRef)>,
}

impl Scope for Classifier<'_> {
    fn parameter(&self, name: &str) -> Option<f64> {
        self.model.parameters.get(name).copied()
    }

    fn function(&self, name: &str) -> Option<&Expr> {
        self.raw_functions.get(name)
    }
}

fn appearance(el: &Element) -> Appearance {
    Appearance {
        visible: el.show_object,
        label_visible: el.show_label,
        style: el.style.clone(),
        caption: el.caption.clone(),
    }
}

impl<'a> Classifier<'a> {
    fn new(doc: &'a Document) -> Self {
        let mut model = Model::default();
        model.diagnostics.extend(doc.diagnostics.iter().cloned());
        Classifier {
            doc,
            model,
            raw_functions: HashMap::new(),
            polygon_edges: HashMap::new(),
        }
    }

    fn elements(&self, kind: ElementKind) -> impl Iterator<Item = &'a Element> + use<'a> {
        self.doc.elements.iter().filter(move |e| e.kind == kind)
    }

    fn unsupported(&mut self, el: &Element, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(label = %el.label, reason = %reason, "unsupported element");
        self.model.unsupported.push(Unsupported {
            label: el.label.clone(),
            kind: kind_name(&el.kind),
            reason,
        });
    }

    // ------------------------------------------------------------------------
    // Argument resolution
    // ------------------------------------------------------------------------

    /// A coordinate literal or a label of a point with coordinates
    fn point_ref(&self, arg: &Arg) -> Option<PointRef> {
        match arg {
            Arg::Coordinate(p) => Some(PointRef::Literal(*p)),
            Arg::Label(label) => self.named_point(label),
            Arg::Number(_) | Arg::Text(_) => None,
        }
    }

    fn named_point(&self, label: &str) -> Option<PointRef> {
        if let Some(point) = self.model.point(label) {
            return Some(PointRef::Named { label: point.label.clone(), pos: point.pos });
        }
        let el = self.doc.element(label)?;
        if el.kind != ElementKind::Point {
            return None;
        }
        let pos = el.position()?;
        Some(PointRef::Named { label: label.to_string(), pos })
    }

    fn number(&self, arg: &Arg) -> Option<f64> {
        match arg {
            Arg::Number(v) => Some(*v),
            Arg::Label(label) => self
                .parameter(label)
                .or_else(|| self.doc.element(label).and_then(|e| e.value))
                .or_else(|| expr::parse_number(label)),
            Arg::Text(text) => expr::parse_function_body(text)
                .ok()?
                .resolve(self)
                .ok()?
                .eval_const(),
            Arg::Coordinate(_) => None,
        }
    }

    /// General form of a linear element by label
    fn line_coeffs(&self, label: &str) -> Option<solve::LineCoeffs> {
        if let Some(line) = self.model.line(label) {
            return line.general_form();
        }
        let el = self.doc.element(label)?;
        if !el.kind.is_linear() || el.kind == ElementKind::Vector {
            return None;
        }
        let c = el.coords?;
        let coeffs = solve::LineCoeffs::new(c.x, c.y, c.z);
        (!coeffs.is_degenerate()).then_some(coeffs)
    }

    fn is_kind(&self, label: &str, kind: ElementKind) -> bool {
        self.doc.element(label).is_some_and(|e| e.kind == kind)
    }

    fn is_linear(&self, label: &str) -> bool {
        self.doc.element(label).is_some_and(|e| e.kind.is_linear())
    }

    // ------------------------------------------------------------------------
    // Parameters and points
    // ------------------------------------------------------------------------

    fn collect_parameters(&mut self) {
        for el in &self.doc.elements {
            let is_free_angle =
                el.kind == ElementKind::Angle && self.doc.producer(&el.label).is_none();
            if el.kind == ElementKind::Numeric || is_free_angle {
                if let Some(v) = el.value.filter(|v| v.is_finite()) {
                    self.model.parameters.insert(el.label.clone(), v);
                }
            }
        }
    }

    fn collect_points(&mut self) {
        for el in self.elements(ElementKind::Point) {
            let pos = el.position().or_else(|| match self.doc.expression(&el.label) {
                Some(ExpressionValue::Coordinate(p)) => Some(*p),
                _ => None,
            });
            let Some(pos) = pos else {
                self.unsupported(el, "point has no finite coordinates");
                continue;
            };
            let producer = self.doc.producer(&el.label);
            let provenance = match producer {
                Some(cmd) => point_provenance(cmd),
                None => Provenance::Free,
            };
            debug!(label = %el.label, ?provenance, "point");
            self.model.push_point(Point {
                label: el.label.clone(),
                pos,
                provenance,
                command: producer.map(|c| c.name.clone()),
                inputs: producer
                    .map(|c| c.input_labels().map(str::to_string).collect())
                    .unwrap_or_default(),
                look: appearance(el),
            });
        }
    }

    // ------------------------------------------------------------------------
    // Conics
    // ------------------------------------------------------------------------

    fn collect_conics(&mut self) {
        for el in self.elements(ElementKind::Conic) {
            let producer = self.doc.producer(&el.label);
            let equation = self.equation_text(&el.label);

            let mut sources = Vec::new();
            if let Some(cmd) = producer {
                sources.push(ConicSource::Command(cmd.name.clone()));
            }
            if let Some(text) = &equation {
                sources.push(ConicSource::Equation(text.clone()));
            }
            if el.matrix.is_some() {
                sources.push(ConicSource::Matrix);
            }

            let resolved = producer
                .and_then(|cmd| self.conic_from_command(cmd))
                .or_else(|| {
                    let text = equation.as_deref()?;
                    let shape = self.conic_from_equation(text)?;
                    Some((shape, Method::Equation))
                })
                .or_else(|| {
                    let shape = solve::decompose_conic(&QuadraticForm::from_matrix(el.matrix?))?;
                    Some((shape, Method::Matrix))
                });

            let Some((shape, method)) = resolved else {
                self.unsupported(el, "degenerate or unreadable conic");
                continue;
            };
            let semantic = SemanticType { kind: shape.kind_name(), method };
            let center = producer.and_then(|cmd| self.center_input(cmd, &shape));
            debug!(label = %el.label, semantic = %semantic, "conic");
            self.model.conics.push(Conic {
                label: el.label.clone(),
                shape,
                center,
                semantic,
                sources,
                look: appearance(el),
            });
        }
    }

    /// The command input that names the center point, if any
    fn center_input(&self, cmd: &Command, shape: &solve::ConicShape) -> Option<PointRef> {
        use solve::ConicShape::{Circle, Ellipse};
        if !matches!(shape, Circle { .. } | Ellipse { .. }) {
            return None;
        }
        let center = shape.center();
        cmd.input_labels()
            .filter_map(|label| self.named_point(label))
            .find(|p| p.pos().distance(center) < tol::POINT_COINCIDENCE)
    }

        fn equation_text(&self, label: &str) -> Option<String> {
        match self.doc.expression(label)? {
            ExpressionValue::Text { text, .. } if text.contains('=') => {
                // `c: x² + y² = 4`
                let text = match text.split_once(':') {
                    Some((head, rest)) if head.trim() == label => rest.trim(),
                    _ => text.as_str(),
                };
                Some(text.to_string())
            }
            _ => None,
        }
    }

    fn conic_from_command(&self, cmd: &Command) -> Option<(solve::ConicShape, Method)> {
        let inputs = cmd
            .inputs
            .iter()
            .map(|arg| self.conic_input(arg))
            .collect::<Option<Vec<_>>>()?;
        let shape = match cmd.kind {
            CommandKind::Circle => conics::circle(&inputs),
            CommandKind::Ellipse => conics::ellipse(&inputs),
            CommandKind::Hyperbola => conics::hyperbola(&inputs),
            CommandKind::Parabola => conics::parabola(&inputs),
            _ => None,
        };
        if shape.is_none() {
            debug!(command = %cmd.name, "conic command parameters unusable, falling through");
        }
        shape.filter(|(s, _)| s.is_finite())
    }

    fn conic_input(&self, arg: &Arg) -> Option<ConicInput> {
        if let Some(p) = self.point_ref(arg) {
            return Some(ConicInput::Point(p.pos()));
        }
        if let Some(label) = arg.label() {
            if let Some(coeffs) = self.line_coeffs(label) {
                return Some(ConicInput::Line(coeffs));
            }
        }
        self.number(arg).map(ConicInput::Number)
    }

    fn conic_from_equation(&self, text: &str) -> Option<solve::ConicShape> {
        let eq = expr::parse_equation(text).ok()?;
        let lhs = eq.lhs.resolve(self).ok()?;
        let rhs = match &eq.rhs {
            Some(rhs) => Some(rhs.resolve(self).ok()?),
            None => None,
        };
        let poly = Poly2::from_equation(&expr::Equation { lhs, rhs }).ok()?;
        solve::decompose_conic(&QuadraticForm::from_poly(&poly))
    }

    // ------------------------------------------------------------------------
    // Polygons
    // ------------------------------------------------------------------------

    fn collect_polygons(&mut self) {
        for el in self.elements(ElementKind::Polygon) {
            let Some(cmd) = self.doc.producer(&el.label) else {
                self.unsupported(el, "polygon without a defining command");
                continue;
            };
            let Some(vertices) = self.polygon_vertices(cmd) else {
                self.unsupported(el, format!("cannot read vertices of {}", cmd.name));
                continue;
            };

            // outputs after the polygon itself: edges first, then new vertices
            let edges: Vec<_> = cmd
                .outputs
                .iter()
                .skip(1)
                .filter(|l| self.is_kind(l, ElementKind::Segment))
                .collect();
            for (i, label) in edges.into_iter().enumerate() {
                let from = vertices[i % vertices.len()].clone();
                let to = vertices[(i + 1) % vertices.len()].clone();
                self.polygon_edges.insert(label.clone(), (from, to));
            }

            debug!(label = %el.label, vertices = vertices.len(), "polygon");
            self.model.polygons.push(Polygon {
                label: el.label.clone(),
                vertices,
                look: appearance(el),
            });
        }
    }

    fn polygon_vertices(&self, cmd: &Command) -> Option<Vec<PointRef>> {
        if cmd.kind != CommandKind::Polygon {
            return None;
        }
        let points: Vec<PointRef> = cmd.inputs.iter().filter_map(|a| self.point_ref(a)).collect();

        if points.len() >= 3 && points.len() == cmd.inputs.len() {
            return Some(points);
        }

        // Polygon(A, B, n)
        if let [a, b, n] = cmd.inputs.as_slice() {
            let (a, b, n) = (self.point_ref(a), self.point_ref(b), self.number(n));
            if let (Some(a), Some(b), Some(_)) = (a, b, n) {
                let mut vertices = vec![a, b];
                vertices.extend(cmd.outputs.iter().filter_map(|l| self.named_point(l)));
                if vertices.len() >= 3 {
                    return Some(sort_regular(vertices));
                }
                return None;
            }
        }

        let mut vertices: Vec<PointRef> = Vec::new();
        let labels = cmd.input_labels().chain(cmd.outputs.iter().map(String::as_str));
        for label in labels {
            if vertices.iter().any(|v| v.label() == Some(label)) {
                continue;
            }
            if let Some(p) = self.named_point(label) {
                vertices.push(p);
            }
        }
        (vertices.len() >= 3).then(|| sort_by_centroid_angle(vertices))
    }

    // ------------------------------------------------------------------------
    // Lines
    // ------------------------------------------------------------------------

    fn collect_lines(&mut self) {
        let linear = self.doc.elements.iter().filter(|e| e.kind.is_linear());
        for el in linear {
            let kind = match el.kind {
                ElementKind::Ray => LineKind::Ray,
                ElementKind::Segment => LineKind::Segment,
                ElementKind::Vector => LineKind::Vector,
                _ => LineKind::Line,
            };
            let producer = self.doc.producer(&el.label);
            let coeffs = match (&el.kind, el.coords) {
                (ElementKind::Vector, _) | (_, None) => None,
                (_, Some(c)) => Some(solve::LineCoeffs::new(c.x, c.y, c.z)),
            };
            let relation = producer.and_then(|cmd| self.line_relation(cmd, coeffs.as_ref()));

            let through = self
                .polygon_edges
                .get(&el.label)
                .cloned()
                .or_else(|| producer.and_then(|cmd| self.two_point_line(cmd)))
                .or_else(|| self.vector_from_components(el))
                .or_else(|| {
                    relation.as_ref().and_then(|r| self.relation_points(r, coeffs.as_ref()))
                })
                .or_else(|| {
                    let (p, q) = coeffs?.two_points()?;
                    Some((PointRef::Literal(p), PointRef::Literal(q)))
                });

            let Some((start, end)) = through else {
                self.unsupported(el, "cannot resolve two points or a general form");
                continue;
            };
            debug!(label = %el.label, ?kind, related = relation.is_some(), "line");
            let polygon = producer
                .filter(|c| c.kind == CommandKind::Polygon)
                .and_then(|c| c.outputs.first().cloned());
            self.model.push_line(Line {
                label: el.label.clone(),
                kind,
                start,
                end,
                coeffs,
                relation,
                polygon,
                look: appearance(el),
            });
        }
    }

    /// Endpoints from the first two point-like arguments, plus the command
    /// shapes that name only one point.
    fn two_point_line(&self, cmd: &Command) -> Option<(PointRef, PointRef)> {
        if !matches!(
            cmd.kind,
            CommandKind::Line | CommandKind::Segment | CommandKind::Ray | CommandKind::Vector
        ) {
            return None;
        }
        let mut points = cmd.inputs.iter().filter_map(|a| self.point_ref(a));
        let first = points.next()?;
        if let Some(second) = points.next() {
            return Some((first, second));
        }
        let rest = &cmd.inputs[1..];
        match (&cmd.kind, rest) {
            // Segment(A, length) creates its far endpoint as a second output
            (CommandKind::Segment, [_]) => {
                let end = cmd.outputs.iter().skip(1).find_map(|l| self.named_point(l))?;
                Some((first, end))
            }
            // Vector(A) is a position vector
            (CommandKind::Vector, []) => Some((PointRef::Literal(DVec2::ZERO), first)),
            // Ray(A, v) and Line(A, v) follow a direction vector
            (CommandKind::Ray | CommandKind::Line, [Arg::Label(v)])
                if self.is_kind(v, ElementKind::Vector) =>
            {
                let dir = self.doc.element(v)?.coords.map(|c| dvec2(c.x, c.y))?;
                (dir.length() > tol::POINT_COINCIDENCE)
                    .then(|| (first.clone(), PointRef::Literal(first.pos() + dir)))
            }
            _ => None,
        }
    }

    fn vector_from_components(&self, el: &Element) -> Option<(PointRef, PointRef)> {
        if el.kind != ElementKind::Vector {
            return None;
        }
        let c = el.coords?;
        let start = match &el.start_point {
            Some(arg) => self.point_ref(arg)?,
            None => PointRef::Literal(DVec2::ZERO),
        };
        let end = start.pos() + dvec2(c.x, c.y);
        end.is_finite().then(|| (start, PointRef::Literal(end)))
    }

    fn line_relation(
        &self,
        cmd: &Command,
        own: Option<&solve::LineCoeffs>,
    ) -> Option<LineRelation> {
        match cmd.kind {
            CommandKind::Tangent => {
                let conic = cmd.input_labels().find(|l| self.is_kind(l, ElementKind::Conic))?;
                let form = self.conic_form(conic);
                let point = match (own, form) {
                    (Some(line), Some(q)) => solve::tangent_point(line, &q),
                    _ => None,
                };
                if point.is_none() {
                    warn!(conic = %conic, "tangent point not solvable");
                }
                Some(LineRelation::Tangent { conic: conic.to_string(), point })
            }
            CommandKind::AngularBisector => {
                let points: Vec<String> = cmd
                    .input_labels()
                    .filter(|l| self.is_kind(l, ElementKind::Point))
                    .map(str::to_string)
                    .collect();
                (points.len() == 3).then_some(LineRelation::Bisector { points })
            }
            CommandKind::OrthogonalLine => {
                let through = cmd.input_labels().find(|l| self.is_kind(l, ElementKind::Point))?;
                let target = cmd.input_labels().find(|l| *l != through)?;
                let foot = if self.is_linear(target) {
                    let source = self.named_point(through)?.pos();
                    self.line_coeffs(target)
                        .and_then(|t| solve::project_onto_line(source, &t))
                } else {
                    None
                };
                Some(LineRelation::Orthogonal {
                    through: through.to_string(),
                    target: target.to_string(),
                    foot,
                })
            }
            CommandKind::Line => {
                let [Arg::Label(through), Arg::Label(target)] = cmd.inputs.as_slice() else {
                    return None;
                };
                (self.is_kind(through, ElementKind::Point) && self.is_linear(target)).then(|| {
                    LineRelation::Parallel { through: through.clone(), target: target.clone() }
                })
            }
            _ => None,
        }
    }

    fn conic_form(&self, label: &str) -> Option<QuadraticForm> {
        if let Some(m) = self.doc.element(label).and_then(|e| e.matrix) {
            return Some(QuadraticForm::from_matrix(m));
        }
        self.model.conic(label).map(|c| c.shape.to_quadratic())
    }

    /// Through-points implied by a relation when plain two-point resolution failed
    fn relation_points(
        &self,
        relation: &LineRelation,
        own: Option<&solve::LineCoeffs>,
    ) -> Option<(PointRef, PointRef)> {
        match relation {
            LineRelation::Orthogonal { through, foot: Some(foot), .. } => {
                let source = self.named_point(through)?;
                (source.pos().distance(*foot) > tol::POINT_COINCIDENCE)
                    .then(|| (source, PointRef::Literal(*foot)))
            }
            LineRelation::Parallel { through, target } => {
                let source = self.named_point(through)?;
                let dir = self.line_coeffs(target)?.direction()?;
                let far = source.pos() + dir;
                Some((source, PointRef::Literal(far)))
            }
            LineRelation::Tangent { point: Some(touch), .. } => {
                let dir = own?.direction()?;
                Some((PointRef::Literal(*touch), PointRef::Literal(*touch + dir)))
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Conic parts
    // ------------------------------------------------------------------------

    fn collect_conic_parts(&mut self) {
        for el in self.elements(ElementKind::ConicPart) {
            let Some(cmd) = self.doc.producer(&el.label) else {
                self.unsupported(el, "conic part without a defining command");
                continue;
            };
            let (kind, arity) = match cmd.kind {
                CommandKind::Semicircle => (ConicPartKind::Semicircle, 2),
                CommandKind::CircularArc => (ConicPartKind::CircleArc, 3),
                CommandKind::CircularSector => (ConicPartKind::CircleSector, 3),
                CommandKind::CircumcircularArc => (ConicPartKind::CircumcircleArc, 3),
                CommandKind::CircumcircularSector => (ConicPartKind::CircumcircleSector, 3),
                _ => {
                    self.unsupported(el, format!("conic part from {}", cmd.name));
                    continue;
                }
            };
            let points = cmd
                .inputs
                .iter()
                .map(|a| self.point_ref(a))
                .collect::<Option<Vec<_>>>()
                .filter(|p| p.len() == arity);
            let Some(points) = points else {
                self.unsupported(el, format!("{} needs {arity} points", cmd.name));
                continue;
            };
            debug!(label = %el.label, ?kind, "conic part");
            self.model.conic_parts.push(ConicPart {
                label: el.label.clone(),
                kind,
                points,
                look: appearance(el),
            });
        }
    }

    // ------------------------------------------------------------------------
    // Angles
    // ------------------------------------------------------------------------

    fn collect_angles(&mut self) {
        for el in self.elements(ElementKind::Angle) {
            let Some(cmd) = self.doc.producer(&el.label) else {
                // free angle: a parameter, nothing to draw
                continue;
            };
            let form = match cmd.inputs.as_slice() {
                [a, b, c] if cmd.kind == CommandKind::Angle => {
                    match (self.point_ref(a), self.point_ref(b), self.point_ref(c)) {
                        (Some(first), Some(vertex), Some(second)) => {
                            Some(AngleForm::ThreePoint { first, vertex, second })
                        }
                        _ => None,
                    }
                }
                [Arg::Label(f), Arg::Label(g)] if cmd.kind == CommandKind::Angle => {
                    (self.is_linear(f) && self.is_linear(g))
                        .then(|| AngleForm::TwoLine { first: f.clone(), second: g.clone() })
                }
                _ => None,
            };
            let Some(form) = form else {
                self.unsupported(el, format!("angle from {}", cmd.name));
                continue;
            };
            self.model.angles.push(Angle {
                label: el.label.clone(),
                form,
                value: el.value.filter(|v| v.is_finite()),
                arc_size: el.arc_size.unwrap_or(30.0),
                look: appearance(el),
            });
        }
    }

    // ------------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------------

    fn collect_functions(&mut self) {
        let functions: Vec<&Element> = self.elements(ElementKind::Function).collect();

        for el in &functions {
            if let Some(ExpressionValue::Text { text, .. }) = self.doc.expression(&el.label) {
                if let Ok(body) = expr::parse_function_body(text) {
                    self.raw_functions.insert(el.label.clone(), body);
                }
            }
        }

        for el in functions {
            let producer = self.doc.producer(&el.label).filter(|c| c.kind == CommandKind::Function);
            let (source, domain) = match producer {
                // Function(f, a, b)
                Some(cmd) if cmd.inputs.len() == 3 => {
                    let base = cmd.inputs[0].label().unwrap_or_default();
                    let domain = match (self.number(&cmd.inputs[1]), self.number(&cmd.inputs[2])) {
                        (Some(a), Some(b)) if a < b => Some((a, b)),
                        _ => None,
                    };
                    (format!("{base}(x)"), domain)
                }
                _ => match self.doc.expression(&el.label) {
                    Some(ExpressionValue::Text { text, .. }) => (text.clone(), None),
                    _ => {
                        self.unsupported(el, "function without an expression");
                        continue;
                    }
                },
            };

            let body = expr::parse_function_body(&source)
                .and_then(|e| e.resolve(self))
                .map_err(|e| e.to_string());
            if let Err(reason) = &body {
                warn!(label = %el.label, reason = %reason, "function body not usable");
            }
            self.model.functions.push(Function {
                label: el.label.clone(),
                source,
                body,
                domain,
                look: appearance(el),
            });
        }
    }

    fn collect_unsupported(&mut self) {
        for el in &self.doc.elements {
            if let ElementKind::Other(ty) = &el.kind {
                let children: Vec<&str> = el.raw.iter().map(|n| n.tag.as_str()).collect();
                let reason = if children.is_empty() {
                    format!("element type `{ty}`")
                } else {
                    format!("element type `{ty}` ({})", children.join(", "))
                };
                self.unsupported(el, reason);
            }
        }
    }
}

fn kind_name(kind: &ElementKind) -> String {
    match kind {
        ElementKind::Other(ty) => ty.clone(),
        other => format!("{other:?}").to_lowercase(),
    }
}

fn point_provenance(cmd: &Command) -> Provenance {
    match cmd.kind {
        CommandKind::Point if cmd.inputs.iter().any(|a| !matches!(a, Arg::Coordinate(_))) => {
            Provenance::OnObject
        }
        CommandKind::Point => Provenance::Free,
        CommandKind::Intersect | CommandKind::IntersectPath => Provenance::Intersection,
        CommandKind::Midpoint => Provenance::Midpoint,
        CommandKind::Center => Provenance::Center,
        _ => Provenance::Derived,
    }
}

fn centroid(points: &[PointRef]) -> DVec2 {
    points.iter().map(PointRef::pos).sum::<DVec2>() / points.len() as f64
}

fn sort_by_centroid_angle(mut points: Vec<PointRef>) -> Vec<PointRef> {
    let c = centroid(&points);
    points.sort_by(|p, q| heading(p.pos() - c).total_cmp(&heading(q.pos() - c)));
    points
}

/// A, B, then the remaining vertices in the winding A→B sets, starting at A.
fn sort_regular(points: Vec<PointRef>) -> Vec<PointRef> {
    let c = centroid(&points);
    let start = heading(points[0].pos() - c);
    let (a, b) = (points[0].pos() - c, points[1].pos() - c);
    let winding = if a.perp_dot(b) >= 0.0 { 1.0 } else { -1.0 };
    let sweep = |p: &PointRef| (winding * (heading(p.pos() - c) - start)).rem_euclid(TAU);
    let mut keyed: Vec<(f64, PointRef)> = points.into_iter().map(|p| (sweep(&p), p)).collect();
    keyed.sort_by(|x, y| x.0.total_cmp(&y.0));
    keyed.into_iter().map(|(_, p)| p).collect()
}
