//! Rendering context - output buffer and coordinate names

use std::collections::HashMap;

use crate::bounds::Bounds;
use crate::model::{Model, PointRef};
use crate::options::Options;
use crate::types::Coord;
use glam::DVec2;

use super::text::coordinate_name;

/// State threaded through every category emitter
pub struct RenderContext<'a> {
    pub model: &'a Model,
    pub options: &'a Options,
    pub bounds: Bounds,
    lines: Vec<String>,
    indent: usize,
    /// Point label -> declared coordinate name
    names: HashMap<String, String>,
}

impl<'a> RenderContext<'a> {
    pub fn new(model: &'a Model, options: &'a Options, bounds: Bounds) -> Self {
        Self { model, options, bounds, lines: Vec::new(), indent: 1, names: HashMap::new() }
    }

    /// Append one output line at the current indent
    pub fn emit(&mut self, line: impl AsRef<str>) {
        let mut s = "  ".repeat(self.indent);
        s.push_str(line.as_ref());
        self.lines.push(s);
    }

    pub fn comment(&mut self, text: impl AsRef<str>) {
        // a newline in the text would end the comment early
        let text = text.as_ref().replace(['\n', '\r'], " ");
        self.emit(format!("% {text}"));
    }

    pub fn open_scope(&mut self, line: impl AsRef<str>) {
        self.emit(line);
        self.indent += 1;
    }

    pub fn close_scope(&mut self, line: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.emit(line);
    }

    /// Register a coordinate name for a point label, unique within the picture
    pub fn declare(&mut self, label: &str) -> String {
        if let Some(name) = self.names.get(label) {
            return name.clone();
        }
        let base = coordinate_name(label);
        let mut name = base.clone();
        let mut n = 2;
        while self.names.values().any(|v| *v == name) {
            name = format!("{base}-{n}");
            n += 1;
        }
        self.names.insert(label.to_string(), name.clone());
        name
    }

    pub fn name(&self, label: &str) -> Option<&str> {
        self.names.get(label).map(String::as_str)
    }

    /// `(A)` for a declared point, else its literal coordinate
    pub fn at(&self, point: &PointRef) -> String {
        match point.label().and_then(|l| self.name(l)) {
            Some(name) => format!("({name})"),
            None => Coord(point.pos()).to_string(),
        }
    }

    pub fn literal(&self, p: DVec2) -> String {
        Coord(p).to_string()
    }

    /// Declared points with their coordinate names, in model order
    pub fn declared_points(&self) -> impl Iterator<Item = (&str, DVec2)> {
        self.model.points.iter().filter_map(|pt| self.name(&pt.label).map(|name| (name, pt.pos)))
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn names_are_unique() {
        let model = Model::default();
        let options = Options::default();
        let bounds = Bounds { x_min: -1.0, x_max: 1.0, y_min: -1.0, y_max: 1.0 };
        let mut ctx = RenderContext::new(&model, &options, bounds);
        assert_eq!(ctx.declare("A_1"), "A1");
        assert_eq!(ctx.declare("A_{1}"), "A1-2");
        assert_eq!(ctx.declare("A_1"), "A1");

        let named = PointRef::Named { label: "A_1".into(), pos: dvec2(1.0, 2.0) };
        let undeclared = PointRef::Named { label: "Q".into(), pos: dvec2(0.5, 0.0) };
        assert_eq!(ctx.at(&named), "(A1)");
        assert_eq!(ctx.at(&undeclared), "(0.5, 0)");
    }
}
