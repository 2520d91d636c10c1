//! Construction document reader.
//!
//! Reads the `<construction>` subtree of a GeoGebra XML file into three
//! lookups: elements by label, expressions by label, and commands by output
//! label. Nothing here interprets geometry; the classifier does that.

use crate::errors::ReadError;
use crate::expr::{parse_number, parse_point_literal};
use crate::log::{debug, warn};
use crate::types::{Homogeneous, Rgb};
use glam::DVec2;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// Elements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ElementKind {
    Point,
    Line,
    Segment,
    Ray,
    Vector,
    Polygon,
    Conic,
    ConicPart,
    Angle,
    Function,
    Numeric,
    Other(String),
}

impl ElementKind {
    pub fn from_type(ty: &str) -> ElementKind {
        match ty {
            "point" => ElementKind::Point,
            "line" => ElementKind::Line,
            "segment" => ElementKind::Segment,
            "ray" => ElementKind::Ray,
            "vector" => ElementKind::Vector,
            "polygon" => ElementKind::Polygon,
            "conic" => ElementKind::Conic,
            "conicpart" => ElementKind::ConicPart,
            "angle" => ElementKind::Angle,
            "function" => ElementKind::Function,
            "numeric" => ElementKind::Numeric,
            other => ElementKind::Other(other.to_string()),
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(
            self,
            ElementKind::Line | ElementKind::Segment | ElementKind::Ray | ElementKind::Vector
        )
    }
}

/// Per-element style as stored in the file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Style {
    pub color: Option<Rgb>,
    pub alpha: Option<f64>,
    /// GeoGebra thickness units (1..13)
    pub thickness: Option<f64>,
    /// GeoGebra line type: 0 full, 10 dashed, 15 long dash, 20 dotted, 30 dash-dot
    pub line_type: Option<u32>,
    pub point_size: Option<f64>,
}

/// Child node kept verbatim for element types nothing else understands
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub kind: ElementKind,
    pub label: String,
    pub show_object: bool,
    pub show_label: bool,
    pub style: Style,
    pub coords: Option<Homogeneous>,
    /// `A0..A5` of a conic
    pub matrix: Option<[f64; 6]>,
    pub value: Option<f64>,
    pub arc_size: Option<f64>,
    pub start_point: Option<Arg>,
    pub caption: Option<String>,
    pub raw: Vec<RawNode>,
}

impl Element {
    fn new(kind: ElementKind, label: String) -> Self {
        Element {
            kind,
            label,
            show_object: true,
            show_label: true,
            style: Style::default(),
            coords: None,
            matrix: None,
            value: None,
            arc_size: None,
            start_point: None,
            caption: None,
            raw: Vec::new(),
        }
    }

    /// Cartesian position of a point element
    pub fn position(&self) -> Option<DVec2> {
        self.coords.and_then(Homogeneous::to_point)
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Builder commands the classifier knows how to read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CommandKind {
    Point,
    Intersect,
    IntersectPath,
    Midpoint,
    Center,
    Segment,
    Line,
    Ray,
    Vector,
    Polygon,
    Circle,
    Ellipse,
    Hyperbola,
    Parabola,
    Semicircle,
    CircularArc,
    CircularSector,
    CircumcircularArc,
    CircumcircularSector,
    Angle,
    Tangent,
    AngularBisector,
    OrthogonalLine,
    Function,
    Other(String),
}

impl CommandKind {
    pub fn from_name(name: &str) -> CommandKind {
        match name {
            "Point" => CommandKind::Point,
            "Intersect" => CommandKind::Intersect,
            "IntersectPath" => CommandKind::IntersectPath,
            "Midpoint" => CommandKind::Midpoint,
            "Center" => CommandKind::Center,
            "Segment" => CommandKind::Segment,
            "Line" => CommandKind::Line,
            "Ray" => CommandKind::Ray,
            "Vector" => CommandKind::Vector,
            "Polygon" => CommandKind::Polygon,
            "Circle" => CommandKind::Circle,
            "Ellipse" => CommandKind::Ellipse,
            "Hyperbola" => CommandKind::Hyperbola,
            "Parabola" => CommandKind::Parabola,
            "Semicircle" => CommandKind::Semicircle,
            "CircularArc" => CommandKind::CircularArc,
            "CircularSector" => CommandKind::CircularSector,
            "CircumcircularArc" => CommandKind::CircumcircularArc,
            "CircumcircularSector" => CommandKind::CircumcircularSector,
            "Angle" => CommandKind::Angle,
            "Tangent" => CommandKind::Tangent,
            "AngularBisector" => CommandKind::AngularBisector,
            "OrthogonalLine" | "PerpendicularLine" => CommandKind::OrthogonalLine,
            "Function" => CommandKind::Function,
            other => CommandKind::Other(other.to_string()),
        }
    }
}

/// One command input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Arg {
    Coordinate(DVec2),
    Number(f64),
    Label(String),
    /// Anything else, e.g. `A + (1, 0)`
    Text(String),
}

impl Arg {
    pub fn parse(raw: &str) -> Arg {
        let raw = raw.trim();
        if let Some(p) = parse_point_literal(raw) {
            return Arg::Coordinate(p);
        }
        if let Ok(v) = raw.parse::<f64>() {
            return Arg::Number(v);
        }
        if is_label(raw) {
            return Arg::Label(raw.to_string());
        }
        match parse_number(raw) {
            Some(v) => Arg::Number(v),
            None => Arg::Text(raw.to_string()),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Arg::Label(l) => Some(l),
            _ => None,
        }
    }
}

fn is_label(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '{' | '}' | '\''))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub name: String,
    pub kind: CommandKind,
    pub inputs: Vec<Arg>,
    pub outputs: Vec<String>,
}

impl Command {
    pub fn input_labels(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().filter_map(Arg::label)
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExpressionValue {
    Coordinate(DVec2),
    Text { text: String, ty: Option<String> },
}

// ============================================================================
// Document
// ============================================================================

#[derive(Debug, Default, Serialize)]
pub struct Document {
    pub elements: Vec<Element>,
    /// Commands in declaration order
    pub commands: Vec<Command>,
    pub expressions: HashMap<String, ExpressionValue>,
    /// Reader-level oddities worth surfacing, e.g. duplicate producers
    pub diagnostics: Vec<String>,
    #[serde(skip)]
    element_index: HashMap<String, usize>,
    #[serde(skip)]
    producer_index: HashMap<String, usize>,
}

impl Document {
    pub fn element(&self, label: &str) -> Option<&Element> {
        self.element_index.get(label).map(|&i| &self.elements[i])
    }

    /// The command whose output list contains `label`
    pub fn producer(&self, label: &str) -> Option<&Command> {
        self.producer_index.get(label).map(|&i| &self.commands[i])
    }

    pub fn expression(&self, label: &str) -> Option<&ExpressionValue> {
        self.expressions.get(label)
    }

    fn index(&mut self) {
        let mut kept = Vec::with_capacity(self.elements.len());
        for element in std::mem::take(&mut self.elements) {
            if self.element_index.contains_key(&element.label) {
                warn!(label = %element.label, "duplicate element label");
                self.diagnostics.push(format!(
                    "duplicate element label `{}`, keeping the first",
                    element.label
                ));
                continue;
            }
            self.element_index.insert(element.label.clone(), kept.len());
            kept.push(element);
        }
        self.elements = kept;
        for (i, command) in self.commands.iter().enumerate() {
            for output in &command.outputs {
                if let Some(&first) = self.producer_index.get(output) {
                    warn!(label = %output, "element claimed by two commands");
                    self.diagnostics.push(format!(
                        "`{output}` is produced by both {} and {}, keeping {}",
                        self.commands[first].name, command.name, self.commands[first].name
                    ));
                    continue;
                }
                if !self.element_index.contains_key(output) {
                    self.diagnostics
                        .push(format!("{} output `{output}` has no element", command.name));
                }
                self.producer_index.insert(output.clone(), i);
            }
        }
    }
}

/// Read a GeoGebra construction document.
pub fn read_document(xml: &str) -> Result<Document, ReadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buffer = Vec::new();
    let mut doc = Document::default();

    let mut found_construction = false;
    let mut in_construction = false;
    let mut macro_depth = 0usize;
    let mut element: Option<Element> = None;
    let mut command: Option<Command> = None;

    loop {
        let position = reader.buffer_position() as usize;
        let event = reader
            .read_event_into(&mut buffer)
            .map_err(|e| ReadError::Xml { message: e.to_string(), position })?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let tag = tag_name(e);
                if tag == "macro" {
                    if !is_empty {
                        macro_depth += 1;
                    }
                } else if macro_depth > 0 {
                    // macro bodies carry their own construction
                } else if tag == "construction" {
                    found_construction = true;
                    in_construction = !is_empty;
                } else if in_construction {
                    read_node(&mut doc, &mut element, &mut command, &tag, e, is_empty, position)?;
                }
            }
            Event::End(ref e) => {
                let tag = tag_name_end(e.name().as_ref());
                match tag.as_str() {
                    "macro" => macro_depth = macro_depth.saturating_sub(1),
                    "construction" if macro_depth == 0 => in_construction = false,
                    "element" if in_construction => {
                        if let Some(el) = element.take() {
                            doc.elements.push(el);
                        }
                    }
                    "command" if in_construction => {
                        if let Some(cmd) = command.take() {
                            doc.commands.push(cmd);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buffer.clear();
    }

    if !found_construction {
        return Err(ReadError::MissingConstruction);
    }

    doc.index();
    debug!(
        elements = doc.elements.len(),
        commands = doc.commands.len(),
        expressions = doc.expressions.len(),
        "read construction"
    );
    Ok(doc)
}

fn read_node(
    doc: &mut Document,
    element: &mut Option<Element>,
    command: &mut Option<Command>,
    tag: &str,
    e: &BytesStart,
    is_empty: bool,
    position: usize,
) -> Result<(), ReadError> {
    let attrs = attributes(e, position)?;
    match tag {
        "element" => {
            let kind = ElementKind::from_type(attr(&attrs, "type").unwrap_or(""));
            let label = attr(&attrs, "label").unwrap_or("").to_string();
            let fresh = Element::new(kind, label);
            if is_empty {
                doc.elements.push(fresh);
            } else {
                *element = Some(fresh);
            }
        }
        "command" => {
            let name = attr(&attrs, "name").unwrap_or("").to_string();
            let fresh = Command {
                kind: CommandKind::from_name(&name),
                name,
                inputs: Vec::new(),
                outputs: Vec::new(),
            };
            if is_empty {
                doc.commands.push(fresh);
            } else {
                *command = Some(fresh);
            }
        }
        "expression" => read_expression(doc, &attrs),
        "input" | "output" => {
            if let Some(cmd) = command.as_mut() {
                let args = indexed_args(&attrs);
                if tag == "input" {
                    cmd.inputs = args.iter().map(|a| Arg::parse(a)).collect();
                } else {
                    cmd.outputs = args.into_iter().filter(|a| !a.is_empty()).collect();
                }
            }
        }
        _ => {
            if let Some(el) = element.as_mut() {
                read_element_child(el, tag, attrs);
            }
        }
    }
    Ok(())
}

fn tag_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn tag_name_end(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

fn attributes(e: &BytesStart, position: usize) -> Result<Vec<(String, String)>, ReadError> {
    let mut out = Vec::new();
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| ReadError::Xml { message: err.to_string(), position })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ReadError::Xml { message: err.to_string(), position })?
            .into_owned();
        out.push((key, value));
    }
    Ok(out)
}

fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn num(attrs: &[(String, String)], key: &str) -> Option<f64> {
    attr(attrs, key).and_then(|v| v.trim().parse::<f64>().ok())
}

fn flag(attrs: &[(String, String)], key: &str) -> Option<bool> {
    attr(attrs, key).map(|v| v == "true")
}

/// `a0, a1, ...` up to the first missing index
fn indexed_args(attrs: &[(String, String)]) -> Vec<String> {
    let mut out = Vec::new();
    for i in 0.. {
        match attr(attrs, &format!("a{i}")) {
            Some(v) => out.push(v.to_string()),
            None => break,
        }
    }
    out
}

fn read_expression(doc: &mut Document, attrs: &[(String, String)]) {
    let Some(label) = attr(attrs, "label") else { return };
    let text = attr(attrs, "exp").unwrap_or("").to_string();
    let value = match parse_point_literal(&text) {
        Some(p) => ExpressionValue::Coordinate(p),
        None => ExpressionValue::Text { text, ty: attr(attrs, "type").map(str::to_string) },
    };
    doc.expressions.insert(label.to_string(), value);
}

fn read_element_child(el: &mut Element, tag: &str, attrs: Vec<(String, String)>) {
    match tag {
        "show" => {
            el.show_object = flag(&attrs, "object").unwrap_or(el.show_object);
            el.show_label = flag(&attrs, "label").unwrap_or(el.show_label);
        }
        "objColor" => {
            let channel = |k: &str| num(&attrs, k).map(|v| v.clamp(0.0, 255.0) as u8);
            if let (Some(r), Some(g), Some(b)) = (channel("r"), channel("g"), channel("b")) {
                el.style.color = Some(Rgb { r, g, b });
            }
            el.style.alpha = num(&attrs, "alpha");
        }
        "lineStyle" => {
            el.style.thickness = num(&attrs, "thickness");
            el.style.line_type = attr(&attrs, "type").and_then(|v| v.trim().parse().ok());
        }
        "pointSize" => el.style.point_size = num(&attrs, "val"),
        "coords" => {
            let (x, y, z) = (num(&attrs, "x"), num(&attrs, "y"), num(&attrs, "z"));
            if let (Some(x), Some(y), Some(z)) = (x, y, z) {
                el.coords = Some(Homogeneous { x, y, z });
            }
        }
        "matrix" => {
            let mut m = [0.0; 6];
            for (i, slot) in m.iter_mut().enumerate() {
                match num(&attrs, &format!("A{i}")) {
                    Some(v) => *slot = v,
                    None => return,
                }
            }
            el.matrix = Some(m);
        }
        "value" => el.value = num(&attrs, "val"),
        "arcSize" => el.arc_size = num(&attrs, "val"),
        "caption" => el.caption = attr(&attrs, "val").map(str::to_string),
        "startPoint" if el.start_point.is_none() => {
            if let Some(exp) = attr(&attrs, "exp") {
                el.start_point = Some(Arg::parse(exp));
            } else if let (Some(x), Some(y)) = (num(&attrs, "x"), num(&attrs, "y")) {
                let z = num(&attrs, "z").unwrap_or(1.0);
                if let Some(p) = (Homogeneous { x, y, z }).to_point() {
                    el.start_point = Some(Arg::Coordinate(p));
                }
            }
        }
        _ => {
            if matches!(el.kind, ElementKind::Other(_)) {
                el.raw.push(RawNode { tag: tag.to_string(), attributes: attrs });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<geogebra format="5.0">
  <macro cmdName="Hidden">
    <construction>
      <element type="point" label="Inner"><coords x="9" y="9" z="1"/></element>
    </construction>
  </macro>
  <construction title="" author="" date="">
    <expression label="A" exp="(0, 0)"/>
    <expression label="f" exp="f(x) = x^2" type="function"/>
    <element type="point" label="A">
      <show object="true" label="true"/>
      <objColor r="77" g="77" b="255" alpha="0.0"/>
      <coords x="0" y="0" z="1"/>
      <pointSize val="5"/>
    </element>
    <element type="point" label="B">
      <coords x="6" y="8" z="2"/>
    </element>
    <command name="Segment">
      <input a0="A" a1="B"/>
      <output a0="s"/>
    </command>
    <element type="segment" label="s">
      <show object="true" label="false"/>
      <lineStyle thickness="5" type="10"/>
      <coords x="-4" y="3" z="0"/>
    </element>
    <command name="Circle">
      <input a0="(1, 2)" a1="3" a3="ignored"/>
      <output a0="c"/>
    </command>
    <element type="conic" label="c">
      <matrix A0="1" A1="1" A2="-4" A3="0" A4="-1" A5="-2"/>
    </element>
    <element type="textfield" label="t">
      <linkedGeo exp="A"/>
    </element>
  </construction>
</geogebra>"#;

    #[test]
    fn reads_elements_and_styles() {
        let doc = read_document(SAMPLE).unwrap();
        let a = doc.element("A").unwrap();
        assert_eq!(a.kind, ElementKind::Point);
        assert_eq!(a.style.color, Some(Rgb { r: 77, g: 77, b: 255 }));
        assert_eq!(a.style.point_size, Some(5.0));
        assert_eq!(doc.element("B").unwrap().position(), Some(dvec2(3.0, 4.0)));

        let s = doc.element("s").unwrap();
        assert!(!s.show_label);
        assert_eq!(s.style.line_type, Some(10));
        assert_eq!(doc.element("c").unwrap().matrix, Some([1.0, 1.0, -4.0, 0.0, -1.0, -2.0]));
    }

    #[test]
    fn ignores_macro_constructions() {
        let doc = read_document(SAMPLE).unwrap();
        assert!(doc.element("Inner").is_none());
    }

    #[test]
    fn commands_keep_order_and_stop_at_missing_index() {
        let doc = read_document(SAMPLE).unwrap();
        let names: Vec<_> = doc.commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Segment", "Circle"]);

        let circle = doc.producer("c").unwrap();
        assert_eq!(circle.kind, CommandKind::Circle);
        assert_eq!(circle.inputs, [Arg::Coordinate(dvec2(1.0, 2.0)), Arg::Number(3.0)]);

        let segment = doc.producer("s").unwrap();
        assert_eq!(segment.input_labels().collect::<Vec<_>>(), ["A", "B"]);
    }

    #[test]
    fn expressions_split_coordinates_from_text() {
        let doc = read_document(SAMPLE).unwrap();
        assert_eq!(doc.expression("A"), Some(&ExpressionValue::Coordinate(dvec2(0.0, 0.0))));
        assert!(matches!(
            doc.expression("f"),
            Some(ExpressionValue::Text { ty: Some(ty), .. }) if ty == "function"
        ));
    }

    #[test]
    fn unknown_types_keep_raw_children() {
        let doc = read_document(SAMPLE).unwrap();
        let t = doc.element("t").unwrap();
        assert_eq!(t.kind, ElementKind::Other("textfield".to_string()));
        assert_eq!(t.raw[0].tag, "linkedGeo");
        assert_eq!(t.raw[0].attributes, [("exp".to_string(), "A".to_string())]);
    }

    #[test]
    fn first_producer_wins() {
        let xml = r#"<geogebra><construction>
            <command name="Midpoint"><input a0="A" a1="B"/><output a0="M"/></command>
            <command name="Center"><input a0="c"/><output a0="M"/></command>
            <element type="point" label="M"><coords x="1" y="1" z="1"/></element>
        </construction></geogebra>"#;
        let doc = read_document(xml).unwrap();
        assert_eq!(doc.producer("M").unwrap().kind, CommandKind::Midpoint);
        assert_eq!(doc.diagnostics.len(), 1);
    }

    #[test]
    fn duplicate_labels_keep_the_first_element() {
        let xml = r#"<geogebra><construction>
            <element type="point" label="A"><coords x="1" y="1" z="1"/></element>
            <element type="point" label="A"><coords x="2" y="2" z="1"/></element>
        </construction></geogebra>"#;
        let doc = read_document(xml).unwrap();
        assert_eq!(doc.elements.len(), 1);
        assert_eq!(doc.element("A").unwrap().position(), Some(dvec2(1.0, 1.0)));
        assert_eq!(doc.diagnostics, ["duplicate element label `A`, keeping the first"]);
    }

    #[test]
    fn missing_construction_is_an_error() {
        let err = read_document("<geogebra><kernel/></geogebra>").unwrap_err();
        assert!(matches!(err, ReadError::MissingConstruction));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = read_document("<geogebra><construction></geogebra>").unwrap_err();
        assert!(matches!(err, ReadError::Xml { .. }));
    }

    #[test]
    fn argument_classification() {
        assert_eq!(Arg::parse("A_{1}"), Arg::Label("A_{1}".to_string()));
        assert_eq!(Arg::parse("2.5"), Arg::Number(2.5));
        assert_eq!(Arg::parse("(1; -2)"), Arg::Coordinate(dvec2(1.0, -2.0)));
        assert_eq!(Arg::parse("A + (1, 0)"), Arg::Text("A + (1, 0)".to_string()));
    }
}
