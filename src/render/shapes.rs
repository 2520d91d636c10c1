//! Polygons, vectors and segments: straight path emission

use crate::model::{Line, LineKind, Model, Polygon};

use super::context::RenderContext;
use super::style::{Category, bracket, polygon_fill, stroke};

pub fn render_polygons(ctx: &mut RenderContext<'_>) {
    let model = ctx.model;
    let mut first = true;
    for polygon in model.polygons.iter().filter(|p| p.look.visible) {
        if first {
            ctx.comment("polygons");
            first = false;
        }
        match polygon_path(ctx, polygon) {
            Some(path) => ctx.emit(path),
            None => ctx.comment(format!("{}: fewer than three vertices", polygon.label)),
        }
    }
}

/// Whether the polygon that produced `line` is drawn as one path
fn drawn_as_edge(model: &Model, line: &Line) -> bool {
    line.polygon.as_deref().is_some_and(|owner| {
        model.polygons.iter().any(|p| p.label == owner && p.look.visible && p.vertices.len() >= 3)
    })
}

fn polygon_path(ctx: &RenderContext<'_>, polygon: &Polygon) -> Option<String> {
    if polygon.vertices.len() < 3 {
        return None;
    }
    let mut options = stroke(ctx.options, Category::Polygon, &polygon.look.style);
    options.extend(polygon_fill(ctx.options, &polygon.look.style));
    let vertices: Vec<String> = polygon.vertices.iter().map(|v| ctx.at(v)).collect();
    Some(format!("\\draw{} {} -- cycle;", bracket(&options), vertices.join(" -- ")))
}

pub fn render_vectors(ctx: &mut RenderContext<'_>) {
    render_straight(ctx, LineKind::Vector, "vectors");
}

pub fn render_segments(ctx: &mut RenderContext<'_>) {
    render_straight(ctx, LineKind::Segment, "segments");
}

fn render_straight(ctx: &mut RenderContext<'_>, kind: LineKind, heading: &str) {
    let model = ctx.model;
    let (category, arrow) = match kind {
        LineKind::Vector => (Category::Vector, true),
        _ => (Category::Segment, false),
    };
    let mut first = true;
    let lines = model.lines.iter().filter(|l| l.kind == kind && l.look.visible);
    for line in lines.filter(|l| !drawn_as_edge(model, l)) {
        if first {
            ctx.comment(heading);
            first = false;
        }
        let mut options = Vec::new();
        if arrow {
            options.push("->".to_string());
        }
        options.extend(stroke(ctx.options, category, &line.look.style));
        let (from, to) = (ctx.at(&line.start), ctx.at(&line.end));
        ctx.emit(format!("\\draw{} {from} -- {to};", bracket(&options)));
    }
}
