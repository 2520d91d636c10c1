//! Infinite lines and rays, clipped to the viewport

use crate::bounds::Bounds;
use crate::log::{debug, warn};
use crate::model::{Line, LineKind, LineRelation};
use crate::solve::tol;
use crate::types::{Coord, Num};
use glam::DVec2;

use super::context::RenderContext;
use super::style::{Category, bracket, stroke};

/// Liang–Barsky: the parameter interval of `origin + t·dir` inside `bounds`,
/// intersected with `[t0, t1]`.
pub fn clip_parametric(
    origin: DVec2,
    dir: DVec2,
    bounds: &Bounds,
    t0: f64,
    t1: f64,
) -> Option<(f64, f64)> {
    let (mut lo, mut hi) = (t0, t1);
    let checks = [
        (-dir.x, origin.x - bounds.x_min),
        (dir.x, bounds.x_max - origin.x),
        (-dir.y, origin.y - bounds.y_min),
        (dir.y, bounds.y_max - origin.y),
    ];
    for (p, q) in checks {
        if p.abs() < tol::COEFFICIENT {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            lo = lo.max(r);
        } else {
            hi = hi.min(r);
        }
        if lo > hi {
            return None;
        }
    }
    Some((lo, hi))
}

/// `[t0, t1]` widened on both sides by `fraction` of its length
fn extend(t0: f64, t1: f64, fraction: f64) -> (f64, f64) {
    let ext = (t1 - t0) * fraction;
    (t0 - ext, t1 + ext)
}

/// A point on the line and its unit direction
fn anchor(line: &Line) -> Option<(DVec2, DVec2)> {
    if let Some(dir) = line.direction() {
        return Some((line.start.pos(), dir));
    }
    let (p, q) = line.coeffs?.two_points()?;
    Some((p, (q - p).try_normalize()?))
}

pub fn render_lines(ctx: &mut RenderContext<'_>) {
    render_kind(ctx, LineKind::Line, "lines");
}

pub fn render_rays(ctx: &mut RenderContext<'_>) {
    render_kind(ctx, LineKind::Ray, "rays");
}

fn render_kind(ctx: &mut RenderContext<'_>, kind: LineKind, heading: &str) {
    let model = ctx.model;
    let mut first = true;
    for line in model.lines.iter().filter(|l| l.kind == kind && l.look.visible) {
        if first {
            ctx.comment(heading);
            first = false;
        }
        relation_comment(ctx, line);
        let drawn = match kind {
            LineKind::Ray => ray_path(ctx, line),
            _ => line_path(ctx, line),
        };
        match drawn {
            Some(path) => {
                let category = if kind == LineKind::Ray { Category::Ray } else { Category::Line };
                let options = bracket(&stroke(ctx.options, category, &line.look.style));
                ctx.emit(format!("\\draw{options} {path};"));
            }
            None => {
                warn!(label = %line.label, "line misses the viewport");
                ctx.comment(format!("{}: outside the viewport", line.label));
            }
        }
    }
}

fn relation_comment(ctx: &mut RenderContext<'_>, line: &Line) {
    match &line.relation {
        Some(LineRelation::Tangent { conic, point: Some(p) }) => {
            ctx.comment(format!("{}: tangent to {conic} at {}", line.label, Coord(*p)));
        }
        Some(LineRelation::Orthogonal { through, target, foot: Some(f) }) => {
            let (label, foot) = (&line.label, Coord(*f));
            ctx.comment(format!("{label}: perpendicular from {through} to {target}, foot {foot}"));
        }
        _ => {}
    }
}

fn line_path(ctx: &RenderContext<'_>, line: &Line) -> Option<String> {
    let (origin, dir) = anchor(line)?;
    let (t0, t1) = clip_parametric(origin, dir, &ctx.bounds, f64::NEG_INFINITY, f64::INFINITY)?;
    let (t0, t1) = extend(t0, t1, ctx.options.line_extension);
    let (from, to) = (origin + dir * t0, origin + dir * t1);

    if let Some((a, pa, b, pb)) = named_pair(ctx, line, origin, dir) {
        let span = pb - pa;
        let along = |p: DVec2| (p - pa).dot(span) / span.length_squared();
        debug!(label = %line.label, a, b, "line through named coordinates");
        return Some(format!(
            "($({a})!{}!({b})$) -- ($({a})!{}!({b})$)",
            Num(along(from)),
            Num(along(to))
        ));
    }
    Some(format!("{} -- {}", Coord(from), Coord(to)))
}

/// Two declared coordinates on the line, the line's own points first
fn named_pair<'c>(
    ctx: &'c RenderContext<'_>,
    line: &Line,
    origin: DVec2,
    dir: DVec2,
) -> Option<(&'c str, DVec2, &'c str, DVec2)> {
    if !ctx.options.named_coordinates {
        return None;
    }
    let on_line = |p: DVec2| (p - origin).perp_dot(dir).abs() <= tol::POINT_ON_LINE;
    let own = [&line.start, &line.end]
        .into_iter()
        .filter_map(|r| r.label().and_then(|l| ctx.name(l)).map(|name| (name, r.pos())));
    let mut found: Vec<(&str, DVec2)> = Vec::with_capacity(2);
    for (name, pos) in own.chain(ctx.declared_points()) {
        let seen =
            found.iter().any(|(n, p)| *n == name || p.distance(pos) < tol::POINT_COINCIDENCE);
        if !on_line(pos) || seen {
            continue;
        }
        found.push((name, pos));
        if found.len() == 2 {
            return Some((found[0].0, found[0].1, found[1].0, found[1].1));
        }
    }
    None
}

fn ray_path(ctx: &RenderContext<'_>, line: &Line) -> Option<String> {
    let origin = line.start.pos();
    let dir = line.direction()?;
    let (_, exit) = clip_parametric(origin, dir, &ctx.bounds, 0.0, f64::INFINITY)?;
    let to = origin + dir * exit * (1.0 + ctx.options.line_extension);
    Some(format!("{} -- {}", ctx.at(&line.start), Coord(to)))
}
