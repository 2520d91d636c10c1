//! Angle marks: arcs, right-angle squares and two-line disambiguation
//!
//! A three-point angle always takes the signed shortest arc between its
//! rays. A two-line angle has several candidate arcs at the intersection,
//! one per pair of rays; the candidates are scored and the cheapest wins:
//!
//! - base cost: distance to the stored angle value in degrees (reflex values
//!   folded below a half turn), or the arc size itself when no value is stored
//! - `ORDER_PENALTY` per ray pointing against its line's own point order
//! - `REGION_BONUS` off when the arc's bisector lies in the preferred region

use crate::log::{debug, warn};
use crate::model::{Angle, AngleForm, Line};
use crate::options::AngleRegion;
use crate::solve::{self, heading, tol};
use crate::types::{Coord, Num};
use glam::DVec2;
use std::f64::consts::{PI, TAU};

use super::context::RenderContext;
use super::defaults::{ANGLE_LABEL_GAP, ARC_UNITS_PER_PIXEL};
use super::style::{Category, bracket, stroke};
use super::text::{escape_text, math_label};

pub const ORDER_PENALTY: f64 = 0.01;
pub const REGION_BONUS: f64 = 0.05;

/// Arc from `start` sweeping `sweep` radians (negative is clockwise)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleMark {
    pub vertex: DVec2,
    pub start: f64,
    pub sweep: f64,
}

impl AngleMark {
    pub fn is_right(&self) -> bool {
        (self.sweep.abs().to_degrees() - 90.0).abs() <= tol::RIGHT_ANGLE_DEG
    }

    pub fn bisector(&self) -> DVec2 {
        DVec2::from_angle(self.start + self.sweep / 2.0)
    }
}

/// Signed shortest arc from ray `vertex→first` to ray `vertex→second`
pub fn three_point_mark(first: DVec2, vertex: DVec2, second: DVec2) -> Option<AngleMark> {
    let (u, v) = (first - vertex, second - vertex);
    if u.length() < tol::POINT_COINCIDENCE || v.length() < tol::POINT_COINCIDENCE {
        return None;
    }
    let sweep = u.perp_dot(v).atan2(u.dot(v));
    Some(AngleMark { vertex, start: heading(u), sweep })
}

/// Best-scoring arc between two lines; arcs never exceed a half turn
pub fn two_line_mark(
    first: &Line,
    second: &Line,
    target: Option<f64>,
    region: AngleRegion,
) -> Option<AngleMark> {
    let vertex = solve::intersect_lines(&first.general_form()?, &second.general_form()?)?;
    let (c1, c2) = (candidates(first, vertex)?, candidates(second, vertex)?);
    let (o1, o2) = (order_direction(first), order_direction(second));

    let mut best: Option<(f64, AngleMark)> = None;
    for d1 in &c1 {
        for d2 in &c2 {
            let sweep = d1.perp_dot(*d2).atan2(d1.dot(*d2));
            let size = sweep.abs();
            if size < 1e-9 || (size - PI).abs() < 1e-9 {
                continue;
            }
            let mark = AngleMark { vertex, start: heading(*d1), sweep };
            let mut score = match target {
                Some(t) => {
                    let t = t.rem_euclid(TAU);
                    (size - if t > PI { TAU - t } else { t }).abs().to_degrees()
                }
                None => size.to_degrees(),
            };
            if o1.is_some_and(|o| d1.dot(o) < 0.0) {
                score += ORDER_PENALTY;
            }
            if o2.is_some_and(|o| d2.dot(o) < 0.0) {
                score += ORDER_PENALTY;
            }
            if in_region(mark.bisector(), region) {
                score -= REGION_BONUS;
            }
            if best.as_ref().is_none_or(|(s, _)| score < *s - 1e-12) {
                best = Some((score, mark));
            }
        }
    }
    best.map(|(_, mark)| mark)
}

/// Unit rays from the vertex along a line: toward its defining points and
/// both ways along its direction, without duplicates
fn candidates(line: &Line, vertex: DVec2) -> Option<Vec<DVec2>> {
    let along = line.direction().or_else(|| line.general_form()?.direction())?;
    let mut out: Vec<DVec2> = Vec::with_capacity(4);
    let toward = [line.start.pos(), line.end.pos()]
        .into_iter()
        .filter(|p| p.distance(vertex) > tol::POINT_COINCIDENCE)
        .filter_map(|p| (p - vertex).try_normalize());
    for d in toward.chain([along, -along]) {
        if !out.iter().any(|o| o.dot(d) > 1.0 - 1e-9) {
            out.push(d);
        }
    }
    Some(out)
}

fn order_direction(line: &Line) -> Option<DVec2> {
    line.direction()
}

fn in_region(v: DVec2, region: AngleRegion) -> bool {
    match region {
        AngleRegion::Auto => false,
        AngleRegion::Left => v.x < 0.0,
        AngleRegion::Right => v.x > 0.0,
        AngleRegion::Above => v.y > 0.0,
        AngleRegion::Below => v.y < 0.0,
    }
}

pub fn render_angles(ctx: &mut RenderContext<'_>) {
    let model = ctx.model;
    let mut first = true;
    for angle in model.angles.iter().filter(|a| a.look.visible) {
        if first {
            ctx.comment("angles");
            first = false;
        }
        let mark = match &angle.form {
            AngleForm::ThreePoint { first, vertex, second } => {
                three_point_mark(first.pos(), vertex.pos(), second.pos())
            }
            AngleForm::TwoLine { first, second } => match (model.line(first), model.line(second)) {
                (Some(l1), Some(l2)) => {
                    two_line_mark(l1, l2, angle.value, ctx.options.angle_region)
                }
                _ => None,
            },
        };
        match mark {
            Some(mark) => emit_mark(ctx, angle, &mark),
            None => {
                warn!(label = %angle.label, "angle has no vertex");
                ctx.comment(format!("{}: undefined angle", angle.label));
            }
        }
    }
}

fn emit_mark(ctx: &mut RenderContext<'_>, angle: &Angle, mark: &AngleMark) {
    let radius = angle.arc_size * ARC_UNITS_PER_PIXEL;
    let options = bracket(&stroke(ctx.options, Category::Angle, &angle.look.style));
    let v = mark.vertex;
    let u1 = DVec2::from_angle(mark.start);
    let u2 = DVec2::from_angle(mark.start + mark.sweep);
    if mark.is_right() {
        debug!(label = %angle.label, "right angle");
        let corner = v + (u1 + u2) * radius;
        ctx.emit(format!(
            "\\draw{options} {} -- {} -- {};",
            Coord(v + u1 * radius),
            Coord(corner),
            Coord(v + u2 * radius)
        ));
    } else {
        let start = mark.start.to_degrees();
        ctx.emit(format!(
            "\\draw{options} {} arc[start angle={}, end angle={}, radius={}];",
            Coord(v + u1 * radius),
            Num(start),
            Num(start + mark.sweep.to_degrees()),
            Num(radius)
        ));
    }
    if angle.look.label_visible {
        let text = match angle.look.caption.as_deref().filter(|c| !c.is_empty()) {
            Some(caption) => escape_text(caption),
            None => format!("${}$", math_label(&angle.label)),
        };
        let at = v + mark.bisector() * (radius + ANGLE_LABEL_GAP);
        ctx.emit(format!("\\node at {} {{{text}}};", Coord(at)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Appearance, LineKind, PointRef};
    use glam::dvec2;

    fn line(label: &str, a: DVec2, b: DVec2) -> Line {
        Line {
            label: label.into(),
            kind: LineKind::Line,
            start: PointRef::Literal(a),
            end: PointRef::Literal(b),
            coeffs: None,
            relation: None,
            polygon: None,
            look: Appearance::default(),
        }
    }

    #[test]
    fn right_angle_is_symmetric() {
        let (a, o, b) = (dvec2(1.0, 0.0), dvec2(0.0, 0.0), dvec2(0.0, 1.0));
        let m1 = three_point_mark(a, o, b).unwrap();
        let m2 = three_point_mark(b, o, a).unwrap();
        assert!(m1.is_right() && m2.is_right());
        assert!((m1.sweep + m2.sweep).abs() < 1e-12);
        assert!(m1.bisector().distance(m2.bisector()) < 1e-12);
    }

    #[test]
    fn near_right_angle_within_tolerance() {
        let b = DVec2::from_angle(91.0_f64.to_radians());
        assert!(three_point_mark(dvec2(1.0, 0.0), DVec2::ZERO, b).unwrap().is_right());
        let b = DVec2::from_angle(92.0_f64.to_radians());
        assert!(!three_point_mark(dvec2(1.0, 0.0), DVec2::ZERO, b).unwrap().is_right());
    }

    #[test]
    fn shortest_arc_is_signed() {
        let m = three_point_mark(dvec2(0.0, 1.0), DVec2::ZERO, dvec2(1.0, 0.0)).unwrap();
        assert!((m.sweep.to_degrees() + 90.0).abs() < 1e-9);
        assert!(three_point_mark(DVec2::ZERO, DVec2::ZERO, dvec2(1.0, 0.0)).is_none());
    }

    #[test]
    fn two_lines_take_the_smaller_angle() {
        // x axis and the line y = x through the origin
        let g = line("g", dvec2(-1.0, 0.0), dvec2(2.0, 0.0));
        let h = line("h", dvec2(-1.0, -1.0), dvec2(2.0, 2.0));
        let m = two_line_mark(&g, &h, None, AngleRegion::Auto).unwrap();
        assert!((m.sweep.to_degrees() - 45.0).abs() < 1e-9);
        // both rays follow the lines' point order
        assert!((m.start.to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn two_lines_follow_target_value() {
        let g = line("g", dvec2(-1.0, 0.0), dvec2(2.0, 0.0));
        let h = line("h", dvec2(-1.0, -1.0), dvec2(2.0, 2.0));
        let m = two_line_mark(&g, &h, Some(135f64.to_radians()), AngleRegion::Auto).unwrap();
        assert!((m.sweep.abs().to_degrees() - 135.0).abs() < 1e-9);
        // a reflex target picks the matching non-reflex arc
        let m = two_line_mark(&g, &h, Some(315f64.to_radians()), AngleRegion::Auto).unwrap();
        assert!((m.sweep.abs().to_degrees() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn region_breaks_ties() {
        // perpendicular lines: all four quadrants are 90°
        let g = line("g", dvec2(-1.0, 0.0), dvec2(1.0, 0.0));
        let h = line("h", dvec2(0.0, -1.0), dvec2(0.0, 1.0));
        let m = two_line_mark(&g, &h, None, AngleRegion::Below).unwrap();
        assert!(m.bisector().y < 0.0);
        let m = two_line_mark(&g, &h, None, AngleRegion::Auto).unwrap();
        assert!(m.bisector().x > 0.0 && m.bisector().y > 0.0);
    }

    #[test]
    fn parallel_lines_have_no_mark() {
        let g = line("g", dvec2(0.0, 0.0), dvec2(1.0, 0.0));
        let h = line("h", dvec2(0.0, 1.0), dvec2(1.0, 1.0));
        assert!(two_line_mark(&g, &h, None, AngleRegion::Auto).is_none());
    }
}
