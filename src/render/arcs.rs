//! Semicircles, arcs and sectors

use crate::log::warn;
use crate::model::{ConicPart, ConicPartKind};
use crate::solve::{self, heading, tol};
use crate::types::{Coord, Num};
use glam::DVec2;
use std::f64::consts::TAU;

use super::context::RenderContext;
use super::style::{Category, bracket, stroke};

/// Circle and angular sweep of a conic part, angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: DVec2,
    pub radius: f64,
    pub start: f64,
    pub end: f64,
}

pub fn render_conic_parts(ctx: &mut RenderContext<'_>) {
    let model = ctx.model;
    let mut first = true;
    for part in model.conic_parts.iter().filter(|p| p.look.visible) {
        if first {
            ctx.comment("conic parts");
            first = false;
        }
        let Some(arc) = arc_geometry(part) else {
            warn!(label = %part.label, "degenerate arc");
            ctx.comment(format!("{}: degenerate {:?}", part.label, part.kind));
            continue;
        };
        let options = bracket(&stroke(ctx.options, Category::ConicPart, &part.look.style));
        let start = match part.points.get(match part.kind {
            ConicPartKind::CircleArc | ConicPartKind::CircleSector => 1,
            _ => 0,
        }) {
            Some(p) => ctx.at(p),
            None => ctx.literal(arc.center + DVec2::from_angle(arc.start) * arc.radius),
        };
        let sweep = format!(
            "arc[start angle={}, end angle={}, radius={}]",
            Num(arc.start.to_degrees()),
            Num(arc.end.to_degrees()),
            Num(arc.radius)
        );
        if part.kind.is_sector() {
            let center = match (part.kind, part.points.first()) {
                (ConicPartKind::CircleSector, Some(m)) => ctx.at(m),
                _ => Coord(arc.center).to_string(),
            };
            ctx.emit(format!("\\draw{options} {center} -- {start} {sweep} -- cycle;"));
        } else {
            ctx.emit(format!("\\draw{options} {start} {sweep};"));
        }
    }
}

/// Where the arc sits and which way it turns.
///
/// Semicircles and center arcs run counterclockwise from their first point.
/// Circumcircle arcs start at the first point and turn whichever way passes
/// through the middle one.
pub fn arc_geometry(part: &ConicPart) -> Option<ArcGeometry> {
    let pts: Vec<DVec2> = part.points.iter().map(|p| p.pos()).collect();
    match (part.kind, pts.as_slice()) {
        (ConicPartKind::Semicircle, [a, b]) => {
            let center = (*a + *b) / 2.0;
            let radius = center.distance(*a);
            if radius < tol::POINT_COINCIDENCE {
                return None;
            }
            let start = heading(*a - center);
            Some(ArcGeometry { center, radius, start, end: start + std::f64::consts::PI })
        }
        (ConicPartKind::CircleArc | ConicPartKind::CircleSector, [m, a, b]) => {
            let radius = m.distance(*a);
            if radius < tol::POINT_COINCIDENCE || m.distance(*b) < tol::POINT_COINCIDENCE {
                return None;
            }
            let start = heading(*a - *m);
            let end = ccw_after(start, heading(*b - *m));
            Some(ArcGeometry { center: *m, radius, start, end })
        }
        (ConicPartKind::CircumcircleArc | ConicPartKind::CircumcircleSector, [a, b, c]) => {
            let center = solve::circumcenter(*a, *b, *c)?;
            let radius = center.distance(*a);
            let start = heading(*a - center);
            let via = ccw_after(start, heading(*b - center));
            let end_ccw = ccw_after(start, heading(*c - center));
            let end = if via < end_ccw { end_ccw } else { end_ccw - TAU };
            Some(ArcGeometry { center, radius, start, end })
        }
        _ => None,
    }
}

/// `angle` moved by full turns into `(start, start + 2π]`
fn ccw_after(start: f64, angle: f64) -> f64 {
    let mut a = angle;
    while a <= start {
        a += TAU;
    }
    while a > start + TAU {
        a -= TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Appearance, PointRef};
    use glam::dvec2;

    fn part(kind: ConicPartKind, points: &[(f64, f64)]) -> ConicPart {
        ConicPart {
            label: "c".into(),
            kind,
            points: points.iter().map(|&(x, y)| PointRef::Literal(dvec2(x, y))).collect(),
            look: Appearance::default(),
        }
    }

    fn deg(arc: &ArcGeometry) -> (f64, f64) {
        (arc.start.to_degrees().round(), arc.end.to_degrees().round())
    }

    #[test]
    fn semicircle_turns_left() {
        let semicircle = part(ConicPartKind::Semicircle, &[(1.0, 0.0), (-1.0, 0.0)]);
        let arc = arc_geometry(&semicircle).unwrap();
        assert_eq!(arc.center, dvec2(0.0, 0.0));
        assert_eq!(deg(&arc), (0.0, 180.0));
    }

    #[test]
    fn center_arc_wraps_past_full_turn() {
        // from 90° counterclockwise to 0°
        let arc = part(ConicPartKind::CircleArc, &[(0.0, 0.0), (0.0, 2.0), (2.0, 0.0)]);
        let arc = arc_geometry(&arc).unwrap();
        assert_eq!(deg(&arc), (90.0, 360.0));
        assert_eq!(arc.radius, 2.0);
    }

    #[test]
    fn circumcircle_arc_passes_through_middle_point() {
        // A=(1,0), B=(0,1), C=(-1,0): counterclockwise through the top
        let upper = part(ConicPartKind::CircumcircleArc, &[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0)]);
        let arc = arc_geometry(&upper).unwrap();
        assert_eq!(deg(&arc), (0.0, 180.0));
        // B below the chord: clockwise through the bottom
        let lower = part(ConicPartKind::CircumcircleArc, &[(1.0, 0.0), (0.0, -1.0), (-1.0, 0.0)]);
        let arc = arc_geometry(&lower).unwrap();
        assert_eq!(deg(&arc), (0.0, -180.0));
    }

    #[test]
    fn collinear_circumcircle_is_degenerate() {
        let flat = part(ConicPartKind::CircumcircleSector, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert!(arc_geometry(&flat).is_none());
    }
}
