//! Point label placement.
//!
//! Each label tries eight compass directions around its point and keeps the
//! cheapest one. Labels are placed in document order, so earlier labels win
//! contested spots. All lengths here are TeX points.

use glam::{DVec2, dvec2};
use std::f64::consts::FRAC_1_SQRT_2;

/// Cost per pt² of overlap with an already placed label
pub const OVERLAP_WEIGHT: f64 = 1000.0;
/// Cost per pt a foreign point intrudes into the clearance radius
pub const PROXIMITY_WEIGHT: f64 = 10.0;
/// Reward for pointing away from the centroid of all labeled points
pub const CENTROID_WEIGHT: f64 = 1.0;
/// Extra clearance around a label box, on top of the offset
pub const CLEARANCE: f64 = 4.0;
/// Offset growth factor when every direction still overlaps
pub const GROWTH: f64 = 1.5;

/// Compass direction of a label relative to its point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassPoint {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

/// Candidate order; ties go to the earlier entry
pub const CANDIDATES: [CompassPoint; 8] = [
    CompassPoint::NorthEast,
    CompassPoint::NorthWest,
    CompassPoint::SouthEast,
    CompassPoint::SouthWest,
    CompassPoint::North,
    CompassPoint::South,
    CompassPoint::East,
    CompassPoint::West,
];

impl CompassPoint {
    /// Sector of a direction vector, y up.
    ///
    /// 2.414 ≈ tan(67.5°) and 0.414 ≈ tan(22.5°) split the circle into
    /// eight 45° sectors.
    pub fn from_direction(dir: DVec2) -> Self {
        let (dx, dy) = (dir.x, dir.y);
        if dx > 0.0 {
            if dy >= 2.414 * dx {
                CompassPoint::North
            } else if dy > 0.414 * dx {
                CompassPoint::NorthEast
            } else if dy > -0.414 * dx {
                CompassPoint::East
            } else if dy > -2.414 * dx {
                CompassPoint::SouthEast
            } else {
                CompassPoint::South
            }
        } else if dx < 0.0 {
            if dy >= -2.414 * dx {
                CompassPoint::North
            } else if dy > -0.414 * dx {
                CompassPoint::NorthWest
            } else if dy > 0.414 * dx {
                CompassPoint::West
            } else if dy > 2.414 * dx {
                CompassPoint::SouthWest
            } else {
                CompassPoint::South
            }
        } else if dy >= 0.0 {
            CompassPoint::North
        } else {
            CompassPoint::South
        }
    }

    /// Per-axis sign of the shift, as TikZ applies `above right=d`
    pub fn step(self) -> DVec2 {
        match self {
            CompassPoint::North => dvec2(0.0, 1.0),
            CompassPoint::NorthEast => dvec2(1.0, 1.0),
            CompassPoint::East => dvec2(1.0, 0.0),
            CompassPoint::SouthEast => dvec2(1.0, -1.0),
            CompassPoint::South => dvec2(0.0, -1.0),
            CompassPoint::SouthWest => dvec2(-1.0, -1.0),
            CompassPoint::West => dvec2(-1.0, 0.0),
            CompassPoint::NorthWest => dvec2(-1.0, 1.0),
        }
    }

    pub fn unit(self) -> DVec2 {
        let s = self.step();
        if s.x != 0.0 && s.y != 0.0 { s * FRAC_1_SQRT_2 } else { s }
    }

    /// TikZ positioning keyword
    pub fn tikz(self) -> &'static str {
        match self {
            CompassPoint::North => "above",
            CompassPoint::NorthEast => "above right",
            CompassPoint::East => "right",
            CompassPoint::SouthEast => "below right",
            CompassPoint::South => "below",
            CompassPoint::SouthWest => "below left",
            CompassPoint::West => "left",
            CompassPoint::NorthWest => "above left",
        }
    }
}

/// A label to place: the point it belongs to and its box size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSpec {
    pub at: DVec2,
    pub size: DVec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub direction: CompassPoint,
    pub offset: f64,
}

impl Placement {
    /// `above right=4pt`
    pub fn tikz(&self) -> String {
        format!("{}={}pt", self.direction.tikz(), crate::types::Num(self.offset))
    }
}

/// Rough box of a math-mode label set at `font_size`
pub fn estimate_size(text: &str, font_size: f64) -> DVec2 {
    let glyphs = text.chars().filter(|c| !matches!(c, '\\' | '{' | '}' | '_' | '^' | '$')).count();
    dvec2(0.6 * font_size * glyphs.max(1) as f64, font_size)
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    min: DVec2,
    max: DVec2,
}

impl Rect {
    fn around(center: DVec2, size: DVec2) -> Rect {
        Rect { min: center - size / 2.0, max: center + size / 2.0 }
    }

    fn overlap(&self, other: &Rect) -> f64 {
        let lo = self.min.max(other.min);
        let hi = self.max.min(other.max);
        let d = (hi - lo).max(DVec2::ZERO);
        d.x * d.y
    }

    fn distance_to(&self, p: DVec2) -> f64 {
        let clamped = p.clamp(self.min, self.max);
        clamped.distance(p)
    }
}

fn label_box(spec: &LabelSpec, direction: CompassPoint, offset: f64) -> Rect {
    let step = direction.step();
    let center = spec.at + step * (DVec2::splat(offset) + spec.size / 2.0);
    Rect::around(center, spec.size)
}

/// Direction and offset for every label, in input order.
///
/// `obstacles` are the positions of all drawn points, labeled or not.
pub fn place_labels(
    labels: &[LabelSpec],
    obstacles: &[DVec2],
    offset: f64,
    max_shift: f64,
) -> Vec<Placement> {
    let centroid = if labels.is_empty() {
        DVec2::ZERO
    } else {
        labels.iter().map(|l| l.at).sum::<DVec2>() / labels.len() as f64
    };

    let mut placed: Vec<Rect> = Vec::with_capacity(labels.len());
    let mut out = Vec::with_capacity(labels.len());
    for spec in labels {
        let away = (spec.at - centroid).try_normalize();
        let mut current = offset;
        let (placement, rect) = loop {
            let (best, rect, overlap) = best_direction(spec, current, away, &placed, obstacles);
            if overlap <= 0.0 || current * GROWTH > max_shift {
                break (Placement { direction: best, offset: current }, rect);
            }
            current *= GROWTH;
        };
        placed.push(rect);
        out.push(placement);
    }
    out
}

fn best_direction(
    spec: &LabelSpec,
    offset: f64,
    away: Option<DVec2>,
    placed: &[Rect],
    obstacles: &[DVec2],
) -> (CompassPoint, Rect, f64) {
    let clearance = offset + CLEARANCE;
    let mut best: Option<(f64, CompassPoint, Rect, f64)> = None;
    for direction in CANDIDATES {
        let rect = label_box(spec, direction, offset);
        let overlap: f64 = placed.iter().map(|r| rect.overlap(r)).sum();
        let crowding: f64 = obstacles
            .iter()
            .filter(|q| q.distance(spec.at) > 1e-9)
            .map(|q| (clearance - rect.distance_to(*q)).max(0.0))
            .sum();
        let bias = away.map_or(0.0, |a| direction.unit().dot(a));
        let score = OVERLAP_WEIGHT * overlap + PROXIMITY_WEIGHT * crowding - CENTROID_WEIGHT * bias;
        if best.as_ref().is_none_or(|(s, ..)| score < *s) {
            best = Some((score, direction, rect, overlap));
        }
    }
    match best {
        Some((_, direction, rect, overlap)) => (direction, rect, overlap),
        None => (CompassPoint::NorthEast, label_box(spec, CompassPoint::NorthEast, offset), 0.0),
    }
}
