//! Viewport computation.

use crate::log::debug;
use crate::model::Model;
use crate::options::Viewport;
use glam::{DVec2, dvec2};
use serde::Serialize;

/// Smallest extent an axis is allowed to have in smart mode
pub const MIN_SPAN: f64 = 1.0;
/// Minimum padding added on each side in smart mode
pub const MIN_PADDING: f64 = 0.8;
/// Padding as a share of the extent
pub const PADDING_RATIO: f64 = 0.2;

/// Axis-aligned drawing window in user units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn min(&self) -> DVec2 {
        dvec2(self.x_min, self.y_min)
    }

    pub fn max(&self) -> DVec2 {
        dvec2(self.x_max, self.y_max)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        (self.x_min..=self.x_max).contains(&p.x) && (self.y_min..=self.y_max).contains(&p.y)
    }

    /// Grow every side by `margin`
    pub fn expand(&self, margin: f64) -> Bounds {
        Bounds {
            x_min: self.x_min - margin,
            x_max: self.x_max + margin,
            y_min: self.y_min - margin,
            y_max: self.y_max + margin,
        }
    }
}

/// Resolve the drawing window for a model.
///
/// Without smart mode this is the configured window. With it, the window
/// hugs the visible points. Overrides are applied last in both cases.
pub fn compute_bounds(model: &Model, viewport: &Viewport) -> Bounds {
    let mut bounds = Bounds {
        x_min: viewport.x_min,
        x_max: viewport.x_max,
        y_min: viewport.y_min,
        y_max: viewport.y_max,
    };

    if viewport.smart {
        match fit_points(model.visible_points().map(|p| p.pos)) {
            Some(fitted) => bounds = fitted,
            None => {
                debug!("smart bounds: no visible points, keeping the defaults");
            }
        }
    }

    let o = &viewport.overrides;
    bounds.x_min = o.x_min.unwrap_or(bounds.x_min);
    bounds.x_max = o.x_max.unwrap_or(bounds.x_max);
    bounds.y_min = o.y_min.unwrap_or(bounds.y_min);
    bounds.y_max = o.y_max.unwrap_or(bounds.y_max);
    bounds
}

fn fit_points(points: impl Iterator<Item = DVec2>) -> Option<Bounds> {
    let mut lo = DVec2::splat(f64::INFINITY);
    let mut hi = DVec2::splat(f64::NEG_INFINITY);
    let mut any = false;
    for p in points.filter(|p| p.is_finite()) {
        lo = lo.min(p);
        hi = hi.max(p);
        any = true;
    }
    if !any {
        return None;
    }
    let (x_min, x_max) = pad_axis(lo.x, hi.x);
    let (y_min, y_max) = pad_axis(lo.y, hi.y);
    Some(Bounds { x_min, x_max, y_min, y_max })
}

fn pad_axis(lo: f64, hi: f64) -> (f64, f64) {
    let (lo, hi) = if hi - lo < MIN_SPAN {
        let mid = (lo + hi) / 2.0;
        (mid - MIN_SPAN / 2.0, mid + MIN_SPAN / 2.0)
    } else {
        (lo, hi)
    };
    let pad = MIN_PADDING.max((hi - lo) * PADDING_RATIO);
    (round2(lo - pad), round2(hi + pad))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Appearance, Point, Provenance};

    fn point(label: &str, x: f64, y: f64, visible: bool) -> Point {
        Point {
            label: label.to_string(),
            pos: dvec2(x, y),
            provenance: Provenance::Free,
            command: None,
            inputs: Vec::new(),
            look: Appearance { visible, label_visible: true, ..Default::default() },
        }
    }

    fn model(points: Vec<Point>) -> Model {
        let mut model = Model::default();
        for p in points {
            model.push_point(p);
        }
        model
    }

    #[test]
    fn defaults_without_smart_mode() {
        let m = model(vec![point("A", 40.0, 40.0, true)]);
        let b = compute_bounds(&m, &Viewport::default());
        assert_eq!(b, Bounds { x_min: -5.0, x_max: 5.0, y_min: -5.0, y_max: 5.0 });
    }

    #[test]
    fn smart_mode_pads_visible_points() {
        let m = model(vec![
            point("A", 0.0, 0.0, true),
            point("B", 10.0, 2.0, true),
            point("H", 100.0, 100.0, false),
        ]);
        let vp = Viewport { smart: true, ..Default::default() };
        let b = compute_bounds(&m, &vp);
        // x: extent 10, pad 2; y: extent 2, pad 0.8
        assert_eq!(b, Bounds { x_min: -2.0, x_max: 12.0, y_min: -0.8, y_max: 2.8 });
    }

    #[test]
    fn single_point_gets_min_span() {
        let m = model(vec![point("A", 1.0, 1.0, true)]);
        let vp = Viewport { smart: true, ..Default::default() };
        let b = compute_bounds(&m, &vp);
        assert_eq!(b, Bounds { x_min: -0.3, x_max: 2.3, y_min: -0.3, y_max: 2.3 });
    }

    #[test]
    fn overrides_win_and_empty_falls_back() {
        let mut vp = Viewport { smart: true, ..Default::default() };
        vp.overrides.y_max = Some(9.0);
        let b = compute_bounds(&model(Vec::new()), &vp);
        assert_eq!(b, Bounds { x_min: -5.0, x_max: 5.0, y_min: -5.0, y_max: 9.0 });
    }

    #[test]
    fn smart_bounds_are_idempotent() {
        let m = model(vec![point("A", 0.123, -3.3, true), point("B", 2.71, 1.0 / 3.0, true)]);
        let vp = Viewport { smart: true, ..Default::default() };
        let first = compute_bounds(&m, &vp);
        let second = compute_bounds(&m, &vp);
        assert_eq!(first.x_min.to_bits(), second.x_min.to_bits());
        assert_eq!(first.y_max.to_bits(), second.y_max.to_bits());
        assert_eq!(first, second);
    }
}
