//! Sampling curves into drawable runs

use crate::bounds::Bounds;
use glam::DVec2;

/// A parameter interval drawn as one plot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Run {
    pub start: f64,
    pub end: f64,
    /// Valid samples inside the run
    pub samples: usize,
}

/// Split `y = f(x)` over `domain` into continuous runs.
///
/// A sample is invalid when `f` has no value there or, with a `window`, when
/// the value falls outside it. A jump larger than `max_jump` between
/// neighbors ends the run. Runs narrower than `max(1.5·step, 1% of the
/// domain)` are dropped.
pub fn function_runs(
    f: impl Fn(f64) -> Option<f64>,
    domain: (f64, f64),
    samples: usize,
    window: Option<(f64, f64)>,
    max_jump: f64,
) -> Vec<Run> {
    let (lo, hi) = domain;
    let samples = samples.max(2);
    let step = (hi - lo) / (samples - 1) as f64;
    let min_width = (1.5 * step).max(0.01 * (hi - lo));

    let mut runs = Vec::new();
    let mut current: Option<Run> = None;
    let mut previous: Option<f64> = None;
    for i in 0..samples {
        let x = if i + 1 == samples { hi } else { lo + step * i as f64 };
        let y = f(x).filter(|y| window.is_none_or(|(w0, w1)| (w0..=w1).contains(y)));
        let continues = match (previous, y) {
            (Some(p), Some(y)) => (y - p).abs() <= max_jump,
            _ => false,
        };
        match current.as_mut() {
            Some(run) if continues => {
                run.end = x;
                run.samples += 1;
            }
            _ => {
                runs.extend(current.take());
                if y.is_some() {
                    current = Some(Run { start: x, end: x, samples: 1 });
                }
            }
        }
        previous = y;
    }
    runs.extend(current);
    runs.retain(|r| r.end - r.start >= min_width);
    runs
}

/// Parameter intervals of `f` over `range` that lie inside `bounds`,
/// each widened by one step so the curve reaches the edge.
pub fn visible_runs(
    f: impl Fn(f64) -> DVec2,
    range: (f64, f64),
    samples: usize,
    bounds: &Bounds,
) -> Vec<(f64, f64)> {
    let (lo, hi) = range;
    let samples = samples.max(2);
    let step = (hi - lo) / (samples - 1) as f64;
    let mut runs = Vec::new();
    let mut start: Option<f64> = None;
    let mut last = lo;
    for i in 0..samples {
        let t = lo + step * i as f64;
        let p = f(t);
        let inside = p.is_finite() && bounds.contains(p);
        match (inside, start) {
            (true, None) => start = Some((t - step).max(lo)),
            (false, Some(s)) => {
                runs.push((s, t));
                start = None;
            }
            _ => {}
        }
        last = t;
    }
    if let Some(s) = start {
        runs.push((s, last));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn reciprocal_splits_at_the_pole() {
        let f = |x: f64| {
            let y = 1.0 / x;
            y.is_finite().then_some(y)
        };
        let runs = function_runs(f, (-5.0, 5.0), 240, Some((-10.0, 10.0)), 20.0);
        assert!(runs.len() >= 2, "{runs:?}");
        assert!(runs.iter().all(|r| r.end < 0.0 || r.start > 0.0), "{runs:?}");
    }

    #[test]
    fn jump_splits_without_window() {
        let f = |x: f64| Some(if x < 0.0 { -100.0 } else { 100.0 });
        let runs = function_runs(f, (-1.0, 1.0), 101, None, 10.0);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].end, 1.0);
    }

    #[test]
    fn short_runs_are_dropped() {
        // valid only on a sliver around 0
        let f = |x: f64| (x.abs() < 0.01).then_some(0.0);
        assert!(function_runs(f, (-5.0, 5.0), 240, None, 1.0).is_empty());
    }

    #[test]
    fn continuous_function_is_one_run() {
        let runs = function_runs(|x| Some(x * x), (-2.0, 2.0), 240, None, 20.0);
        assert_eq!(runs, vec![Run { start: -2.0, end: 2.0, samples: 240 }]);
    }

    #[test]
    fn visible_part_of_a_curve() {
        let bounds = Bounds { x_min: -1.0, x_max: 1.0, y_min: -1.0, y_max: 1.0 };
        let runs = visible_runs(|t| dvec2(t, 0.0), (-4.0, 4.0), 81, &bounds);
        assert_eq!(runs.len(), 1);
        let (s, e) = runs[0];
        assert!(s < -0.95 && s >= -1.2 && e > 0.95 && e <= 1.2, "{runs:?}");
    }
}
