//! Canonical conic parameters from builder commands.

use super::Method;
use crate::solve::{self, ConicShape, LineCoeffs, MainAxis, ParabolaForm, heading, tol};
use glam::DVec2;

/// Resolved inputs of a conic command
pub(super) enum ConicInput {
    Point(DVec2),
    Number(f64),
    Line(LineCoeffs),
}

pub(super) fn circle(inputs: &[ConicInput]) -> Option<(ConicShape, Method)> {
    match inputs {
        [ConicInput::Point(center), ConicInput::Number(r)] if *r > 0.0 => {
            Some((ConicShape::Circle { center: *center, radius: *r }, Method::CenterRadius))
        }
        [ConicInput::Point(center), ConicInput::Point(p)] => {
            let radius = center.distance(*p);
            (radius > tol::POINT_COINCIDENCE)
                .then_some((ConicShape::Circle { center: *center, radius }, Method::CenterPoint))
        }
        [ConicInput::Point(a), ConicInput::Point(b), ConicInput::Point(c)] => {
            let center = solve::circumcenter(*a, *b, *c)?;
            let radius = center.distance(*a);
            Some((ConicShape::Circle { center, radius }, Method::ThreePoints))
        }
        _ => None,
    }
}

/// Semi-axis from `Ellipse(F1, F2, a)` or `Ellipse(F1, F2, P)`
pub(super) fn ellipse(inputs: &[ConicInput]) -> Option<(ConicShape, Method)> {
    let (f1, f2, a, method) = foci_and_axis(inputs, |d1, d2| (d1 + d2) / 2.0)?;
    let c = f1.distance(f2) / 2.0;
    let b2 = a * a - c * c;
    if a <= 0.0 || b2 <= 0.0 {
        return None;
    }
    let center = (f1 + f2) / 2.0;
    let angle = if c > tol::POINT_COINCIDENCE { heading(f2 - f1) } else { 0.0 };
    Some((ConicShape::ellipse(center, a, b2.sqrt(), angle), method))
}

pub(super) fn hyperbola(inputs: &[ConicInput]) -> Option<(ConicShape, Method)> {
    let (f1, f2, a, method) = foci_and_axis(inputs, |d1, d2| (d1 - d2).abs() / 2.0)?;
    let c = f1.distance(f2) / 2.0;
    let b2 = c * c - a * a;
    if a <= 0.0 || b2 <= 0.0 {
        return None;
    }
    let center = (f1 + f2) / 2.0;
    let shape = ConicShape::hyperbola(center, a, b2.sqrt(), heading(f2 - f1), MainAxis::U);
    Some((shape, method))
}

fn foci_and_axis(
    inputs: &[ConicInput],
    from_point: impl Fn(f64, f64) -> f64,
) -> Option<(DVec2, DVec2, f64, Method)> {
    match inputs {
        [ConicInput::Point(f1), ConicInput::Point(f2), ConicInput::Number(a)] => {
            Some((*f1, *f2, *a, Method::FociAxis))
        }
        [ConicInput::Point(f1), ConicInput::Point(f2), ConicInput::Point(p)] => {
            let a = from_point(p.distance(*f1), p.distance(*f2));
            Some((*f1, *f2, a, Method::FociPoint))
        }
        _ => None,
    }
}

/// `Parabola(F, d)`: vertex halfway between the focus and the directrix
pub(super) fn parabola(inputs: &[ConicInput]) -> Option<(ConicShape, Method)> {
    let [ConicInput::Point(focus), ConicInput::Line(directrix)] = inputs else {
        return None;
    };
    let foot = solve::project_onto_line(*focus, directrix)?;
    let distance = focus.distance(foot);
    if distance < tol::POINT_COINCIDENCE {
        return None;
    }
    let axis = (*focus - foot) / distance;
    let form = if axis.y.abs() >= axis.x.abs() { ParabolaForm::YOfX } else { ParabolaForm::XOfY };
    let shape = ConicShape::Parabola {
        vertex: (*focus + foot) / 2.0,
        axis,
        focal: distance / 2.0,
        form,
    };
    Some((shape, Method::FocusDirectrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn circle_variants() {
        let (shape, method) =
            circle(&[ConicInput::Point(dvec2(0.0, 0.0)), ConicInput::Number(2.0)]).unwrap();
        assert_eq!(shape, ConicShape::Circle { center: dvec2(0.0, 0.0), radius: 2.0 });
        assert_eq!(method, Method::CenterRadius);

        let through = [ConicInput::Point(dvec2(1.0, 1.0)), ConicInput::Point(dvec2(4.0, 5.0))];
        let (_, method) = circle(&through).unwrap();
        assert_eq!(method, Method::CenterPoint);

        assert!(circle(&[ConicInput::Point(dvec2(0.0, 0.0)), ConicInput::Number(-1.0)]).is_none());
    }

    #[test]
    fn ellipse_from_foci() {
        let inputs = [
            ConicInput::Point(dvec2(-3.0, 0.0)),
            ConicInput::Point(dvec2(3.0, 0.0)),
            ConicInput::Number(5.0),
        ];
        let (shape, _) = ellipse(&inputs).unwrap();
        let ConicShape::Ellipse { rx, ry, angle, .. } = shape else {
            panic!("expected an ellipse, got {shape:?}");
        };
        assert!((rx - 5.0).abs() < 1e-12 && (ry - 4.0).abs() < 1e-12 && angle == 0.0);

        // semi-axis shorter than the focal distance
        let bad = [
            ConicInput::Point(dvec2(-3.0, 0.0)),
            ConicInput::Point(dvec2(3.0, 0.0)),
            ConicInput::Number(2.0),
        ];
        assert!(ellipse(&bad).is_none());
    }

    #[test]
    fn hyperbola_through_point() {
        let inputs = [
            ConicInput::Point(dvec2(0.0, -5.0)),
            ConicInput::Point(dvec2(0.0, 5.0)),
            ConicInput::Point(dvec2(0.0, 3.0)),
        ];
        let (shape, method) = hyperbola(&inputs).unwrap();
        assert_eq!(method, Method::FociPoint);
        let ConicShape::Hyperbola { a, b, main_axis, angle, .. } = shape else {
            panic!("expected a hyperbola");
        };
        assert!((a - 3.0).abs() < 1e-12 && (b - 4.0).abs() < 1e-12);
        assert_eq!((main_axis, angle), (MainAxis::V, 0.0));
    }

    #[test]
    fn parabola_from_focus_and_directrix() {
        // focus (0, 1), directrix y = -1: y = x²/4
        let inputs = [
            ConicInput::Point(dvec2(0.0, 1.0)),
            ConicInput::Line(LineCoeffs::new(0.0, 1.0, 1.0)),
        ];
        let (shape, _) = parabola(&inputs).unwrap();
        let ConicShape::Parabola { vertex, axis, focal, form } = shape else {
            panic!("expected a parabola");
        };
        assert_eq!(
            (vertex, axis, focal, form),
            (dvec2(0.0, 0.0), dvec2(0.0, 1.0), 1.0, ParabolaForm::YOfX)
        );
    }
}
