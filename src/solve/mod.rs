//! Closed-form geometric solvers.
//!
//! Every routine returns `None` on a degenerate configuration instead of
//! letting a NaN or an infinity escape into the output.

pub mod tol;

use crate::expr::eval::Poly2;
use glam::{DVec2, dvec2};
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI};

// ============================================================================
// Lines in general form
// ============================================================================

/// `a·x + b·y + c = 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineCoeffs {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl LineCoeffs {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        LineCoeffs { a, b, c }
    }

    /// Line through two distinct points
    pub fn through(p: DVec2, q: DVec2) -> Option<Self> {
        if p.distance(q) < tol::POINT_COINCIDENCE {
            return None;
        }
        let a = q.y - p.y;
        let b = p.x - q.x;
        Some(LineCoeffs { a, b, c: -(a * p.x + b * p.y) })
    }

    pub fn is_degenerate(&self) -> bool {
        self.a.abs().max(self.b.abs()) < tol::COEFFICIENT
    }

    pub fn eval(&self, p: DVec2) -> f64 {
        self.a * p.x + self.b * p.y + self.c
    }

    pub fn distance(&self, p: DVec2) -> f64 {
        self.eval(p).abs() / dvec2(self.a, self.b).length()
    }

    /// Unit direction along the line
    pub fn direction(&self) -> Option<DVec2> {
        dvec2(-self.b, self.a).try_normalize()
    }

    /// Two points on the line, solved against the larger coefficient.
    pub fn two_points(&self) -> Option<(DVec2, DVec2)> {
        if self.is_degenerate() {
            return None;
        }
        if self.b.abs() >= self.a.abs() {
            let y = |x: f64| -(self.a * x + self.c) / self.b;
            Some((dvec2(0.0, y(0.0)), dvec2(1.0, y(1.0))))
        } else {
            let x = |y: f64| -(self.b * y + self.c) / self.a;
            Some((dvec2(x(0.0), 0.0), dvec2(x(1.0), 1.0)))
        }
    }
}

/// Intersection of two lines by Cramer's rule
pub fn intersect_lines(l1: &LineCoeffs, l2: &LineCoeffs) -> Option<DVec2> {
    let det = l1.a * l2.b - l2.a * l1.b;
    if det.abs() < tol::DETERMINANT {
        return None;
    }
    let x = (l1.b * l2.c - l2.b * l1.c) / det;
    let y = (l2.a * l1.c - l1.a * l2.c) / det;
    Some(dvec2(x, y))
}

/// Foot of the perpendicular from `p`
pub fn project_onto_line(p: DVec2, line: &LineCoeffs) -> Option<DVec2> {
    let n = dvec2(line.a, line.b);
    let nn = n.length_squared();
    if nn < tol::COEFFICIENT {
        return None;
    }
    Some(p - n * (line.eval(p) / nn))
}

/// Center of the circle through three points
pub fn circumcenter(a: DVec2, b: DVec2, c: DVec2) -> Option<DVec2> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < tol::DETERMINANT {
        return None;
    }
    let (a2, b2, c2) = (a.length_squared(), b.length_squared(), c.length_squared());
    let x = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let y = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = dvec2(x, y);
    center.is_finite().then_some(center)
}

// ============================================================================
// Conics
// ============================================================================

/// `A·x² + B·xy + C·y² + D·x + E·y + F = 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadraticForm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl QuadraticForm {
    /// From the symmetric matrix entries `A0..A5` stored with a conic
    pub fn from_matrix(m: [f64; 6]) -> Self {
        QuadraticForm {
            a: m[0],
            c: m[1],
            f: m[2],
            b: 2.0 * m[3],
            d: 2.0 * m[4],
            e: 2.0 * m[5],
        }
    }

    pub fn from_circle(center: DVec2, radius: f64) -> Self {
        QuadraticForm {
            a: 1.0,
            b: 0.0,
            c: 1.0,
            d: -2.0 * center.x,
            e: -2.0 * center.y,
            f: center.length_squared() - radius * radius,
        }
    }

    pub fn from_poly(p: &Poly2) -> Self {
        QuadraticForm { a: p.xx, b: p.xy, c: p.yy, d: p.x, e: p.y, f: p.c }
    }

    pub fn eval(&self, p: DVec2) -> f64 {
        self.a * p.x * p.x
            + self.b * p.x * p.y
            + self.c * p.y * p.y
            + self.d * p.x
            + self.e * p.y
            + self.f
    }

    fn scaled(&self, k: f64) -> Self {
        QuadraticForm {
            a: self.a * k,
            b: self.b * k,
            c: self.c * k,
            d: self.d * k,
            e: self.e * k,
            f: self.f * k,
        }
    }
}

/// Which rotated axis carries the transverse axis of a hyperbola
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MainAxis {
    U,
    V,
}

/// Which rotated coordinate a parabola is a function of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParabolaForm {
    /// `u = k·v² + ...`
    XOfY,
    /// `v = k·u² + ...`
    YOfX,
}

/// Canonical conic. Angles are radians, counterclockwise from +x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ConicShape {
    Circle {
        center: DVec2,
        radius: f64,
    },
    Ellipse {
        center: DVec2,
        rx: f64,
        ry: f64,
        angle: f64,
    },
    Parabola {
        vertex: DVec2,
        /// Unit vector the parabola opens toward
        axis: DVec2,
        /// Focal distance `p`, so the curve is `V + t·T + t²/(4p)·N`
        focal: f64,
        form: ParabolaForm,
    },
    Hyperbola {
        center: DVec2,
        a: f64,
        b: f64,
        angle: f64,
        main_axis: MainAxis,
    },
}

impl ConicShape {
    /// Ellipse with semi-axis `rx` along `angle`, normalized: a circle when
    /// the axes coincide, `rx` major unless the ellipse is axis-aligned,
    /// and `angle` in `(-π/2, π/2]`.
    pub fn ellipse(center: DVec2, rx: f64, ry: f64, angle: f64) -> ConicShape {
        let (mut rx, mut ry, mut angle) = (rx, ry, angle);
        if (rx - ry).abs() < tol::POINT_COINCIDENCE * rx.max(ry).max(1.0) {
            return ConicShape::Circle { center, radius: rx };
        }
        if rx < ry {
            std::mem::swap(&mut rx, &mut ry);
            angle += FRAC_PI_2;
        }
        angle = half_turn_range(angle);
        if (angle - FRAC_PI_2).abs() < 1e-9 {
            std::mem::swap(&mut rx, &mut ry);
            angle = 0.0;
        }
        if angle.abs() < 1e-12 {
            angle = 0.0;
        }
        ConicShape::Ellipse { center, rx, ry, angle }
    }

    /// Hyperbola with transverse semi-axis `a`, `angle` folded into `(-π/2, π/2)`
    pub fn hyperbola(center: DVec2, a: f64, b: f64, angle: f64, main_axis: MainAxis) -> ConicShape {
        let (mut angle, mut main_axis) = (half_turn_range(angle), main_axis);
        if (angle - FRAC_PI_2).abs() < 1e-9 {
            angle = 0.0;
            main_axis = match main_axis {
                MainAxis::U => MainAxis::V,
                MainAxis::V => MainAxis::U,
            };
        }
        if angle.abs() < 1e-12 {
            angle = 0.0;
        }
        ConicShape::Hyperbola { center, a, b, angle, main_axis }
    }

    /// Unit vectors `(transverse, conjugate)` of a hyperbola
    pub fn hyperbola_axes(angle: f64, main_axis: MainAxis) -> (DVec2, DVec2) {
        let (s, c) = angle.sin_cos();
        let (u, v) = (dvec2(c, s), dvec2(-s, c));
        match main_axis {
            MainAxis::U => (u, v),
            MainAxis::V => (v, -u),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ConicShape::Circle { .. } => "circle",
            ConicShape::Ellipse { .. } => "ellipse",
            ConicShape::Parabola { .. } => "parabola",
            ConicShape::Hyperbola { .. } => "hyperbola",
        }
    }

    pub fn center(&self) -> DVec2 {
        match *self {
            ConicShape::Circle { center, .. }
            | ConicShape::Ellipse { center, .. }
            | ConicShape::Hyperbola { center, .. } => center,
            ConicShape::Parabola { vertex, .. } => vertex,
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            ConicShape::Circle { center, radius } => center.is_finite() && radius.is_finite(),
            ConicShape::Ellipse { center, rx, ry, angle } => {
                center.is_finite() && rx.is_finite() && ry.is_finite() && angle.is_finite()
            }
            ConicShape::Parabola { vertex, axis, focal, .. } => {
                vertex.is_finite() && axis.is_finite() && focal.is_finite()
            }
            ConicShape::Hyperbola { center, a, b, angle, .. } => {
                center.is_finite() && a.is_finite() && b.is_finite() && angle.is_finite()
            }
        }
    }

    /// Quadratic form of this shape, up to scale
    pub fn to_quadratic(&self) -> QuadraticForm {
        match *self {
            ConicShape::Circle { center, radius } => QuadraticForm::from_circle(center, radius),
            ConicShape::Ellipse { center, rx, ry, angle } => {
                rotated_central(center, angle, 1.0 / (rx * rx), 1.0 / (ry * ry), -1.0)
            }
            ConicShape::Hyperbola { center, a, b, angle, main_axis } => {
                let (ku, kv) = match main_axis {
                    MainAxis::U => (1.0 / (a * a), -1.0 / (b * b)),
                    MainAxis::V => (-1.0 / (b * b), 1.0 / (a * a)),
                };
                rotated_central(center, angle, ku, kv, -1.0)
            }
            ConicShape::Parabola { vertex, axis, focal, .. } => {
                // (w·T)² = 4p·(w·N) with w = p - V
                let t = dvec2(-axis.y, axis.x);
                let (tx, ty, nx, ny) = (t.x, t.y, axis.x, axis.y);
                let k = 4.0 * focal;
                let a = tx * tx;
                let b = 2.0 * tx * ty;
                let c = ty * ty;
                let (vx, vy) = (vertex.x, vertex.y);
                let d = -2.0 * a * vx - b * vy - k * nx;
                let e = -b * vx - 2.0 * c * vy - k * ny;
                let f = a * vx * vx + b * vx * vy + c * vy * vy + k * (nx * vx + ny * vy);
                QuadraticForm { a, b, c, d, e, f }
            }
        }
    }
}

/// `ku·u² + kv·v² + f = 0` in the frame rotated by `angle` around `center`
fn rotated_central(center: DVec2, angle: f64, ku: f64, kv: f64, f: f64) -> QuadraticForm {
    let (s, c) = angle.sin_cos();
    let a = ku * c * c + kv * s * s;
    let b = 2.0 * (ku - kv) * s * c;
    let cc = ku * s * s + kv * c * c;
    let (x0, y0) = (center.x, center.y);
    QuadraticForm {
        a,
        b,
        c: cc,
        d: -2.0 * a * x0 - b * y0,
        e: -b * x0 - 2.0 * cc * y0,
        f: a * x0 * x0 + b * x0 * y0 + cc * y0 * y0 + f,
    }
}

/// Decompose a general quadratic form into a canonical shape.
pub fn decompose_conic(q: &QuadraticForm) -> Option<ConicShape> {
    let scale = q.a.abs().max(q.b.abs()).max(q.c.abs());
    if !scale.is_finite() || scale < tol::COEFFICIENT {
        return None;
    }
    let q = q.scaled(1.0 / scale);

    let theta = if q.b.abs() < tol::COEFFICIENT { 0.0 } else { 0.5 * q.b.atan2(q.a - q.c) };
    let (s, c) = theta.sin_cos();
    let a_rot = q.a * c * c + q.b * s * c + q.c * s * s;
    let c_rot = q.a * s * s - q.b * s * c + q.c * c * c;
    let d_rot = q.d * c + q.e * s;
    let e_rot = -q.d * s + q.e * c;
    let u_axis = dvec2(c, s);
    let v_axis = dvec2(-s, c);

    let discriminant = q.b * q.b - 4.0 * q.a * q.c;
    let shape = if discriminant.abs() < tol::CONIC_DISCRIMINANT {
        decompose_parabola(a_rot, c_rot, d_rot, e_rot, q.f, u_axis, v_axis)?
    } else {
        let det = 4.0 * q.a * q.c - q.b * q.b;
        if det.abs() < tol::DETERMINANT {
            return None;
        }
        let x0 = (-2.0 * q.c * q.d + q.b * q.e) / det;
        let y0 = (q.b * q.d - 2.0 * q.a * q.e) / det;
        let center = dvec2(x0, y0);
        let f0 = q.f + (q.d * x0 + q.e * y0) / 2.0;
        if discriminant < 0.0 {
            decompose_ellipse(center, theta, a_rot, c_rot, f0)?
        } else {
            decompose_hyperbola(center, theta, a_rot, c_rot, f0)?
        }
    };
    shape.is_finite().then_some(shape)
}

fn decompose_ellipse(
    center: DVec2,
    theta: f64,
    a_rot: f64,
    c_rot: f64,
    f0: f64,
) -> Option<ConicShape> {
    if a_rot.abs() < tol::COEFFICIENT || c_rot.abs() < tol::COEFFICIENT {
        return None;
    }
    let rx2 = -f0 / a_rot;
    let ry2 = -f0 / c_rot;
    if rx2 <= 0.0 || ry2 <= 0.0 {
        // imaginary ellipse or a single point
        return None;
    }
    Some(ConicShape::ellipse(center, rx2.sqrt(), ry2.sqrt(), theta))
}

fn decompose_hyperbola(
    center: DVec2,
    theta: f64,
    a_rot: f64,
    c_rot: f64,
    f0: f64,
) -> Option<ConicShape> {
    if [f0, a_rot, c_rot].iter().any(|v| v.abs() < tol::COEFFICIENT) {
        // pair of crossing lines
        return None;
    }
    let along_u = -f0 / a_rot;
    let (a2, b2, main_axis) = if along_u > 0.0 {
        (along_u, f0 / c_rot, MainAxis::U)
    } else {
        (-f0 / c_rot, f0 / a_rot, MainAxis::V)
    };
    if a2 <= 0.0 || b2 <= 0.0 {
        return None;
    }
    Some(ConicShape::hyperbola(center, a2.sqrt(), b2.sqrt(), theta, main_axis))
}

/// Fold an axis angle into `(-π/2, π/2]`
fn half_turn_range(mut angle: f64) -> f64 {
    while angle > FRAC_PI_2 + 1e-12 {
        angle -= PI;
    }
    while angle <= -FRAC_PI_2 + 1e-12 {
        angle += PI;
    }
    angle
}

fn decompose_parabola(
    a_rot: f64,
    c_rot: f64,
    d_rot: f64,
    e_rot: f64,
    f: f64,
    u_axis: DVec2,
    v_axis: DVec2,
) -> Option<ConicShape> {
    let (form, quad, lin_along, lin_across, along, across) = if a_rot.abs() < c_rot.abs() {
        // C'·v² + D'·u + E'·v + F = 0, u as a function of v
        (ParabolaForm::XOfY, c_rot, e_rot, d_rot, v_axis, u_axis)
    } else {
        (ParabolaForm::YOfX, a_rot, d_rot, e_rot, u_axis, v_axis)
    };
    if quad.abs() < tol::COEFFICIENT || lin_across.abs() < tol::COEFFICIENT {
        return None;
    }
    // across = k·(along - t0)² + s0
    let t0 = -lin_along / (2.0 * quad);
    let s0 = -(quad * t0 * t0 + lin_along * t0 + f) / lin_across;
    let k = -quad / lin_across;
    let vertex = along * t0 + across * s0;
    let axis = if k > 0.0 { across } else { -across };
    Some(ConicShape::Parabola {
        vertex,
        axis,
        focal: 1.0 / (4.0 * k.abs()),
        form,
    })
}

/// Point where `line` touches `conic`.
///
/// Substitutes the line into the conic, eliminating the variable with the
/// larger line coefficient, and takes the vertex of the resulting quadratic.
pub fn tangent_point(line: &LineCoeffs, conic: &QuadraticForm) -> Option<DVec2> {
    if line.is_degenerate() {
        return None;
    }
    let q = conic;
    let solve = |qa: f64, qb: f64, qc: f64| -> Option<f64> {
        if qa.abs() > tol::COEFFICIENT {
            Some(-qb / (2.0 * qa))
        } else if qb.abs() > tol::COEFFICIENT {
            Some(-qc / qb)
        } else {
            None
        }
    };
    let point = if line.b.abs() >= line.a.abs() {
        // y = m·x + n
        let m = -line.a / line.b;
        let n = -line.c / line.b;
        let qa = q.a + q.b * m + q.c * m * m;
        let qb = q.b * n + 2.0 * q.c * m * n + q.d + q.e * m;
        let qc = q.c * n * n + q.e * n + q.f;
        let x = solve(qa, qb, qc)?;
        dvec2(x, m * x + n)
    } else {
        // x = m·y + n
        let m = -line.b / line.a;
        let n = -line.c / line.a;
        let qa = q.c + q.b * m + q.a * m * m;
        let qb = q.b * n + 2.0 * q.a * m * n + q.e + q.d * m;
        let qc = q.a * n * n + q.d * n + q.f;
        let y = solve(qa, qb, qc)?;
        dvec2(m * y + n, y)
    };
    point.is_finite().then_some(point)
}

/// Angle of `v` in radians, in `(-π, π]`
pub fn heading(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}
