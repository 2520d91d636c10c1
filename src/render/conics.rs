//! Circles, ellipses, parabolas and hyperbolas

use crate::log::{debug, warn};
use crate::model::{Conic, PointRef};
use crate::solve::ConicShape;
use crate::types::Num;
use glam::{DVec2, dvec2};

use super::context::RenderContext;
use super::defaults::{CONIC_PLOT_SAMPLES, CONIC_SAMPLES};
use super::sampling::visible_runs;
use super::style::{Category, bracket, stroke};

pub fn render_conics(ctx: &mut RenderContext<'_>) {
    let model = ctx.model;
    let mut first = true;
    for conic in model.conics.iter().filter(|c| c.look.visible) {
        if first {
            ctx.comment("conics");
            first = false;
        }
        match conic_paths(ctx, conic) {
            Ok(paths) => {
                debug!(label = %conic.label, kind = conic.shape.kind_name(), "conic");
                for path in paths {
                    ctx.emit(format!("{path} % {}: {}", conic.label, conic.semantic));
                }
            }
            Err(reason) => {
                warn!(label = %conic.label, %reason, "conic skipped");
                ctx.comment(format!("{}: {reason}", conic.label));
            }
        }
    }
}

fn conic_paths(ctx: &RenderContext<'_>, conic: &Conic) -> Result<Vec<String>, String> {
    if !conic.shape.is_finite() {
        return Err(format!("degenerate {}", conic.shape.kind_name()));
    }
    let style = stroke(ctx.options, Category::Conic, &conic.look.style);
    let options = bracket(&style);
    let center_at = |center: DVec2| match &conic.center {
        Some(point) => ctx.at(point),
        None => ctx.at(&PointRef::Literal(center)),
    };
    match conic.shape {
        ConicShape::Circle { center, radius } => {
            if radius <= 0.0 {
                return Err("degenerate circle".to_string());
            }
            let at = center_at(center);
            Ok(vec![format!("\\draw{options} {at} circle ({});", Num(radius))])
        }
        ConicShape::Ellipse { center, rx, ry, angle } => {
            if rx <= 0.0 || ry <= 0.0 {
                return Err("degenerate ellipse".to_string());
            }
            let at = center_at(center);
            let mut opts = style.clone();
            if angle != 0.0 {
                opts.push(format!("rotate around={{{}:{at}}}", Num(angle.to_degrees())));
            }
            let (rx, ry) = (Num(rx), Num(ry));
            Ok(vec![format!("\\draw{} {at} ellipse ({rx} and {ry});", bracket(&opts))])
        }
        ConicShape::Parabola { vertex, axis, focal, .. } => {
            if focal <= 0.0 {
                return Err("degenerate parabola".to_string());
            }
            let tangent = axis.perp();
            let bend = axis / (4.0 * focal);
            let reach = reach(ctx, vertex);
            let curve = |t: f64| vertex + tangent * t + bend * t * t;
            let terms = |c: f64, t: f64, b: f64| combo(c, &[(t, "(\\t)"), (b, "(\\t)^2")]);
            let x = terms(vertex.x, tangent.x, bend.x);
            let y = terms(vertex.y, tangent.y, bend.y);
            let runs = visible_runs(curve, (-reach, reach), CONIC_SAMPLES, &ctx.bounds);
            plots(&style, &runs, &x, &y)
        }
        ConicShape::Hyperbola { center, a, b, angle, main_axis } => {
            if a <= 0.0 || b <= 0.0 {
                return Err("degenerate hyperbola".to_string());
            }
            let (u, w) = ConicShape::hyperbola_axes(angle, main_axis);
            let limit = (reach(ctx, center) / b.min(a)).asinh() + 0.5;
            let mut paths = Vec::new();
            for sign in [1.0, -1.0] {
                let ua = u * (sign * a);
                let wb = w * b;
                let curve = |t: f64| center + ua * t.cosh() + wb * t.sinh();
                let x = combo(center.x, &[(ua.x, "cosh(\\t)"), (wb.x, "sinh(\\t)")]);
                let y = combo(center.y, &[(ua.y, "cosh(\\t)"), (wb.y, "sinh(\\t)")]);
                let runs = visible_runs(curve, (-limit, limit), CONIC_SAMPLES, &ctx.bounds);
                // one empty branch is fine, both empty is reported below
                if let Ok(branch) = plots(&style, &runs, &x, &y) {
                    paths.extend(branch);
                }
            }
            if paths.is_empty() {
                return Err("hyperbola lies outside the viewport".to_string());
            }
            Ok(paths)
        }
    }
}

/// Parameter bound beyond which a curve with `|p - origin| >= |t|` has left the viewport
fn reach(ctx: &RenderContext<'_>, origin: DVec2) -> f64 {
    let b = ctx.bounds;
    let mid = dvec2((b.x_min + b.x_max) / 2.0, (b.y_min + b.y_max) / 2.0);
    origin.distance(mid) + dvec2(b.width(), b.height()).length() / 2.0 + 1.0
}

fn plots(style: &[String], runs: &[(f64, f64)], x: &str, y: &str) -> Result<Vec<String>, String> {
    if runs.is_empty() {
        return Err("curve lies outside the viewport".to_string());
    }
    Ok(runs
        .iter()
        .map(|(t0, t1)| {
            let mut options = style.to_vec();
            options.push(format!("domain={}:{}", Num(*t0), Num(*t1)));
            options.push(format!("samples={CONIC_PLOT_SAMPLES}"));
            options.push("smooth".to_string());
            options.push("variable=\\t".to_string());
            format!("\\draw{} plot ({{{x}}}, {{{y}}});", bracket(&options))
        })
        .collect())
}

/// `c + k1*term1 - k2*term2`, dropping terms that print as zero
pub(super) fn combo(constant: f64, terms: &[(f64, &str)]) -> String {
    let mut out = String::new();
    if Num(constant).to_string() != "0" {
        out.push_str(&Num(constant).to_string());
    }
    for (k, term) in terms {
        let k = Num(*k);
        let text = k.to_string();
        if text == "0" {
            continue;
        }
        let (negative, magnitude) = match text.strip_prefix('-') {
            Some(m) => (true, m.to_string()),
            None => (false, text),
        };
        let factor =
            if magnitude == "1" { term.to_string() } else { format!("{magnitude}*{term}") };
        match (out.is_empty(), negative) {
            (true, false) => out.push_str(&factor),
            (true, true) => {
                out.push('-');
                out.push_str(&factor);
            }
            (false, false) => {
                out.push_str(" + ");
                out.push_str(&factor);
            }
            (false, true) => {
                out.push_str(" - ");
                out.push_str(&factor);
            }
        }
    }
    if out.is_empty() { "0".to_string() } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Bounds;
    use crate::model::{Appearance, Method, Model, SemanticType};
    use crate::options::Options;

    const VIEW: Bounds = Bounds { x_min: -5.0, x_max: 5.0, y_min: -5.0, y_max: 5.0 };

    fn conic(shape: ConicShape, center: Option<PointRef>) -> Conic {
        Conic {
            label: "c".into(),
            shape,
            center,
            semantic: SemanticType { kind: shape.kind_name(), method: Method::CenterRadius },
            sources: Vec::new(),
            look: Appearance { visible: true, ..Default::default() },
        }
    }

    fn drawn(conic: Conic) -> Vec<String> {
        let mut model = Model::default();
        model.conics.push(conic);
        let options = Options::default();
        let mut ctx = RenderContext::new(&model, &options, VIEW);
        ctx.declare("M");
        render_conics(&mut ctx);
        ctx.into_lines()
    }

    #[test]
    fn declared_center_is_named() {
        let m = PointRef::Named { label: "M".into(), pos: dvec2(1.0, 1.0) };
        let circle = ConicShape::Circle { center: dvec2(1.0, 1.0), radius: 2.0 };
        let out = drawn(conic(circle, Some(m.clone())));
        assert!(out.iter().any(|l| l.contains(" (M) circle (2);")), "{out:?}");

        let ellipse = ConicShape::Ellipse { center: dvec2(1.0, 1.0), rx: 3.0, ry: 1.0, angle: 0.5 };
        let out = drawn(conic(ellipse, Some(m)));
        let path = out.iter().find(|l| l.contains("ellipse")).unwrap();
        assert!(path.contains(":(M)}"), "{path}");
        assert!(path.contains(" (M) ellipse (3 and 1);"), "{path}");
    }

    #[test]
    fn undeclared_center_is_a_literal() {
        let circle = ConicShape::Circle { center: dvec2(1.0, -1.0), radius: 2.0 };
        let out = drawn(conic(circle, None));
        assert!(out.iter().any(|l| l.contains(" (1, -1) circle (2);")), "{out:?}");
    }

    #[test]
    fn combinations() {
        assert_eq!(combo(0.0, &[(1.0, "(\\t)"), (0.25, "(\\t)^2")]), "(\\t) + 0.25*(\\t)^2");
        assert_eq!(combo(2.0, &[(-1.0, "(\\t)"), (0.0, "(\\t)^2")]), "2 - (\\t)");
        assert_eq!(combo(-1.5, &[(3.0, "cosh(\\t)")]), "-1.5 + 3*cosh(\\t)");
        assert_eq!(combo(0.0, &[(-2.0, "sinh(\\t)")]), "-2*sinh(\\t)");
        assert_eq!(combo(0.0, &[]), "0");
    }
}
