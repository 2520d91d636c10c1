//! TikZ generation for the geometric model
//!
//! This module is organized into submodules:
//! - `defaults`: sampling densities and unit conversions
//! - `context`: RenderContext with the output buffer and coordinate names
//! - `style`: stroke and fill options per category
//! - `text`: label and caption escaping
//! - `sampling`: splitting curves into drawable runs
//! - one module per category group: `functions`, `conics`, `arcs`,
//!   `lines`, `shapes`, `angles`, `points`
//!
//! Categories are emitted in a fixed order. A failure in one entity turns
//! into a `%` comment and never stops the others.

pub mod angles;
pub mod arcs;
pub mod conics;
pub mod context;
pub mod defaults;
pub mod functions;
pub mod lines;
pub mod points;
pub mod sampling;
pub mod shapes;
pub mod style;
pub mod text;

pub use context::RenderContext;

use crate::bounds::{Bounds, compute_bounds};
use crate::log::debug;
use crate::model::Model;
use crate::options::{Options, Wrap};
use crate::types::Num;

use defaults::AXIS_OVERHANG;
use text::escape_text;

/// Category emitters in output order
const PASSES: [fn(&mut RenderContext<'_>); 10] = [
    functions::render_functions,
    conics::render_conics,
    arcs::render_conic_parts,
    lines::render_lines,
    lines::render_rays,
    shapes::render_polygons,
    shapes::render_vectors,
    shapes::render_segments,
    angles::render_angles,
    points::render_points,
];

/// Render a model to a complete TikZ program, wrapped per `options.wrap`.
///
/// `options` must already be validated.
pub fn render(model: &Model, options: &Options) -> String {
    let bounds = compute_bounds(model, &options.viewport);
    debug!(?bounds, "viewport");
    let body = render_body(model, options, bounds);
    wrap(&picture(body, options), options)
}

/// Lines between `\begin{tikzpicture}` and `\end{tikzpicture}`
pub fn render_body(model: &Model, options: &Options, bounds: Bounds) -> Vec<String> {
    let mut ctx = RenderContext::new(model, options, bounds);

    for diagnostic in &model.diagnostics {
        ctx.comment(format!("warning: {diagnostic}"));
    }
    if options.show_grid {
        ctx.emit(format!(
            "\\draw[help lines, step=1] ({}, {}) grid ({}, {});",
            Num(bounds.x_min),
            Num(bounds.y_min),
            Num(bounds.x_max),
            Num(bounds.y_max)
        ));
    }
    if options.show_axis {
        render_axes(&mut ctx);
    }
    if options.named_coordinates {
        render_coordinates(&mut ctx);
    }
    for pass in PASSES {
        pass(&mut ctx);
    }
    if !model.unsupported.is_empty() {
        ctx.comment("unsupported");
        for u in &model.unsupported {
            ctx.comment(format!("{} {}: {}", u.kind, u.label, u.reason));
        }
    }
    ctx.into_lines()
}

fn render_axes(ctx: &mut RenderContext<'_>) {
    let b = ctx.bounds;
    let x0 = 0f64.clamp(b.x_min, b.x_max);
    let y0 = 0f64.clamp(b.y_min, b.y_max);
    ctx.emit(format!(
        "\\draw[->] ({}, {}) -- ({}, {}) node[right] {{$x$}};",
        Num(b.x_min),
        Num(y0),
        Num(b.x_max + AXIS_OVERHANG),
        Num(y0)
    ));
    ctx.emit(format!(
        "\\draw[->] ({}, {}) -- ({}, {}) node[above] {{$y$}};",
        Num(x0),
        Num(b.y_min),
        Num(x0),
        Num(b.y_max + AXIS_OVERHANG)
    ));
}

fn render_coordinates(ctx: &mut RenderContext<'_>) {
    let model = ctx.model;
    let mut first = true;
    for point in model.points.iter().filter(|p| p.pos.is_finite()) {
        if first {
            ctx.comment("coordinates");
            first = false;
        }
        let name = ctx.declare(&point.label);
        let at = ctx.literal(point.pos);
        ctx.emit(format!("\\coordinate ({name}) at {at};"));
    }
}

/// `tikzpicture` around already indented body lines
pub fn picture(body: Vec<String>, options: &Options) -> String {
    let mut out = String::new();
    if options.scale != 1.0 {
        out.push_str(&format!("\\begin{{tikzpicture}}[scale={}]\n", Num(options.scale)));
    } else {
        out.push_str("\\begin{tikzpicture}\n");
    }
    for line in body {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("\\end{tikzpicture}\n");
    out
}

/// Wrap a picture as a standalone document, a figure, or nothing
pub fn wrap(picture: &str, options: &Options) -> String {
    match options.wrap {
        Wrap::Bare => picture.to_string(),
        Wrap::Standalone => format!(
            "\\documentclass[tikz,border=5pt]{{standalone}}\n\
             \\usetikzlibrary{{calc}}\n\
             \\begin{{document}}\n\
             {picture}\\end{{document}}\n"
        ),
        Wrap::Figure => {
            let mut out = String::from("\\begin{figure}[htbp]\n\\centering\n");
            out.push_str(picture);
            if let Some(caption) = options.caption.as_deref().filter(|c| !c.is_empty()) {
                out.push_str(&format!("\\caption{{{}}}\n", escape_text(caption)));
            }
            if let Some(label) = options.figure_label.as_deref().filter(|l| !l.is_empty()) {
                out.push_str(&format!("\\label{{{label}}}\n"));
            }
            out.push_str("\\end{figure}\n");
            out
        }
    }
}
