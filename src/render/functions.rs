//! Function graphs as pgfplots-free `plot` paths

use crate::log::{debug, warn};
use crate::model::Function;
use crate::types::Num;

use super::context::RenderContext;
use super::defaults::{FUNCTION_SAMPLES, PLOT_SAMPLES};
use super::sampling::{Run, function_runs};
use super::style::{Category, bracket, stroke};

pub fn render_functions(ctx: &mut RenderContext<'_>) {
    let mut plots = Vec::new();
    for function in ctx.model.functions.iter().filter(|f| f.look.visible) {
        match plot_function(ctx, function) {
            Ok(lines) => plots.extend(lines),
            Err(reason) => {
                warn!(label = %function.label, %reason, "function skipped");
                plots.push(format!("% {}: {reason}", function.label));
            }
        }
    }
    if plots.is_empty() {
        return;
    }

    let b = ctx.bounds;
    ctx.comment("functions");
    ctx.open_scope("\\begin{scope}");
    ctx.emit(format!(
        "\\clip ({}, {}) rectangle ({}, {});",
        Num(b.x_min),
        Num(b.y_min),
        Num(b.x_max),
        Num(b.y_max)
    ));
    for line in plots {
        ctx.emit(line);
    }
    ctx.close_scope("\\end{scope}");
}

fn plot_function(ctx: &RenderContext<'_>, function: &Function) -> Result<Vec<String>, String> {
    let body = function.body.as_ref().map_err(Clone::clone)?;
    let pgf = body.to_pgfmath().map_err(|e| e.to_string())?;

    let b = ctx.bounds;
    let (lo, hi) = match function.domain {
        Some((a, z)) => (a.max(b.x_min), z.min(b.x_max)),
        None => (b.x_min, b.x_max),
    };
    if lo >= hi {
        return Err("domain lies outside the viewport".to_string());
    }

    let runs = if body.may_be_discontinuous() {
        let window = ctx.options.function_y_clip.then(|| {
            let pad = b.height() / 2.0;
            (b.y_min - pad, b.y_max + pad)
        });
        let eval = |x| body.eval(x, 0.0);
        let runs = function_runs(eval, (lo, hi), FUNCTION_SAMPLES, window, 2.0 * b.height());
        debug!(label = %function.label, runs = runs.len(), "sampled discontinuous function");
        if runs.is_empty() {
            return Err("no visible samples".to_string());
        }
        runs
    } else {
        vec![Run { start: lo, end: hi, samples: PLOT_SAMPLES }]
    };

    let style = stroke(ctx.options, Category::Function, &function.look.style);
    Ok(runs
        .iter()
        .map(|run| {
            let mut options = style.clone();
            options.push(format!("domain={}:{}", Num(run.start), Num(run.end)));
            options.push(format!("samples={}", run.samples.max(2)));
            options.push("smooth".to_string());
            options.push("variable=\\x".to_string());
            format!("\\draw{} plot (\\x, {{{pgf}}});", bracket(&options))
        })
        .collect())
}
