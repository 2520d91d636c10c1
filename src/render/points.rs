//! Point markers and their labels

use crate::layout::{CompassPoint, LabelSpec, Placement, estimate_size, place_labels};
use crate::log::debug;
use crate::model::PointRef;
use crate::solve::tol;
use crate::types::Num;
use glam::DVec2;

use super::context::RenderContext;
use super::defaults::PT_PER_UNIT;
use super::style::{bracket, point_marker};
use super::text::{escape_text, math_label};

struct Marker {
    at: String,
    pos: DVec2,
    options: Vec<String>,
    radius: f64,
    label: Option<String>,
}

pub fn render_points(ctx: &mut RenderContext<'_>) {
    let model = ctx.model;
    let options = ctx.options;
    let mut markers: Vec<Marker> = model
        .visible_points()
        .filter(|p| p.pos.is_finite())
        .map(|p| {
            let (color, radius) = point_marker(options, &p.look.style);
            let caption = p.look.caption.as_deref().filter(|c| !c.is_empty());
            let label = p.look.label_visible.then(|| match caption {
                Some(caption) => escape_text(caption),
                None => format!("${}$", math_label(&p.label)),
            });
            Marker {
                at: ctx.at(&PointRef::Named { label: p.label.clone(), pos: p.pos }),
                pos: p.pos,
                options: color.into_iter().collect(),
                radius,
                label,
            }
        })
        .collect();

    if options.show_axis
        && ctx.bounds.contains(DVec2::ZERO)
        && !markers.iter().any(|m| m.pos.length() < tol::POINT_COINCIDENCE)
    {
        debug!("synthesizing origin point");
        let (color, radius) = point_marker(options, &Default::default());
        markers.push(Marker {
            at: ctx.literal(DVec2::ZERO),
            pos: DVec2::ZERO,
            options: color.into_iter().collect(),
            radius,
            label: Some("$O$".to_string()),
        });
    }
    if markers.is_empty() {
        return;
    }

    let placements = label_placements(ctx, &markers);
    let font = (options.label_font_size != 10.0).then(|| {
        let size = Num(options.label_font_size);
        let skip = Num(options.label_font_size * 1.2);
        format!("font=\\fontsize{{{size}pt}}{{{skip}pt}}\\selectfont")
    });

    ctx.comment("points");
    let mut placements = placements.into_iter();
    for marker in &markers {
        let (at, radius) = (&marker.at, Num(marker.radius));
        let mut line = format!("\\fill{} {at} circle ({radius}pt)", bracket(&marker.options));
        if let Some(text) = &marker.label {
            let placement = placements.next().unwrap_or(Placement {
                direction: CompassPoint::NorthEast,
                offset: options.label_offset,
            });
            let mut node = vec![placement.tikz()];
            node.extend(font.clone());
            line.push_str(&format!(" node{} {{{text}}}", bracket(&node)));
        }
        line.push(';');
        ctx.emit(line);
    }
}

/// One placement per labeled marker, in marker order
fn label_placements(ctx: &RenderContext<'_>, markers: &[Marker]) -> Vec<Placement> {
    let options = ctx.options;
    let to_pt = PT_PER_UNIT * options.scale;
    let labels: Vec<LabelSpec> = markers
        .iter()
        .filter_map(|m| {
            let text = m.label.as_deref()?;
            let size = estimate_size(text, options.label_font_size);
            Some(LabelSpec { at: m.pos * to_pt, size })
        })
        .collect();
    if !options.refine_labels {
        let fixed = Placement { direction: CompassPoint::NorthEast, offset: options.label_offset };
        return vec![fixed; labels.len()];
    }
    let obstacles: Vec<DVec2> = markers.iter().map(|m| m.pos * to_pt).collect();
    place_labels(&labels, &obstacles, options.label_offset, options.label_max_shift)
}
