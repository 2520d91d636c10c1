//! Stroke and fill options per category

use crate::document::Style;
use crate::options::{Options, StyleMode};
use crate::types::Num;

use super::defaults::{NATIVE_POINT_PT, NATIVE_THICKNESS_PT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Function,
    Conic,
    ConicPart,
    Line,
    Ray,
    Polygon,
    Vector,
    Segment,
    Angle,
}

fn category_thickness(options: &Options, category: Category) -> Option<f64> {
    let t = &options.thickness;
    match category {
        Category::Function => t.function,
        Category::Conic | Category::ConicPart => t.conic,
        Category::Line => t.line,
        Category::Ray => t.ray,
        Category::Polygon => t.polygon,
        Category::Vector => t.vector,
        Category::Segment => t.segment,
        Category::Angle => t.angle,
    }
}

/// GeoGebra line type to a TikZ dash option
pub fn dash_pattern(line_type: u32) -> Option<&'static str> {
    match line_type {
        10 => Some("dashed"),
        15 => Some("dash pattern=on 8pt off 4pt"),
        20 => Some("dotted"),
        30 => Some("dash dot"),
        _ => None,
    }
}

fn color_option(color: &str) -> Option<String> {
    (color != "black" && !color.is_empty()).then(|| format!("color={color}"))
}

/// Stroke options for an element of `category`
pub fn stroke(options: &Options, category: Category, style: &Style) -> Vec<String> {
    let mut out = Vec::new();
    let default_width = category_thickness(options, category).unwrap_or(options.stroke_thickness);
    match options.style_mode {
        StyleMode::Default => {
            out.extend(color_option(&options.stroke_color));
            out.push(format!("line width={}pt", Num(default_width)));
            out.extend(options.line_pattern.tikz().map(str::to_string));
        }
        StyleMode::Native => {
            if let Some(rgb) = style.color.filter(|c| !c.is_black()) {
                out.push(format!("color={}", rgb.to_xcolor()));
            }
            let width = style.thickness.map_or(default_width, |t| t * NATIVE_THICKNESS_PT);
            out.push(format!("line width={}pt", Num(width)));
            out.extend(style.line_type.and_then(dash_pattern).map(str::to_string));
        }
    }
    out
}

/// Fill options for a polygon, empty when it stays unfilled
pub fn polygon_fill(options: &Options, style: &Style) -> Vec<String> {
    match options.style_mode {
        StyleMode::Default => match &options.polygon_fill {
            Some(color) => {
                let opacity = Num(options.polygon_opacity);
                vec![format!("fill={color}"), format!("fill opacity={opacity}")]
            }
            None => Vec::new(),
        },
        StyleMode::Native => match (style.color, style.alpha) {
            (Some(rgb), Some(alpha)) if alpha > 0.0 => {
                let opacity = Num(alpha.clamp(0.0, 1.0));
                vec![format!("fill={}", rgb.to_xcolor()), format!("fill opacity={opacity}")]
            }
            _ => Vec::new(),
        },
    }
}

/// Marker color and radius in pt for a point
pub fn point_marker(options: &Options, style: &Style) -> (Option<String>, f64) {
    match options.style_mode {
        StyleMode::Default => (color_option(&options.point_color), options.point_size),
        StyleMode::Native => {
            let color =
                style.color.filter(|c| !c.is_black()).map(|c| format!("color={}", c.to_xcolor()));
            let radius = style.point_size.map_or(options.point_size, |s| s * NATIVE_POINT_PT);
            (color, radius)
        }
    }
}

/// `[a, b]`, or nothing for an empty list
pub fn bracket(options: &[String]) -> String {
    if options.is_empty() { String::new() } else { format!("[{}]", options.join(", ")) }
}
