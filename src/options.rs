//! Translation options.
//!
//! One explicit record, camelCase in JSON, every field defaulted. It is
//! validated once at the entry point; nothing downstream re-checks it.

use crate::errors::OptionsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    pub viewport: Viewport,
    pub show_axis: bool,
    pub show_grid: bool,
    /// TikZ color name or expression for strokes in default style mode
    pub stroke_color: String,
    /// Stroke width in pt
    pub stroke_thickness: f64,
    pub point_color: String,
    /// Point marker radius in pt
    pub point_size: f64,
    pub thickness: CategoryThickness,
    pub line_pattern: LinePattern,
    /// How far lines run past the viewport, as a fraction of the visible
    /// length
    pub line_extension: f64,
    /// Distance between a point and its label, in pt
    pub label_offset: f64,
    /// Label font size in pt
    pub label_font_size: f64,
    /// Upper bound for the label offset when refinement pushes labels out
    pub label_max_shift: f64,
    pub refine_labels: bool,
    /// Fill color for polygons; no fill when absent
    pub polygon_fill: Option<String>,
    pub polygon_opacity: f64,
    pub angle_region: AngleRegion,
    pub style_mode: StyleMode,
    /// Emit `\coordinate` definitions and refer to points by name
    pub named_coordinates: bool,
    /// Drop function samples far outside the viewport
    pub function_y_clip: bool,
    pub scale: f64,
    pub wrap: Wrap,
    pub caption: Option<String>,
    pub figure_label: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            viewport: Viewport::default(),
            show_axis: true,
            show_grid: false,
            stroke_color: "black".to_string(),
            stroke_thickness: 0.8,
            point_color: "black".to_string(),
            point_size: 1.5,
            thickness: CategoryThickness::default(),
            line_pattern: LinePattern::Solid,
            line_extension: 0.05,
            label_offset: 4.0,
            label_font_size: 10.0,
            label_max_shift: 16.0,
            refine_labels: true,
            polygon_fill: None,
            polygon_opacity: 0.2,
            angle_region: AngleRegion::Auto,
            style_mode: StyleMode::Default,
            named_coordinates: true,
            function_y_clip: true,
            scale: 1.0,
            wrap: Wrap::Standalone,
            caption: None,
            figure_label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Viewport {
    /// Fit the viewport to the visible points
    pub smart: bool,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Per-axis values that win over both the defaults and smart mode
    pub overrides: AxisOverrides,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            smart: false,
            x_min: -5.0,
            x_max: 5.0,
            y_min: -5.0,
            y_max: 5.0,
            overrides: AxisOverrides::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisOverrides {
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
}

/// Stroke widths in pt per category, falling back to `strokeThickness`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryThickness {
    pub function: Option<f64>,
    pub conic: Option<f64>,
    pub line: Option<f64>,
    pub ray: Option<f64>,
    pub segment: Option<f64>,
    pub vector: Option<f64>,
    pub polygon: Option<f64>,
    pub angle: Option<f64>,
}

impl CategoryThickness {
    fn fields(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("thickness.function", self.function),
            ("thickness.conic", self.conic),
            ("thickness.line", self.line),
            ("thickness.ray", self.ray),
            ("thickness.segment", self.segment),
            ("thickness.vector", self.vector),
            ("thickness.polygon", self.polygon),
            ("thickness.angle", self.angle),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinePattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LinePattern {
    /// TikZ option, or `None` for solid
    pub fn tikz(self) -> Option<&'static str> {
        match self {
            LinePattern::Solid => None,
            LinePattern::Dashed => Some("dashed"),
            LinePattern::Dotted => Some("dotted"),
            LinePattern::DashDot => Some("dash dot"),
        }
    }
}

/// Where a two-line angle mark should go when several regions fit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AngleRegion {
    #[default]
    Auto,
    Left,
    Right,
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleMode {
    /// Uniform styling from these options
    #[default]
    Default,
    /// Each element's own color, thickness and dash pattern
    Native,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Wrap {
    /// Complete `standalone` document
    #[default]
    Standalone,
    /// `figure` environment with caption and label
    Figure,
    /// Only the `tikzpicture`
    Bare,
}

impl Options {
    /// Parse options from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Options, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load options from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Options> {
        let contents = std::fs::read_to_string(path)?;
        Options::from_json(&contents).map_err(std::io::Error::other)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        let vp = &self.viewport;
        let o = &vp.overrides;
        let bounds = [
            ("viewport.xMin", Some(vp.x_min)),
            ("viewport.xMax", Some(vp.x_max)),
            ("viewport.yMin", Some(vp.y_min)),
            ("viewport.yMax", Some(vp.y_max)),
            ("viewport.overrides.xMin", o.x_min),
            ("viewport.overrides.xMax", o.x_max),
            ("viewport.overrides.yMin", o.y_min),
            ("viewport.overrides.yMax", o.y_max),
        ];
        for (field, value) in bounds {
            if let Some(value) = value {
                finite(field, value)?;
            }
        }

        let x = (o.x_min.unwrap_or(vp.x_min), o.x_max.unwrap_or(vp.x_max));
        let y = (o.y_min.unwrap_or(vp.y_min), o.y_max.unwrap_or(vp.y_max));
        for (axis, (min, max)) in [("x", x), ("y", y)] {
            if min >= max {
                return Err(OptionsError::EmptyViewport { axis, min, max });
            }
        }

        let lengths = [
            ("strokeThickness", Some(self.stroke_thickness)),
            ("pointSize", Some(self.point_size)),
            ("lineExtension", Some(self.line_extension)),
            ("labelOffset", Some(self.label_offset)),
            ("labelFontSize", Some(self.label_font_size)),
            ("labelMaxShift", Some(self.label_max_shift)),
        ];
        for (field, value) in lengths.into_iter().chain(self.thickness.fields()) {
            if let Some(value) = value {
                finite(field, value)?;
                if value < 0.0 {
                    return Err(OptionsError::Negative { field, value });
                }
            }
        }

        finite("polygonOpacity", self.polygon_opacity)?;
        if !(0.0..=1.0).contains(&self.polygon_opacity) {
            return Err(OptionsError::OutOfUnitRange {
                field: "polygonOpacity",
                value: self.polygon_opacity,
            });
        }

        finite("scale", self.scale)?;
        if self.scale <= 0.0 {
            return Err(OptionsError::NotPositive { field: "scale", value: self.scale });
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), OptionsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(OptionsError::NotFinite { field, value })
    }
}
