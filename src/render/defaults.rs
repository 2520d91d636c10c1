//! Default sizes and sampling densities

/// TeX points per user unit at `scale=1` (TikZ units are centimeters)
pub const PT_PER_UNIT: f64 = 28.452_755_9;
/// Samples across a function domain when it may be discontinuous
pub const FUNCTION_SAMPLES: usize = 240;
/// Samples for a single plot of a continuous function
pub const PLOT_SAMPLES: usize = 100;
/// Samples for the visibility scan of parabolas and hyperbolas
pub const CONIC_SAMPLES: usize = 400;
/// Samples handed to pgf for each visible conic run
pub const CONIC_PLOT_SAMPLES: usize = 80;
/// Angle arc radius per pixel of `arcSize`
pub const ARC_UNITS_PER_PIXEL: f64 = 1.0 / 60.0;
/// Gap between an angle arc and its label, in user units
pub const ANGLE_LABEL_GAP: f64 = 0.25;
/// GeoGebra thickness unit in pt
pub const NATIVE_THICKNESS_PT: f64 = 0.25;
/// GeoGebra point size unit in pt
pub const NATIVE_POINT_PT: f64 = 0.3;
/// Axis arrows run this far past the viewport
pub const AXIS_OVERHANG: f64 = 0.3;
