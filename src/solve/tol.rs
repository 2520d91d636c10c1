//! Numeric tolerances shared by every solver and by the classifier.

/// Below this a 2x2 determinant is treated as singular
pub const DETERMINANT: f64 = 1e-10;

/// Below this a coefficient is treated as zero when dividing by it
pub const COEFFICIENT: f64 = 1e-12;

/// Two points closer than this are the same point
pub const POINT_COINCIDENCE: f64 = 1e-7;

/// A point within this distance of a line lies on it
pub const POINT_ON_LINE: f64 = 1e-6;

/// Scale-normalized `B² - 4AC` below this is a parabola
pub const CONIC_DISCRIMINANT: f64 = 1e-9;

/// An angle within this many degrees of 90 gets a right-angle mark
pub const RIGHT_ANGLE_DEG: f64 = 1.2;
