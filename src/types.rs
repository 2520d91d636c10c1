//! Small value types shared by the reader, the classifier and the generator.

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A number as it appears in TikZ output.
///
/// Rounded to four decimals, trailing zeros dropped, `-0` printed as `0`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Num(pub f64);

impl Num {
    #[inline]
    pub fn rounded(self) -> f64 {
        let r = (self.0 * 1e4).round() / 1e4;
        if r == 0.0 { 0.0 } else { r }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("{:.4}", self.rounded());
        let s = if s.contains('.') { s.trim_end_matches('0').trim_end_matches('.') } else { &s };
        f.write_str(if s == "-0" { "0" } else { s })
    }
}

/// `(x, y)` for TikZ
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coord(pub DVec2);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", Num(self.0.x), Num(self.0.y))
    }
}

/// 8-bit RGB color from `<objColor>`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn is_black(self) -> bool {
        self == Rgb::BLACK
    }

    /// xcolor extended syntax: `{rgb,255:red,r;green,g;blue,b}`
    pub fn to_xcolor(self) -> String {
        format!("{{rgb,255:red,{};green,{};blue,{}}}", self.r, self.g, self.b)
    }
}

/// Homogeneous triple `(x, y, z)` as stored for points and lines
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct Homogeneous {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Homogeneous {
    /// Cartesian point, or `None` at infinity
    pub fn to_point(self) -> Option<DVec2> {
        if self.z.abs() < 1e-12 {
            return None;
        }
        let p = dvec2(self.x / self.z, self.y / self.z);
        p.is_finite().then_some(p)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}
