//! Graphics state: color, stroke, font, transform and clip applicable to
//! subsequent drawing operators.

use std::collections::BTreeMap;

use crate::path::Path;

/// Device color in one of the two supported color spaces.
///
/// RGB components are 8-bit samples; CMYK components are already normalized
/// to `[0, 1]`. Alpha is an 8-bit coverage value, 255 = opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Rgb { r: u8, g: u8, b: u8, alpha: u8 },
    Cmyk { c: f64, m: f64, y: f64, k: f64, alpha: u8 },
}

impl Color {
    pub const BLACK: Color = Color::Rgb { r: 0, g: 0, b: 0, alpha: 255 };
    pub const WHITE: Color = Color::Rgb { r: 255, g: 255, b: 255, alpha: 255 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color::Rgb { r, g, b, alpha: 255 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, alpha: u8) -> Color {
        Color::Rgb { r, g, b, alpha }
    }

    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Color {
        Color::Cmyk { c, m, y, k, alpha: 255 }
    }

    pub fn alpha(&self) -> u8 {
        match *self {
            Color::Rgb { alpha, .. } => alpha,
            Color::Cmyk { alpha, .. } => alpha,
        }
    }
}

/// Line join style at path corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    /// Operand of the `j` operator.
    pub const fn operand(self) -> i64 {
        match self {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        }
    }
}

/// Cap style at the ends of open subpaths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineCap {
    /// Operand of the `J` operator.
    pub const fn operand(self) -> i64 {
        match self {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        }
    }
}

/// Dash pattern of a stroke. An empty `array` encodes "dashing removed",
/// which is emitted as an explicit `[] 0 d` reset; a stroke whose dash was
/// never set carries no pattern at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Dash {
    pub array: Vec<f64>,
    pub phase: f64,
}

/// Stroke descriptor applied to path drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub line_width: f64,
    /// Only meaningful when `join` is [`LineJoin::Miter`].
    pub miter_limit: f64,
    pub join: LineJoin,
    pub cap: LineCap,
    pub dash: Option<Dash>,
}

impl Default for Stroke {
    fn default() -> Stroke {
        Stroke {
            line_width: 1.0,
            miter_limit: 10.0,
            join: LineJoin::Miter,
            cap: LineCap::Butt,
            dash: None,
        }
    }
}

/// Font selection: a base font name plus a size in units.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub base_font: String,
    pub size: f64,
}

impl Font {
    pub fn new<S: Into<String>>(base_font: S, size: f64) -> Font {
        Font {
            base_font: base_font.into(),
            size,
        }
    }
}

impl Default for Font {
    fn default() -> Font {
        Font::new("Helvetica", 12.0)
    }
}

/// Affine transform as the six coefficients `a b c d e f` of
///
/// ```text
/// | a c e |
/// | b d f |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub matrix: [f64; 6],
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Transform {
        Transform {
            matrix: [a, b, c, d, e, f],
        }
    }

    pub fn translate(tx: f64, ty: f64) -> Transform {
        Transform::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Transform {
        Transform::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Post-multiply `other` onto this transform, so that `other` applies
    /// before the existing transform when mapping coordinates.
    pub fn concatenate(&mut self, other: &Transform) {
        let [a1, b1, c1, d1, e1, f1] = self.matrix;
        let [a2, b2, c2, d2, e2, f2] = other.matrix;
        self.matrix = [
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * e2 + c1 * f2 + e1,
            b1 * e2 + d1 * f2 + f1,
        ];
    }
}

/// Snapshot of the full graphics state.
///
/// Defaults: black color, no paint, solid 1-unit miter/butt stroke, 12-unit
/// Helvetica, identity transform, no clip, white background, empty hints.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub background: Color,
    pub color: Color,
    /// Fill paint override; tracked but never emitted by the current
    /// operator set.
    pub paint: Option<Color>,
    pub stroke: Stroke,
    pub font: Font,
    pub transform: Transform,
    pub clip: Option<Path>,
    pub hints: BTreeMap<String, String>,
}

impl Default for GraphicsState {
    fn default() -> GraphicsState {
        GraphicsState {
            background: Color::WHITE,
            color: Color::BLACK,
            paint: None,
            stroke: Stroke::default(),
            font: Font::default(),
            transform: Transform::IDENTITY,
            clip: None,
            hints: BTreeMap::new(),
        }
    }
}
