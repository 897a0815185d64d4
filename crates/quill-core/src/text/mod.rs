mod font;
mod layout;
mod rasterization;
mod segment;
mod shaping;

pub use self::font::*;
pub use self::layout::*;
pub use self::rasterization::*;
pub use self::segment::*;
pub use self::shaping::*;

use crate::Color;

/// Points per logical inch.
pub const PT_PER_LOGICAL_INCH: f32 = 72.0;
/// Pixels per logical inch, aka. DPI.
pub const PX_PER_LOGICAL_INCH: f32 = 96.0;

pub fn pt_to_px(pt: f32) -> f32 {
    pt * (PX_PER_LOGICAL_INCH / PT_PER_LOGICAL_INCH)
}

pub fn px_to_pt(px: f32) -> f32 {
    px * (PT_PER_LOGICAL_INCH / PX_PER_LOGICAL_INCH)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextAttrs {
    /// Font size in pixels.
    pub size: f32,
    pub line_height: LineHeight,
    pub word_spacing: WordSpacing,
    /// Width at which lines get wrapped.
    pub max_width: f32,
    pub color: Color,
}

impl TextAttrs {
    pub fn line_height_px(&self) -> f32 {
        match self.line_height {
            LineHeight::Px(v) => v,
            LineHeight::Relative(v) => v * self.size,
        }
    }
}

impl Default for TextAttrs {
    fn default() -> Self {
        Self {
            size: 16.0,
            line_height: Default::default(),
            word_spacing: Default::default(),
            max_width: f32::INFINITY,
            color: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineHeight {
    Px(f32),
    Relative(f32),
}

impl Default for LineHeight {
    fn default() -> LineHeight {
        LineHeight::Relative(1.2)
    }
}

/// Gap inserted between two words on the same line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WordSpacing {
    Px(f32),
    /// The shaped advance of a single space in the current font.
    #[default]
    SpaceAdvance,
}
