use std::fmt;

use crate::math::{UVec2, Vec2};
use crate::text::{FontFace, FontId, GlyphId};
use crate::{Error, ErrorKind, ImageData, ImageFormat, Result};

/// Identifies one rasterized glyph bitmap: a glyph of a face at a size.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct GlyphKey {
    pub font: FontId,
    pub glyph: GlyphId,
    /// Bit pattern of the `f32` pixel size.
    pub size: u32,
}

impl GlyphKey {
    pub fn new(font: FontId, glyph: GlyphId, size: f32) -> GlyphKey {
        GlyphKey {
            font,
            glyph,
            size: size.to_bits(),
        }
    }

    pub fn size(&self) -> f32 {
        f32::from_bits(self.size)
    }
}

#[derive(Debug, Clone)]
pub struct RasterizedGlyph {
    pub image: ImageData,
    /// Position of the bitmap's top-left corner relative to the pen on the
    /// baseline, y pointing down.
    pub offset: Vec2,
}

impl RasterizedGlyph {
    /// A glyph without any visible pixels, e.g. one without an outline.
    pub fn empty() -> RasterizedGlyph {
        RasterizedGlyph {
            image: ImageData::empty(ImageFormat::Gray8),
            offset: Vec2::ZERO,
        }
    }

    pub fn size(&self) -> UVec2 {
        self.image.size
    }

    /// Distance from the baseline up to the top of the bitmap.
    pub fn horizontal_bearing_y(&self) -> f32 {
        -self.offset.y
    }
}

/// Produces glyph bitmaps. Returns `None` if the glyph can't be handled by
/// this particular rasterizer.
pub trait Rasterizer {
    fn rasterize(
        &mut self,
        font_face: &FontFace,
        glyph_id: GlyphId,
        size: f32,
    ) -> Option<RasterizedGlyph>;
}

/// A chain of rasterizers, asked in the order they were added.
#[derive(Default)]
pub struct FontRasterizers {
    rasterizers: Vec<Box<dyn Rasterizer>>,
}

impl FontRasterizers {
    pub fn new() -> FontRasterizers {
        FontRasterizers::default()
    }

    pub fn add_rasterizer<R: Rasterizer + 'static>(&mut self, rasterizer: R) {
        self.rasterizers.push(Box::new(rasterizer));
    }

    pub fn is_empty(&self) -> bool {
        self.rasterizers.is_empty()
    }

    /// Like [`Rasterizer::rasterize`], but treats a glyph nobody could
    /// rasterize as an error.
    pub fn rasterize_key(
        &mut self,
        font_face: &FontFace,
        key: &GlyphKey,
    ) -> Result<RasterizedGlyph> {
        self.rasterize(font_face, key.glyph, key.size()).ok_or_else(|| {
            Error::new(
                ErrorKind::Rasterization,
                format!(
                    "failed to rasterize glyph {} of font {} at {}px",
                    key.glyph.0,
                    key.font.0,
                    key.size()
                ),
            )
        })
    }
}

impl Rasterizer for FontRasterizers {
    fn rasterize(
        &mut self,
        font_face: &FontFace,
        glyph_id: GlyphId,
        size: f32,
    ) -> Option<RasterizedGlyph> {
        for rasterizer in &mut self.rasterizers {
            if let Some(res) = rasterizer.rasterize(font_face, glyph_id, size) {
                return Some(res);
            }
        }

        None
    }
}

impl fmt::Debug for FontRasterizers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontRasterizers")
            .field("len", &self.rasterizers.len())
            .finish_non_exhaustive()
    }
}
