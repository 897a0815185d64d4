use crate::math::Vec2;
use crate::text::{FontFace, GlyphId};

/// A single positioned glyph produced by a [`TextShaper`]. All values are in
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: GlyphId,
    pub cluster: usize,
    pub x_advance: f32,
    pub y_advance: f32,
    /// Offset from the pen position, y pointing down.
    pub offset: Vec2,
}

impl ShapedGlyph {
    pub fn new(glyph_id: GlyphId, x_advance: f32) -> ShapedGlyph {
        ShapedGlyph {
            glyph_id,
            cluster: 0,
            x_advance,
            y_advance: 0.0,
            offset: Vec2::ZERO,
        }
    }
}

/// Turns a string into positioned glyphs for a given font and pixel size.
///
/// Shaped glyphs are appended to `buf`.
pub trait TextShaper: Send + Sync + 'static {
    fn shape(
        &mut self,
        font_face: &FontFace,
        text: &str,
        size: f32,
        buf: &mut Vec<ShapedGlyph>,
    );
}

/// Maps characters to glyphs one by one through the font's character map,
/// using the horizontal metrics for advances. No kerning, ligatures or
/// complex scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmapTextShaper;

impl TextShaper for CmapTextShaper {
    fn shape(
        &mut self,
        font_face: &FontFace,
        text: &str,
        size: f32,
        buf: &mut Vec<ShapedGlyph>,
    ) {
        let face = font_face.ttfp_face();
        let scale = font_face.metrics().scale(size);

        buf.extend(text.char_indices().map(|(cluster, c)| {
            let glyph_id = face.glyph_index(c).unwrap_or(GlyphId(0));
            let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);

            ShapedGlyph {
                cluster,
                ..ShapedGlyph::new(glyph_id, advance as f32 * scale)
            }
        }));
    }
}
