use crate::math::{vec2, UVec2, Vec2};
use crate::text::{FontId, GlyphKey, RasterizedGlyph, TextLayout};
use crate::{GlyphAtlas, GlyphSlot, Result};

pub const VERTICES_PER_GLYPH: usize = 6;
pub const FLOATS_PER_VERTEX: usize = 4;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextVertex {
    pub pos: Vec2,
    pub tex: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssembleParams {
    /// Top-left corner of the text.
    pub origin: Vec2,
    /// Distance from the top of a line to its baseline.
    pub baseline: f32,
    pub font: FontId,
    /// Font size in pixels.
    pub size: f32,
}

/// Turns laid out text into a triangle list of textured glyph quads.
///
/// The vertex buffer is reused between calls.
#[derive(Debug, Default)]
pub struct VertexAssembler {
    vertices: Vec<TextVertex>,
    viewport: Option<UVec2>,
}

impl VertexAssembler {
    /// With a `viewport`, positions are divided by its size. A viewport
    /// without area is ignored.
    pub fn new(viewport: Option<UVec2>) -> VertexAssembler {
        VertexAssembler {
            vertices: Vec::new(),
            viewport: viewport.filter(|v| v.cmpne(UVec2::ZERO).all()),
        }
    }

    pub fn viewport(&self) -> Option<UVec2> {
        self.viewport
    }

    /// Builds the vertices for every glyph of `layout`, looking each one up in
    /// `atlas` and rasterizing the ones it doesn't have yet.
    ///
    /// Each call is one atlas frame, so a layout with more distinct glyphs
    /// than the atlas caches fails with
    /// [`ErrorKind::AtlasAlloc`](crate::ErrorKind::AtlasAlloc). Fails on the
    /// first glyph that can't be placed, leaving the buffer empty. Uploads
    /// recorded for the glyphs before it stay in the atlas.
    pub fn assemble(
        &mut self,
        layout: &TextLayout,
        atlas: &mut GlyphAtlas,
        params: &AssembleParams,
        mut rasterize: impl FnMut(&GlyphKey) -> Result<RasterizedGlyph>,
    ) -> Result<&[TextVertex]> {
        self.vertices.clear();
        self.vertices.reserve(layout.glyph_count * VERTICES_PER_GLYPH);
        atlas.begin_frame();

        if let Err(e) = self.push_layout(layout, atlas, params, &mut rasterize) {
            log::error!("aborting text draw: {}", e);
            self.vertices.clear();
            return Err(e);
        }

        log::trace!("assembled {} glyphs", self.glyph_count());

        Ok(&self.vertices)
    }

    fn push_layout(
        &mut self,
        layout: &TextLayout,
        atlas: &mut GlyphAtlas,
        params: &AssembleParams,
        rasterize: &mut impl FnMut(&GlyphKey) -> Result<RasterizedGlyph>,
    ) -> Result<()> {
        let atlas_size = atlas.texture_size();

        for placed in &layout.segments {
            let mut pen =
                params.origin + vec2(placed.x_offset, placed.y_offset + params.baseline);

            for glyph in &placed.segment.glyphs {
                let key = GlyphKey::new(params.font, glyph.glyph_id, params.size);
                let (slot, _) = atlas.get_slot(key, |key| rasterize(key))?;

                self.quad(pen + glyph.offset + slot.offset, &slot, atlas_size);

                pen += vec2(glyph.x_advance, glyph.y_advance);
            }
        }

        Ok(())
    }

    fn quad(&mut self, pos: Vec2, slot: &GlyphSlot, atlas_size: UVec2) {
        let size = slot.size.as_vec2();

        // only sample the part of the cell the bitmap covers
        let (tex_min, _) = slot.rect.normalize(atlas_size);
        let tex_max = tex_min + size / atlas_size.as_vec2();

        let (min, max) = match self.viewport {
            Some(viewport) => {
                let viewport = viewport.as_vec2();
                (pos / viewport, (pos + size) / viewport)
            }
            None => (pos, pos + size),
        };

        let top_left = TextVertex {
            pos: min,
            tex: tex_min,
        };
        let top_right = TextVertex {
            pos: vec2(max.x, min.y),
            tex: vec2(tex_max.x, tex_min.y),
        };
        let bottom_left = TextVertex {
            pos: vec2(min.x, max.y),
            tex: vec2(tex_min.x, tex_max.y),
        };
        let bottom_right = TextVertex {
            pos: max,
            tex: tex_max,
        };

        self.vertices.extend_from_slice(&[
            top_left,
            top_right,
            bottom_left,
            bottom_left,
            top_right,
            bottom_right,
        ]);
    }

    pub fn vertices(&self) -> &[TextVertex] {
        &self.vertices
    }

    /// The vertex buffer as a flat `x, y, u, v` float stream.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn glyph_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_GLYPH
    }
}
