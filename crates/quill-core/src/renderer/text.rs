use crate::renderer::{AssembleParams, TextDraw, TextVertex, VertexAssembler};
use crate::text::{layout_text, GlyphKey, LayoutParams, RasterizedGlyph, Segment, TextLayout};
use crate::{Color, GlyphAtlas, Result, TextRendererConfig, TextureCommand, TextureId};

/// Owns the glyph atlas and the vertex buffer, and turns text into
/// [`TextDraw`]s.
///
/// Shaping and rasterization are left to the caller, which passes them in as
/// closures.
#[derive(Debug)]
pub struct TextRenderer {
    atlas: GlyphAtlas,
    assembler: VertexAssembler,
    config: TextRendererConfig,
}

impl TextRenderer {
    pub fn new(texture: TextureId, config: TextRendererConfig) -> Result<TextRenderer> {
        config.validate()?;

        Ok(TextRenderer {
            atlas: GlyphAtlas::new(texture, &config.atlas)?,
            assembler: VertexAssembler::new(config.viewport),
            config,
        })
    }

    pub fn config(&self) -> &TextRendererConfig {
        &self.config
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    /// Splits `text` into words, shapes them with `shape` and wraps them into
    /// lines.
    pub fn layout(
        &self,
        text: &str,
        params: &LayoutParams,
        shape: impl FnMut(&str) -> Segment,
    ) -> TextLayout {
        layout_text(text, params, shape)
    }

    /// Builds the vertices of `layout`, rasterizing glyphs missing from the
    /// atlas with `rasterize`.
    ///
    /// The texture commands recorded along the way must reach the renderer
    /// before the draw, see
    /// [`take_texture_commands`](TextRenderer::take_texture_commands).
    pub fn prepare(
        &mut self,
        layout: &TextLayout,
        params: &AssembleParams,
        rasterize: impl FnMut(&GlyphKey) -> Result<RasterizedGlyph>,
    ) -> Result<&[TextVertex]> {
        self.assembler.assemble(layout, &mut self.atlas, params, rasterize)
    }

    /// The draw for the vertices built by the last
    /// [`prepare`](TextRenderer::prepare).
    pub fn draw(&self, color: Color) -> TextDraw<'_> {
        TextDraw {
            texture: self.atlas.texture(),
            vertices: self.assembler.vertices(),
            color,
        }
    }

    pub fn take_texture_commands(&mut self) -> Vec<TextureCommand> {
        self.atlas.take_commands()
    }

    /// Destroys the renderer, recording the commands that release its atlas
    /// texture.
    pub fn free(self, commands: &mut Vec<TextureCommand>) {
        self.atlas.free(commands);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{UVec2, Vec2};
    use crate::text::{FontId, GlyphId, ShapedGlyph};
    use crate::{AtlasConfig, ErrorKind, ImageData, ImageFormat};

    fn shape(word: &str) -> Segment {
        Segment::new(word.chars().map(|c| ShapedGlyph::new(GlyphId(c as u16), 9.0)))
    }

    fn rasterize(_: &GlyphKey) -> Result<RasterizedGlyph> {
        Ok(RasterizedGlyph {
            image: ImageData {
                format: ImageFormat::Gray8,
                size: UVec2::new(6, 6),
                data: vec![0xff; 36],
            },
            offset: Vec2::new(0.0, -6.0),
        })
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TextRendererConfig {
            atlas: AtlasConfig {
                size: 64,
                cell_size: 32,
                cache_capacity: 100,
            },
            viewport: None,
        };

        let err = TextRenderer::new(TextureId(0), config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn prepare_draws_from_the_atlas_texture() {
        let mut renderer = TextRenderer::new(TextureId(3), Default::default()).unwrap();
        let params = LayoutParams {
            max_width: 100.0,
            line_height: 16.0,
            word_gap: 4.0,
        };
        let layout = renderer.layout("hi there", &params, shape);
        let assemble = AssembleParams {
            origin: Vec2::ZERO,
            baseline: 12.0,
            font: FontId(1),
            size: 12.0,
        };

        let vertices = renderer.prepare(&layout, &assemble, rasterize).unwrap();
        assert_eq!(vertices.len(), 7 * 6);

        let draw = renderer.draw(Color::BLACK);
        assert_eq!(draw.texture, TextureId(3));
        assert_eq!(draw.color, Color::BLACK);
        assert_eq!(draw.glyph_count(), 7);

        // create + one write per distinct glyph: h, i, t, e, r
        assert_eq!(renderer.take_texture_commands().len(), 6);
        assert_eq!(renderer.atlas().len(), 5);
    }

    #[test]
    fn free_releases_the_atlas_texture() {
        let renderer = TextRenderer::new(TextureId(9), Default::default()).unwrap();
        let mut commands = Vec::new();
        renderer.free(&mut commands);

        assert_eq!(commands.last(), Some(&TextureCommand::Free { id: TextureId(9) }));
    }
}
