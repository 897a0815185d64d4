use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::math::Vec2;
use crate::renderer::{AssembleParams, TextRenderer};
use crate::text::{
    DefaultTextShaper, FontFace, FontId, FontRasterizers, LayoutParams, Segment, ShapedGlyph,
    TextAttrs, TextLayout, TextShaper, WordSpacing,
};
use crate::{Error, ErrorKind, Renderer, Result, TextRendererConfig, TextureId};

/// Ties fonts, shaping, rasterization, the glyph atlas and a [`Renderer`]
/// together.
pub struct TextGraphics {
    pub renderer: Box<dyn Renderer>,
    pub fonts: HashMap<FontId, FontFace>,
    pub font_rasterizers: FontRasterizers,
    pub text_shaper: Box<dyn TextShaper>,
    pub text_renderer: TextRenderer,
    next_font_id: u32,
    shaping_buf: Vec<ShapedGlyph>,
}

impl TextGraphics {
    pub fn new<R: Renderer>(renderer: R, config: TextRendererConfig) -> Result<TextGraphics> {
        let mut graphics = TextGraphics {
            renderer: Box::new(renderer),
            fonts: HashMap::new(),
            font_rasterizers: FontRasterizers::new(),
            text_shaper: Box::new(DefaultTextShaper::new()),
            text_renderer: TextRenderer::new(TextureId::default(), config)?,
            next_font_id: 0,
            shaping_buf: Vec::new(),
        };

        graphics.default_init();

        Ok(graphics)
    }

    fn default_init(&mut self) {
        #[cfg(feature = "image")]
        self.font_rasterizers
            .add_rasterizer(quill_image::EmbeddedImageRasterizer);

        #[cfg(feature = "freetype")]
        self.font_rasterizers
            .add_rasterizer(quill_freetype::FreetypeRasterizer::new());

        #[cfg(feature = "zeno")]
        self.font_rasterizers
            .add_rasterizer(quill_zeno::ZenoRasterizer::new());
    }

    /// Parses a font face from `data` and registers it.
    pub fn add_font(
        &mut self,
        data: Arc<dyn AsRef<[u8]> + Send + Sync>,
        face_index: u32,
    ) -> Result<FontId> {
        let id = FontId(self.next_font_id);

        let face = FontFace::new(id, data, face_index).map_err(|e| {
            log::warn!("failed to parse font face {}: {}", face_index, e);
            e
        })?;

        self.next_font_id += 1;
        self.fonts.insert(id, face);

        Ok(id)
    }

    pub fn load_font_file(&mut self, path: impl AsRef<Path>, face_index: u32) -> Result<FontId> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| Error::from(e).with_context(format!("reading {}", path.display())))?;

        self.add_font(Arc::new(data), face_index)
    }

    pub fn font(&self, id: FontId) -> Option<&FontFace> {
        self.fonts.get(&id)
    }

    /// Lays out `text` and draws it with its top-left corner at `pos`.
    ///
    /// Returns the layout, whose size can be used to place things around the
    /// text. Atlas uploads are handed to the renderer even if the draw fails.
    pub fn draw_text(
        &mut self,
        font: FontId,
        text: &str,
        attrs: &TextAttrs,
        pos: Vec2,
    ) -> Result<TextLayout> {
        let face = self.fonts.get(&font).ok_or_else(|| {
            Error::new(ErrorKind::InvalidId, format!("unknown font {}", font.0))
        })?;

        let shaper = &mut *self.text_shaper;
        let buf = &mut self.shaping_buf;
        let size = attrs.size;

        let word_gap = match attrs.word_spacing {
            WordSpacing::Px(v) => v,
            WordSpacing::SpaceAdvance => {
                buf.clear();
                shaper.shape(face, " ", size, buf);
                buf.iter().map(|g| g.x_advance).sum()
            }
        };

        let params = LayoutParams {
            max_width: attrs.max_width,
            line_height: attrs.line_height_px(),
            word_gap,
        };

        let layout = self.text_renderer.layout(text, &params, |word| {
            buf.clear();
            shaper.shape(face, word, size, buf);
            Segment::new(buf.drain(..))
        });

        log::trace!(
            "laid out {} glyphs in {} lines ({}x{})",
            layout.glyph_count,
            layout.line_count,
            layout.width,
            layout.height
        );

        let assemble = AssembleParams {
            origin: pos,
            baseline: face.metrics().baseline(size),
            font,
            size,
        };

        let rasterizers = &mut self.font_rasterizers;
        let prepared = self
            .text_renderer
            .prepare(&layout, &assemble, |key| rasterizers.rasterize_key(face, key))
            .map(|_| ());

        let commands = self.text_renderer.take_texture_commands();
        if !commands.is_empty() {
            self.renderer.update_textures(&commands)?;
        }

        prepared?;

        let draw = self.text_renderer.draw(attrs.color);
        if !draw.vertices.is_empty() {
            self.renderer.draw_text(&draw)?;
        }

        Ok(layout)
    }
}
