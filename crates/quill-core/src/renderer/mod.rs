use crate::{Color, Result, TextureCommand, TextureId};

mod assembler;
mod text;

pub use self::assembler::*;
pub use self::text::*;

/// One draw call worth of text: quads sampling from a single atlas texture.
#[derive(Debug, Clone, Copy)]
pub struct TextDraw<'a> {
    pub texture: TextureId,
    /// Two triangles per glyph, [`VERTICES_PER_GLYPH`] vertices each.
    pub vertices: &'a [TextVertex],
    pub color: Color,
}

impl TextDraw<'_> {
    pub fn glyph_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_GLYPH
    }
}

/// The graphics side of the pipeline.
pub trait Renderer: Send + Sync + 'static {
    fn update_textures(&mut self, commands: &[TextureCommand]) -> Result<()>;

    fn draw_text(&mut self, draw: &TextDraw<'_>) -> Result<()>;
}
