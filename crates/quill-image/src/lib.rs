use quill_core::math::{UVec2, Vec2};
use quill_core::text::{FontFace, GlyphId, RasterizedGlyph, Rasterizer};
use quill_core::{ImageData, ImageFormat};

/// Rasterizes glyphs stored as embedded bitmaps (`sbix`, `CBDT`), which is
/// how most colour emoji fonts ship. Bitmaps larger than the requested size
/// are scaled down.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedImageRasterizer;

impl Rasterizer for EmbeddedImageRasterizer {
    fn rasterize(
        &mut self,
        font_face: &FontFace,
        glyph_id: GlyphId,
        size: f32,
    ) -> Option<RasterizedGlyph> {
        let face = font_face.ttfp_face();

        let raster = face.glyph_raster_image(glyph_id, size.min(u16::MAX.into()) as u16)?;

        let mut image = match image::load_from_memory(raster.data) {
            Ok(v) => v.into_rgba8(),
            Err(e) => {
                log::warn!(
                    "failed to decode embedded bitmap of glyph {} in font {}: {}",
                    glyph_id.0,
                    font_face.id().0,
                    e
                );
                return None;
            }
        };

        let scale = (size / raster.pixels_per_em as f32).min(1.0);

        let old_size = UVec2::new(image.width(), image.height());
        let size = (old_size.as_vec2() * scale).as_uvec2();

        if size.cmpeq(UVec2::ZERO).any() {
            return Some(RasterizedGlyph::empty());
        }

        if size != old_size {
            image = image::imageops::resize(
                &image,
                size.x,
                size.y,
                image::imageops::FilterType::Lanczos3,
            );
        }

        let offset = Vec2::new(
            raster.x as f32,
            -(raster.height as f32) - (raster.y as f32),
        ) * scale;

        Some(RasterizedGlyph {
            image: ImageData {
                format: ImageFormat::Srgba8,
                size,
                data: image.into_raw(),
            },
            offset,
        })
    }
}
