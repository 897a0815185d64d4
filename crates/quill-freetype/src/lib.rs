use std::borrow::Borrow;
use std::collections::{hash_map, HashMap};
use std::sync::Arc;

use freetype::bitmap::PixelMode;
use freetype::face::LoadFlag;
use freetype::{Face, Library};
use quill_core::math::{UVec2, Vec2};
use quill_core::text::{FontFace, FontId, GlyphId, RasterizedGlyph, Rasterizer};
use quill_core::{ImageData, ImageFormat};

struct FaceBuffer(Arc<dyn AsRef<[u8]> + Send + Sync + 'static>);

impl Borrow<[u8]> for FaceBuffer {
    fn borrow(&self) -> &[u8] {
        (*self.0).as_ref()
    }
}

/// Rasterizes glyphs with FreeType, producing hinted coverage masks.
pub struct FreetypeRasterizer {
    faces: HashMap<FontId, Face<FaceBuffer>>,
    library: Option<Library>,
}

impl FreetypeRasterizer {
    pub fn new() -> FreetypeRasterizer {
        let library = match Library::init() {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("failed to initialize freetype: {}", e);
                None
            }
        };

        FreetypeRasterizer {
            faces: HashMap::default(),
            library,
        }
    }
}

impl Rasterizer for FreetypeRasterizer {
    fn rasterize(
        &mut self,
        font_face: &FontFace,
        glyph_id: GlyphId,
        size: f32,
    ) -> Option<RasterizedGlyph> {
        let face = match self.faces.entry(font_face.id()) {
            hash_map::Entry::Occupied(entry) => entry.into_mut(),
            hash_map::Entry::Vacant(entry) => {
                let face = self
                    .library
                    .as_mut()?
                    .new_memory_face2(
                        FaceBuffer(Arc::clone(font_face.data())),
                        font_face.face_index() as isize,
                    )
                    .map_err(|e| {
                        log::warn!("freetype failed to load font {}: {}", font_face.id().0, e)
                    })
                    .ok()?;
                entry.insert(face)
            }
        };

        let size = (size * 64.0) as isize;
        face.set_char_size(size, size, 72, 72).ok()?;
        face.load_glyph(glyph_id.0 as u32, LoadFlag::RENDER).ok()?;

        let glyph = face.glyph();
        let bitmap = glyph.bitmap();

        let pitch = bitmap.pitch().unsigned_abs() as usize;
        let width = bitmap.width() as usize;
        let height = bitmap.rows() as usize;

        if pitch == 0 || width == 0 || height == 0 {
            return Some(RasterizedGlyph::empty());
        }

        let format = match bitmap.pixel_mode().ok()? {
            PixelMode::Gray => ImageFormat::Gray8,
            _ => return None,
        };

        let offset = Vec2::new(glyph.bitmap_left() as f32, -glyph.bitmap_top() as f32);

        let rows = bitmap
            .buffer()
            .chunks(pitch)
            .map(|chunk| chunk[..width].iter().copied());

        let data = if bitmap.pitch() < 0 {
            rows.rev().flatten().collect::<Vec<_>>()
        } else {
            rows.flatten().collect::<Vec<_>>()
        };

        let image = ImageData {
            format,
            size: UVec2::new(width as u32, height as u32),
            data,
        };

        Some(RasterizedGlyph { image, offset })
    }
}

impl Default for FreetypeRasterizer {
    fn default() -> Self {
        FreetypeRasterizer::new()
    }
}
