use std::collections::{hash_map, HashMap};
use std::fmt;
use std::sync::Arc;

use quill_core::math::IVec2;
use quill_core::text::{FontFace, FontId, GlyphId, ShapedGlyph, TextShaper};
use rustybuzz::{Direction, Face, UnicodeBuffer};

self_cell::self_cell! {
    struct CachedFace {
        owner: Arc<dyn AsRef<[u8]> + Send + Sync>,
        #[covariant]
        dependent: Face,
    }
}

/// Shapes left-to-right text with rustybuzz. Faces are parsed once per
/// [`FontId`] and kept around.
#[derive(Default)]
pub struct RustybuzzShaper {
    buffer: UnicodeBuffer,
    faces: HashMap<FontId, CachedFace>,
}

impl RustybuzzShaper {
    pub fn new() -> RustybuzzShaper {
        RustybuzzShaper::default()
    }
}

impl TextShaper for RustybuzzShaper {
    fn shape(
        &mut self,
        font_face: &FontFace,
        text: &str,
        size: f32,
        buf: &mut Vec<ShapedGlyph>,
    ) {
        let face = match self.faces.entry(font_face.id()) {
            hash_map::Entry::Occupied(v) => v.into_mut().borrow_dependent(),
            hash_map::Entry::Vacant(v) => {
                let index = font_face.face_index();
                let cached_face = match CachedFace::try_new(Arc::clone(font_face.data()), |data| {
                    rustybuzz::ttf_parser::Face::parse((**data).as_ref(), index)
                        .map(Face::from_face)
                }) {
                    Ok(v) => v,
                    Err(e) => {
                        log::warn!("failed to parse font {} for shaping: {}", font_face.id().0, e);
                        return;
                    }
                };

                v.insert(cached_face).borrow_dependent()
            }
        };

        let scale = font_face.metrics().scale(size);

        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.clear();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        buffer.set_direction(Direction::LeftToRight);

        let glyphs = rustybuzz::shape(face, &[], buffer);

        let it = glyphs.glyph_infos().iter().zip(glyphs.glyph_positions());
        buf.extend(it.map(|(info, pos)| ShapedGlyph {
            glyph_id: GlyphId(info.glyph_id as u16),
            cluster: info.cluster as usize,
            x_advance: pos.x_advance as f32 * scale,
            y_advance: -pos.y_advance as f32 * scale,
            offset: IVec2::new(pos.x_offset, -pos.y_offset).as_vec2() * scale,
        }));

        self.buffer = glyphs.clear();
    }
}

impl fmt::Debug for RustybuzzShaper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RustybuzzShaper")
            .field("faces", &self.faces.len())
            .finish_non_exhaustive()
    }
}
