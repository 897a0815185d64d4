use std::fmt;
use std::sync::Arc;

use ttf_parser::Face;
pub use ttf_parser::GlyphId;

use crate::{Error, ErrorKind, Result};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct FontId(pub u32);

impl FontId {
    pub const DUMMY: FontId = FontId(u32::MAX);
}

self_cell::self_cell! {
    struct FaceRef {
        owner: Arc<dyn AsRef<[u8]> + Send + Sync>,
        #[covariant]
        dependent: Face,
    }
}

/// A parsed font face together with the data it was parsed from.
pub struct FontFace {
    id: FontId,
    face_ref: FaceRef,
    face_index: u32,
    metrics: FontMetrics,
}

impl FontFace {
    pub fn new(
        id: FontId,
        data: Arc<dyn AsRef<[u8]> + Send + Sync>,
        face_index: u32,
    ) -> Result<FontFace> {
        let face_ref = FaceRef::try_new(data, |data| Face::parse((**data).as_ref(), face_index))
            .map_err(|e| Error::wrap(ErrorKind::InvalidFont, e))?;

        let metrics = FontMetrics::from_ttfp_face(face_ref.borrow_dependent());

        Ok(FontFace {
            id,
            face_ref,
            face_index,
            metrics,
        })
    }

    pub fn id(&self) -> FontId {
        self.id
    }

    pub fn data(&self) -> &Arc<dyn AsRef<[u8]> + Send + Sync> {
        self.face_ref.borrow_owner()
    }

    pub fn ttfp_face(&self) -> &Face {
        self.face_ref.borrow_dependent()
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("id", &self.id)
            .field("face_index", &self.face_index)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

/// Vertical metrics of a face, in font units.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct FontMetrics {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub units_per_em: u16,
}

impl FontMetrics {
    fn from_ttfp_face(face: &Face<'_>) -> FontMetrics {
        FontMetrics {
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
            units_per_em: face.units_per_em(),
        }
    }

    /// Factor converting font units to pixels at the given pixel size.
    pub fn scale(&self, size: f32) -> f32 {
        if self.units_per_em == 0 {
            return 0.0;
        }

        size / self.units_per_em as f32
    }

    /// Distance from the top of a line to the baseline, in pixels.
    pub fn baseline(&self, size: f32) -> f32 {
        self.ascender as f32 * self.scale(size)
    }
}
