use crate::math::UVec2;
use crate::{Error, ErrorKind, Result};

/// Geometry of the glyph atlas texture and capacity of its glyph cache.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct AtlasConfig {
    /// Side of the square atlas texture in pixels.
    pub size: u32,
    /// Side of a single square glyph cell in pixels.
    pub cell_size: u32,
    /// Maximum number of glyphs kept in the cache. Must not exceed
    /// [`total_cells`](AtlasConfig::total_cells).
    pub cache_capacity: usize,
}

impl AtlasConfig {
    pub fn cells_per_row(&self) -> u32 {
        if self.cell_size == 0 {
            return 0;
        }

        self.size / self.cell_size
    }

    pub fn total_cells(&self) -> usize {
        let per_row = self.cells_per_row() as usize;
        per_row * per_row
    }

    pub fn texture_size(&self) -> UVec2 {
        UVec2::splat(self.size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cell_size == 0 {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                "atlas cell size must not be zero",
            ));
        }

        if self.cell_size > self.size {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!(
                    "atlas cell size {} is larger than the atlas size {}",
                    self.cell_size, self.size
                ),
            ));
        }

        if self.cache_capacity == 0 {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                "glyph cache capacity must not be zero",
            ));
        }

        if self.cache_capacity > self.total_cells() {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!(
                    "glyph cache capacity {} exceeds the {} cells of a {}px atlas with {}px cells",
                    self.cache_capacity,
                    self.total_cells(),
                    self.size,
                    self.cell_size
                ),
            ));
        }

        Ok(())
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        AtlasConfig {
            size: 1024,
            cell_size: 32,
            cache_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct TextRendererConfig {
    pub atlas: AtlasConfig,
    /// When set, vertex positions are divided by the viewport size, giving
    /// coordinates in `0..=1`. Otherwise they stay in pixels.
    pub viewport: Option<UVec2>,
}

impl TextRendererConfig {
    pub fn validate(&self) -> Result<()> {
        self.atlas.validate()?;

        if let Some(viewport) = self.viewport {
            if viewport.cmpeq(UVec2::ZERO).any() {
                return Err(Error::new(
                    ErrorKind::InvalidConfig,
                    format!("viewport {}x{} has no area", viewport.x, viewport.y),
                ));
            }
        }

        Ok(())
    }
}
