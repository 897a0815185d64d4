use std::fmt;

use crate::lru::LruCache;
use crate::math::{URect, UVec2, Vec2};
use crate::text::{GlyphKey, RasterizedGlyph};
use crate::{AtlasConfig, Error, ErrorKind, ImageData, ImageFormat, Result};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct TextureId(pub u64);

/// Texture operations recorded on the CPU side and executed by a
/// [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, PartialEq)]
pub enum TextureCommand {
    CreateDynamic {
        id: TextureId,
        format: ImageFormat,
        size: UVec2,
    },
    Write {
        dst_id: TextureId,
        dst_rect: URect,
        data: ImageData,
    },
    Free {
        id: TextureId,
    },
}

/// Hands out fixed-size square cells of the atlas texture in row-major
/// order. Cells given back with [`release`](GlyphView::release) are reused
/// before new ones are taken.
#[derive(Debug, Clone)]
pub struct GlyphView {
    cell_size: u32,
    cells_per_row: u32,
    total_cells: u32,
    next: u32,
    free_cells: Vec<URect>,
}

impl GlyphView {
    pub fn new(config: &AtlasConfig) -> Result<GlyphView> {
        config.validate()?;

        let cells_per_row = config.cells_per_row();

        Ok(GlyphView {
            cell_size: config.cell_size,
            cells_per_row,
            total_cells: cells_per_row * cells_per_row,
            next: 0,
            free_cells: Vec::new(),
        })
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn total_cells(&self) -> usize {
        self.total_cells as usize
    }

    /// Number of cells that can still be handed out.
    pub fn available(&self) -> usize {
        (self.total_cells - self.next) as usize + self.free_cells.len()
    }

    /// Returns the rectangle of the `index`-th cell.
    pub fn cell_rect(&self, index: u32) -> URect {
        let x = index % self.cells_per_row;
        let y = index / self.cells_per_row;
        URect::from_pos_size(
            UVec2::new(x, y) * self.cell_size,
            UVec2::splat(self.cell_size),
        )
    }

    /// Returns the next unused cell, or `None` once every cell is taken.
    pub fn next(&mut self) -> Option<URect> {
        if let Some(rect) = self.free_cells.pop() {
            return Some(rect);
        }

        if self.next >= self.total_cells {
            return None;
        }

        let rect = self.cell_rect(self.next);
        self.next += 1;
        Some(rect)
    }

    /// Gives a cell back so it can be handed out again.
    pub fn release(&mut self, rect: URect) {
        self.free_cells.push(rect);
    }

    /// Records the upload of `image` into the cell `rect` of `texture`.
    ///
    /// Bitmaps larger than a cell are cropped to it, smaller ones are padded
    /// with transparent pixels so the whole cell is overwritten. Returns the
    /// size of the bitmap inside the cell.
    pub fn into_cell(
        &self,
        texture: TextureId,
        image: ImageData,
        rect: URect,
        commands: &mut Vec<TextureCommand>,
    ) -> UVec2 {
        let cell = rect.size();
        if image.size.cmpgt(cell).any() {
            log::warn!(
                "glyph bitmap {}x{} does not fit into a {}x{} atlas cell, cropping",
                image.size.x,
                image.size.y,
                cell.x,
                cell.y
            );
        }

        let image = image.crop(cell).into_srgba8();
        let size = image.size;

        commands.push(TextureCommand::Write {
            dst_id: texture,
            dst_rect: rect,
            data: image.pad(cell),
        });

        size
    }
}

/// Where a glyph lives in the atlas, plus what's needed to place its quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphSlot {
    /// The atlas cell.
    pub rect: URect,
    /// Size of the bitmap inside the cell. Never larger than the cell.
    pub size: UVec2,
    /// Position of the bitmap relative to the pen on the baseline.
    pub offset: Vec2,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct AtlasStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Number of glyphs currently cached.
    pub glyphs: usize,
}

#[derive(Debug, Clone, Copy)]
struct CachedGlyph {
    slot: GlyphSlot,
    /// Frame of the last lookup.
    frame: u64,
}

/// A single texture holding rasterized glyphs in fixed-size cells, with an
/// LRU index from glyph to cell.
///
/// [`get_slot`](GlyphAtlas::get_slot) is the only way glyphs get in, which
/// keeps the index and the texture contents in sync.
///
/// Lookups are grouped into frames with
/// [`begin_frame`](GlyphAtlas::begin_frame). A glyph looked up in the current
/// frame is never evicted, since vertices built earlier in the frame still
/// point at its cell.
pub struct GlyphAtlas {
    texture: TextureId,
    size: UVec2,
    view: GlyphView,
    cache: LruCache<GlyphKey, CachedGlyph>,
    frame: u64,
    commands: Vec<TextureCommand>,
    stats: AtlasStats,
}

impl GlyphAtlas {
    pub fn new(texture: TextureId, config: &AtlasConfig) -> Result<GlyphAtlas> {
        let view = GlyphView::new(config)?;
        let size = config.texture_size();

        log::debug!(
            "creating {}x{} glyph atlas with {}px cells, caching up to {} glyphs",
            size.x,
            size.y,
            config.cell_size,
            config.cache_capacity
        );

        Ok(GlyphAtlas {
            texture,
            size,
            view,
            cache: LruCache::new(config.cache_capacity),
            frame: 0,
            commands: vec![TextureCommand::CreateDynamic {
                id: texture,
                format: ImageFormat::Srgba8,
                size,
            }],
            stats: AtlasStats::default(),
        })
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn texture_size(&self) -> UVec2 {
        self.size
    }

    pub fn cell_size(&self) -> u32 {
        self.view.cell_size()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    pub fn stats(&self) -> AtlasStats {
        AtlasStats {
            glyphs: self.cache.len(),
            ..self.stats
        }
    }

    pub fn contains(&self, key: &GlyphKey) -> bool {
        self.cache.contains(key)
    }

    /// Starts a new frame. Glyphs looked up from now on may evict the ones
    /// looked up before.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
    }

    /// Returns the slot of the glyph and whether it was already cached.
    ///
    /// On a miss the glyph is rasterized with `rasterize`, written into a
    /// free cell and cached. If the cache is full, the least recently used
    /// glyph is evicted first and its cell reused.
    ///
    /// Fails with [`ErrorKind::AtlasAlloc`] when every cached glyph was used
    /// in the current frame. Errors leave the atlas untouched.
    pub fn get_slot(
        &mut self,
        key: GlyphKey,
        rasterize: impl FnOnce(&GlyphKey) -> Result<RasterizedGlyph>,
    ) -> Result<(GlyphSlot, bool)> {
        if let Some(cached) = self.cache.get_mut(&key) {
            log::trace!("glyph {} of font {} cached", key.glyph.0, key.font.0);
            cached.frame = self.frame;
            self.stats.hits += 1;
            return Ok((cached.slot, true));
        }

        self.stats.misses += 1;
        log::trace!("glyph {} of font {} not cached", key.glyph.0, key.font.0);

        // glyphs of the current frame are always the most recent ones
        let pinned = match self.cache.peek_oldest() {
            Some((_, oldest)) => self.cache.is_full() && oldest.frame == self.frame,
            None => false,
        };
        if pinned {
            return Err(Error::new(
                ErrorKind::AtlasAlloc,
                format!(
                    "all {} cached glyphs are used by the current frame",
                    self.cache.len()
                ),
            ));
        }

        let glyph = rasterize(&key)?;

        if self.cache.is_full() {
            if let Some((evicted, CachedGlyph { slot, .. })) = self.cache.pop_oldest() {
                log::debug!(
                    "evicting glyph {} of font {} from cell ({}, {})",
                    evicted.glyph.0,
                    evicted.font.0,
                    slot.rect.min.x,
                    slot.rect.min.y
                );
                self.stats.evictions += 1;
                self.view.release(slot.rect);
            }
        }

        let rect = self.view.next().ok_or_else(|| {
            Error::new(
                ErrorKind::AtlasAlloc,
                format!(
                    "all {} atlas cells are in use",
                    self.view.total_cells()
                ),
            )
        })?;

        let size = self
            .view
            .into_cell(self.texture, glyph.image, rect, &mut self.commands);

        let slot = GlyphSlot {
            rect,
            size,
            offset: glyph.offset,
        };

        let cached = CachedGlyph {
            slot,
            frame: self.frame,
        };
        if let Some((_, rejected)) = self.cache.store(key, cached) {
            self.view.release(rejected.slot.rect);
        }

        Ok((slot, false))
    }

    /// Drains the texture commands recorded since the last call.
    pub fn take_commands(&mut self) -> Vec<TextureCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn has_pending_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Destroys the atlas, recording the command that frees its texture.
    pub fn free(mut self, commands: &mut Vec<TextureCommand>) {
        commands.append(&mut self.commands);
        commands.push(TextureCommand::Free { id: self.texture });
    }
}

impl fmt::Debug for GlyphAtlas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphAtlas")
            .field("texture", &self.texture)
            .field("size", &self.size)
            .field("view", &self.view)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::text::{FontId, GlyphId};

    fn config(size: u32, cell_size: u32, cache_capacity: usize) -> AtlasConfig {
        AtlasConfig {
            size,
            cell_size,
            cache_capacity,
        }
    }

    fn key(glyph: u16) -> GlyphKey {
        GlyphKey::new(FontId(0), GlyphId(glyph), 32.0)
    }

    fn glyph(size: UVec2) -> RasterizedGlyph {
        RasterizedGlyph {
            image: ImageData {
                format: ImageFormat::Gray8,
                size,
                data: vec![0xff; (size.x * size.y) as usize],
            },
            offset: Vec2::new(1.0, -(size.y as f32)),
        }
    }

    fn writes(commands: &[TextureCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, TextureCommand::Write { .. }))
            .count()
    }

    #[test]
    fn view_hands_out_cells_row_major() {
        let mut view = GlyphView::new(&config(1024, 32, 1024)).unwrap();

        assert_eq!(view.next().unwrap().min, UVec2::new(0, 0));
        assert_eq!(view.next().unwrap().min, UVec2::new(32, 0));

        for _ in 2..32 {
            view.next().unwrap();
        }

        let rect = view.next().unwrap();
        assert_eq!(rect, URect::new(UVec2::new(0, 32), UVec2::new(32, 64)));
    }

    #[test]
    fn view_cells_are_disjoint_and_inside_the_texture() {
        let mut view = GlyphView::new(&config(128, 32, 16)).unwrap();
        let texture = URect::new(UVec2::ZERO, UVec2::splat(128));

        let cells: Vec<_> = std::iter::from_fn(|| view.next()).collect();
        assert_eq!(cells.len(), 16);
        assert_eq!(cells.iter().collect::<HashSet<_>>().len(), 16);

        for (i, a) in cells.iter().enumerate() {
            assert!(texture.contains_rect(a));
            for b in &cells[i + 1..] {
                assert!(!a.intersects(b));
            }
        }

        assert_eq!(view.available(), 0);
        assert_eq!(view.next(), None);
    }

    #[test]
    fn view_reuses_released_cells_first() {
        let mut view = GlyphView::new(&config(64, 32, 4)).unwrap();
        let first = view.next().unwrap();
        view.next().unwrap();

        view.release(first);
        assert_eq!(view.available(), 3);
        assert_eq!(view.next(), Some(first));
        assert_eq!(view.next().unwrap().min, UVec2::new(0, 32));
    }

    #[test]
    fn into_cell_crops_and_converts() {
        let view = GlyphView::new(&config(64, 32, 4)).unwrap();
        let rect = view.cell_rect(3);
        let mut commands = Vec::new();

        let size = view.into_cell(
            TextureId(7),
            glyph(UVec2::new(40, 20)).image,
            rect,
            &mut commands,
        );

        assert_eq!(size, UVec2::new(32, 20));
        match &commands[..] {
            [TextureCommand::Write {
                dst_id,
                dst_rect,
                data,
            }] => {
                assert_eq!(*dst_id, TextureId(7));
                assert_eq!(*dst_rect, rect);
                assert_eq!(data.format, ImageFormat::Srgba8);
                assert_eq!(data.size, UVec2::splat(32));
                assert_eq!(data.data.len(), 32 * 32 * 4);
                // bitmap rows, then transparent padding below them
                assert_eq!(&data.data[..4], &[255, 255, 255, 255]);
                assert!(data.data[32 * 20 * 4..].iter().all(|&b| b == 0));
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn small_bitmaps_overwrite_the_whole_cell() {
        let view = GlyphView::new(&config(64, 32, 4)).unwrap();
        let rect = view.cell_rect(1);
        let mut commands = Vec::new();

        let image = glyph(UVec2::new(4, 2)).image;
        let size = view.into_cell(TextureId(0), image, rect, &mut commands);
        assert_eq!(size, UVec2::new(4, 2));

        match &commands[..] {
            [TextureCommand::Write { dst_rect, data, .. }] => {
                assert_eq!(*dst_rect, rect);
                assert_eq!(data.size, UVec2::splat(32));

                let stride = 32 * 4;
                for (y, row) in data.data.chunks_exact(stride).enumerate() {
                    for (x, pixel) in row.chunks_exact(4).enumerate() {
                        let alpha = pixel[3];
                        if x < 4 && y < 2 {
                            assert_eq!(alpha, 0xff);
                        } else {
                            assert_eq!(alpha, 0, "pixel ({}, {}) is not cleared", x, y);
                        }
                    }
                }
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn empty_bitmaps_clear_the_cell() {
        let view = GlyphView::new(&config(64, 32, 4)).unwrap();
        let mut commands = Vec::new();

        let size = view.into_cell(
            TextureId(0),
            ImageData::empty(ImageFormat::Gray8),
            view.cell_rect(0),
            &mut commands,
        );

        assert_eq!(size, UVec2::ZERO);
        match &commands[..] {
            [TextureCommand::Write { dst_rect, data, .. }] => {
                assert_eq!(*dst_rect, view.cell_rect(0));
                assert!(data.data.iter().all(|&b| b == 0));
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn atlas_creates_its_texture() {
        let mut atlas = GlyphAtlas::new(TextureId(1), &config(256, 32, 8)).unwrap();

        assert_eq!(
            atlas.take_commands(),
            [TextureCommand::CreateDynamic {
                id: TextureId(1),
                format: ImageFormat::Srgba8,
                size: UVec2::splat(256),
            }]
        );
        assert!(!atlas.has_pending_commands());
    }

    #[test]
    fn atlas_rejects_oversized_cache() {
        let err = GlyphAtlas::new(TextureId(1), &config(64, 32, 5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn repeated_lookups_hit_the_cache() {
        let mut atlas = GlyphAtlas::new(TextureId(1), &config(256, 32, 8)).unwrap();
        atlas.take_commands();

        let mut rasterized = 0;
        let mut lookup = |atlas: &mut GlyphAtlas| {
            atlas
                .get_slot(key(5), |_| {
                    rasterized += 1;
                    Ok(glyph(UVec2::new(10, 12)))
                })
                .unwrap()
        };

        let (first, cached) = lookup(&mut atlas);
        assert!(!cached);

        for _ in 0..3 {
            let (slot, cached) = lookup(&mut atlas);
            assert!(cached);
            assert_eq!(slot, first);
        }

        assert_eq!(rasterized, 1);
        assert_eq!(first.size, UVec2::new(10, 12));
        assert_eq!(first.offset, Vec2::new(1.0, -12.0));
        assert_eq!(writes(&atlas.take_commands()), 1);
        assert_eq!(
            atlas.stats(),
            AtlasStats {
                hits: 3,
                misses: 1,
                evictions: 0,
                glyphs: 1,
            }
        );
    }

    #[test]
    fn eviction_reclaims_the_cell() {
        let mut atlas = GlyphAtlas::new(TextureId(1), &config(64, 32, 4)).unwrap();
        let mut cells = Vec::new();

        for id in 0..4 {
            let (slot, _) = atlas
                .get_slot(key(id), |_| Ok(glyph(UVec2::splat(8))))
                .unwrap();
            cells.push(slot.rect);
        }

        atlas.begin_frame();
        atlas.take_commands();

        // touch glyph 0 so glyph 1 becomes the oldest
        assert!(atlas.get_slot(key(0), |_| unreachable!()).unwrap().1);

        let (slot, cached) = atlas
            .get_slot(key(9), |_| Ok(glyph(UVec2::splat(8))))
            .unwrap();

        assert!(!cached);
        assert_eq!(slot.rect, cells[1]);
        assert!(!atlas.contains(&key(1)));
        assert!(atlas.contains(&key(0)));
        assert_eq!(atlas.len(), 4);
        assert_eq!(atlas.stats().evictions, 1);

        // the reused cell is overwritten as a whole
        match &atlas.take_commands()[..] {
            [TextureCommand::Write { dst_rect, .. }] => assert_eq!(*dst_rect, cells[1]),
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn glyphs_of_the_current_frame_are_not_evicted() {
        let mut atlas = GlyphAtlas::new(TextureId(1), &config(64, 32, 4)).unwrap();
        atlas.begin_frame();

        let slots: Vec<_> = (0..4)
            .map(|id| {
                atlas
                    .get_slot(key(id), |_| Ok(glyph(UVec2::splat(8))))
                    .unwrap()
                    .0
            })
            .collect();
        atlas.take_commands();

        let err = atlas.get_slot(key(4), |_| unreachable!()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AtlasAlloc);

        // nothing was evicted or overwritten
        assert!(!atlas.has_pending_commands());
        assert_eq!(atlas.stats().evictions, 0);
        for (id, slot) in slots.iter().enumerate() {
            assert_eq!(atlas.cache.peek(&key(id as u16)).map(|c| c.slot), Some(*slot));
        }

        atlas.begin_frame();
        let (slot, cached) = atlas
            .get_slot(key(4), |_| Ok(glyph(UVec2::splat(8))))
            .unwrap();
        assert!(!cached);
        assert_eq!(slot.rect, slots[0].rect);
        assert!(!atlas.contains(&key(0)));
    }

    #[test]
    fn frame_pinning_covers_cache_hits() {
        let mut atlas = GlyphAtlas::new(TextureId(1), &config(64, 32, 4)).unwrap();

        for id in 0..4 {
            atlas
                .get_slot(key(id), |_| Ok(glyph(UVec2::splat(8))))
                .unwrap();
        }

        atlas.begin_frame();
        for id in [3, 2, 1, 0] {
            assert!(atlas.get_slot(key(id), |_| unreachable!()).unwrap().1);
        }

        let err = atlas.get_slot(key(7), |_| unreachable!()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AtlasAlloc);
        assert_eq!(atlas.len(), 4);
    }

    #[test]
    fn never_runs_out_of_cells_when_capacity_matches() {
        let mut atlas = GlyphAtlas::new(TextureId(1), &config(64, 32, 4)).unwrap();

        for id in 0..100 {
            atlas.begin_frame();
            let (slot, _) = atlas
                .get_slot(key(id % 11), |_| Ok(glyph(UVec2::splat(4))))
                .unwrap();
            assert!(slot.rect.max.cmple(UVec2::splat(64)).all());
        }

        assert_eq!(atlas.len(), 4);
    }

    #[test]
    fn live_glyphs_never_share_a_cell() {
        let mut atlas = GlyphAtlas::new(TextureId(1), &config(128, 32, 10)).unwrap();

        for id in [1, 2, 3, 1, 4, 5, 6, 7, 8, 9, 10, 11, 2, 12, 3, 13, 1] {
            atlas.begin_frame();
            atlas
                .get_slot(key(id), |_| Ok(glyph(UVec2::splat(4))))
                .unwrap();

            let rects: Vec<_> = atlas.cache.iter().map(|(_, c)| c.slot.rect).collect();
            let unique: HashSet<_> = rects.iter().collect();
            assert_eq!(unique.len(), rects.len());
        }
    }

    #[test]
    fn failed_rasterization_leaves_atlas_untouched() {
        let mut atlas = GlyphAtlas::new(TextureId(1), &config(64, 32, 4)).unwrap();
        atlas.take_commands();

        let err = atlas
            .get_slot(key(3), |_| {
                Err(Error::new(ErrorKind::Rasterization, "no outline"))
            })
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Rasterization);
        assert!(atlas.is_empty());
        assert!(!atlas.has_pending_commands());
        assert_eq!(atlas.view.available(), 4);
    }

    #[test]
    fn free_releases_the_texture() {
        let atlas = GlyphAtlas::new(TextureId(4), &config(64, 32, 4)).unwrap();
        let mut commands = Vec::new();
        atlas.free(&mut commands);

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1], TextureCommand::Free { id: TextureId(4) });
    }
}
