//! Semantic tile categories.
//!
//! Two sources merge here: read-only defaults shipped with the asset pack and
//! operator overrides kept in the catalog store. An override always wins.

use crate::grid::{TileGridStack, TileIndex};
use crate::pixels::TilePixelFlags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Semantic tag for a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileCategory {
    /// Ground cover
    Terrain,
    /// Roads and walkways
    Paths,
    /// Decorations and scattered objects
    Props,
    /// Structures
    Buildings,
}

/// An inclusive tile index range pre-tagged by the asset pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRange {
    /// Tag applied to the range
    pub category: TileCategory,
    /// First tile index
    pub start: TileIndex,
    /// Last tile index, inclusive
    pub end: TileIndex,
}

/// Which tiles the palette shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaletteFilter {
    /// Every visible tile
    #[default]
    All,
    /// Tiles resolving to one category
    Category(TileCategory),
    /// Tiles with no category at all
    Untagged,
}

/// Category assignments for one tileset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    pack: BTreeMap<TileIndex, TileCategory>,
    overrides: BTreeMap<TileIndex, TileCategory>,
}

impl CategoryIndex {
    /// Index seeded from pack ranges and persisted operator overrides.
    pub fn new(pack_ranges: &[CategoryRange], overrides: BTreeMap<TileIndex, TileCategory>) -> Self {
        let mut pack = BTreeMap::new();
        for range in pack_ranges {
            for tile in range.start..=range.end {
                pack.insert(tile, range.category);
            }
        }
        Self { pack, overrides }
    }

    /// `override ?? pack default ?? none`.
    pub fn resolve(&self, tile: TileIndex) -> Option<TileCategory> {
        self.overrides
            .get(&tile)
            .or_else(|| self.pack.get(&tile))
            .copied()
    }

    /// Operator overrides only; this is what gets persisted.
    pub fn overrides(&self) -> &BTreeMap<TileIndex, TileCategory> {
        &self.overrides
    }

    /// Sets or clears the operator override for one tile.
    ///
    /// `None` drops the override so the pack default shows through again.
    /// Returns whether anything changed.
    pub fn assign(&mut self, tile: TileIndex, category: Option<TileCategory>) -> bool {
        match category {
            Some(c) => self.overrides.insert(tile, c) != Some(c),
            None => self.overrides.remove(&tile).is_some(),
        }
    }

    /// Applies [`Self::assign`] to every tile, skipping pixel-hidden ones.
    pub fn bulk_assign<I>(&mut self, tiles: I, category: Option<TileCategory>, flags: &TilePixelFlags) -> usize
    where
        I: IntoIterator<Item = TileIndex>,
    {
        let targets: Vec<TileIndex> = tiles.into_iter().filter(|&t| !flags.is_hidden(t)).collect();
        let changed = targets
            .into_iter()
            .filter(|&t| self.assign(t, category))
            .count();
        debug!(?category, changed, "bulk category assignment");
        changed
    }

    /// Tags every used, visible, untagged tile: `props` when it sits on an
    /// overlay or has transparent pixels, `terrain` otherwise.
    pub fn auto_tag_used(&mut self, stack: &TileGridStack, flags: &TilePixelFlags) -> usize {
        let mut tagged = 0;
        for (tile, on_overlay) in stack.used_tiles() {
            if flags.is_hidden(tile) || self.resolve(tile).is_some() {
                continue;
            }
            let category = if on_overlay || flags.is_transparent(tile) {
                TileCategory::Props
            } else {
                TileCategory::Terrain
            };
            self.overrides.insert(tile, category);
            tagged += 1;
        }
        debug!(tagged, "auto-tagged used tiles");
        tagged
    }

    /// Tile indices in `0..tile_count` the palette shows under `filter`.
    pub fn palette(&self, tile_count: usize, filter: PaletteFilter, flags: &TilePixelFlags) -> Vec<TileIndex> {
        (0..tile_count as TileIndex)
            .filter(|&t| !flags.is_hidden(t))
            .filter(|&t| match filter {
                PaletteFilter::All => true,
                PaletteFilter::Category(c) => self.resolve(t) == Some(c),
                PaletteFilter::Untagged => self.resolve(t).is_none(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_index() -> CategoryIndex {
        CategoryIndex::new(
            &[CategoryRange {
                category: TileCategory::Buildings,
                start: 10,
                end: 12,
            }],
            BTreeMap::new(),
        )
    }

    #[test]
    fn override_wins_and_clearing_restores_pack_default() {
        let mut index = pack_index();
        assert_eq!(index.resolve(11), Some(TileCategory::Buildings));

        assert!(index.assign(11, Some(TileCategory::Props)));
        assert_eq!(index.resolve(11), Some(TileCategory::Props));
        assert!(!index.assign(11, Some(TileCategory::Props)));

        assert!(index.assign(11, None));
        assert_eq!(index.resolve(11), Some(TileCategory::Buildings));
        assert!(!index.assign(11, None));
    }

    #[test]
    fn bulk_assign_skips_hidden_tiles() {
        let mut index = CategoryIndex::default();
        let flags = TilePixelFlags::new(vec![], vec![false, true, false]);
        let changed = index.bulk_assign([0, 1, 2], Some(TileCategory::Paths), &flags);
        assert_eq!(changed, 2);
        assert_eq!(index.resolve(1), None);
        assert_eq!(index.resolve(2), Some(TileCategory::Paths));
    }

    #[test]
    fn auto_tag_uses_overlay_and_transparency() {
        let mut stack = TileGridStack::create_blank(4, 1, 2);
        stack.set_cell(0, 0, 0, 0); // plain base -> terrain
        stack.set_cell(0, 1, 0, 1); // transparent -> props
        stack.set_cell(1, 2, 0, 2); // overlay -> props
        stack.set_cell(0, 3, 0, 3); // hidden -> skipped
        stack.set_cell(0, 2, 0, 10); // pack tagged -> kept

        let flags = TilePixelFlags::new(vec![false, true, false, false], vec![false, false, false, true]);
        let mut index = pack_index();
        assert_eq!(index.auto_tag_used(&stack, &flags), 3);

        assert_eq!(index.resolve(0), Some(TileCategory::Terrain));
        assert_eq!(index.resolve(1), Some(TileCategory::Props));
        assert_eq!(index.resolve(2), Some(TileCategory::Props));
        assert_eq!(index.resolve(3), None);
        assert_eq!(index.resolve(10), Some(TileCategory::Buildings));
        assert!(!index.overrides().contains_key(&10));
    }

    #[test]
    fn palette_filters_by_category_and_hides_blank_tiles() {
        let mut index = pack_index();
        index.assign(2, Some(TileCategory::Terrain));
        let flags = TilePixelFlags::new(vec![], vec![false, false, false, true]);

        assert_eq!(index.palette(13, PaletteFilter::All, &flags).len(), 12);
        assert_eq!(
            index.palette(13, PaletteFilter::Category(TileCategory::Buildings), &flags),
            vec![10, 11, 12]
        );
        assert_eq!(
            index.palette(13, PaletteFilter::Category(TileCategory::Terrain), &flags),
            vec![2]
        );
        assert_eq!(
            index.palette(6, PaletteFilter::Untagged, &flags),
            vec![0, 1, 4, 5]
        );
    }
}
