//! Format-agnostic asset pack: the read-only bundle a session starts from.

use crate::category::CategoryRange;
use crate::object::ObjectDefinition;
use crate::store::TilesetId;

/// Tileset image facts the core needs for export and object capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetInfo {
    /// Identity scoping every catalog
    pub id: TilesetId,
    /// Image reference, relative to the pack
    pub image: String,
    /// Square tile size in pixels
    pub tile_dim: u32,
    /// Image width in pixels
    pub pixel_width: u32,
    /// Image height in pixels
    pub pixel_height: u32,
}

impl TilesetInfo {
    /// Tiles per image row.
    pub fn columns(&self) -> u32 {
        self.pixel_width / self.tile_dim
    }

    /// Tile rows in the image.
    pub fn rows(&self) -> u32 {
        self.pixel_height / self.tile_dim
    }

    /// Number of addressable tiles.
    pub fn tile_count(&self) -> usize {
        usize::try_from(self.tile_count_wide()).unwrap_or(usize::MAX)
    }

    /// Tile count computed without overflow.
    pub(crate) fn tile_count_wide(&self) -> u64 {
        u64::from(self.columns()) * u64::from(self.rows())
    }
}

/// Decoded asset pack. Nothing in here is ever mutated by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPack {
    /// Tileset description
    pub tileset: TilesetInfo,
    /// Pre-tagged category ranges
    pub category_ranges: Vec<CategoryRange>,
    /// Read-only object definitions
    pub objects: Vec<ObjectDefinition>,
}
