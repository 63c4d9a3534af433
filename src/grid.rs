//! Layered tile grids, the base authoring surface.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index of a tile inside the active tileset.
pub type TileIndex = i32;

/// Sentinel stored in cells that hold no tile.
pub const EMPTY_TILE: TileIndex = -1;

/// Walkability code stored in the collision layer. `0` means walkable.
pub type CollisionCode = u8;

/// One 2D grid of tile indices, indexed `[col][row]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileGridLayer {
    cells: Vec<Vec<TileIndex>>,
}

impl TileGridLayer {
    /// A layer with every cell set to [`EMPTY_TILE`].
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![EMPTY_TILE; height]; width],
        }
    }

    /// Wraps pre-built `[col][row]` data.
    pub fn from_columns(cells: Vec<Vec<TileIndex>>) -> Self {
        Self { cells }
    }

    /// Tile at `(col, row)`, or [`EMPTY_TILE`] when out of range.
    #[inline]
    pub fn get(&self, col: i32, row: i32) -> TileIndex {
        if col < 0 || row < 0 {
            return EMPTY_TILE;
        }
        self.cells
            .get(col as usize)
            .and_then(|c| c.get(row as usize))
            .copied()
            .unwrap_or(EMPTY_TILE)
    }

    fn slot_mut(&mut self, col: i32, row: i32) -> Option<&mut TileIndex> {
        if col < 0 || row < 0 {
            return None;
        }
        self.cells
            .get_mut(col as usize)
            .and_then(|c| c.get_mut(row as usize))
    }

    /// Raw columns, `[col][row]`.
    pub fn columns(&self) -> &[Vec<TileIndex>] {
        &self.cells
    }

    /// True when every cell is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|&t| t == EMPTY_TILE)
    }
}

/// The topmost painted tile at a cell and the layer it lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopTile {
    /// Tile index found
    pub tile: TileIndex,
    /// Layer the tile was found on
    pub layer: usize,
}

/// Ordered tile layers plus a separate collision layer.
///
/// Layer 0 is the base; higher indices are overlays drawn in index order.
/// All layers share the stack's width and height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGridStack {
    width: usize,
    height: usize,
    layers: Vec<TileGridLayer>,
    collision: Vec<Vec<CollisionCode>>,
}

impl TileGridStack {
    /// A stack of `layer_count` empty layers with an all-walkable collision layer.
    pub fn create_blank(width: usize, height: usize, layer_count: usize) -> Self {
        Self {
            width,
            height,
            layers: (0..layer_count)
                .map(|_| TileGridLayer::blank(width, height))
                .collect(),
            collision: vec![vec![0; height]; width],
        }
    }

    /// Map width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of tile layers, collision excluded.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// All tile layers in draw order.
    pub fn layers(&self) -> &[TileGridLayer] {
        &self.layers
    }

    /// One tile layer.
    pub fn layer(&self, index: usize) -> Option<&TileGridLayer> {
        self.layers.get(index)
    }

    /// The collision layer, `[col][row]`.
    pub fn collision(&self) -> &[Vec<CollisionCode>] {
        &self.collision
    }

    /// Whether `(col, row)` lies inside the map.
    #[inline]
    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.width && (row as usize) < self.height
    }

    /// Tile on `layer` at `(col, row)`; [`EMPTY_TILE`] for unknown layers or cells.
    #[inline]
    pub fn get(&self, layer: usize, col: i32, row: i32) -> TileIndex {
        self.layers
            .get(layer)
            .map_or(EMPTY_TILE, |l| l.get(col, row))
    }

    /// Writes one cell. Returns `true` only when the stored value changed;
    /// out-of-range coordinates and unchanged values are silent no-ops.
    pub fn set_cell(&mut self, layer: usize, col: i32, row: i32, tile: TileIndex) -> bool {
        let Some(slot) = self
            .layers
            .get_mut(layer)
            .and_then(|l| l.slot_mut(col, row))
        else {
            return false;
        };
        if *slot == tile {
            return false;
        }
        *slot = tile;
        true
    }

    /// Scans layers from the highest index down and returns the first painted tile.
    pub fn top_tile_at(&self, col: i32, row: i32) -> Option<TopTile> {
        self.layers
            .iter()
            .enumerate()
            .rev()
            .find_map(|(layer, l)| {
                let tile = l.get(col, row);
                (tile != EMPTY_TILE).then_some(TopTile { tile, layer })
            })
    }

    /// Collision code at `(col, row)`, `None` outside the map.
    pub fn collision_at(&self, col: i32, row: i32) -> Option<CollisionCode> {
        if !self.in_bounds(col, row) {
            return None;
        }
        Some(self.collision[col as usize][row as usize])
    }

    /// Writes a collision code. Same no-op rules as [`Self::set_cell`].
    pub fn set_collision(&mut self, col: i32, row: i32, code: CollisionCode) -> bool {
        if !self.in_bounds(col, row) {
            return false;
        }
        let slot = &mut self.collision[col as usize][row as usize];
        if *slot == code {
            return false;
        }
        *slot = code;
        true
    }

    /// Every tile index in use, mapped to whether it appears on any overlay layer.
    pub fn used_tiles(&self) -> BTreeMap<TileIndex, bool> {
        let mut used = BTreeMap::new();
        for (layer, l) in self.layers.iter().enumerate() {
            for &tile in l.cells.iter().flatten() {
                if tile == EMPTY_TILE {
                    continue;
                }
                let on_overlay = used.entry(tile).or_insert(false);
                *on_overlay |= layer > 0;
            }
        }
        used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_stack_has_no_top_tiles() {
        let stack = TileGridStack::create_blank(3, 2, 3);
        assert_eq!(stack.layer_count(), 3);
        for col in -1..4 {
            for row in -1..3 {
                assert_eq!(stack.top_tile_at(col, row), None);
            }
        }
    }

    #[test]
    fn higher_layers_occlude_lower_ones() {
        let mut stack = TileGridStack::create_blank(4, 4, 2);
        stack.set_cell(0, 2, 3, 7);
        stack.set_cell(1, 2, 3, 5);
        assert_eq!(stack.top_tile_at(2, 3), Some(TopTile { tile: 5, layer: 1 }));

        stack.set_cell(1, 2, 3, EMPTY_TILE);
        assert_eq!(stack.top_tile_at(2, 3), Some(TopTile { tile: 7, layer: 0 }));
    }

    #[test]
    fn set_cell_reports_changes_only() {
        let mut stack = TileGridStack::create_blank(2, 2, 1);
        assert!(stack.set_cell(0, 1, 1, 4));
        assert!(!stack.set_cell(0, 1, 1, 4));
        assert!(stack.set_cell(0, 1, 1, 3));
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut stack = TileGridStack::create_blank(2, 2, 1);
        let before = stack.clone();
        assert!(!stack.set_cell(0, -1, 0, 1));
        assert!(!stack.set_cell(0, 2, 0, 1));
        assert!(!stack.set_cell(0, 0, 2, 1));
        assert!(!stack.set_cell(5, 0, 0, 1));
        assert!(!stack.set_collision(9, 9, 1));
        assert_eq!(stack, before);
    }

    #[test]
    fn collision_is_separate_from_tiles() {
        let mut stack = TileGridStack::create_blank(2, 2, 1);
        assert!(stack.set_collision(1, 0, 2));
        assert_eq!(stack.collision_at(1, 0), Some(2));
        assert_eq!(stack.top_tile_at(1, 0), None);
        assert_eq!(stack.collision_at(2, 0), None);
    }

    #[test]
    fn used_tiles_tracks_overlay_usage() {
        let mut stack = TileGridStack::create_blank(3, 1, 2);
        stack.set_cell(0, 0, 0, 1);
        stack.set_cell(0, 1, 0, 2);
        stack.set_cell(1, 2, 0, 2);
        stack.set_cell(1, 0, 0, 3);

        let used = stack.used_tiles();
        assert_eq!(used.get(&1), Some(&false));
        assert_eq!(used.get(&2), Some(&true));
        assert_eq!(used.get(&3), Some(&true));
        assert_eq!(used.len(), 3);
    }
}
