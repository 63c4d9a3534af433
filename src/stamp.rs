//! Stamps: named multi-layer tile templates captured from the grid and
//! placed back with an optional rotation/flip.

use crate::geom::{Cell, CellRect, Transform};
use crate::grid::{TileGridLayer, TileGridStack, TileIndex, EMPTY_TILE};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Identity of a stamp definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StampId(pub Uuid);

impl StampId {
    /// A fresh random identity.
    pub fn new() -> Self {
        StampId(Uuid::new_v4())
    }
}

impl Default for StampId {
    fn default() -> Self {
        Self::new()
    }
}

/// A rectangular multi-layer snippet. Only the name changes after capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampDefinition {
    /// Identity
    pub id: StampId,
    /// Display name
    pub name: String,
    /// Width in tiles
    pub width: usize,
    /// Height in tiles
    pub height: usize,
    /// `[layer][x][y]`
    pub layers: Vec<TileGridLayer>,
}

/// A single cell write produced by a stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellWrite {
    /// Target layer
    pub layer: usize,
    /// Target cell on the map
    pub cell: Cell,
    /// Tile written, possibly [`EMPTY_TILE`]
    pub tile: TileIndex,
}

/// Every cell a stamp touches at some origin, plus the bounding box.
///
/// Previews and placement both come from here, so their bounds always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampFootprint {
    /// Transformed bounding box on the map
    pub bounds: CellRect,
    /// Cell writes in layer order
    pub writes: Vec<CellWrite>,
}

impl StampDefinition {
    /// Copies `selection` out of every layer of `stack`.
    ///
    /// Cells outside the stack read as empty. Returns `None` for a degenerate
    /// selection.
    pub fn capture(stack: &TileGridStack, selection: CellRect, name: impl Into<String>) -> Option<Self> {
        let (width, height) = (selection.width(), selection.height());
        if width == 0 || height == 0 {
            return None;
        }
        let layers = stack
            .layers()
            .iter()
            .map(|layer| {
                TileGridLayer::from_columns(
                    (0..width as i32)
                        .map(|x| {
                            (0..height as i32)
                                .map(|y| layer.get(selection.min_col + x, selection.min_row + y))
                                .collect()
                        })
                        .collect(),
                )
            })
            .collect();
        Some(Self {
            id: StampId::new(),
            name: name.into(),
            width,
            height,
            layers,
        })
    }

    /// Tile stored at `(x, y)` on `layer` of the stamp.
    #[inline]
    pub fn tile(&self, layer: usize, x: usize, y: usize) -> TileIndex {
        self.layers
            .get(layer)
            .map_or(EMPTY_TILE, |l| l.get(x as i32, y as i32))
    }

    /// Size once `transform` is applied.
    pub fn transformed_size(&self, transform: Transform) -> (usize, usize) {
        transform.transformed_size(self.width, self.height)
    }

    /// Computes the writes for placing this stamp at `origin`.
    ///
    /// With `skip_empty`, empty stamp cells produce no write so whatever is
    /// underneath stays put.
    pub fn footprint(&self, origin: Cell, transform: Transform, skip_empty: bool) -> StampFootprint {
        let (tw, th) = self.transformed_size(transform);
        let bounds = CellRect {
            min_col: origin.col,
            max_col: origin.col + tw as i32 - 1,
            min_row: origin.row,
            max_row: origin.row + th as i32 - 1,
        };

        let mut writes = Vec::new();
        for (layer, grid) in self.layers.iter().enumerate() {
            for x in 0..self.width {
                for y in 0..self.height {
                    let tile = grid.get(x as i32, y as i32);
                    if skip_empty && tile == EMPTY_TILE {
                        continue;
                    }
                    let (tx, ty) = transform.apply(x, y, self.width, self.height);
                    writes.push(CellWrite {
                        layer,
                        cell: Cell::new(origin.col + tx as i32, origin.row + ty as i32),
                        tile,
                    });
                }
            }
        }
        StampFootprint { bounds, writes }
    }

    /// Places the stamp onto `stack`, all-or-nothing.
    ///
    /// Returns `false` without touching the stack when the transformed stamp
    /// does not fit inside the map. Stamp layers beyond the stack's layer count
    /// are dropped.
    pub fn place(
        &self,
        stack: &mut TileGridStack,
        origin: Cell,
        transform: Transform,
        skip_empty: bool,
    ) -> bool {
        let footprint = self.footprint(origin, transform, skip_empty);
        let b = footprint.bounds;
        if !stack.in_bounds(b.min_col, b.min_row) || !stack.in_bounds(b.max_col, b.max_row) {
            debug!(stamp = %self.name, ?origin, "stamp placement out of bounds, ignored");
            return false;
        }

        let layer_limit = self.layers.len().min(stack.layer_count());
        let mut changed = 0usize;
        for w in footprint.writes.iter().filter(|w| w.layer < layer_limit) {
            if stack.set_cell(w.layer, w.cell.col, w.cell.row, w.tile) {
                changed += 1;
            }
        }
        debug!(stamp = %self.name, ?origin, changed, "stamp placed");
        true
    }
}

/// Next free number for names of the form `"{prefix} N"`.
///
/// Returns one past the highest `N` already used, so deleting an entry never
/// makes a later default name collide with a survivor.
pub(crate) fn next_numbered<'a>(prefix: &str, names: impl IntoIterator<Item = &'a str>) -> usize {
    names
        .into_iter()
        .filter_map(|name| name.strip_prefix(prefix)?.strip_prefix(' ')?.parse::<usize>().ok())
        .max()
        .map_or(1, |n| n + 1)
}

/// Stamp definitions for one tileset plus the active selection.
#[derive(Debug, Clone, Default)]
pub struct StampLibrary {
    stamps: Vec<StampDefinition>,
    active: Option<StampId>,
}

impl StampLibrary {
    /// Library restored from persisted definitions.
    pub fn from_definitions(stamps: Vec<StampDefinition>) -> Self {
        Self {
            stamps,
            active: None,
        }
    }

    /// Definitions in insertion order.
    pub fn definitions(&self) -> &[StampDefinition] {
        &self.stamps
    }

    /// Number of stamps.
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// True when no stamps exist.
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Looks a stamp up by id.
    pub fn get(&self, id: StampId) -> Option<&StampDefinition> {
        self.stamps.iter().find(|s| s.id == id)
    }

    /// Adds a definition and returns its id.
    pub fn insert(&mut self, stamp: StampDefinition) -> StampId {
        let id = stamp.id;
        self.stamps.push(stamp);
        id
    }

    /// Captures `selection` from `stack` and stores it.
    pub fn capture(
        &mut self,
        stack: &TileGridStack,
        selection: CellRect,
        name: impl Into<String>,
    ) -> Option<StampId> {
        let stamp = StampDefinition::capture(stack, selection, name)?;
        debug!(name = %stamp.name, width = stamp.width, height = stamp.height, "stamp captured");
        Some(self.insert(stamp))
    }

    /// Renames a stamp. Blank names are rejected.
    pub fn rename(&mut self, id: StampId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.stamps.iter_mut().find(|s| s.id == id) {
            Some(stamp) => {
                stamp.name = name.to_owned();
                true
            }
            None => false,
        }
    }

    /// Deletes a stamp, clearing the active selection if it pointed at it.
    pub fn delete(&mut self, id: StampId) -> bool {
        let before = self.stamps.len();
        self.stamps.retain(|s| s.id != id);
        if self.active == Some(id) {
            self.active = None;
        }
        before != self.stamps.len()
    }

    /// Selects the stamp used by the stamp tool. Unknown ids are ignored.
    pub fn set_active(&mut self, id: Option<StampId>) -> bool {
        match id {
            Some(id) if self.get(id).is_none() => false,
            _ => {
                self.active = id;
                true
            }
        }
    }

    /// The active stamp, if any.
    pub fn active(&self) -> Option<&StampDefinition> {
        self.active.and_then(|id| self.get(id))
    }
}
