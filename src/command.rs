use crate::geom::{Cell, CellRect, Transform};
use crate::grid::{CollisionCode, TileIndex};
use crate::object::{Anchor, ObjectId};
use crate::stamp::StampId;

/// A side effect requested by the editor state machine.
///
/// Commands are plain data; the session executes them against the grid and
/// catalogs in the order they were emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// Write one tile (brush or eraser)
    SetCell {
        /// Target layer
        layer: usize,
        /// Target cell
        cell: Cell,
        /// Tile to write; `EMPTY_TILE` erases
        tile: TileIndex,
    },
    /// Write one collision code
    SetCollision {
        /// Target cell
        cell: Cell,
        /// Walkability code
        code: CollisionCode,
    },
    /// Read the topmost tile under `cell` and make it the brush tile
    PickTile {
        /// Cell to sample
        cell: Cell,
    },
    /// Stamp a library entry onto the map
    PlaceStamp {
        /// Stamp to place
        id: StampId,
        /// Top-left of the transformed stamp
        origin: Cell,
        /// Rotation and flips
        transform: Transform,
        /// Leave cells under empty stamp cells untouched
        skip_empty: bool,
    },
    /// Add an object placement
    PlaceObject {
        /// Object to place
        id: ObjectId,
        /// Anchor cell
        cell: Cell,
    },
    /// Remove the topmost object covering `cell`
    RemoveObjectAt {
        /// Cell to hit-test
        cell: Cell,
    },
    /// Capture a map selection as a new stamp
    CaptureStamp {
        /// Map selection
        selection: CellRect,
    },
    /// Capture a tileset selection as a new object
    CaptureObject {
        /// Selection in tileset tile coordinates
        selection: CellRect,
        /// Anchor rule for the new object
        anchor: Anchor,
    },
}
