//! Cell coordinates, rectangular selections and the rotation/flip mapping
//! shared by stamp previews and stamp placement.

use serde::{Deserialize, Serialize};

/// A map cell, `(col, row)`. Signed so drag gestures may leave the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Column
    pub col: i32,
    /// Row
    pub row: i32,
}

impl Cell {
    /// Shorthand constructor.
    #[inline]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

/// Inclusive rectangular cell selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    /// Leftmost column
    pub min_col: i32,
    /// Rightmost column
    pub max_col: i32,
    /// Top row
    pub min_row: i32,
    /// Bottom row
    pub max_row: i32,
}

impl CellRect {
    /// Normalizes a drag between two corners in any direction.
    pub fn from_corners(a: Cell, b: Cell) -> Self {
        Self {
            min_col: a.col.min(b.col),
            max_col: a.col.max(b.col),
            min_row: a.row.min(b.row),
            max_row: a.row.max(b.row),
        }
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        (self.max_col - self.min_col + 1).max(0) as usize
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        (self.max_row - self.min_row + 1).max(0) as usize
    }

    /// Whether `cell` lies inside the rectangle.
    pub fn contains(&self, cell: Cell) -> bool {
        (self.min_col..=self.max_col).contains(&cell.col)
            && (self.min_row..=self.max_row).contains(&cell.row)
    }
}

/// Clockwise quarter-turn rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation
    #[default]
    #[serde(rename = "0")]
    R0,
    /// 90 degrees clockwise
    #[serde(rename = "90")]
    R90,
    /// 180 degrees
    #[serde(rename = "180")]
    R180,
    /// 270 degrees clockwise
    #[serde(rename = "270")]
    R270,
}

impl Rotation {
    /// All rotations in clockwise order.
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Builds a rotation from degrees; anything but a multiple of 90 is rejected.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }

    /// Rotation in degrees.
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    /// Next quarter turn clockwise.
    pub fn rotate_cw(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    #[inline]
    fn swaps_axes(self) -> bool {
        matches!(self, Rotation::R90 | Rotation::R270)
    }
}

/// Flip-then-rotate transform applied to a `width x height` stamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transform {
    /// Rotation applied after flipping
    pub rotation: Rotation,
    /// Mirror across the vertical axis
    pub flip_x: bool,
    /// Mirror across the horizontal axis
    pub flip_y: bool,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform {
        rotation: Rotation::R0,
        flip_x: false,
        flip_y: false,
    };

    /// Shorthand constructor.
    pub const fn new(rotation: Rotation, flip_x: bool, flip_y: bool) -> Self {
        Self {
            rotation,
            flip_x,
            flip_y,
        }
    }

    /// Size of the transformed bounding box. 90 and 270 swap the axes.
    #[inline]
    pub fn transformed_size(&self, width: usize, height: usize) -> (usize, usize) {
        if self.rotation.swaps_axes() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Maps a source cell of a `width x height` stamp into the transformed box.
    #[inline]
    pub fn apply(&self, x: usize, y: usize, width: usize, height: usize) -> (usize, usize) {
        transform(x, y, width, height, *self)
    }

    /// Maps a cell of the transformed box back to the source cell.
    pub fn invert(&self, tx: usize, ty: usize, width: usize, height: usize) -> (usize, usize) {
        let (fx, fy) = match self.rotation {
            Rotation::R0 => (tx, ty),
            Rotation::R90 => (width - 1 - ty, tx),
            Rotation::R180 => (width - 1 - tx, height - 1 - ty),
            Rotation::R270 => (ty, height - 1 - tx),
        };
        let x = if self.flip_x { width - 1 - fx } else { fx };
        let y = if self.flip_y { height - 1 - fy } else { fy };
        (x, y)
    }
}

/// Flip about the stamp's own size first, then rotate.
///
/// `(x, y)` must lie inside `width x height`.
pub fn transform(x: usize, y: usize, width: usize, height: usize, t: Transform) -> (usize, usize) {
    let x = if t.flip_x { width - 1 - x } else { x };
    let y = if t.flip_y { height - 1 - y } else { y };
    match t.rotation {
        Rotation::R0 => (x, y),
        Rotation::R90 => (y, width - 1 - x),
        Rotation::R180 => (width - 1 - x, height - 1 - y),
        Rotation::R270 => (height - 1 - y, x),
    }
}
