//! Object catalog: anchored single-sprite definitions and their placements.

use crate::geom::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identity of an object definition. Pack objects carry their own string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    /// A fresh identity for an operator-authored object.
    pub fn generate() -> Self {
        ObjectId(format!("obj-{}", Uuid::new_v4()))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        ObjectId(s.to_owned())
    }
}

/// Identity of one placement on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementId(pub Uuid);

/// Which footprint corner the placement cell refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Placement cell is the top-left tile
    #[default]
    TopLeft,
    /// Placement cell is the bottom-left tile, i.e. the object's visual base
    BottomLeft,
}

/// Where an object's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectSprite {
    /// Pixel rectangle inside the tileset image
    Region {
        /// Left edge in pixels
        x: u32,
        /// Top edge in pixels
        y: u32,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Standalone image shipped with the asset pack
    Image {
        /// Image path relative to the pack
        path: String,
    },
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDefinition {
    /// Identity
    pub id: ObjectId,
    /// Display name
    pub name: String,
    /// Footprint width in tiles
    pub tile_width: u32,
    /// Footprint height in tiles
    pub tile_height: u32,
    /// Anchor rule for placement
    #[serde(default)]
    pub anchor: Anchor,
    /// Sprite source
    pub sprite: ObjectSprite,
    /// Pack-provided entries cannot be renamed or deleted
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub readonly: bool,
}

/// An object instance on the map, anchored at `(col, row)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedObject {
    /// Identity
    pub id: PlacementId,
    /// Definition this instance draws
    pub object_id: ObjectId,
    /// Anchor column
    pub col: i32,
    /// Anchor row
    pub row: i32,
}

/// Inclusive tile footprint of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    /// First column
    pub start_col: i32,
    /// First row
    pub start_row: i32,
    /// Last column
    pub end_col: i32,
    /// Last row
    pub end_row: i32,
}

impl TileBounds {
    /// Whether the footprint covers `cell`.
    pub fn contains(&self, cell: Cell) -> bool {
        (self.start_col..=self.end_col).contains(&cell.col)
            && (self.start_row..=self.end_row).contains(&cell.row)
    }

    /// Whether the footprint fits inside a `width x height` map.
    pub fn within(&self, width: usize, height: usize) -> bool {
        self.start_col >= 0
            && self.start_row >= 0
            && (self.end_col as i64) < width as i64
            && (self.end_row as i64) < height as i64
    }
}

impl ObjectDefinition {
    /// Offset from the footprint's top-left to the anchor cell.
    pub fn anchor_offset(&self) -> Cell {
        match self.anchor {
            Anchor::TopLeft => Cell::new(0, 0),
            Anchor::BottomLeft => Cell::new(0, self.tile_height as i32 - 1),
        }
    }

    /// Footprint of this object anchored at `at`.
    pub fn tile_bounds(&self, at: Cell) -> TileBounds {
        let offset = self.anchor_offset();
        let start_col = at.col - offset.col;
        let start_row = at.row - offset.row;
        TileBounds {
            start_col,
            start_row,
            end_col: start_col + self.tile_width as i32 - 1,
            end_row: start_row + self.tile_height as i32 - 1,
        }
    }
}

/// Definitions and placements for one tileset.
#[derive(Debug, Clone, Default)]
pub struct ObjectCatalog {
    definitions: Vec<ObjectDefinition>,
    placements: Vec<PlacedObject>,
}

impl ObjectCatalog {
    /// Catalog merged from read-only pack entries and persisted user entries.
    ///
    /// User entries whose id collides with a pack entry are dropped.
    pub fn new(pack: Vec<ObjectDefinition>, user: Vec<ObjectDefinition>) -> Self {
        let mut definitions: Vec<ObjectDefinition> = pack
            .into_iter()
            .map(|mut d| {
                d.readonly = true;
                d
            })
            .collect();
        for mut def in user {
            if definitions.iter().any(|d| d.id == def.id) {
                warn!(id = %def.id, "user object shadows a pack object, skipped");
                continue;
            }
            def.readonly = false;
            definitions.push(def);
        }
        Self {
            definitions,
            placements: Vec::new(),
        }
    }

    /// All definitions, pack entries first.
    pub fn definitions(&self) -> &[ObjectDefinition] {
        &self.definitions
    }

    /// Operator-authored definitions; the part that gets persisted.
    pub fn user_definitions(&self) -> impl Iterator<Item = &ObjectDefinition> {
        self.definitions.iter().filter(|d| !d.readonly)
    }

    /// Placements in the order they were made.
    pub fn placements(&self) -> &[PlacedObject] {
        &self.placements
    }

    /// Looks a definition up by id.
    pub fn get(&self, id: &ObjectId) -> Option<&ObjectDefinition> {
        self.definitions.iter().find(|d| &d.id == id)
    }

    /// Creates a user-owned definition from a tileset pixel region.
    pub fn capture(
        &mut self,
        name: impl Into<String>,
        tile_width: u32,
        tile_height: u32,
        anchor: Anchor,
        sprite: ObjectSprite,
    ) -> Option<ObjectId> {
        if tile_width == 0 || tile_height == 0 {
            return None;
        }
        let def = ObjectDefinition {
            id: ObjectId::generate(),
            name: name.into(),
            tile_width,
            tile_height,
            anchor,
            sprite,
            readonly: false,
        };
        debug!(id = %def.id, name = %def.name, "object captured");
        let id = def.id.clone();
        self.definitions.push(def);
        Some(id)
    }

    /// Renames a user definition. Readonly entries and blank names are refused.
    pub fn rename(&mut self, id: &ObjectId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.definitions.iter_mut().find(|d| &d.id == id) {
            Some(def) if !def.readonly => {
                def.name = name.to_owned();
                true
            }
            _ => false,
        }
    }

    /// Deletes a user definition together with every placement that uses it.
    pub fn delete(&mut self, id: &ObjectId) -> bool {
        let Some(pos) = self.definitions.iter().position(|d| &d.id == id && !d.readonly) else {
            return false;
        };
        self.definitions.remove(pos);
        let before = self.placements.len();
        self.placements.retain(|p| &p.object_id != id);
        debug!(%id, removed_placements = before - self.placements.len(), "object deleted");
        true
    }

    /// Places `id` anchored at `at` on a `width x height` map.
    ///
    /// Unknown definitions and footprints leaving the map are ignored.
    pub fn place(&mut self, id: &ObjectId, at: Cell, width: usize, height: usize) -> Option<PlacementId> {
        let def = self.get(id)?;
        if !def.tile_bounds(at).within(width, height) {
            return None;
        }
        let placement = PlacedObject {
            id: PlacementId(Uuid::new_v4()),
            object_id: id.clone(),
            col: at.col,
            row: at.row,
        };
        let pid = placement.id;
        self.placements.push(placement);
        Some(pid)
    }

    /// Footprint of a placement, `None` if its definition is gone.
    pub fn placement_bounds(&self, placement: &PlacedObject) -> Option<TileBounds> {
        self.get(&placement.object_id)
            .map(|d| d.tile_bounds(Cell::new(placement.col, placement.row)))
    }

    /// Removes the most recently placed object covering `at`.
    pub fn remove_at(&mut self, at: Cell) -> Option<PlacedObject> {
        let pos = self
            .placements
            .iter()
            .rposition(|p| self.placement_bounds(p).is_some_and(|b| b.contains(at)))?;
        Some(self.placements.remove(pos))
    }

    /// Drops every placement.
    pub fn clear_placements(&mut self) {
        self.placements.clear();
    }

    /// Placements with their definitions, back-to-front.
    ///
    /// Stable sort by `(end_row, start_col)`. Placements whose definition is
    /// missing are skipped.
    pub fn draw_order(&self) -> Vec<(&PlacedObject, &ObjectDefinition)> {
        let mut resolved: Vec<_> = self
            .placements
            .iter()
            .filter_map(|p| {
                let def = self.get(&p.object_id)?;
                let b = def.tile_bounds(Cell::new(p.col, p.row));
                Some(((b.end_row, b.start_col), p, def))
            })
            .collect();
        resolved.sort_by_key(|(key, _, _)| *key);
        resolved.into_iter().map(|(_, p, d)| (p, d)).collect()
    }
}
