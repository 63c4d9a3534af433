use crate::error::{require_json, MapError};
use crate::grid::{CollisionCode, TileGridLayer, TileGridStack};
use crate::object::{ObjectCatalog, ObjectDefinition, PlacedObject};
use crate::pack::TilesetInfo;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// The hand-off document for the rendering/runtime side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Tile size in pixels
    pub tile_dim: u32,
    /// Tileset image width in pixels
    pub tileset_pixel_width: u32,
    /// Tileset image height in pixels
    pub tileset_pixel_height: u32,
    /// Map width in tiles
    pub map_width: usize,
    /// Map height in tiles
    pub map_height: usize,
    /// Tile layers in draw order, each `[col][row]`
    pub layers: Vec<TileGridLayer>,
    /// Walkability codes, `[col][row]`
    pub collision_layer: Vec<Vec<CollisionCode>>,
    /// Every object definition, pack entries included
    pub object_catalog: Vec<ObjectDefinition>,
    /// Placements in back-to-front draw order
    pub object_placements: Vec<PlacedObject>,
}

impl ExportDocument {
    /// Snapshots the current in-memory state. No I/O happens here.
    pub fn build(tileset: &TilesetInfo, stack: &TileGridStack, objects: &ObjectCatalog) -> Self {
        Self {
            tile_dim: tileset.tile_dim,
            tileset_pixel_width: tileset.pixel_width,
            tileset_pixel_height: tileset.pixel_height,
            map_width: stack.width(),
            map_height: stack.height(),
            layers: stack.layers().to_vec(),
            collision_layer: stack.collision().to_vec(),
            object_catalog: objects.definitions().to_vec(),
            object_placements: objects
                .draw_order()
                .into_iter()
                .map(|(p, _)| p.clone())
                .collect(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, MapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the document as JSON.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MapError> {
        let p = path.as_ref();
        require_json(p)?;
        std::fs::write(p, self.to_json()?).map_err(|source| MapError::io(p, source))?;
        info!(path = %p.display(), "map exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Cell;
    use crate::object::{Anchor, ObjectId, ObjectSprite};
    use crate::store::TilesetId;

    fn tileset() -> TilesetInfo {
        TilesetInfo {
            id: TilesetId::from("town"),
            image: "town.png".into(),
            tile_dim: 16,
            pixel_width: 128,
            pixel_height: 64,
        }
    }

    #[test]
    fn export_is_deterministic_and_complete() {
        let mut stack = TileGridStack::create_blank(3, 2, 2);
        stack.set_cell(0, 2, 1, 5);
        stack.set_collision(0, 1, 1);
        let mut objects = ObjectCatalog::new(
            vec![ObjectDefinition {
                id: ObjectId::from("oak"),
                name: "Oak".into(),
                tile_width: 1,
                tile_height: 2,
                anchor: Anchor::BottomLeft,
                sprite: ObjectSprite::Image {
                    path: "oak.png".into(),
                },
                readonly: true,
            }],
            vec![],
        );
        objects.place(&ObjectId::from("oak"), Cell::new(0, 1), 3, 2).unwrap();

        let doc = ExportDocument::build(&tileset(), &stack, &objects);
        assert_eq!(doc, ExportDocument::build(&tileset(), &stack, &objects));
        assert_eq!((doc.map_width, doc.map_height), (3, 2));
        assert_eq!(doc.layers[0].get(2, 1), 5);
        assert_eq!(doc.collision_layer[0][1], 1);
        assert_eq!(doc.object_placements.len(), 1);

        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value["tileDim"], 16);
        assert_eq!(value["layers"][0][2][1], 5);
        assert_eq!(value["objectCatalog"][0]["anchor"], "bottom-left");
        assert_eq!(value["objectPlacements"][0]["objectId"], "oak");
    }

    #[test]
    fn write_to_file_requires_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = ExportDocument::build(
            &tileset(),
            &TileGridStack::create_blank(1, 1, 1),
            &ObjectCatalog::default(),
        );
        assert!(matches!(
            doc.write_to_file(dir.path().join("map.tmx")),
            Err(MapError::UnsupportedFormat(_))
        ));
        let path = dir.path().join("map.json");
        doc.write_to_file(&path).unwrap();
        let back: ExportDocument = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, doc);
    }
}
