// src/loader/json_loader.rs
use crate::category::{CategoryRange, TileCategory};
use crate::error::{require_json, MapError};
use crate::grid::TileIndex;
use crate::object::{Anchor, ObjectDefinition, ObjectId, ObjectSprite};
use crate::pack::{AssetPack, TilesetInfo};
use crate::store::TilesetId;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonTileset {
    id: String,
    image: String,
    tile_dim: u32,
    pixel_width: u32,
    pixel_height: u32,
}

#[derive(Deserialize)]
struct JsonCategoryRange {
    category: TileCategory,
    start: i32,
    #[serde(default)]
    end: Option<i32>,
}

#[derive(Deserialize)]
struct JsonRegion {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonObject {
    id: String,
    #[serde(default)]
    name: String,
    tile_width: u32,
    tile_height: u32,
    #[serde(default)]
    anchor: Anchor,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    region: Option<JsonRegion>,
}

#[derive(Deserialize)]
struct JsonPack {
    tileset: JsonTileset,
    #[serde(default)]
    categories: Vec<JsonCategoryRange>,
    #[serde(default)]
    objects: Vec<JsonObject>,
}

fn tileset_from_json(ts: JsonTileset) -> Result<TilesetInfo, MapError> {
    if ts.id.trim().is_empty() {
        return Err(MapError::InvalidPack("tileset id must not be empty".into()));
    }
    if ts.tile_dim == 0 {
        return Err(MapError::InvalidPack(format!(
            "tileset {} has a zero tile dimension",
            ts.id
        )));
    }
    if ts.pixel_width < ts.tile_dim || ts.pixel_height < ts.tile_dim {
        return Err(MapError::InvalidPack(format!(
            "tileset {} image {}x{} is smaller than one {}px tile",
            ts.id, ts.pixel_width, ts.pixel_height, ts.tile_dim
        )));
    }
    let info = TilesetInfo {
        id: TilesetId(ts.id),
        image: ts.image,
        tile_dim: ts.tile_dim,
        pixel_width: ts.pixel_width,
        pixel_height: ts.pixel_height,
    };
    // Every tile must be addressable by a `TileIndex`.
    if info.tile_count_wide() > TileIndex::MAX as u64 {
        return Err(MapError::InvalidPack(format!(
            "tileset {} has {} tiles, more than a tile index can address",
            info.id,
            info.tile_count_wide()
        )));
    }
    Ok(info)
}

fn range_from_json(r: JsonCategoryRange, tile_count: usize) -> Result<CategoryRange, MapError> {
    let end = r.end.unwrap_or(r.start);
    if r.start < 0 || end < r.start || end as usize >= tile_count {
        return Err(MapError::InvalidPack(format!(
            "category range {}..={} outside tileset of {} tiles",
            r.start, end, tile_count
        )));
    }
    Ok(CategoryRange {
        category: r.category,
        start: r.start,
        end,
    })
}

fn object_from_json(obj: JsonObject) -> Result<ObjectDefinition, MapError> {
    if obj.tile_width == 0 || obj.tile_height == 0 {
        return Err(MapError::InvalidPack(format!(
            "object {} has an empty footprint",
            obj.id
        )));
    }

    let sprite = match (obj.image, obj.region) {
        (Some(path), None) => ObjectSprite::Image { path },
        (None, Some(r)) => ObjectSprite::Region {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        },
        _ => {
            return Err(MapError::InvalidPack(format!(
                "object {} needs exactly one of image or region",
                obj.id
            )));
        }
    };

    let name = if obj.name.is_empty() {
        obj.id.clone()
    } else {
        obj.name
    };

    Ok(ObjectDefinition {
        id: ObjectId(obj.id),
        name,
        tile_width: obj.tile_width,
        tile_height: obj.tile_height,
        anchor: obj.anchor,
        sprite,
        readonly: true,
    })
}

fn pack_from_json(j: JsonPack) -> Result<AssetPack, MapError> {
    let tileset = tileset_from_json(j.tileset)?;
    let tile_count = tileset.tile_count();

    let category_ranges = j
        .categories
        .into_iter()
        .map(|r| range_from_json(r, tile_count))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    let objects = j
        .objects
        .into_iter()
        .map(|obj| {
            if !seen.insert(obj.id.clone()) {
                return Err(MapError::InvalidPack(format!(
                    "duplicate object id {}",
                    obj.id
                )));
            }
            object_from_json(obj)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        tileset = %tileset.id,
        ranges = category_ranges.len(),
        objects = objects.len(),
        "decoded asset pack"
    );

    Ok(AssetPack {
        tileset,
        category_ranges,
        objects,
    })
}

/// Decodes an asset pack held in memory.
pub fn decode_pack_str(json: &str) -> Result<AssetPack, MapError> {
    let j: JsonPack = serde_json::from_str(json).map_err(MapError::Parse)?;
    pack_from_json(j)
}

/// Reads and decodes an asset pack file. Only `.json` is accepted.
pub fn decode_pack_file(path: impl AsRef<Path>) -> Result<AssetPack, MapError> {
    let p = path.as_ref();
    require_json(p)?;

    let txt = std::fs::read_to_string(p).map_err(|source| MapError::io(p, source))?;
    let j: JsonPack = serde_json::from_str(&txt).map_err(|source| MapError::json(p, source))?;
    pack_from_json(j)
}
