#![allow(dead_code)]

use tiled_authoring::{
    decode_pack_str, AssetPack, EditorConfig, MapDefaults, MemoryStore, Session, TilePixelFlags,
};

pub const TOWN_PACK: &str = r#"
{
  "tileset": { "id": "town", "image": "town.png", "tileDim": 16, "pixelWidth": 128, "pixelHeight": 64 },
  "categories": [ { "category": "buildings", "start": 20, "end": 23 } ],
  "objects": [
    { "id": "oak", "name": "Oak", "tileWidth": 2, "tileHeight": 3, "anchor": "bottom-left", "image": "objects/oak.png" }
  ]
}
"#;

pub const FOREST_PACK: &str = r#"
{
  "tileset": { "id": "forest", "image": "forest.png", "tileDim": 32, "pixelWidth": 256, "pixelHeight": 256 }
}
"#;

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn pack(json: &str) -> AssetPack {
    decode_pack_str(json).expect("test pack should decode")
}

pub fn config(width: usize, height: usize, layer_count: usize) -> EditorConfig {
    EditorConfig {
        map: MapDefaults {
            width,
            height,
            layer_count,
        },
        ..Default::default()
    }
}

pub fn session(width: usize, height: usize, layer_count: usize) -> Session {
    init_tracing();
    Session::open(
        config(width, height, layer_count),
        pack(TOWN_PACK),
        TilePixelFlags::default(),
        Box::new(MemoryStore::default()),
    )
}
