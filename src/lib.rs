#![warn(missing_docs)]

//! Tile-map authoring core: layered grids, stamps, objects, tile categories
//! and automatic stamp extraction, exported as a plain map document.

mod category;
mod command;
mod config;
mod editor;
mod error;
mod export;
mod extract;
mod geom;
mod grid;
mod loader {
    pub mod json_loader;
}
mod object;
mod pack;
mod pixels;
mod session;
mod stamp;
mod store;

pub use category::{CategoryIndex, CategoryRange, PaletteFilter, TileCategory};
pub use command::EditorCommand;
pub use config::{EditorConfig, MapDefaults};
pub use editor::{CaptureMode, CaptureTarget, EditorEvent, EditorState, Tool};
pub use error::MapError;
pub use export::ExportDocument;
pub use extract::{
    detect_ground, extract_stamps, extract_stamps_after, ExtractConfig, ExtractOutcome, MAX_GROUND_COVERAGE,
    MIN_GROUND_COVERAGE,
};
pub use geom::{transform, Cell, CellRect, Rotation, Transform};
pub use grid::{CollisionCode, TileGridLayer, TileGridStack, TileIndex, TopTile, EMPTY_TILE};
pub use loader::json_loader::{decode_pack_file, decode_pack_str};
pub use object::{
    Anchor, ObjectCatalog, ObjectDefinition, ObjectId, ObjectSprite, PlacedObject, PlacementId,
    TileBounds,
};
pub use pack::{AssetPack, TilesetInfo};
pub use pixels::TilePixelFlags;
pub use session::{ExtractReport, Session, Warning};
pub use stamp::{CellWrite, StampDefinition, StampFootprint, StampId, StampLibrary};
pub use store::{CatalogRecord, CatalogStore, JsonFileStore, MemoryStore, TilesetId};
