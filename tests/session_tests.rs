// tests/session_tests.rs

mod common;

use std::io;
use tiled_authoring::{
    Anchor, CaptureTarget, CatalogRecord, CatalogStore, Cell, CellRect, EditorCommand,
    EditorEvent, MapError, ObjectId, PaletteFilter, Rotation, Session, TileCategory,
    TilePixelFlags, TilesetId, Tool, Warning, EMPTY_TILE,
};

fn drag(session: &mut Session, from: Cell, to: Cell) {
    session.handle(EditorEvent::PointerDown(from));
    session.handle(EditorEvent::PointerMove(to));
    session.handle(EditorEvent::PointerUp(to));
}

fn click(session: &mut Session, at: Cell) -> bool {
    let changed = session.handle(EditorEvent::PointerDown(at));
    session.handle(EditorEvent::PointerUp(at));
    changed
}

#[test]
fn paint_capture_and_stamp_through_events() {
    let mut session = common::session(8, 8, 2);

    session.handle(EditorEvent::SelectTile(3));
    drag(&mut session, Cell::new(0, 0), Cell::new(1, 0));
    session.handle(EditorEvent::SelectLayer(1));
    session.handle(EditorEvent::SelectTile(4));
    click(&mut session, Cell::new(1, 1));

    session.handle(EditorEvent::BeginCapture(CaptureTarget::Stamp));
    drag(&mut session, Cell::new(0, 0), Cell::new(1, 1));
    assert_eq!(session.stamps().len(), 1);
    let stamp = session.stamps().definitions()[0].clone();
    assert_eq!((stamp.width, stamp.height, stamp.name.as_str()), (2, 2, "Stamp 1"));

    session.handle(EditorEvent::SelectTool(Tool::Stamp { id: stamp.id }));
    assert!(click(&mut session, Cell::new(4, 4)));
    let stack = session.stack();
    assert_eq!(stack.get(0, 4, 4), 3);
    assert_eq!(stack.get(0, 5, 4), 3);
    assert_eq!(stack.get(1, 5, 5), 4);
    assert_eq!(stack.get(0, 4, 5), EMPTY_TILE);

    let stored = session.store().load(&TilesetId::from("town")).unwrap();
    assert_eq!(stored.stamps, vec![stamp]);
}

#[test]
fn default_capture_names_stay_unique_after_deletes() {
    let mut session = common::session(4, 4, 1);
    let capture = |session: &mut Session| {
        session.handle(EditorEvent::BeginCapture(CaptureTarget::Stamp));
        drag(session, Cell::new(0, 0), Cell::new(1, 1));
    };
    capture(&mut session);
    capture(&mut session);
    let first = session.stamps().definitions()[0].id;
    assert!(session.delete_stamp(first));
    capture(&mut session);

    let names: Vec<&str> = session.stamps().definitions().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Stamp 2", "Stamp 3"]);

    for _ in 0..2 {
        session.handle(EditorEvent::BeginCapture(CaptureTarget::Object {
            anchor: Anchor::TopLeft,
        }));
        drag(&mut session, Cell::new(0, 0), Cell::new(0, 0));
    }
    let first_object = session.objects().user_definitions().next().unwrap().id.clone();
    assert!(session.delete_object(&first_object));
    session.handle(EditorEvent::BeginCapture(CaptureTarget::Object {
        anchor: Anchor::TopLeft,
    }));
    drag(&mut session, Cell::new(1, 0), Cell::new(1, 0));
    let names: Vec<&str> = session.objects().user_definitions().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["Object 2", "Object 3"]);
}

#[test]
fn rotated_stamp_off_the_edge_changes_nothing() {
    let mut session = common::session(4, 4, 1);
    session.handle(EditorEvent::SelectTile(2));
    drag(&mut session, Cell::new(0, 0), Cell::new(2, 0));
    let id = session
        .capture_stamp(CellRect::from_corners(Cell::new(0, 0), Cell::new(2, 0)), "Fence")
        .unwrap();
    let before = session.stack().clone();

    session.handle(EditorEvent::SelectTool(Tool::Stamp { id }));
    session.handle(EditorEvent::RotateStamp);
    assert_eq!(session.editor().transform.rotation, Rotation::R90);
    assert!(!click(&mut session, Cell::new(3, 2)));
    assert_eq!(session.stack(), &before);

    assert!(click(&mut session, Cell::new(3, 1)));
    assert_eq!(session.stack().get(0, 3, 3), 2);
}

#[test]
fn eyedropper_picks_topmost_tile() {
    let mut session = common::session(4, 4, 3);
    session.execute(EditorCommand::SetCell {
        layer: 0,
        cell: Cell::new(2, 2),
        tile: 1,
    });
    session.execute(EditorCommand::SetCell {
        layer: 2,
        cell: Cell::new(2, 2),
        tile: 7,
    });

    session.handle(EditorEvent::SelectTool(Tool::Eyedropper));
    click(&mut session, Cell::new(2, 2));
    let editor = session.editor();
    assert_eq!(editor.tool, Tool::Brush);
    assert_eq!((editor.selected_tile, editor.active_layer), (7, 2));
}

#[test]
fn deleting_an_object_removes_every_placement() {
    let mut session = common::session(8, 8, 1);
    let lamp = session
        .capture_object(
            CellRect::from_corners(Cell::new(0, 0), Cell::new(0, 1)),
            "Lamp",
            Anchor::BottomLeft,
        )
        .unwrap();

    session.handle(EditorEvent::SelectTool(Tool::Object { id: lamp.clone() }));
    assert!(click(&mut session, Cell::new(2, 3)));
    assert!(click(&mut session, Cell::new(5, 6)));
    assert!(!click(&mut session, Cell::new(5, 0)), "footprint would leave the map");
    assert_eq!(session.objects().placements().len(), 2);

    assert!(session.delete_object(&lamp));
    assert!(session.objects().placements().is_empty());
    assert_eq!(session.editor().tool, Tool::Brush);
    assert!(!session.execute(EditorCommand::RemoveObjectAt { cell: Cell::new(2, 3) }));
    assert!(!session.execute(EditorCommand::RemoveObjectAt { cell: Cell::new(5, 6) }));
}

#[test]
fn pack_objects_cannot_be_deleted_but_can_be_placed() {
    let mut session = common::session(8, 8, 1);
    let oak = ObjectId::from("oak");
    assert!(!session.delete_object(&oak));
    assert!(!session.rename_object(&oak, "Pine"));
    assert!(session.place_object(&oak, Cell::new(0, 2)));

    session.handle(EditorEvent::SelectTool(Tool::Object { id: oak }));
    session.handle(EditorEvent::SecondaryClick(Cell::new(1, 0)));
    assert!(session.objects().placements().is_empty());

    let stored = session.store().load(&TilesetId::from("town")).unwrap();
    assert!(stored.objects.is_empty(), "pack objects are never persisted");
}

#[test]
fn selecting_unknown_definitions_is_ignored() {
    let mut session = common::session(4, 4, 1);
    assert!(!session.handle(EditorEvent::SelectTool(Tool::Object {
        id: ObjectId::from("missing")
    })));
    assert_eq!(session.editor().tool, Tool::Brush);
}

#[test]
fn tileset_switch_resets_grid_but_keeps_other_catalogs() {
    let mut session = common::session(6, 6, 2);
    session.handle(EditorEvent::SelectTile(5));
    click(&mut session, Cell::new(1, 1));
    session.capture_stamp(CellRect::from_corners(Cell::new(0, 0), Cell::new(1, 1)), "Corner");
    assert!(session.assign_category(5, Some(TileCategory::Props)));

    session.switch_tileset(common::pack(common::FOREST_PACK), TilePixelFlags::default());
    assert_eq!(session.tileset().id, TilesetId::from("forest"));
    assert!(session.stamps().is_empty());
    assert_eq!(session.categories().resolve(5), None);
    assert_eq!(session.stack().top_tile_at(1, 1), None);
    assert_eq!(session.editor().selected_tile, EMPTY_TILE);
    assert!(session.objects().get(&ObjectId::from("oak")).is_none());

    session.switch_tileset(common::pack(common::TOWN_PACK), TilePixelFlags::default());
    assert_eq!(session.stamps().len(), 1);
    assert_eq!(session.categories().resolve(5), Some(TileCategory::Props));
    assert_eq!(session.categories().resolve(21), Some(TileCategory::Buildings));
    assert_eq!(session.stack().top_tile_at(1, 1), None);
}

#[test]
fn tagging_and_palette_filtering() {
    let mut session = Session::open(
        common::config(4, 4, 2),
        common::pack(common::TOWN_PACK),
        TilePixelFlags::new(vec![false, true], vec![false, false, true]),
        Box::new(tiled_authoring::MemoryStore::default()),
    );
    session.execute(EditorCommand::SetCell {
        layer: 0,
        cell: Cell::new(0, 0),
        tile: 0,
    });
    session.execute(EditorCommand::SetCell {
        layer: 0,
        cell: Cell::new(1, 0),
        tile: 1,
    });
    session.execute(EditorCommand::SetCell {
        layer: 1,
        cell: Cell::new(2, 0),
        tile: 2,
    });

    assert_eq!(session.auto_tag_used(), 2);
    assert_eq!(
        session.palette(PaletteFilter::Category(TileCategory::Terrain)),
        vec![0]
    );
    assert_eq!(
        session.palette(PaletteFilter::Category(TileCategory::Props)),
        vec![1]
    );
    assert_eq!(session.bulk_assign_categories(0..4, Some(TileCategory::Paths)), 3);
    assert_eq!(
        session.palette(PaletteFilter::Category(TileCategory::Paths)),
        vec![0, 1, 3]
    );
    assert!(!session.palette(PaletteFilter::All).contains(&2));
}

struct OfflineStore;

fn offline() -> MapError {
    MapError::Io {
        path: "catalogs/town.json".into(),
        source: io::Error::new(io::ErrorKind::NotConnected, "offline"),
    }
}

impl CatalogStore for OfflineStore {
    fn load(&self, _: &TilesetId) -> Result<CatalogRecord, MapError> {
        Err(offline())
    }

    fn save(&mut self, _: &TilesetId, _: &CatalogRecord) -> Result<(), MapError> {
        Err(offline())
    }
}

#[test]
fn store_failures_degrade_to_warnings() {
    common::init_tracing();
    let mut session = Session::open(
        common::config(4, 4, 1),
        common::pack(common::TOWN_PACK),
        TilePixelFlags::default(),
        Box::new(OfflineStore),
    );
    assert!(matches!(session.warnings(), [Warning::CatalogLoad { .. }]));
    assert!(session.objects().get(&ObjectId::from("oak")).is_some());

    let id = session.capture_stamp(CellRect::from_corners(Cell::new(0, 0), Cell::new(1, 1)), "Offline");
    assert!(id.is_some());
    assert_eq!(session.stamps().len(), 1);

    let warnings = session.take_warnings();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[1].to_string().contains("could not save catalogs for town"));
    assert!(session.warnings().is_empty());
}

#[test]
fn export_reflects_current_state() -> anyhow::Result<()> {
    let mut session = common::session(8, 8, 2);
    session.handle(EditorEvent::SelectTile(6));
    click(&mut session, Cell::new(3, 3));
    session.handle(EditorEvent::SelectTool(Tool::Collision { code: 1 }));
    click(&mut session, Cell::new(4, 4));
    assert!(session.place_object(&ObjectId::from("oak"), Cell::new(0, 7)));

    let doc = session.export();
    assert_eq!((doc.tile_dim, doc.tileset_pixel_width, doc.tileset_pixel_height), (16, 128, 64));
    assert_eq!(doc.layers.len(), 2);
    assert_eq!(doc.layers[0].get(3, 3), 6);
    assert_eq!(doc.collision_layer[4][4], 1);
    assert_eq!(doc.object_catalog.len(), 1);
    assert_eq!(doc.object_placements[0].object_id, ObjectId::from("oak"));

    let json: serde_json::Value = serde_json::from_str(&doc.to_json()?)?;
    assert_eq!(json["mapWidth"], 8);
    assert_eq!(json["objectCatalog"][0]["readonly"], true);
    Ok(())
}
