//! One authoring session: the live grid, the catalogs of the active tileset,
//! the editor state and the store they persist to.

use crate::category::{CategoryIndex, PaletteFilter, TileCategory};
use crate::command::EditorCommand;
use crate::config::EditorConfig;
use crate::editor::{EditorEvent, EditorState, Tool};
use crate::export::ExportDocument;
use crate::extract::{extract_stamps_after, ExtractOutcome};
use crate::geom::{Cell, CellRect};
use crate::grid::{TileGridStack, TileIndex};
use crate::object::{Anchor, ObjectCatalog, ObjectId, ObjectSprite};
use crate::pack::{AssetPack, TilesetInfo};
use crate::pixels::TilePixelFlags;
use crate::stamp::{next_numbered, StampId, StampLibrary};
use crate::store::{CatalogRecord, CatalogStore, TilesetId};
use std::fmt;
use tracing::{debug, info, warn};

/// A non-fatal problem surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Stored catalogs could not be read; the session runs with empty ones
    CatalogLoad {
        /// Tileset whose record failed
        tileset: TilesetId,
        /// Error text
        message: String,
    },
    /// A catalog change could not be written back
    CatalogSave {
        /// Tileset whose record failed
        tileset: TilesetId,
        /// Error text
        message: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::CatalogLoad { tileset, message } => {
                write!(f, "could not load catalogs for {tileset}: {message}")
            }
            Warning::CatalogSave { tileset, message } => {
                write!(f, "could not save catalogs for {tileset}: {message}")
            }
        }
    }
}

/// What an extraction run did to the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractReport {
    /// New stamps were added, largest first
    Added(Vec<StampId>),
    /// No region qualified; nothing was added
    NoSuitableRegions,
}

/// The authoring session.
pub struct Session {
    config: EditorConfig,
    pack: AssetPack,
    flags: TilePixelFlags,
    stack: TileGridStack,
    stamps: StampLibrary,
    objects: ObjectCatalog,
    categories: CategoryIndex,
    auto_extracted: bool,
    editor: EditorState,
    store: Box<dyn CatalogStore>,
    warnings: Vec<Warning>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("tileset", &self.pack.tileset.id)
            .field("stamps", &self.stamps.len())
            .field("objects", &self.objects.definitions().len())
            .field("editor", &self.editor)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Opens a session on `pack`, restoring its catalogs from `store`.
    ///
    /// A store failure is recorded as a warning and the session starts with
    /// empty operator catalogs.
    pub fn open(
        config: EditorConfig,
        pack: AssetPack,
        flags: TilePixelFlags,
        store: Box<dyn CatalogStore>,
    ) -> Self {
        let stack = blank_stack(&config);
        let mut session = Self {
            config,
            pack,
            flags,
            stack,
            stamps: StampLibrary::default(),
            objects: ObjectCatalog::default(),
            categories: CategoryIndex::default(),
            auto_extracted: false,
            editor: EditorState::default(),
            store,
            warnings: Vec::new(),
        };
        session.restore_catalogs();
        session
    }

    fn restore_catalogs(&mut self) {
        let tileset = self.pack.tileset.id.clone();
        let record = match self.store.load(&tileset) {
            Ok(record) => record,
            Err(err) => {
                warn!(%tileset, error = %err, "catalog load failed, continuing with empty catalogs");
                self.warnings.push(Warning::CatalogLoad {
                    tileset: tileset.clone(),
                    message: err.to_string(),
                });
                CatalogRecord::default()
            }
        };
        info!(
            %tileset,
            stamps = record.stamps.len(),
            objects = record.objects.len(),
            categories = record.categories.len(),
            "catalogs restored"
        );
        self.categories = CategoryIndex::new(&self.pack.category_ranges, record.categories);
        self.stamps = StampLibrary::from_definitions(record.stamps);
        self.objects = ObjectCatalog::new(self.pack.objects.clone(), record.objects);
        self.auto_extracted = record.auto_extracted;
    }

    fn persist(&mut self) {
        let tileset = self.pack.tileset.id.clone();
        let record = CatalogRecord {
            categories: self.categories.overrides().clone(),
            stamps: self.stamps.definitions().to_vec(),
            objects: self.objects.user_definitions().cloned().collect(),
            auto_extracted: self.auto_extracted,
        };
        if let Err(err) = self.store.save(&tileset, &record) {
            warn!(%tileset, error = %err, "catalog save failed");
            self.warnings.push(Warning::CatalogSave {
                tileset,
                message: err.to_string(),
            });
        }
    }

    /// Switches to another tileset.
    ///
    /// The live grid and placements are discarded since tile indices mean
    /// nothing across tilesets. Stored catalogs of other tilesets stay put.
    pub fn switch_tileset(&mut self, pack: AssetPack, flags: TilePixelFlags) {
        info!(from = %self.pack.tileset.id, to = %pack.tileset.id, "switching tileset");
        self.pack = pack;
        self.flags = flags;
        self.stack = blank_stack(&self.config);
        self.editor = self.editor.clone().update(&EditorEvent::TilesetSwitched).0;
        self.restore_catalogs();
    }

    /// Replaces the grid with a blank one and drops every placement.
    pub fn reset_map(&mut self, width: usize, height: usize, layer_count: usize) {
        self.stack = TileGridStack::create_blank(width, height, layer_count);
        self.objects.clear_placements();
    }

    /// Runs one input event. Returns whether the grid or placements changed.
    pub fn handle(&mut self, event: EditorEvent) -> bool {
        match &event {
            EditorEvent::SelectTool(Tool::Stamp { id }) => {
                if !self.stamps.set_active(Some(*id)) {
                    debug!(?id, "unknown stamp selected, ignored");
                    return false;
                }
            }
            EditorEvent::SelectTool(Tool::Object { id }) => {
                if self.objects.get(id).is_none() {
                    debug!(%id, "unknown object selected, ignored");
                    return false;
                }
                self.stamps.set_active(None);
            }
            EditorEvent::SelectTool(_) => {
                self.stamps.set_active(None);
            }
            _ => {}
        }

        let (next, commands) = self.editor.clone().update(&event);
        self.editor = next;
        commands
            .into_iter()
            .fold(false, |changed, command| self.execute(command) | changed)
    }

    /// Executes one editor command.
    pub fn execute(&mut self, command: EditorCommand) -> bool {
        match command {
            EditorCommand::SetCell { layer, cell, tile } => self.stack.set_cell(layer, cell.col, cell.row, tile),
            EditorCommand::SetCollision { cell, code } => self.stack.set_collision(cell.col, cell.row, code),
            EditorCommand::PickTile { cell } => {
                if let Some(top) = self.stack.top_tile_at(cell.col, cell.row) {
                    self.handle(EditorEvent::TilePicked {
                        tile: top.tile,
                        layer: top.layer,
                    });
                }
                false
            }
            EditorCommand::PlaceStamp {
                id,
                origin,
                transform,
                skip_empty,
            } => match self.stamps.get(id) {
                Some(stamp) => stamp.place(&mut self.stack, origin, transform, skip_empty),
                None => {
                    debug!(?id, "stamp no longer exists, nothing placed");
                    false
                }
            },
            EditorCommand::PlaceObject { id, cell } => self
                .objects
                .place(&id, cell, self.stack.width(), self.stack.height())
                .is_some(),
            EditorCommand::RemoveObjectAt { cell } => self.objects.remove_at(cell).is_some(),
            EditorCommand::CaptureStamp { selection } => {
                let n = next_numbered("Stamp", self.stamps.definitions().iter().map(|s| s.name.as_str()));
                let name = format!("Stamp {n}");
                self.capture_stamp(selection, &name);
                false
            }
            EditorCommand::CaptureObject { selection, anchor } => {
                let n = next_numbered("Object", self.objects.user_definitions().map(|d| d.name.as_str()));
                let name = format!("Object {n}");
                self.capture_object(selection, &name, anchor);
                false
            }
        }
    }

    /// Captures a map selection as a stamp and persists the library.
    pub fn capture_stamp(&mut self, selection: CellRect, name: &str) -> Option<StampId> {
        let id = self.stamps.capture(&self.stack, selection, name)?;
        self.persist();
        Some(id)
    }

    /// Renames a stamp.
    pub fn rename_stamp(&mut self, id: StampId, name: &str) -> bool {
        let renamed = self.stamps.rename(id, name);
        if renamed {
            self.persist();
        }
        renamed
    }

    /// Deletes a stamp and drops the stamp tool if it was using it.
    pub fn delete_stamp(&mut self, id: StampId) -> bool {
        if !self.stamps.delete(id) {
            return false;
        }
        self.editor = self.editor.clone().update(&EditorEvent::StampDeleted(id)).0;
        self.persist();
        true
    }

    /// Captures a tileset selection (in tile units) as an object.
    ///
    /// Selections reaching past the tileset image are ignored.
    pub fn capture_object(&mut self, selection: CellRect, name: &str, anchor: Anchor) -> Option<ObjectId> {
        let ts = &self.pack.tileset;
        let fits = selection.min_col >= 0
            && selection.min_row >= 0
            && selection.max_col < ts.columns() as i32
            && selection.max_row < ts.rows() as i32;
        if !fits {
            debug!(?selection, "object selection outside tileset, ignored");
            return None;
        }
        let (w, h) = (selection.width() as u32, selection.height() as u32);
        let sprite = ObjectSprite::Region {
            x: selection.min_col as u32 * ts.tile_dim,
            y: selection.min_row as u32 * ts.tile_dim,
            width: w * ts.tile_dim,
            height: h * ts.tile_dim,
        };
        let id = self.objects.capture(name, w, h, anchor, sprite)?;
        self.persist();
        Some(id)
    }

    /// Renames an operator-authored object.
    pub fn rename_object(&mut self, id: &ObjectId, name: &str) -> bool {
        let renamed = self.objects.rename(id, name);
        if renamed {
            self.persist();
        }
        renamed
    }

    /// Deletes an operator-authored object and all of its placements.
    pub fn delete_object(&mut self, id: &ObjectId) -> bool {
        if !self.objects.delete(id) {
            return false;
        }
        self.editor = self.editor.clone().update(&EditorEvent::ObjectDeleted(id.clone())).0;
        self.persist();
        true
    }

    /// Sets or clears the category override of one tile.
    pub fn assign_category(&mut self, tile: TileIndex, category: Option<TileCategory>) -> bool {
        let changed = self.categories.assign(tile, category);
        if changed {
            self.persist();
        }
        changed
    }

    /// Tags a set of tiles at once, skipping hidden ones.
    pub fn bulk_assign_categories<I>(&mut self, tiles: I, category: Option<TileCategory>) -> usize
    where
        I: IntoIterator<Item = TileIndex>,
    {
        let changed = self.categories.bulk_assign(tiles, category, &self.flags);
        if changed > 0 {
            self.persist();
        }
        changed
    }

    /// Default-tags every used, untagged tile.
    pub fn auto_tag_used(&mut self) -> usize {
        let tagged = self.categories.auto_tag_used(&self.stack, &self.flags);
        if tagged > 0 {
            self.persist();
        }
        tagged
    }

    /// Palette contents for the active tileset.
    pub fn palette(&self, filter: PaletteFilter) -> Vec<TileIndex> {
        self.categories
            .palette(self.pack.tileset.tile_count(), filter, &self.flags)
    }

    /// Segments the current map into stamps and adds them to the library.
    pub fn extract_stamps(&mut self) -> ExtractReport {
        let outcome = extract_stamps_after(
            &self.stack,
            &self.categories,
            &self.flags,
            &self.config.extraction,
            self.stamps.definitions(),
        );
        self.auto_extracted = true;
        let report = match outcome {
            ExtractOutcome::Extracted(stamps) => {
                ExtractReport::Added(stamps.into_iter().map(|s| self.stamps.insert(s)).collect())
            }
            ExtractOutcome::NoSuitableRegions => ExtractReport::NoSuitableRegions,
        };
        self.persist();
        report
    }

    /// Runs extraction only if it never ran for this tileset.
    pub fn auto_extract_once(&mut self) -> Option<ExtractReport> {
        if self.auto_extracted {
            return None;
        }
        Some(self.extract_stamps())
    }

    /// Export snapshot of the current state.
    pub fn export(&self) -> ExportDocument {
        ExportDocument::build(&self.pack.tileset, &self.stack, &self.objects)
    }

    /// Places an object directly, bypassing the editor.
    pub fn place_object(&mut self, id: &ObjectId, at: Cell) -> bool {
        self.execute(EditorCommand::PlaceObject { id: id.clone(), cell: at })
    }

    /// Active tileset.
    pub fn tileset(&self) -> &TilesetInfo {
        &self.pack.tileset
    }

    /// Live grid.
    pub fn stack(&self) -> &TileGridStack {
        &self.stack
    }

    /// Stamp library.
    pub fn stamps(&self) -> &StampLibrary {
        &self.stamps
    }

    /// Object catalog and placements.
    pub fn objects(&self) -> &ObjectCatalog {
        &self.objects
    }

    /// Category assignments.
    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    /// Editor state.
    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// Whether auto-extraction already ran for this tileset.
    pub fn auto_extracted(&self) -> bool {
        self.auto_extracted
    }

    /// Backing store.
    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Drains the warning list.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

fn blank_stack(config: &EditorConfig) -> TileGridStack {
    TileGridStack::create_blank(config.map.width, config.map.height, config.map.layer_count)
}
