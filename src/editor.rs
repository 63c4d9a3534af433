//! Editor tool/mode state machine.
//!
//! [`EditorState::update`] is a pure `(state, event) -> (state, commands)`
//! transition. It never touches the grid; anything that needs map data is
//! emitted as an [`EditorCommand`] for the session to run.

use crate::command::EditorCommand;
use crate::geom::{Cell, CellRect, Transform};
use crate::grid::{CollisionCode, TileIndex, EMPTY_TILE};
use crate::object::{Anchor, ObjectId};
use crate::stamp::StampId;

/// The active tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Tool {
    /// Paint the selected tile
    #[default]
    Brush,
    /// Clear cells on the active layer
    Eraser,
    /// Sample the topmost tile under the pointer
    Eyedropper,
    /// Place a stamp
    Stamp {
        /// Stamp being placed
        id: StampId,
    },
    /// Place objects; secondary click removes them
    Object {
        /// Object being placed
        id: ObjectId,
    },
    /// Paint collision codes
    Collision {
        /// Code written
        code: CollisionCode,
    },
}

/// What a capture selection turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    /// Map selection -> stamp
    Stamp,
    /// Tileset selection -> object
    Object {
        /// Anchor rule for the new object
        anchor: Anchor,
    },
}

/// Capture sub-state. While not idle, pointer input drives the selection
/// instead of the active tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureMode {
    /// No capture in progress
    #[default]
    Idle,
    /// Waiting for the first corner
    Armed(CaptureTarget),
    /// Dragging out a selection
    Selecting {
        /// What the selection becomes
        target: CaptureTarget,
        /// Corner where the drag started
        anchor: Cell,
        /// Corner under the pointer
        current: Cell,
    },
}

/// Discrete input the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Primary button pressed over a cell
    PointerDown(Cell),
    /// Pointer moved onto a cell
    PointerMove(Cell),
    /// Primary button released over a cell
    PointerUp(Cell),
    /// Secondary click over a cell
    SecondaryClick(Cell),
    /// Switch tools
    SelectTool(Tool),
    /// Choose the brush tile
    SelectTile(TileIndex),
    /// Choose the layer brush and eraser write to
    SelectLayer(usize),
    /// Result of an eyedropper sample
    TilePicked {
        /// Sampled tile
        tile: TileIndex,
        /// Layer it was found on
        layer: usize,
    },
    /// Rotate the stamp transform a quarter turn clockwise
    RotateStamp,
    /// Toggle horizontal flip of the stamp transform
    FlipStampX,
    /// Toggle vertical flip of the stamp transform
    FlipStampY,
    /// Toggle additive stamping
    ToggleSkipEmpty,
    /// Start a capture
    BeginCapture(CaptureTarget),
    /// Abandon the capture without committing anything
    CancelCapture,
    /// A stamp was deleted from the library
    StampDeleted(StampId),
    /// An object definition was deleted from the catalog
    ObjectDeleted(ObjectId),
    /// The tileset changed; selections are meaningless now
    TilesetSwitched,
}

/// Whole editor UI state as one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    /// Active tool
    pub tool: Tool,
    /// Capture sub-state
    pub capture: CaptureMode,
    /// Tile the brush paints
    pub selected_tile: TileIndex,
    /// Layer brush and eraser write to
    pub active_layer: usize,
    /// Stamp rotation and flips
    pub transform: Transform,
    /// Additive stamping
    pub skip_empty: bool,
    /// Primary button is held
    pub dragging: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            tool: Tool::Brush,
            capture: CaptureMode::Idle,
            selected_tile: EMPTY_TILE,
            active_layer: 0,
            transform: Transform::IDENTITY,
            skip_empty: true,
            dragging: false,
        }
    }
}

impl EditorState {
    /// Current capture rectangle, if a selection is being dragged.
    pub fn capture_selection(&self) -> Option<CellRect> {
        match self.capture {
            CaptureMode::Selecting { anchor, current, .. } => Some(CellRect::from_corners(anchor, current)),
            _ => None,
        }
    }

    /// Applies one event.
    pub fn update(self, event: &EditorEvent) -> (EditorState, Vec<EditorCommand>) {
        let mut next = self;
        let mut commands = Vec::new();

        match event {
            EditorEvent::PointerDown(cell) => {
                next.dragging = true;
                match next.capture {
                    CaptureMode::Armed(target) => {
                        next.capture = CaptureMode::Selecting {
                            target,
                            anchor: *cell,
                            current: *cell,
                        };
                    }
                    CaptureMode::Selecting { .. } => {}
                    CaptureMode::Idle => next.apply_tool(*cell, true, &mut commands),
                }
            }
            EditorEvent::PointerMove(cell) => match next.capture {
                CaptureMode::Selecting { target, anchor, .. } => {
                    next.capture = CaptureMode::Selecting {
                        target,
                        anchor,
                        current: *cell,
                    };
                }
                CaptureMode::Armed(_) => {}
                CaptureMode::Idle => {
                    if next.dragging {
                        next.apply_tool(*cell, false, &mut commands);
                    }
                }
            },
            EditorEvent::PointerUp(cell) => {
                next.dragging = false;
                if let CaptureMode::Selecting { target, anchor, .. } = next.capture {
                    let selection = CellRect::from_corners(anchor, *cell);
                    commands.push(match target {
                        CaptureTarget::Stamp => EditorCommand::CaptureStamp { selection },
                        CaptureTarget::Object { anchor } => EditorCommand::CaptureObject { selection, anchor },
                    });
                    next.capture = CaptureMode::Idle;
                }
            }
            EditorEvent::SecondaryClick(cell) => {
                if next.capture == CaptureMode::Idle && matches!(next.tool, Tool::Object { .. }) {
                    commands.push(EditorCommand::RemoveObjectAt { cell: *cell });
                }
            }
            EditorEvent::SelectTool(tool) => {
                next.tool = tool.clone();
                next.dragging = false;
            }
            EditorEvent::SelectTile(tile) => next.selected_tile = *tile,
            EditorEvent::SelectLayer(layer) => next.active_layer = *layer,
            EditorEvent::TilePicked { tile, layer } => {
                next.selected_tile = *tile;
                next.active_layer = *layer;
                next.tool = Tool::Brush;
            }
            EditorEvent::RotateStamp => next.transform.rotation = next.transform.rotation.rotate_cw(),
            EditorEvent::FlipStampX => next.transform.flip_x = !next.transform.flip_x,
            EditorEvent::FlipStampY => next.transform.flip_y = !next.transform.flip_y,
            EditorEvent::ToggleSkipEmpty => next.skip_empty = !next.skip_empty,
            EditorEvent::BeginCapture(target) => {
                next.capture = CaptureMode::Armed(*target);
                next.dragging = false;
            }
            EditorEvent::CancelCapture => {
                // The rest of an abandoned drag must not fall through to the tool.
                if next.capture != CaptureMode::Idle {
                    next.dragging = false;
                }
                next.capture = CaptureMode::Idle;
            }
            EditorEvent::StampDeleted(id) => {
                if next.tool == (Tool::Stamp { id: *id }) {
                    next.tool = Tool::Brush;
                }
            }
            EditorEvent::ObjectDeleted(id) => {
                if matches!(&next.tool, Tool::Object { id: current } if current == id) {
                    next.tool = Tool::Brush;
                }
            }
            EditorEvent::TilesetSwitched => {
                next = EditorState {
                    active_layer: next.active_layer,
                    ..EditorState::default()
                };
            }
        }

        (next, commands)
    }

    fn apply_tool(&self, cell: Cell, pressed: bool, commands: &mut Vec<EditorCommand>) {
        match &self.tool {
            Tool::Brush => {
                if self.selected_tile != EMPTY_TILE {
                    commands.push(EditorCommand::SetCell {
                        layer: self.active_layer,
                        cell,
                        tile: self.selected_tile,
                    });
                }
            }
            Tool::Eraser => commands.push(EditorCommand::SetCell {
                layer: self.active_layer,
                cell,
                tile: EMPTY_TILE,
            }),
            Tool::Collision { code } => commands.push(EditorCommand::SetCollision { cell, code: *code }),
            Tool::Eyedropper if pressed => commands.push(EditorCommand::PickTile { cell }),
            Tool::Stamp { id } if pressed => commands.push(EditorCommand::PlaceStamp {
                id: *id,
                origin: cell,
                transform: self.transform,
                skip_empty: self.skip_empty,
            }),
            Tool::Object { id } if pressed => commands.push(EditorCommand::PlaceObject {
                id: id.clone(),
                cell,
            }),
            Tool::Eyedropper | Tool::Stamp { .. } | Tool::Object { .. } => {}
        }
    }
}
