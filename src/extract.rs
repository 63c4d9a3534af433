//! Automatic stamp extraction.
//!
//! Segments a painted map into candidate stamps: detect the dominant ground
//! tiles, flood-fill everything else into 4-connected components, filter and
//! rank them, then slice each survivor out as a stamp.

use crate::category::{CategoryIndex, TileCategory};
use crate::geom::CellRect;
use crate::grid::{TileGridLayer, TileGridStack, TileIndex, EMPTY_TILE};
use crate::pixels::TilePixelFlags;
use crate::stamp::{next_numbered, StampDefinition, StampId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Lower clamp for [`ExtractConfig::ground_coverage`].
pub const MIN_GROUND_COVERAGE: f32 = 0.4;
/// Upper clamp for [`ExtractConfig::ground_coverage`].
pub const MAX_GROUND_COVERAGE: f32 = 0.95;

const TREE_TRANSPARENCY_RATIO: f32 = 0.45;

/// Tuning knobs for extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractConfig {
    /// Components smaller than this are discarded
    pub min_tiles: usize,
    /// Widest bounding box kept
    pub max_width: usize,
    /// Tallest bounding box kept
    pub max_height: usize,
    /// At most this many stamps are produced
    pub max_stamps: usize,
    /// Fraction of painted base cells the ground set must cover
    pub ground_coverage: f32,
    /// At most this many distinct ground tiles
    pub max_ground_tiles: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_tiles: 4,
            max_width: 12,
            max_height: 12,
            max_stamps: 24,
            ground_coverage: 0.7,
            max_ground_tiles: 6,
        }
    }
}

/// Result of an extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// Stamps ready to be added to the library, largest first
    Extracted(Vec<StampDefinition>),
    /// Nothing survived filtering
    NoSuitableRegions,
}

/// Base-layer tiles treated as background.
///
/// Most frequent tiles are taken greedily until they cover `coverage`
/// (clamped) of the painted base cells or `max_tiles` is reached.
pub fn detect_ground(stack: &TileGridStack, coverage: f32, max_tiles: usize) -> BTreeSet<TileIndex> {
    let coverage = coverage.clamp(MIN_GROUND_COVERAGE, MAX_GROUND_COVERAGE);
    let mut counts: HashMap<TileIndex, usize> = HashMap::new();
    let mut painted = 0usize;
    if let Some(base) = stack.layer(0) {
        for &tile in base.columns().iter().flatten() {
            if tile != EMPTY_TILE {
                *counts.entry(tile).or_default() += 1;
                painted += 1;
            }
        }
    }

    let mut ranked: Vec<(TileIndex, usize)> = counts.into_iter().collect();
    // Ties broken by tile index so the result does not depend on hash order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut ground = BTreeSet::new();
    let mut covered = 0usize;
    for (tile, count) in ranked {
        if ground.len() >= max_tiles || covered as f32 >= coverage * painted as f32 {
            break;
        }
        ground.insert(tile);
        covered += count;
    }
    ground
}

#[derive(Debug, Default)]
struct Component {
    bounds: Option<CellRect>,
    cells: usize,
    layer_instances: Vec<usize>,
    transparent: usize,
    categories: HashMap<TileCategory, usize>,
}

impl Component {
    fn grow(&mut self, col: i32, row: i32) {
        self.cells += 1;
        self.bounds = Some(match self.bounds {
            None => CellRect {
                min_col: col,
                max_col: col,
                min_row: row,
                max_row: row,
            },
            Some(b) => CellRect {
                min_col: b.min_col.min(col),
                max_col: b.max_col.max(col),
                min_row: b.min_row.min(row),
                max_row: b.max_row.max(row),
            },
        });
    }

    fn instances(&self) -> usize {
        self.layer_instances.iter().sum()
    }

    fn overlay_instances(&self) -> usize {
        self.layer_instances.iter().skip(1).sum()
    }

    fn has(&self, category: TileCategory) -> bool {
        self.categories.get(&category).is_some_and(|&n| n > 0)
    }
}

struct Segmenter<'a> {
    stack: &'a TileGridStack,
    ground: &'a BTreeSet<TileIndex>,
    categories: &'a CategoryIndex,
    flags: &'a TilePixelFlags,
}

impl Segmenter<'_> {
    fn is_foreground(&self, col: i32, row: i32) -> bool {
        let base = self.stack.get(0, col, row);
        if base != EMPTY_TILE && !self.ground.contains(&base) {
            return true;
        }
        (1..self.stack.layer_count()).any(|l| self.stack.get(l, col, row) != EMPTY_TILE)
    }

    fn tally(&self, component: &mut Component, col: i32, row: i32) {
        for layer in 0..self.stack.layer_count() {
            let tile = self.stack.get(layer, col, row);
            if tile == EMPTY_TILE || (layer == 0 && self.ground.contains(&tile)) {
                continue;
            }
            component.layer_instances[layer] += 1;
            if self.flags.is_transparent(tile) {
                component.transparent += 1;
            }
            if let Some(c) = self.categories.resolve(tile) {
                *component.categories.entry(c).or_default() += 1;
            }
        }
    }

    /// 4-connected labeling; each cell is visited once.
    fn components(&self) -> Vec<Component> {
        let (w, h) = (self.stack.width(), self.stack.height());
        let mut visited = vec![false; w * h];
        let mut out = Vec::new();
        let mut pending = Vec::new();

        for start_col in 0..w {
            for start_row in 0..h {
                let start = start_col * h + start_row;
                if visited[start] || !self.is_foreground(start_col as i32, start_row as i32) {
                    continue;
                }
                visited[start] = true;
                let mut component = Component {
                    layer_instances: vec![0; self.stack.layer_count()],
                    ..Default::default()
                };
                pending.push((start_col as i32, start_row as i32));

                while let Some((col, row)) = pending.pop() {
                    component.grow(col, row);
                    self.tally(&mut component, col, row);
                    for (nc, nr) in [(col - 1, row), (col + 1, row), (col, row - 1), (col, row + 1)] {
                        if !self.stack.in_bounds(nc, nr) {
                            continue;
                        }
                        let idx = nc as usize * h + nr as usize;
                        if !visited[idx] && self.is_foreground(nc, nr) {
                            visited[idx] = true;
                            pending.push((nc, nr));
                        }
                    }
                }
                out.push(component);
            }
        }
        out
    }
}

struct Namer {
    buildings: usize,
    paths: usize,
    trees: usize,
    prefabs: usize,
}

impl Namer {
    /// Counters continue after the numbered names already in `existing`.
    fn continuing(existing: &[StampDefinition]) -> Self {
        let last = |prefix: &str| next_numbered(prefix, existing.iter().map(|s| s.name.as_str())) - 1;
        Self {
            buildings: last("Building"),
            paths: last("Path"),
            trees: last("Tree Cluster"),
            prefabs: last("Prefab"),
        }
    }

    /// First matching rule wins; each rule has its own counter.
    fn name(&mut self, c: &Component) -> String {
        let instances = c.instances();
        let transparent_ratio = if instances == 0 {
            0.0
        } else {
            c.transparent as f32 / instances as f32
        };

        if c.has(TileCategory::Buildings) {
            self.buildings += 1;
            format!("Building {}", self.buildings)
        } else if c.has(TileCategory::Paths) || c.overlay_instances() == 0 {
            self.paths += 1;
            format!("Path {}", self.paths)
        } else if transparent_ratio > TREE_TRANSPARENCY_RATIO {
            self.trees += 1;
            format!("Tree Cluster {}", self.trees)
        } else {
            self.prefabs += 1;
            format!("Prefab {}", self.prefabs)
        }
    }
}

fn materialize(
    stack: &TileGridStack,
    ground: &BTreeSet<TileIndex>,
    bounds: CellRect,
    name: String,
) -> StampDefinition {
    let (width, height) = (bounds.width(), bounds.height());
    let layers = (0..stack.layer_count())
        .map(|layer| {
            TileGridLayer::from_columns(
                (0..width as i32)
                    .map(|x| {
                        (0..height as i32)
                            .map(|y| {
                                let tile = stack.get(layer, bounds.min_col + x, bounds.min_row + y);
                                if layer == 0 && ground.contains(&tile) {
                                    EMPTY_TILE
                                } else {
                                    tile
                                }
                            })
                            .collect()
                    })
                    .collect(),
            )
        })
        .collect();
    StampDefinition {
        id: StampId::new(),
        name,
        width,
        height,
        layers,
    }
}

/// Runs the full extraction pipeline. Never mutates its inputs.
pub fn extract_stamps(
    stack: &TileGridStack,
    categories: &CategoryIndex,
    flags: &TilePixelFlags,
    config: &ExtractConfig,
) -> ExtractOutcome {
    extract_stamps_after(stack, categories, flags, config, &[])
}

/// Same as [`extract_stamps`], but generated names continue the numbering of
/// `existing`, so a rerun never repeats a name already in the library.
///
/// Every component is labeled before `max_stamps` applies: the cap keeps the
/// largest regions, which may be found last in scan order.
pub fn extract_stamps_after(
    stack: &TileGridStack,
    categories: &CategoryIndex,
    flags: &TilePixelFlags,
    config: &ExtractConfig,
    existing: &[StampDefinition],
) -> ExtractOutcome {
    let ground = detect_ground(stack, config.ground_coverage, config.max_ground_tiles);
    let segmenter = Segmenter {
        stack,
        ground: &ground,
        categories,
        flags,
    };
    let components = segmenter.components();
    let found = components.len();

    let mut kept: Vec<(CellRect, Component)> = components
        .into_iter()
        .filter_map(|c| c.bounds.map(|b| (b, c)))
        .filter(|(b, c)| {
            c.cells >= config.min_tiles && b.width() <= config.max_width && b.height() <= config.max_height
        })
        .collect();
    kept.sort_by(|a, b| b.1.cells.cmp(&a.1.cells));
    kept.truncate(config.max_stamps);
    debug!(?ground, found, kept = kept.len(), "segmented map");

    if kept.is_empty() {
        info!("auto-extraction found no suitable regions");
        return ExtractOutcome::NoSuitableRegions;
    }

    let mut namer = Namer::continuing(existing);
    let stamps: Vec<StampDefinition> = kept
        .into_iter()
        .map(|(bounds, c)| {
            let name = namer.name(&c);
            materialize(stack, &ground, bounds, name)
        })
        .collect();
    info!(count = stamps.len(), "auto-extraction produced stamps");
    ExtractOutcome::Extracted(stamps)
}
