//! Persistence of per-tileset catalogs.

use crate::category::TileCategory;
use crate::error::MapError;
use crate::grid::TileIndex;
use crate::object::ObjectDefinition;
use crate::stamp::StampDefinition;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identity of a tileset; every catalog is scoped by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TilesetId(pub String);

impl fmt::Display for TilesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TilesetId {
    fn from(s: &str) -> Self {
        TilesetId(s.to_owned())
    }
}

/// Everything persisted for one tileset. Always written whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Operator category overrides
    pub categories: BTreeMap<TileIndex, TileCategory>,
    /// Stamp library
    pub stamps: Vec<StampDefinition>,
    /// Operator-authored objects; pack objects are never stored
    pub objects: Vec<ObjectDefinition>,
    /// Auto-extraction already ran for this tileset
    pub auto_extracted: bool,
}

/// Key-value repository for catalog records.
pub trait CatalogStore {
    /// Record for `tileset`; an unknown tileset yields an empty record.
    fn load(&self, tileset: &TilesetId) -> Result<CatalogRecord, MapError>;

    /// Replaces the record for `tileset`.
    fn save(&mut self, tileset: &TilesetId, record: &CatalogRecord) -> Result<(), MapError>;
}

/// In-memory store, handy for tests and sessions that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<TilesetId, CatalogRecord>,
}

impl MemoryStore {
    /// Number of tilesets with a stored record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing was saved yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CatalogStore for MemoryStore {
    fn load(&self, tileset: &TilesetId) -> Result<CatalogRecord, MapError> {
        Ok(self.records.get(tileset).cloned().unwrap_or_default())
    }

    fn save(&mut self, tileset: &TilesetId, record: &CatalogRecord) -> Result<(), MapError> {
        self.records.insert(tileset.clone(), record.clone());
        Ok(())
    }
}

/// One pretty-printed JSON file per tileset inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at `dir`; the directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `tileset`.
    ///
    /// Every byte outside `[a-z0-9_-]` is percent-encoded, so distinct ids
    /// always get distinct file names, on case-insensitive file systems too.
    pub fn path_for(&self, tileset: &TilesetId) -> PathBuf {
        let mut name = String::with_capacity(tileset.0.len() + 5);
        for b in tileset.0.bytes() {
            if b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_' {
                name.push(char::from(b));
            } else {
                name.push_str(&format!("%{b:02X}"));
            }
        }
        name.push_str(".json");
        self.dir.join(name)
    }

    fn read(path: &Path) -> Result<CatalogRecord, MapError> {
        let txt = std::fs::read_to_string(path).map_err(|source| MapError::io(path, source))?;
        serde_json::from_str(&txt).map_err(|source| MapError::json(path, source))
    }
}

impl CatalogStore for JsonFileStore {
    fn load(&self, tileset: &TilesetId) -> Result<CatalogRecord, MapError> {
        let path = self.path_for(tileset);
        if !path.exists() {
            debug!(%tileset, "no stored catalog, starting empty");
            return Ok(CatalogRecord::default());
        }
        Self::read(&path)
    }

    fn save(&mut self, tileset: &TilesetId, record: &CatalogRecord) -> Result<(), MapError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| MapError::io(&self.dir, source))?;
        let path = self.path_for(tileset);
        let txt = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, txt).map_err(|source| MapError::io(&path, source))?;
        debug!(%tileset, path = %path.display(), "catalog saved");
        Ok(())
    }
}
