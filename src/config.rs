use crate::error::{require_json, MapError};
use crate::extract::ExtractConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Size of the blank map a session starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapDefaults {
    /// Width in tiles
    pub width: usize,
    /// Height in tiles
    pub height: usize,
    /// Tile layers, base included
    pub layer_count: usize,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            width: 40,
            height: 30,
            layer_count: 3,
        }
    }
}

/// Editor configuration. Every field has a default, so partial files load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// New map dimensions
    pub map: MapDefaults,
    /// Auto-extraction tuning
    pub extraction: ExtractConfig,
}

impl EditorConfig {
    /// Parses a configuration from a JSON string.
    pub fn load_from_str(json: &str) -> Result<Self, MapError> {
        serde_json::from_str(json).map_err(MapError::Parse)
    }

    /// Loads a configuration file; only JSON is supported.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let p = path.as_ref();
        require_json(p)?;
        let txt = std::fs::read_to_string(p).map_err(|source| MapError::io(p, source))?;
        serde_json::from_str(&txt).map_err(|source| MapError::json(p, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = EditorConfig::load_from_str(
            r#"{ "map": { "width": 8 }, "extraction": { "minTiles": 2, "groundCoverage": 0.5 } }"#,
        )
        .expect("config");
        assert_eq!(config.map.width, 8);
        assert_eq!(config.map.height, MapDefaults::default().height);
        assert_eq!(config.extraction.min_tiles, 2);
        assert_eq!(config.extraction.max_ground_tiles, 6);
    }

    #[test]
    fn empty_object_is_the_default() {
        assert_eq!(EditorConfig::load_from_str("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn rejects_non_json_paths() {
        let err = EditorConfig::load_from_file("editor.toml").unwrap_err();
        assert!(matches!(err, MapError::UnsupportedFormat(ext) if ext == "editor.toml"));
    }
}
