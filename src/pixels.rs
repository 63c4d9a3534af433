use crate::grid::TileIndex;

/// Per-tile pixel facts computed by the tileset image pipeline.
///
/// Both vectors are indexed by tile index. Indices past the end read as
/// `false`, so an empty value is a valid "nothing known" state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilePixelFlags {
    has_transparency: Vec<bool>,
    is_hidden: Vec<bool>,
}

impl TilePixelFlags {
    /// Wraps the classifier output.
    pub fn new(has_transparency: Vec<bool>, is_hidden: Vec<bool>) -> Self {
        Self {
            has_transparency,
            is_hidden,
        }
    }

    /// Tile has at least one pixel with alpha below 255.
    #[inline]
    pub fn is_transparent(&self, tile: TileIndex) -> bool {
        lookup(&self.has_transparency, tile)
    }

    /// Tile is fully transparent or uniformly solid black.
    #[inline]
    pub fn is_hidden(&self, tile: TileIndex) -> bool {
        lookup(&self.is_hidden, tile)
    }
}

#[inline]
fn lookup(flags: &[bool], tile: TileIndex) -> bool {
    usize::try_from(tile)
        .ok()
        .and_then(|i| flags.get(i))
        .copied()
        .unwrap_or(false)
}
