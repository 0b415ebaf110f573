//! Text map format: one line per row, one symbol per column.

use open_world_core::{GridMap, GridMapError, Tile, TileCoord};
use thiserror::Error;

/// Reasons a map text could not be turned into a [`GridMap`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapParseError {
    /// The text contained no rows.
    #[error("map contains no rows")]
    Empty,
    /// A row's width differs from the first row's.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The grid was rectangular but failed structural validation.
    #[error(transparent)]
    Invalid(#[from] GridMapError),
}

/// Parses a map where `1` is a wall, `P` the spawn and anything else floor.
///
/// Only line endings are stripped, so spaces anywhere in a row are floor
/// cells. Trailing empty lines are ignored.
pub fn parse_map(text: &str) -> Result<GridMap, MapParseError> {
    let mut rows: Vec<&str> = text
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    while rows.last().is_some_and(|row| row.is_empty()) {
        let _ = rows.pop();
    }

    let expected = rows.first().map_or(0, |row| row.chars().count());
    if expected == 0 {
        return Err(MapParseError::Empty);
    }

    let mut tiles = Vec::with_capacity(expected * rows.len());
    for (index, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != expected {
            return Err(MapParseError::RaggedRow {
                row: index,
                expected,
                found,
            });
        }
        tiles.extend(row.chars().map(Tile::from_symbol));
    }

    let map = GridMap::from_tiles(
        TileCoord::new(expected as u32),
        TileCoord::new(rows.len() as u32),
        tiles,
    )?;
    Ok(map)
}
