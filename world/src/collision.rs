//! Axis-aligned overlap queries between a moving footprint and static obstacles.

use open_world_core::{CellCoord, Collidable, Footprint, GridMap, ObstacleId, ObstacleSnapshot};

/// Derives one obstacle per wall tile, numbered in row-major order.
pub(crate) fn obstacles_from_map(map: &GridMap, tile_length: f32) -> Vec<ObstacleSnapshot> {
    map.wall_cells()
        .enumerate()
        .map(|(index, cell)| obstacle_at(ObstacleId::new(index as u32), cell, tile_length))
        .collect()
}

fn obstacle_at(id: ObstacleId, cell: CellCoord, tile_length: f32) -> ObstacleSnapshot {
    ObstacleSnapshot {
        id,
        cell,
        footprint: Footprint::tile(cell.origin(tile_length), tile_length),
    }
}

/// Returns the first candidate whose footprint strictly overlaps `subject`.
///
/// Candidates are scanned in slice order, so callers that keep obstacles
/// sorted by identifier receive the lowest overlapping identifier.
#[must_use]
pub fn first_overlap<'a, T>(subject: &Footprint, candidates: &'a [T]) -> Option<&'a T>
where
    T: Collidable,
{
    candidates
        .iter()
        .find(|candidate| subject.overlaps(&candidate.footprint()))
}

/// Iterates over every candidate strictly overlapping `subject`.
pub fn overlapping<'a, T>(
    subject: &'a Footprint,
    candidates: &'a [T],
) -> impl Iterator<Item = &'a T> + 'a
where
    T: Collidable,
{
    candidates
        .iter()
        .filter(move |candidate| subject.overlaps(&candidate.footprint()))
}
