#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Open World demo.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems read immutable snapshots such as [`PlayerSnapshot`] and
//! respond exclusively with new command batches.

use std::{error::Error, fmt, time::Duration};

use glam::Vec2;
use serde::Deserialize;

/// Title shown by adapters that open a window.
pub const WINDOW_TITLE: &str = "Open World Test";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the pixel geometry and travel speed used for movement.
    ConfigureMotion {
        /// Side length of a square tile measured in pixels.
        tile_length: f32,
        /// Distance covered by a transiting player per second, in pixels.
        speed: f32,
    },
    /// Replaces the active level, its obstacles and its player wholesale.
    LoadLevel {
        /// Map describing the new level.
        map: GridMap,
    },
    /// Requests that the player start travelling toward the adjacent tile.
    SteerPlayer {
        /// Direction of the requested transit.
        direction: Direction,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a new level replaced any previous one.
    LevelLoaded {
        /// Number of tile columns in the new map.
        columns: TileCoord,
        /// Number of tile rows in the new map.
        rows: TileCoord,
        /// Cell the player spawned on.
        spawn: CellCoord,
        /// Number of obstacles derived from wall tiles.
        obstacles: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player accepted a steering request.
    TransitStarted {
        /// Direction of travel.
        direction: Direction,
        /// Lattice cell the transit departs from.
        from: LatticeCoord,
        /// Lattice cell the transit heads toward.
        to: LatticeCoord,
    },
    /// Reports that a steering request violated the axis lock.
    SteerRejected {
        /// Direction that was requested.
        direction: Direction,
    },
    /// Confirms that the player reached the end of its transit.
    PlayerArrived {
        /// Lattice cell the player now rests on.
        cell: LatticeCoord,
    },
    /// Reports that the player hit an obstacle and was rolled back.
    PlayerCollided {
        /// First obstacle overlapping the player's footprint.
        obstacle: ObstacleId,
        /// Lattice cell the player was restored to.
        restored_to: LatticeCoord,
    },
}

/// Cardinal movement directions available to the player.
///
/// Screen space grows downward, so [`Direction::North`] decreases the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Axis the direction travels along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::East | Self::West => Axis::Horizontal,
            Self::North | Self::South => Axis::Vertical,
        }
    }

    /// Unit vector pointing in the direction, in pixel space.
    #[must_use]
    pub const fn unit_vector(self) -> Vec2 {
        let (column, row) = self.lattice_step();
        Vec2::new(column as f32, row as f32)
    }

    /// Column and row deltas produced by a single step.
    #[must_use]
    pub const fn lattice_step(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Movement axes used by the axis lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Left and right.
    Horizontal,
    /// Up and down.
    Vertical,
}

impl Axis {
    /// The axis perpendicular to `self`.
    #[must_use]
    pub const fn orthogonal(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Directional keys held during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldDirections {
    /// Left arrow or `A`.
    pub left: bool,
    /// Right arrow or `D`.
    pub right: bool,
    /// Up arrow or `W`.
    pub up: bool,
    /// Down arrow or `S`.
    pub down: bool,
}

impl HeldDirections {
    /// Horizontal candidate; left wins when both keys are held.
    #[must_use]
    pub const fn horizontal(&self) -> Option<Direction> {
        if self.left {
            Some(Direction::West)
        } else if self.right {
            Some(Direction::East)
        } else {
            None
        }
    }

    /// Vertical candidate; up wins when both keys are held.
    #[must_use]
    pub const fn vertical(&self) -> Option<Direction> {
        if self.up {
            Some(Direction::North)
        } else if self.down {
            Some(Direction::South)
        } else {
            None
        }
    }

    /// Candidate along the provided axis.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> Option<Direction> {
        match axis {
            Axis::Horizontal => self.horizontal(),
            Axis::Vertical => self.vertical(),
        }
    }
}

/// Index within the tile grid measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord(u32);

impl TileCoord {
    /// Creates a new tile coordinate wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying tile index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single map cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Top-left corner of the cell in pixel space.
    #[must_use]
    pub fn origin(&self, tile_length: f32) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32) * tile_length
    }
}

/// Signed lattice cell that may lie outside the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LatticeCoord {
    column: i32,
    row: i32,
}

impl LatticeCoord {
    /// Creates a new lattice coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Lattice cell containing the provided pixel-space point.
    ///
    /// Uses floor division so points left of or above the map origin map to
    /// negative cells rather than collapsing onto cell zero.
    #[must_use]
    pub fn containing(point: Vec2, tile_length: f32) -> Self {
        let cell = (point / tile_length).floor();
        Self {
            column: cell.x as i32,
            row: cell.y as i32,
        }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Top-left corner of the cell in pixel space.
    #[must_use]
    pub fn origin(&self, tile_length: f32) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32) * tile_length
    }

    /// Adjacent cell one step away in `direction`.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        let (column, row) = direction.lattice_step();
        Self {
            column: self.column + column,
            row: self.row + row,
        }
    }
}

impl From<CellCoord> for LatticeCoord {
    fn from(cell: CellCoord) -> Self {
        Self::new(cell.column() as i32, cell.row() as i32)
    }
}

/// Contents of a single map cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Walkable floor.
    #[default]
    Empty,
    /// Impassable wall that becomes an obstacle.
    Wall,
    /// Walkable floor where the player appears.
    Spawn,
}

impl Tile {
    /// Decodes a map-file symbol. Unknown symbols are floor.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Self {
        match symbol {
            '1' => Self::Wall,
            'P' => Self::Spawn,
            _ => Self::Empty,
        }
    }

    /// Canonical map-file symbol for the tile.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Wall => '1',
            Self::Spawn => 'P',
        }
    }
}

/// Describes the discrete tile layout of a level in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGrid {
    columns: TileCoord,
    rows: TileCoord,
    tile_length: f32,
}

impl TileGrid {
    /// Creates a new tile grid description.
    #[must_use]
    pub const fn new(columns: TileCoord, rows: TileCoord, tile_length: f32) -> Self {
        Self {
            columns,
            rows,
            tile_length,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> TileCoord {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> TileCoord {
        self.rows
    }

    /// Side length of a single square tile expressed in pixels.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Total width of the grid measured in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns.get() as f32 * self.tile_length
    }

    /// Total height of the grid measured in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows.get() as f32 * self.tile_length
    }

    /// Rectangle covering the whole grid, anchored at the origin.
    #[must_use]
    pub fn bounds(&self) -> Footprint {
        Footprint::new(Vec2::ZERO, Vec2::new(self.width(), self.height()))
    }
}

/// Rectangular, row-major map of tiles with exactly one spawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    columns: TileCoord,
    rows: TileCoord,
    tiles: Vec<Tile>,
    spawn: CellCoord,
}

impl GridMap {
    /// Builds a map from row-major tiles.
    ///
    /// Fails when `tiles` does not hold `columns * rows` entries or when the
    /// map does not contain exactly one [`Tile::Spawn`].
    pub fn from_tiles(
        columns: TileCoord,
        rows: TileCoord,
        tiles: Vec<Tile>,
    ) -> Result<Self, GridMapError> {
        let expected = u64::from(columns.get()) * u64::from(rows.get());
        if tiles.len() as u64 != expected {
            return Err(GridMapError::DimensionMismatch {
                expected,
                actual: tiles.len(),
            });
        }

        let width = columns.get() as usize;
        let mut spawns = tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| **tile == Tile::Spawn)
            .map(|(index, _)| CellCoord::new((index % width) as u32, (index / width) as u32));
        let spawn = spawns.next().ok_or(GridMapError::MissingSpawn)?;
        let extra = spawns.count();
        if extra > 0 {
            return Err(GridMapError::MultipleSpawns { count: extra + 1 });
        }

        Ok(Self {
            columns,
            rows,
            tiles,
            spawn,
        })
    }

    /// Number of columns in the map.
    #[must_use]
    pub const fn columns(&self) -> TileCoord {
        self.columns
    }

    /// Number of rows in the map.
    #[must_use]
    pub const fn rows(&self) -> TileCoord {
        self.rows
    }

    /// Tile stored at `cell`, or `None` outside the map.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        if cell.column() >= self.columns.get() || cell.row() >= self.rows.get() {
            return None;
        }
        let index = cell.row() as usize * self.columns.get() as usize + cell.column() as usize;
        self.tiles.get(index).copied()
    }

    /// Iterates over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Tile)> + '_ {
        let width = self.columns.get().max(1) as usize;
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            (
                CellCoord::new((index % width) as u32, (index / width) as u32),
                *tile,
            )
        })
    }

    /// Cells holding walls, in row-major order.
    pub fn wall_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.iter()
            .filter(|(_, tile)| *tile == Tile::Wall)
            .map(|(cell, _)| cell)
    }

    /// Number of wall tiles.
    #[must_use]
    pub fn wall_count(&self) -> usize {
        self.tiles.iter().filter(|tile| **tile == Tile::Wall).count()
    }

    /// The unique spawn cell.
    #[must_use]
    pub const fn spawn(&self) -> CellCoord {
        self.spawn
    }
}

/// Structural problems detected while building a [`GridMap`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridMapError {
    /// The tile count does not match the declared dimensions.
    DimensionMismatch {
        /// Tile count implied by the dimensions.
        expected: u64,
        /// Tile count provided.
        actual: usize,
    },
    /// No spawn tile was present.
    MissingSpawn,
    /// More than one spawn tile was present.
    MultipleSpawns {
        /// Number of spawn tiles found.
        count: usize,
    },
}

impl fmt::Display for GridMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "map declares {expected} tiles but holds {actual}")
            }
            Self::MissingSpawn => write!(f, "map has no spawn tile"),
            Self::MultipleSpawns { count } => {
                write!(f, "map has {count} spawn tiles, expected exactly one")
            }
        }
    }
}

impl Error for GridMapError {}

/// Axis-aligned rectangle occupied by an entity in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    origin: Vec2,
    size: Vec2,
}

impl Footprint {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Square rectangle with side `tile_length` anchored at `origin`.
    #[must_use]
    pub const fn tile(origin: Vec2, tile_length: f32) -> Self {
        Self::new(origin, Vec2::splat(tile_length))
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Bottom-right corner.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Footprint) -> bool {
        let (a_min, a_max) = (self.origin, self.max());
        let (b_min, b_max) = (other.origin, other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }

    /// Whether `other` lies entirely inside `self`, edges included.
    #[must_use]
    pub fn contains(&self, other: &Footprint) -> bool {
        let (outer_min, outer_max) = (self.origin, self.max());
        let (inner_min, inner_max) = (other.origin, other.max());
        inner_min.x >= outer_min.x
            && inner_min.y >= outer_min.y
            && inner_max.x <= outer_max.x
            && inner_max.y <= outer_max.y
    }

    /// Copy of the rectangle moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.origin + offset, self.size)
    }
}

/// Capability shared by everything that occupies space in a level.
pub trait Collidable {
    /// Rectangle occupied in pixel space.
    fn footprint(&self) -> Footprint;
}

impl Collidable for Footprint {
    fn footprint(&self) -> Footprint {
        *self
    }
}

/// Unique identifier assigned to an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a single obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleSnapshot {
    /// Identifier allocated by the world when the level loaded.
    pub id: ObstacleId,
    /// Wall cell the obstacle was derived from.
    pub cell: CellCoord,
    /// Rectangle occupied by the obstacle.
    pub footprint: Footprint,
}

impl Collidable for ObstacleSnapshot {
    fn footprint(&self) -> Footprint {
        self.footprint
    }
}

/// Read-only snapshot describing every obstacle in the level.
#[derive(Clone, Debug, Default)]
pub struct ObstacleView {
    snapshots: Vec<ObstacleSnapshot>,
}

impl ObstacleView {
    /// Creates a new obstacle view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ObstacleSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ObstacleSnapshot> {
        self.snapshots.iter()
    }

    /// Number of obstacles captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the view holds no obstacles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ObstacleSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player's movement state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Top-left corner of the player's footprint.
    pub position: Vec2,
    /// Direction of the active transit, if any.
    pub direction: Option<Direction>,
    /// Lattice point the current transit departed from.
    pub last_position: Vec2,
    /// Lattice point the current transit heads toward.
    pub next_position: Vec2,
    /// Whether the player is between two lattice points.
    pub in_transit: bool,
    /// Side length of the player's square footprint.
    pub tile_length: f32,
}

impl PlayerSnapshot {
    /// Direction as a vector: zero when idle.
    #[must_use]
    pub fn direction_vector(&self) -> Vec2 {
        self.direction.map_or(Vec2::ZERO, Direction::unit_vector)
    }

    /// Lattice cell containing the center of the footprint.
    #[must_use]
    pub fn cell(&self) -> LatticeCoord {
        LatticeCoord::containing(self.footprint().center(), self.tile_length)
    }
}

impl Collidable for PlayerSnapshot {
    fn footprint(&self) -> Footprint {
        Footprint::tile(self.position, self.tile_length)
    }
}
