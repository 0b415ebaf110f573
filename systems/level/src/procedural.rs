//! Random maps sized to a fixed grid.

use open_world_core::{GridMap, Tile, TileCoord};
use rand::{
    distributions::{Bernoulli, Distribution},
    Rng,
};

use crate::LevelError;

/// Wall probability used when none is configured.
pub const DEFAULT_WALL_PROBABILITY: f64 = 0.2;

/// Minimum wall count used when none is configured.
pub const DEFAULT_MINIMUM_WALLS: u32 = 5;

/// Generates maps where every cell is independently a wall.
#[derive(Clone, Debug)]
pub struct ProceduralGenerator {
    columns: TileCoord,
    rows: TileCoord,
    minimum_walls: u32,
    walls: Bernoulli,
}

impl ProceduralGenerator {
    /// Validates the parameters so that [`Self::generate`] always terminates.
    ///
    /// The spawn overwrite consumes one cell, so at most `cells - 1` walls
    /// can remain and `minimum_walls` must not exceed that.
    pub fn new(
        columns: TileCoord,
        rows: TileCoord,
        wall_probability: f64,
        minimum_walls: u32,
    ) -> Result<Self, LevelError> {
        let cells = u64::from(columns.get()) * u64::from(rows.get());
        if cells == 0 {
            return Err(LevelError::UnsatisfiableGeneration {
                reason: format!("grid {}x{} has no cells", columns.get(), rows.get()),
            });
        }
        if u64::from(minimum_walls) >= cells {
            return Err(LevelError::UnsatisfiableGeneration {
                reason: format!(
                    "{minimum_walls} walls cannot fit in {cells} cells next to the spawn"
                ),
            });
        }
        if minimum_walls > 0 && !(wall_probability > 0.0 && wall_probability <= 1.0) {
            return Err(LevelError::UnsatisfiableGeneration {
                reason: format!("wall probability {wall_probability} never places a wall"),
            });
        }
        let walls = Bernoulli::new(wall_probability).map_err(|_| {
            LevelError::UnsatisfiableGeneration {
                reason: format!("wall probability {wall_probability} is outside [0, 1]"),
            }
        })?;

        Ok(Self {
            columns,
            rows,
            minimum_walls,
            walls,
        })
    }

    /// Grid width in tiles.
    #[must_use]
    pub fn columns(&self) -> TileCoord {
        self.columns
    }

    /// Grid height in tiles.
    #[must_use]
    pub fn rows(&self) -> TileCoord {
        self.rows
    }

    /// Walls every generated map is guaranteed to contain.
    #[must_use]
    pub fn minimum_walls(&self) -> u32 {
        self.minimum_walls
    }

    /// Draws grids until one keeps enough walls after the spawn is placed.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GridMap, LevelError> {
        let cells = self.columns.get() as usize * self.rows.get() as usize;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let mut tiles: Vec<Tile> = (0..cells)
                .map(|_| {
                    if self.walls.sample(rng) {
                        Tile::Wall
                    } else {
                        Tile::Empty
                    }
                })
                .collect();
            let spawn = rng.gen_range(0..cells);
            tiles[spawn] = Tile::Spawn;

            let walls = tiles.iter().filter(|tile| **tile == Tile::Wall).count();
            if walls >= self.minimum_walls as usize {
                tracing::debug!(attempts, walls, "generated procedural map");
                return Ok(GridMap::from_tiles(self.columns, self.rows, tiles)?);
            }
        }
    }
}
