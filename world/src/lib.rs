#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state management for the Open World demo.

pub mod collision;
mod player;

use std::time::Duration;

use open_world_core::{Command, Event, GridMap, ObstacleSnapshot, TileGrid, WINDOW_TITLE};

use self::player::{Player, Steering};

const DEFAULT_TILE_LENGTH: f32 = 32.0;
const DEFAULT_SPEED_TILES_PER_SECOND: f32 = 3.0;

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tile_length: f32,
    speed: f32,
    levels_loaded: u64,
    level: Option<Level>,
}

#[derive(Debug)]
struct Level {
    map: GridMap,
    tile_grid: TileGrid,
    obstacles: Vec<ObstacleSnapshot>,
    player: Player,
}

impl Level {
    fn build(map: GridMap, tile_length: f32) -> Self {
        let tile_grid = TileGrid::new(map.columns(), map.rows(), tile_length);
        let obstacles = collision::obstacles_from_map(&map, tile_length);
        let player = Player::spawn(map.spawn(), tile_length);
        Self {
            map,
            tile_grid,
            obstacles,
            player,
        }
    }

    fn loaded_event(&self) -> Event {
        Event::LevelLoaded {
            columns: self.map.columns(),
            rows: self.map.rows(),
            spawn: self.map.spawn(),
            obstacles: self.obstacles.len() as u32,
        }
    }
}

impl World {
    /// Creates an empty world. No player exists until a level is loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WINDOW_TITLE,
            tile_length: DEFAULT_TILE_LENGTH,
            speed: DEFAULT_SPEED_TILES_PER_SECOND * DEFAULT_TILE_LENGTH,
            levels_loaded: 0,
            level: None,
        }
    }

    fn load(&mut self, map: GridMap, out_events: &mut Vec<Event>) {
        let level = Level::build(map, self.tile_length);
        self.levels_loaded = self.levels_loaded.saturating_add(1);
        tracing::info!(
            columns = level.map.columns().get(),
            rows = level.map.rows().get(),
            obstacles = level.obstacles.len(),
            "level loaded"
        );
        out_events.push(level.loaded_event());
        self.level = Some(level);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureMotion { tile_length, speed } => {
            if !(tile_length.is_finite() && tile_length > 0.0 && speed.is_finite() && speed >= 0.0)
            {
                tracing::warn!(tile_length, speed, "ignoring invalid motion configuration");
                return;
            }

            let relayout = tile_length != world.tile_length;
            world.tile_length = tile_length;
            world.speed = speed;
            if relayout {
                if let Some(level) = world.level.take() {
                    world.load(level.map, out_events);
                }
            }
        }
        Command::LoadLevel { map } => world.load(map, out_events),
        Command::SteerPlayer { direction } => {
            let tile_length = world.tile_length;
            let Some(level) = world.level.as_mut() else {
                return;
            };

            match level.player.steer(direction, tile_length) {
                Steering::Accepted { from, to } => {
                    out_events.push(Event::TransitStarted {
                        direction,
                        from,
                        to,
                    });
                }
                Steering::Rejected => out_events.push(Event::SteerRejected { direction }),
            }
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            advance_level(world, dt, out_events);
        }
    }
}

fn advance_level(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    let tile_length = world.tile_length;
    let speed = world.speed;
    let Some(level) = world.level.as_mut() else {
        return;
    };

    if let Some(cell) = level.player.advance(dt, speed, tile_length) {
        tracing::trace!(column = cell.column(), row = cell.row(), "player arrived");
        out_events.push(Event::PlayerArrived { cell });
    }

    let footprint = level.player.footprint(tile_length);
    let Some(obstacle) = collision::first_overlap(&footprint, &level.obstacles) else {
        return;
    };
    let obstacle = obstacle.id;
    let restored_to = level.player.roll_back(tile_length);
    tracing::debug!(
        obstacle = obstacle.get(),
        column = restored_to.column(),
        row = restored_to.row(),
        "player collided, rolled back"
    );
    out_events.push(Event::PlayerCollided {
        obstacle,
        restored_to,
    });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use open_world_core::{Footprint, GridMap, ObstacleView, PlayerSnapshot, TileGrid};

    use super::World;

    /// Retrieves the banner adapters may use as a window title.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Side length of a tile in pixels.
    #[must_use]
    pub fn tile_length(world: &World) -> f32 {
        world.tile_length
    }

    /// Travel speed of a transiting player in pixels per second.
    #[must_use]
    pub fn speed(world: &World) -> f32 {
        world.speed
    }

    /// Number of levels loaded since the world was created.
    #[must_use]
    pub fn levels_loaded(world: &World) -> u64 {
        world.levels_loaded
    }

    /// Map backing the active level.
    #[must_use]
    pub fn map(world: &World) -> Option<&GridMap> {
        world.level.as_ref().map(|level| &level.map)
    }

    /// Pixel layout of the active level.
    #[must_use]
    pub fn tile_grid(world: &World) -> Option<TileGrid> {
        world.level.as_ref().map(|level| level.tile_grid)
    }

    /// Rectangle covering the active level in pixel space.
    #[must_use]
    pub fn level_bounds(world: &World) -> Option<Footprint> {
        tile_grid(world).map(|grid| grid.bounds())
    }

    /// Snapshot of the player in the active level.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        world
            .level
            .as_ref()
            .map(|level| level.player.snapshot(world.tile_length))
    }

    /// Captures a read-only view of the obstacles in the active level.
    #[must_use]
    pub fn obstacle_view(world: &World) -> ObstacleView {
        world
            .level
            .as_ref()
            .map(|level| ObstacleView::from_snapshots(level.obstacles.clone()))
            .unwrap_or_default()
    }
}
