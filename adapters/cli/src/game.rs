//! Per-frame driver that owns the world and every system.

use std::time::Duration;

use anyhow::{Context, Result};
use open_world_core::{Command, Event};
use open_world_rendering::{FrameInput, Scene};
use open_world_system_camera::Camera;
use open_world_system_level::{crossed_boundary, Levels};
use open_world_system_movement::Movement;
use open_world_world::{self as world, query, World};

use crate::config::GameConfig;

#[derive(Debug)]
pub(crate) struct GameState {
    world: World,
    movement: Movement,
    camera: Camera,
    levels: Levels,
    pending_events: Vec<Event>,
    elapsed: Duration,
}

impl GameState {
    /// Configures motion and loads the first level before any window opens.
    pub(crate) fn new(config: &GameConfig, levels: Levels) -> Result<Self> {
        let mut state = Self {
            world: World::new(),
            movement: Movement::new(config.debounce(), config.motion.axis_priority),
            camera: Camera::new(config.viewport()),
            levels,
            pending_events: Vec::new(),
            elapsed: Duration::ZERO,
        };

        state.apply(Command::ConfigureMotion {
            tile_length: config.display.tile_length,
            speed: config.speed(),
        });
        let map = state
            .levels
            .next_map()
            .context("failed to load the initial level")?;
        state.apply(Command::LoadLevel { map });
        state.follow_player();
        tracing::info!(
            banner = query::welcome_banner(&state.world),
            levels_loaded = query::levels_loaded(&state.world),
            "world ready"
        );
        Ok(state)
    }

    /// Runs one simulation step: sample input, steer, tick, regenerate on
    /// boundary exit and recentre the camera.
    pub(crate) fn update(&mut self, dt: Duration, input: &FrameInput) -> Result<()> {
        self.elapsed += dt;

        let player = query::player(&self.world);
        let mut commands = Vec::new();
        self.movement.handle(
            &self.pending_events,
            self.elapsed,
            input.held,
            player.as_ref(),
            &mut commands,
        );
        self.pending_events.clear();

        commands.push(Command::Tick { dt });
        for command in commands {
            self.apply(command);
        }

        if self.player_left_level() {
            let map = self
                .levels
                .next_map()
                .context("failed to regenerate the level")?;
            tracing::info!(
                columns = map.columns().get(),
                rows = map.rows().get(),
                "player left the level, regenerating"
            );
            self.apply(Command::LoadLevel { map });
        }

        self.follow_player();
        Ok(())
    }

    /// Copies the world into `scene` in screen coordinates.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let camera = &self.camera;
        scene.obstacles = query::obstacle_view(&self.world)
            .iter()
            .map(|obstacle| camera.apply(obstacle))
            .collect();
        scene.player = query::player(&self.world).map(|player| camera.apply(&player));
        scene.camera_offset = camera.offset();
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.pending_events);
    }

    fn player_left_level(&self) -> bool {
        match (
            query::player(&self.world),
            query::level_bounds(&self.world),
        ) {
            (Some(player), Some(bounds)) => crossed_boundary(&player, &bounds),
            _ => false,
        }
    }

    fn follow_player(&mut self) {
        if let Some(player) = query::player(&self.world) {
            self.camera.update(&player);
        }
    }
}

/// Frame callback handed to the rendering backend.
pub(crate) fn advance_frame(
    state: &mut GameState,
    dt: Duration,
    input: FrameInput,
    scene: &mut Scene,
) -> Result<()> {
    state.update(dt, &input)?;
    if input.toggle_grid {
        scene.grid.visible = !scene.grid.visible;
        tracing::debug!(visible = scene.grid.visible, "grid overlay toggled");
    }
    state.populate_scene(scene);
    Ok(())
}
