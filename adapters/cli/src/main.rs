#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Open World demo.

mod config;
mod game;

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use open_world_core::WINDOW_TITLE;
use open_world_rendering::{
    Color, GridOverlay, PlayerVisual, Presentation, RenderingBackend, Scene, SpriteKey,
    BACKGROUND_COLOR, GRID_LINE_COLOR, OBSTACLE_COLOR,
};
use open_world_rendering_macroquad::MacroquadBackend;
use open_world_system_level::Levels;
use tracing_subscriber::EnvFilter;

use crate::{config::GameConfig, game::GameState};

const PLAYER_PLACEHOLDER_COLOR: Color = Color::from_rgb_u8(30, 60, 200);

/// Walk a tile grid, bump into walls and leave the map to get a new one.
#[derive(Parser, Debug)]
#[command(name = "open-world", version)]
pub(crate) struct Args {
    /// TOML configuration file (defaults to ./open-world.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding `.txt` map files
    #[arg(long)]
    maps: Option<PathBuf>,

    /// Generate random levels instead of loading map files
    #[arg(long, conflicts_with = "maps")]
    procedural: bool,

    /// Seed for map selection and generation
    #[arg(long)]
    seed: Option<u64>,

    /// Start with the grid overlay visible
    #[arg(long)]
    grid: bool,

    /// Synchronise presentation with the display refresh rate
    #[arg(long)]
    vsync: bool,

    /// Log frame timing once per second
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Open World command-line interface.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    exit_status(run(&Args::parse()))
}

/// Reports a fatal error through the log only, so it is printed once.
fn exit_status(outcome: Result<()>) -> ExitCode {
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = GameConfig::load(args.config.as_deref())?.with_overrides(args);
    config.validate().context("invalid configuration")?;

    let levels = Levels::new(config.level_source()?, config.level.seed);
    let mut game = GameState::new(&config, levels)?;

    let player_visual = match config.display.sprite_manifest {
        Some(_) => PlayerVisual::Sprite {
            key: SpriteKey::Player,
        },
        None => PlayerVisual::Placeholder {
            color: PLAYER_PLACEHOLDER_COLOR,
        },
    };
    let grid = GridOverlay::new(
        config.display.tile_length,
        GRID_LINE_COLOR,
        config.display.show_grid,
    )?;
    let mut scene = Scene::new(config.viewport(), OBSTACLE_COLOR, player_visual, grid)?;
    game.populate_scene(&mut scene);

    let backend = MacroquadBackend::new()
        .with_vsync(config.display.vsync)
        .with_show_fps(args.show_fps)
        .with_frame_rate(config.display.frame_rate)
        .with_sprite_manifest(config.display.sprite_manifest.clone());

    backend.run(
        Presentation::new(WINDOW_TITLE, BACKGROUND_COLOR, scene),
        move |dt, input, scene| game::advance_frame(&mut game, dt, input, scene),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_run_exits_non_zero() {
        let outcome: Result<()> =
            Err(anyhow::anyhow!("no maps")).context("failed to load the initial level");

        assert_eq!(exit_status(outcome), ExitCode::FAILURE);
        assert_eq!(exit_status(Ok(())), ExitCode::SUCCESS);
    }
}
