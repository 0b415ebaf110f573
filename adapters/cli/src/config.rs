//! TOML configuration with command-line overrides.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use open_world_core::{Axis, TileCoord};
use open_world_system_level::{
    procedural::{DEFAULT_MINIMUM_WALLS, DEFAULT_WALL_PROBABILITY},
    LevelSource, MapDirectory, ProceduralGenerator,
};
use serde::Deserialize;

use crate::Args;

/// Configuration file picked up from the working directory when present.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "open-world.toml";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) display: DisplayConfig,
    pub(crate) motion: MotionConfig,
    pub(crate) level: LevelConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DisplayConfig {
    pub(crate) width_tiles: u32,
    pub(crate) height_tiles: u32,
    pub(crate) tile_length: f32,
    pub(crate) frame_rate: u32,
    pub(crate) vsync: bool,
    pub(crate) show_grid: bool,
    pub(crate) sprite_manifest: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width_tiles: 16,
            height_tiles: 12,
            tile_length: 32.0,
            frame_rate: 60,
            vsync: false,
            show_grid: false,
            sprite_manifest: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MotionConfig {
    pub(crate) speed_tiles_per_second: f32,
    pub(crate) debounce_ms: u64,
    pub(crate) axis_priority: Axis,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed_tiles_per_second: 3.0,
            debounce_ms: 50,
            axis_priority: Axis::Vertical,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SourceKind {
    #[default]
    Files,
    Procedural,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LevelConfig {
    pub(crate) source: SourceKind,
    pub(crate) maps_dir: PathBuf,
    pub(crate) extension: String,
    pub(crate) columns: Option<u32>,
    pub(crate) rows: Option<u32>,
    pub(crate) wall_probability: f64,
    pub(crate) minimum_walls: u32,
    pub(crate) seed: Option<u64>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Files,
            maps_dir: PathBuf::from("maps"),
            extension: "txt".to_owned(),
            columns: None,
            rows: None,
            wall_probability: DEFAULT_WALL_PROBABILITY,
            minimum_walls: DEFAULT_MINIMUM_WALLS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Reads `path`, or the default file if it exists, or falls back to defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    /// Parses a configuration file. Relative paths inside it are resolved
    /// against the file's directory.
    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.level.maps_dir = base.join(&config.level.maps_dir);
            config.display.sprite_manifest = config
                .display
                .sprite_manifest
                .map(|manifest| base.join(manifest));
        }
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Applies command-line flags on top of the file configuration.
    #[must_use]
    pub(crate) fn with_overrides(mut self, args: &Args) -> Self {
        if let Some(maps) = &args.maps {
            self.level.maps_dir = maps.clone();
            self.level.source = SourceKind::Files;
        }
        if args.procedural {
            self.level.source = SourceKind::Procedural;
        }
        if args.seed.is_some() {
            self.level.seed = args.seed;
        }
        self.display.show_grid |= args.grid;
        self.display.vsync |= args.vsync;
        self
    }

    /// Rejects values the simulation cannot run with.
    pub(crate) fn validate(&self) -> Result<()> {
        let display = &self.display;
        if !(display.tile_length.is_finite() && display.tile_length > 0.0) {
            bail!(
                "display.tile_length must be positive (received {})",
                display.tile_length
            );
        }
        if display.width_tiles == 0 || display.height_tiles == 0 {
            bail!(
                "display viewport must be at least one tile (received {}x{})",
                display.width_tiles,
                display.height_tiles
            );
        }
        if display.frame_rate == 0 {
            bail!("display.frame_rate must be positive");
        }
        let speed = self.motion.speed_tiles_per_second;
        if !(speed.is_finite() && speed > 0.0) {
            bail!("motion.speed_tiles_per_second must be positive (received {speed})");
        }
        if self.level.extension.trim_start_matches('.').is_empty() {
            bail!("level.extension must not be empty");
        }
        Ok(())
    }

    /// Window size in pixels.
    pub(crate) fn viewport(&self) -> Vec2 {
        Vec2::new(
            self.display.width_tiles as f32,
            self.display.height_tiles as f32,
        ) * self.display.tile_length
    }

    /// Travel speed in pixels per second.
    pub(crate) fn speed(&self) -> f32 {
        self.motion.speed_tiles_per_second * self.display.tile_length
    }

    pub(crate) fn debounce(&self) -> Duration {
        Duration::from_millis(self.motion.debounce_ms)
    }

    /// Builds the configured level source. Procedural grids default to the
    /// viewport size.
    pub(crate) fn level_source(&self) -> Result<LevelSource> {
        let level = &self.level;
        let source = match level.source {
            SourceKind::Files => LevelSource::Directory(MapDirectory::new(
                level.maps_dir.clone(),
                level.extension.clone(),
            )),
            SourceKind::Procedural => {
                let columns = level.columns.unwrap_or(self.display.width_tiles);
                let rows = level.rows.unwrap_or(self.display.height_tiles);
                let generator = ProceduralGenerator::new(
                    TileCoord::new(columns),
                    TileCoord::new(rows),
                    level.wall_probability,
                    level.minimum_walls,
                )
                .context("invalid procedural level configuration")?;
                LevelSource::Procedural(generator)
            }
        };
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_file_yields_defaults() {
        let config: GameConfig = toml::from_str("").expect("empty config");

        assert_eq!(config, GameConfig::default());
        assert_eq!(config.viewport(), Vec2::new(512.0, 384.0));
        assert_eq!(config.speed(), 96.0);
        assert_eq!(config.debounce(), Duration::from_millis(50));
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn sections_override_individual_fields() {
        let config: GameConfig = toml::from_str(
            r#"
            [display]
            tile_length = 16.0
            show_grid = true

            [motion]
            axis_priority = "horizontal"

            [level]
            source = "procedural"
            columns = 10
            seed = 7
            "#,
        )
        .expect("valid config");

        assert_eq!(config.display.tile_length, 16.0);
        assert_eq!(config.display.width_tiles, 16);
        assert!(config.display.show_grid);
        assert_eq!(config.motion.axis_priority, Axis::Horizontal);
        assert_eq!(config.level.source, SourceKind::Procedural);
        assert_eq!(config.level.seed, Some(7));

        match config.level_source().expect("satisfiable") {
            LevelSource::Procedural(generator) => {
                assert_eq!(generator.columns(), TileCoord::new(10));
                assert_eq!(generator.rows(), TileCoord::new(12));
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<GameConfig>("[display]\nwidth = 3\n").is_err());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut config = GameConfig::default();
        config.display.tile_length = 0.0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.display.frame_rate = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.display.height_tiles = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unsatisfiable_procedural_config_is_reported() {
        let mut config = GameConfig::default();
        config.level.source = SourceKind::Procedural;
        config.level.columns = Some(2);
        config.level.rows = Some(2);
        config.level.minimum_walls = 4;

        let error = config.level_source().expect_err("four walls cannot fit");

        assert!(format!("{error:#}").contains("procedural generation cannot succeed"));
    }

    #[test]
    fn command_line_flags_take_precedence() {
        let args = Args::parse_from([
            "open-world",
            "--procedural",
            "--seed",
            "42",
            "--grid",
        ]);

        let config = GameConfig::default().with_overrides(&args);

        assert_eq!(config.level.source, SourceKind::Procedural);
        assert_eq!(config.level.seed, Some(42));
        assert!(config.display.show_grid);
        assert!(!config.display.vsync);
    }

    #[test]
    fn config_file_paths_resolve_relative_to_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("open-world.toml");
        fs::write(
            &path,
            "[display]\nsprite_manifest = \"assets/manifest.toml\"\n[level]\nmaps_dir = \"levels\"\n",
        )
        .expect("write config");

        let config = GameConfig::load(Some(&path)).expect("config");

        assert_eq!(config.level.maps_dir, dir.path().join("levels"));
        assert_eq!(
            config.display.sprite_manifest,
            Some(dir.path().join("assets/manifest.toml"))
        );
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");

        let error = GameConfig::load(Some(&dir.path().join("absent.toml")))
            .expect_err("file is absent");

        assert!(error.to_string().contains("failed to read config file"));
    }
}
