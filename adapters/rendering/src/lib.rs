#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Open World adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use open_world_core::{Footprint, HeldDirections};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Grass green the window is cleared with.
pub const BACKGROUND_COLOR: Color = Color::from_rgb_u8(124, 252, 0);

/// Brown used for wall tiles.
pub const OBSTACLE_COLOR: Color = Color::from_rgb_u8(92, 64, 51);

/// Grey used for the debug grid overlay.
pub const GRID_LINE_COLOR: Color = Color::from_rgb_u8(127, 127, 127);

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Directional keys currently held down.
    pub held: HeldDirections,
    /// Whether the grid overlay toggle was pressed on this frame.
    pub toggle_grid: bool,
}

/// Textures a backend may be asked to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// The player character.
    Player,
}

/// How the player is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerVisual {
    /// Filled rectangle covering the footprint.
    Placeholder {
        /// Fill color.
        color: Color,
    },
    /// Texture stretched over the footprint.
    Sprite {
        /// Texture to draw.
        key: SpriteKey,
    },
}

/// Straight line in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    /// First endpoint.
    pub start: Vec2,
    /// Second endpoint.
    pub end: Vec2,
}

/// Debug overlay marking tile boundaries of the world lattice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridOverlay {
    tile_length: f32,
    /// Color of every grid line.
    pub line_color: Color,
    /// Whether the overlay is drawn.
    pub visible: bool,
}

impl GridOverlay {
    /// Creates an overlay with lines every `tile_length` pixels.
    pub fn new(tile_length: f32, line_color: Color, visible: bool) -> Result<Self, RenderingError> {
        if !(tile_length.is_finite() && tile_length > 0.0) {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }
        Ok(Self {
            tile_length,
            line_color,
            visible,
        })
    }

    /// Distance between two adjacent lines.
    #[must_use]
    pub fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Lines covering `viewport` for a world shifted by the camera `offset`.
    ///
    /// Vertical lines come first, each group ordered left to right or top
    /// to bottom.
    #[must_use]
    pub fn lines(&self, viewport: Vec2, offset: Vec2) -> Vec<LineSegment> {
        let mut lines = Vec::new();

        let mut x = offset.x.rem_euclid(self.tile_length);
        while x <= viewport.x {
            lines.push(LineSegment {
                start: Vec2::new(x, 0.0),
                end: Vec2::new(x, viewport.y),
            });
            x += self.tile_length;
        }

        let mut y = offset.y.rem_euclid(self.tile_length);
        while y <= viewport.y {
            lines.push(LineSegment {
                start: Vec2::new(0.0, y),
                end: Vec2::new(viewport.x, y),
            });
            y += self.tile_length;
        }

        lines
    }
}

/// Everything drawn in one frame, already translated into screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    viewport: Vec2,
    /// Screen-space footprints of every wall.
    pub obstacles: Vec<Footprint>,
    /// Fill color of walls.
    pub obstacle_color: Color,
    /// Screen-space footprint of the player, if a level is loaded.
    pub player: Option<Footprint>,
    /// How the player is drawn.
    pub player_visual: PlayerVisual,
    /// Debug grid overlay.
    pub grid: GridOverlay,
    /// Camera offset applied to world coordinates.
    pub camera_offset: Vec2,
}

impl Scene {
    /// Creates an empty scene for a window of `viewport` pixels.
    pub fn new(
        viewport: Vec2,
        obstacle_color: Color,
        player_visual: PlayerVisual,
        grid: GridOverlay,
    ) -> Result<Self, RenderingError> {
        if !(viewport.x > 0.0 && viewport.y > 0.0) {
            return Err(RenderingError::InvalidViewport {
                width: viewport.x,
                height: viewport.y,
            });
        }
        Ok(Self {
            viewport,
            obstacles: Vec::new(),
            obstacle_color,
            player: None,
            player_visual,
            grid,
            camera_offset: Vec2::ZERO,
        })
    }

    /// Window size in pixels.
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Grid lines to draw this frame, empty while the overlay is hidden.
    #[must_use]
    pub fn grid_lines(&self) -> Vec<LineSegment> {
        if self.grid.visible {
            self.grid.lines(self.viewport, self.camera_offset)
        } else {
            Vec::new()
        }
    }

    /// Whether any visual asks for a texture.
    #[must_use]
    pub fn requests_sprites(&self) -> bool {
        matches!(self.player_visual, PlayerVisual::Sprite { .. })
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Open World scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and refreshes the scene before
    /// it is rendered. An error returned by the closure stops the loop and is
    /// propagated out of `run`.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<()> + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Grid lines need a positive spacing.
    InvalidTileLength {
        /// Spacing that failed validation.
        tile_length: f32,
    },
    /// The window must have a positive area.
    InvalidViewport {
        /// Requested width in pixels.
        width: f32,
        /// Requested height in pixels.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile_length must be positive (received {tile_length})")
            }
            Self::InvalidViewport { width, height } => {
                write!(f, "viewport must be positive (received {width}x{height})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(visible: bool) -> GridOverlay {
        GridOverlay::new(32.0, GRID_LINE_COLOR, visible).expect("valid overlay")
    }

    #[test]
    fn grid_lines_cover_viewport_at_tile_intervals() {
        let lines = overlay(true).lines(Vec2::new(64.0, 32.0), Vec2::ZERO);

        let vertical: Vec<_> = lines
            .iter()
            .filter(|line| line.start.x == line.end.x)
            .map(|line| line.start.x)
            .collect();
        let horizontal: Vec<_> = lines
            .iter()
            .filter(|line| line.start.y == line.end.y)
            .map(|line| line.start.y)
            .collect();

        assert_eq!(vertical, vec![0.0, 32.0, 64.0]);
        assert_eq!(horizontal, vec![0.0, 32.0]);
    }

    #[test]
    fn grid_lines_follow_the_camera_offset() {
        let lines = overlay(true).lines(Vec2::new(64.0, 64.0), Vec2::new(-40.0, 10.0));

        assert_eq!(lines[0].start, Vec2::new(24.0, 0.0));
        assert_eq!(lines[0].end, Vec2::new(24.0, 64.0));
        let first_horizontal = lines
            .iter()
            .find(|line| line.start.x == 0.0 && line.end.x == 64.0)
            .expect("horizontal line");
        assert_eq!(first_horizontal.start.y, 10.0);
    }

    #[test]
    fn hidden_overlay_draws_nothing() {
        let scene = Scene::new(
            Vec2::new(128.0, 96.0),
            OBSTACLE_COLOR,
            PlayerVisual::Placeholder {
                color: Color::from_rgb_u8(0, 0, 255),
            },
            overlay(false),
        )
        .expect("valid scene");

        assert!(scene.grid_lines().is_empty());
        assert!(!scene.requests_sprites());
    }

    #[test]
    fn overlay_rejects_non_positive_spacing() {
        assert_eq!(
            GridOverlay::new(0.0, GRID_LINE_COLOR, true),
            Err(RenderingError::InvalidTileLength { tile_length: 0.0 })
        );
    }

    #[test]
    fn scene_rejects_empty_viewport() {
        let error = Scene::new(
            Vec2::new(0.0, 96.0),
            OBSTACLE_COLOR,
            PlayerVisual::Sprite {
                key: SpriteKey::Player,
            },
            overlay(true),
        )
        .expect_err("zero width");

        assert_eq!(
            error.to_string(),
            "viewport must be positive (received 0x96)"
        );
    }

    #[test]
    fn palette_matches_byte_colors() {
        assert_eq!(BACKGROUND_COLOR.green, 252.0 / 255.0);
        assert_eq!(OBSTACLE_COLOR.red, 92.0 / 255.0);
        assert_eq!(GRID_LINE_COLOR.alpha, 1.0);
    }
}
