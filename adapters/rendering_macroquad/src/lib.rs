#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Open World.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

mod sprites;

use anyhow::{Context, Result};
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use open_world_core::{Footprint, HeldDirections};
use open_world_rendering::{
    Color, FrameInput, LineSegment, PlayerVisual, Presentation, RenderingBackend, Scene,
};
use std::{
    path::PathBuf,
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use self::sprites::SpriteAtlas;

/// Frame rate the loop is clamped to unless configured otherwise.
pub const DEFAULT_FRAME_RATE: u32 = 60;

const GRID_LINE_THICKNESS: f32 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct KeyboardShortcuts {
    quit_requested: bool,
    toggle_grid: bool,
    held: HeldDirections,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let toggle_grid = is_key_pressed(KeyCode::G);
        let held = HeldDirections {
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
            up: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
            down: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
        };

        Self {
            quit_requested,
            toggle_grid,
            held,
        }
    }

    fn frame_input(&self) -> FrameInput {
        FrameInput {
            held: self.held,
            toggle_grid: self.toggle_grid,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    frame_rate: u32,
    sprite_manifest: Option<PathBuf>,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            frame_rate: DEFAULT_FRAME_RATE,
            sprite_manifest: None,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Caps the loop at `frame_rate` frames per second. Zero disables pacing.
    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Loads the player texture from the sprite manifest at `path`.
    #[must_use]
    pub fn with_sprite_manifest(mut self, path: Option<PathBuf>) -> Self {
        self.sprite_manifest = path;
        self
    }
}

/// Sleeps away whatever is left of each frame budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FramePacer {
    budget: Option<Duration>,
}

impl FramePacer {
    fn new(frame_rate: u32) -> Self {
        let budget = (frame_rate > 0).then(|| Duration::from_secs(1) / frame_rate);
        Self { budget }
    }

    fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.budget
            .and_then(|budget| budget.checked_sub(elapsed))
            .filter(|remaining| !remaining.is_zero())
    }

    fn wait(&self, frame_start: Instant) {
        if let Some(remaining) = self.remaining(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }
}

/// Average frames-per-second over the last full second.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the average once one second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let metrics = FpsMetrics {
            per_second: self.frames as f32 / seconds,
            avg_render: self.render_accum / self.frames,
        };
        *self = Self::default();
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Result<()> + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            frame_rate,
            sprite_manifest,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let viewport = scene.viewport();
        let mut config = macroquad::window::Conf {
            window_title,
            window_width: viewport.x.round() as i32,
            window_height: viewport.y.round() as i32,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (outcome_sender, outcome_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let sprite_atlas = match sprite_manifest {
                Some(path) if scene.requests_sprites() => {
                    match SpriteAtlas::load(&path)
                        .context("failed to initialise sprite atlas")
                    {
                        Ok(atlas) => Some(atlas),
                        Err(error) => {
                            let _ = outcome_sender.send(Err(error));
                            return;
                        }
                    }
                }
                _ => None,
            };

            let background = to_macroquad_color(clear_color);
            let pacer = FramePacer::new(frame_rate);
            let mut fps_counter = FpsCounter::default();

            let outcome = loop {
                let frame_start = Instant::now();
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break Ok(());
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                if let Err(error) = update_scene(frame_dt, keyboard.frame_input(), &mut scene) {
                    break Err(error);
                }

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                draw_obstacles(&scene.obstacles, scene.obstacle_color);
                draw_grid(&scene.grid_lines(), scene.grid.line_color);
                if let Some(player) = scene.player {
                    draw_player(player, scene.player_visual, sprite_atlas.as_ref());
                }
                let render_duration = render_start.elapsed();

                if let Some(FpsMetrics {
                    per_second,
                    avg_render,
                }) = fps_counter.record_frame(frame_dt, render_duration)
                {
                    if show_fps {
                        tracing::info!(
                            fps = format_args!("{per_second:.2}"),
                            render_ms = format_args!("{:.2}", avg_render.as_secs_f64() * 1_000.0),
                            "frame timing"
                        );
                    }
                }

                pacer.wait(frame_start);
                macroquad::window::next_frame().await;
            };

            let _ = outcome_sender.send(outcome);
        });

        outcome_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn draw_obstacles(obstacles: &[Footprint], color: Color) {
    let color = to_macroquad_color(color);
    for obstacle in obstacles {
        draw_footprint(*obstacle, color);
    }
}

fn draw_grid(lines: &[LineSegment], color: Color) {
    let color = to_macroquad_color(color);
    for line in lines {
        macroquad::shapes::draw_line(
            line.start.x,
            line.start.y,
            line.end.x,
            line.end.y,
            GRID_LINE_THICKNESS,
            color,
        );
    }
}

fn draw_player(player: Footprint, visual: PlayerVisual, sprite_atlas: Option<&SpriteAtlas>) {
    match (visual, sprite_atlas) {
        (PlayerVisual::Sprite { key }, Some(atlas)) => atlas.draw(key, player),
        (PlayerVisual::Placeholder { color }, _) => {
            draw_footprint(player, to_macroquad_color(color));
        }
        (PlayerVisual::Sprite { .. }, None) => {
            draw_footprint(player, macroquad::color::BLUE);
        }
    }
}

fn draw_footprint(footprint: Footprint, color: macroquad::color::Color) {
    let origin = footprint.origin();
    let size = footprint.size();
    macroquad::shapes::draw_rectangle(origin.x, origin.y, size.x, size.y, color);
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacer_sleeps_only_for_the_remaining_budget() {
        let pacer = FramePacer::new(50);

        assert_eq!(
            pacer.remaining(Duration::from_millis(5)),
            Some(Duration::from_millis(15))
        );
        assert_eq!(pacer.remaining(Duration::from_millis(20)), None);
        assert_eq!(pacer.remaining(Duration::from_millis(35)), None);
    }

    #[test]
    fn zero_frame_rate_disables_pacing() {
        assert_eq!(FramePacer::new(0).remaining(Duration::ZERO), None);
    }

    #[test]
    fn default_backend_targets_sixty_hertz() {
        let backend = MacroquadBackend::new();
        let pacer = FramePacer::new(backend.frame_rate);

        assert_eq!(pacer.budget, Some(Duration::from_secs(1) / 60));
        assert!(backend.sprite_manifest.is_none());
    }

    #[test]
    fn vsync_maps_to_swap_interval() {
        assert_eq!(
            MacroquadBackend::new().with_vsync(true).swap_interval,
            Some(1)
        );
        assert_eq!(
            MacroquadBackend::new().with_vsync(false).swap_interval,
            Some(0)
        );
    }

    #[test]
    fn fps_counter_reports_average_frames_per_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);

        for _ in 0..3 {
            assert!(counter
                .record_frame(frame, Duration::from_millis(2))
                .is_none());
        }
        let metrics = counter
            .record_frame(frame, Duration::from_millis(6))
            .expect("one second elapsed");

        assert!((metrics.per_second - 4.0).abs() < f32::EPSILON);
        assert_eq!(metrics.avg_render, Duration::from_millis(3));
        assert!(counter
            .record_frame(frame, Duration::ZERO)
            .is_none());
    }

    #[test]
    fn keyboard_snapshot_forwards_held_keys_and_toggle() {
        let keyboard = KeyboardShortcuts {
            quit_requested: false,
            toggle_grid: true,
            held: HeldDirections {
                left: true,
                ..HeldDirections::default()
            },
        };

        let input = keyboard.frame_input();

        assert!(input.toggle_grid);
        assert!(input.held.left);
        assert!(!input.held.right);
    }

    #[test]
    fn colors_convert_channel_by_channel() {
        let color = to_macroquad_color(Color::new(0.1, 0.2, 0.3, 0.4));

        assert_eq!((color.r, color.g, color.b, color.a), (0.1, 0.2, 0.3, 0.4));
    }
}
