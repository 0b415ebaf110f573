#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera that keeps a target entity centred in the viewport.

use glam::Vec2;
use open_world_core::{Collidable, Footprint};

/// Translation from world space to screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    viewport: Vec2,
    offset: Vec2,
}

impl Camera {
    /// Creates a camera for a viewport of `viewport` pixels with no offset.
    #[must_use]
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            offset: Vec2::ZERO,
        }
    }

    /// Viewport size in pixels.
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Offset added to world coordinates when drawing.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Recentres on `target`. Calling it repeatedly without moving the
    /// target leaves the offset unchanged.
    pub fn update<T: Collidable + ?Sized>(&mut self, target: &T) {
        self.offset = self.viewport * 0.5 - target.footprint().center();
    }

    /// Screen-space footprint of `entity`.
    #[must_use]
    pub fn apply<T: Collidable + ?Sized>(&self, entity: &T) -> Footprint {
        entity.footprint().translated(self.offset)
    }
}
