#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input sampling system that turns held keys into player steering commands.

use std::time::Duration;

use open_world_core::{Axis, Command, Direction, Event, HeldDirections, PlayerSnapshot};

/// Minimum time between two input samples.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Pure system that samples held directions at a fixed cadence.
#[derive(Debug)]
pub struct Movement {
    debounce: Duration,
    priority: Axis,
    last_sample: Option<Duration>,
}

impl Movement {
    /// Creates a system sampling every `debounce` and resolving simultaneous
    /// horizontal and vertical keys in favour of `priority`.
    #[must_use]
    pub fn new(debounce: Duration, priority: Axis) -> Self {
        Self {
            debounce,
            priority,
            last_sample: None,
        }
    }

    /// Interval between input samples.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Consumes world events and the current input to emit steering commands.
    ///
    /// `now` is a monotonic timestamp. A sample is taken only once strictly
    /// more than the debounce interval has passed since the previous sample,
    /// and a freshly loaded level restarts the interval.
    pub fn handle(
        &mut self,
        events: &[Event],
        now: Duration,
        held: HeldDirections,
        player: Option<&PlayerSnapshot>,
        out: &mut Vec<Command>,
    ) {
        if events
            .iter()
            .any(|event| matches!(event, Event::LevelLoaded { .. }))
        {
            self.last_sample = Some(now);
        }

        let Some(player) = player else {
            return;
        };

        let Some(last_sample) = self.last_sample else {
            self.last_sample = Some(now);
            return;
        };
        if now.saturating_sub(last_sample) <= self.debounce {
            return;
        }
        self.last_sample = Some(now);

        if let Some(direction) = select_direction(held, player.direction, self.priority) {
            tracing::trace!(?direction, "steering sampled");
            out.push(Command::SteerPlayer { direction });
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, Axis::Vertical)
    }
}

/// Picks at most one held direction that respects the axis lock.
///
/// An axis is eligible only while the active direction, if any, lies on that
/// same axis. Among eligible axes `priority` is consulted first.
#[must_use]
pub fn select_direction(
    held: HeldDirections,
    active: Option<Direction>,
    priority: Axis,
) -> Option<Direction> {
    let eligible = |axis: Axis| active.map_or(true, |direction| direction.axis() == axis);

    [priority, priority.orthogonal()]
        .into_iter()
        .filter(|axis| eligible(*axis))
        .find_map(|axis| held.along(axis))
}
