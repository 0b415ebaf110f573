//! Discrete-step movement state machine for the player.

use std::time::Duration;

use glam::Vec2;
use open_world_core::{CellCoord, Direction, Footprint, LatticeCoord, PlayerSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MotionState {
    Idle,
    Transiting { direction: Direction },
}

/// Outcome of a steering request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Steering {
    Accepted { from: LatticeCoord, to: LatticeCoord },
    Rejected,
}

#[derive(Clone, Debug)]
pub(crate) struct Player {
    position: Vec2,
    last_position: Vec2,
    next_position: Vec2,
    state: MotionState,
}

impl Player {
    pub(crate) fn spawn(cell: CellCoord, tile_length: f32) -> Self {
        let position = cell.origin(tile_length);
        Self {
            position,
            last_position: position,
            next_position: position,
            state: MotionState::Idle,
        }
    }

    fn direction(&self) -> Option<Direction> {
        match self.state {
            MotionState::Idle => None,
            MotionState::Transiting { direction } => Some(direction),
        }
    }

    /// Starts a transit from the cell under the footprint's center.
    ///
    /// Requests along the orthogonal axis of an active transit are rejected.
    /// Requests along the same axis re-anchor the transit on the current cell.
    pub(crate) fn steer(&mut self, direction: Direction, tile_length: f32) -> Steering {
        if let Some(current) = self.direction() {
            if current.axis() != direction.axis() {
                return Steering::Rejected;
            }
        }

        let from = LatticeCoord::containing(self.footprint(tile_length).center(), tile_length);
        let to = from.neighbor(direction);
        self.last_position = from.origin(tile_length);
        self.next_position = to.origin(tile_length);
        self.state = MotionState::Transiting { direction };
        Steering::Accepted { from, to }
    }

    /// Moves toward the transit target without overshooting it.
    ///
    /// Returns the lattice cell reached when the transit completes this tick.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        speed: f32,
        tile_length: f32,
    ) -> Option<LatticeCoord> {
        if self.position == self.next_position {
            return None;
        }

        let velocity = self.direction().map_or(Vec2::ZERO, Direction::unit_vector) * speed;
        let step = velocity * dt.as_secs_f32();
        let remaining = self.next_position - self.position;
        if remaining.length() > step.length() {
            self.position += step;
            return None;
        }

        self.position = self.next_position;
        self.state = MotionState::Idle;
        Some(LatticeCoord::containing(self.position, tile_length))
    }

    /// Restores the departure lattice point and cancels the transit.
    pub(crate) fn roll_back(&mut self, tile_length: f32) -> LatticeCoord {
        self.position = self.last_position;
        self.next_position = self.last_position;
        self.state = MotionState::Idle;
        LatticeCoord::containing(self.position, tile_length)
    }

    pub(crate) fn footprint(&self, tile_length: f32) -> Footprint {
        Footprint::tile(self.position, tile_length)
    }

    pub(crate) fn snapshot(&self, tile_length: f32) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            direction: self.direction(),
            last_position: self.last_position,
            next_position: self.next_position,
            in_transit: matches!(self.state, MotionState::Transiting { .. }),
            tile_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: f32 = 32.0;
    const SPEED: f32 = 96.0;

    fn frame() -> Duration {
        Duration::from_millis(16)
    }

    #[test]
    fn steering_from_rest_targets_adjacent_cell() {
        let mut player = Player::spawn(CellCoord::new(2, 3), TILE);

        let steering = player.steer(Direction::South, TILE);

        assert_eq!(
            steering,
            Steering::Accepted {
                from: LatticeCoord::new(2, 3),
                to: LatticeCoord::new(2, 4),
            }
        );
        let snapshot = player.snapshot(TILE);
        assert!(snapshot.in_transit);
        assert_eq!(snapshot.last_position, Vec2::new(64.0, 96.0));
        assert_eq!(snapshot.next_position, Vec2::new(64.0, 128.0));
    }

    #[test]
    fn orthogonal_steering_is_rejected_mid_transit() {
        for (active, requested) in [
            (Direction::East, Direction::North),
            (Direction::West, Direction::South),
            (Direction::North, Direction::East),
            (Direction::South, Direction::West),
        ] {
            let mut player = Player::spawn(CellCoord::new(4, 4), TILE);
            let _ = player.steer(active, TILE);
            let _ = player.advance(frame(), SPEED, TILE);
            let before = player.snapshot(TILE);

            assert_eq!(player.steer(requested, TILE), Steering::Rejected);
            assert_eq!(player.snapshot(TILE), before);
        }
    }

    #[test]
    fn same_axis_steering_reanchors_on_center_cell() {
        let mut player = Player::spawn(CellCoord::new(1, 0), TILE);
        let _ = player.steer(Direction::East, TILE);
        let _ = player.advance(Duration::from_millis(200), SPEED, TILE);
        assert!(player.snapshot(TILE).position.x > 48.0);

        let steering = player.steer(Direction::East, TILE);

        assert_eq!(
            steering,
            Steering::Accepted {
                from: LatticeCoord::new(2, 0),
                to: LatticeCoord::new(3, 0),
            }
        );
    }

    #[test]
    fn advance_never_overshoots_target() {
        let mut player = Player::spawn(CellCoord::new(0, 0), TILE);
        let _ = player.steer(Direction::East, TILE);
        let target = player.snapshot(TILE).next_position;

        let mut previous = target.distance(player.snapshot(TILE).position);
        let mut arrival = None;
        for _ in 0..100 {
            arrival = player.advance(Duration::from_millis(7), SPEED, TILE);
            let distance = target.distance(player.snapshot(TILE).position);
            assert!(distance >= 0.0);
            assert!(distance <= previous);
            previous = distance;
            if arrival.is_some() {
                break;
            }
        }

        assert_eq!(arrival, Some(LatticeCoord::new(1, 0)));
        let snapshot = player.snapshot(TILE);
        assert_eq!(snapshot.position, target);
        assert_eq!(snapshot.direction, None);
        assert!(!snapshot.in_transit);
    }

    #[test]
    fn oversized_step_snaps_exactly_to_target() {
        let mut player = Player::spawn(CellCoord::new(5, 5), TILE);
        let _ = player.steer(Direction::West, TILE);

        let arrival = player.advance(Duration::from_secs(2), SPEED, TILE);

        assert_eq!(arrival, Some(LatticeCoord::new(4, 5)));
        assert_eq!(player.snapshot(TILE).position, Vec2::new(128.0, 160.0));
    }

    #[test]
    fn roll_back_restores_departure_point() {
        let mut player = Player::spawn(CellCoord::new(1, 1), TILE);
        let _ = player.steer(Direction::North, TILE);
        let _ = player.advance(frame(), SPEED, TILE);

        let restored = player.roll_back(TILE);

        assert_eq!(restored, LatticeCoord::new(1, 1));
        let snapshot = player.snapshot(TILE);
        assert_eq!(snapshot.position, Vec2::new(32.0, 32.0));
        assert_eq!(snapshot.next_position, snapshot.last_position);
        assert_eq!(snapshot.direction, None);
        assert!(!snapshot.in_transit);
    }

    #[test]
    fn idle_player_ignores_ticks() {
        let mut player = Player::spawn(CellCoord::new(0, 0), TILE);

        assert_eq!(player.advance(frame(), SPEED, TILE), None);
        assert_eq!(player.snapshot(TILE).position, Vec2::ZERO);
    }
}
