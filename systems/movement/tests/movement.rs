use std::time::Duration;

use open_world_core::{
    Axis, Command, Direction, Event, GridMap, HeldDirections, LatticeCoord, Tile, TileCoord,
};
use open_world_system_movement::Movement;
use open_world_world::{self as world, query, World};

const RIGHT: HeldDirections = HeldDirections {
    left: false,
    right: true,
    up: false,
    down: false,
};

const DOWN: HeldDirections = HeldDirections {
    left: false,
    right: false,
    up: false,
    down: true,
};

fn loaded_world(rows: &[&str]) -> (World, Vec<Event>) {
    let columns = rows[0].len() as u32;
    let tiles = rows
        .iter()
        .flat_map(|row| row.chars().map(Tile::from_symbol))
        .collect();
    let map = GridMap::from_tiles(TileCoord::new(columns), TileCoord::new(rows.len() as u32), tiles)
        .expect("valid map");
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadLevel { map }, &mut events);
    (world, events)
}

fn sample(
    movement: &mut Movement,
    world: &World,
    events: &[Event],
    now_ms: u64,
    held: HeldDirections,
) -> Vec<Command> {
    let player = query::player(world);
    let mut commands = Vec::new();
    movement.handle(
        events,
        Duration::from_millis(now_ms),
        held,
        player.as_ref(),
        &mut commands,
    );
    commands
}

#[test]
fn samples_are_gated_by_debounce_interval() {
    let (world, events) = loaded_world(&["P..."]);
    let mut movement = Movement::default();

    assert!(sample(&mut movement, &world, &events, 0, RIGHT).is_empty());
    assert!(sample(&mut movement, &world, &[], 30, RIGHT).is_empty());
    assert!(sample(&mut movement, &world, &[], 50, RIGHT).is_empty());
    assert_eq!(
        sample(&mut movement, &world, &[], 51, RIGHT),
        vec![Command::SteerPlayer {
            direction: Direction::East
        }]
    );
    assert!(sample(&mut movement, &world, &[], 90, RIGHT).is_empty());
}

#[test]
fn idle_samples_still_consume_the_interval() {
    let (world, events) = loaded_world(&["P..."]);
    let mut movement = Movement::default();
    let _ = sample(&mut movement, &world, &events, 0, HeldDirections::default());

    assert!(sample(&mut movement, &world, &[], 60, HeldDirections::default()).is_empty());
    assert!(sample(&mut movement, &world, &[], 100, RIGHT).is_empty());
    assert_eq!(sample(&mut movement, &world, &[], 111, RIGHT).len(), 1);
}

#[test]
fn level_load_restarts_the_interval() {
    let (world, events) = loaded_world(&["P..."]);
    let mut movement = Movement::default();
    let _ = sample(&mut movement, &world, &events, 0, HeldDirections::default());

    assert!(sample(&mut movement, &world, &events, 200, RIGHT).is_empty());
    assert_eq!(sample(&mut movement, &world, &[], 251, RIGHT).len(), 1);
}

#[test]
fn nothing_is_emitted_without_a_player() {
    let world = World::new();
    let mut movement = Movement::default();

    assert!(sample(&mut movement, &world, &[], 0, RIGHT).is_empty());
    assert!(sample(&mut movement, &world, &[], 500, RIGHT).is_empty());
}

#[test]
fn orthogonal_keys_are_not_sampled_mid_transit() {
    let (mut world, events) = loaded_world(&["P...", "...."]);
    let mut movement = Movement::new(Duration::from_millis(50), Axis::Horizontal);
    let _ = sample(&mut movement, &world, &events, 0, RIGHT);

    for command in sample(&mut movement, &world, &[], 60, RIGHT) {
        let mut follow_up = Vec::new();
        world::apply(&mut world, command, &mut follow_up);
    }
    let mut tick_events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut tick_events,
    );
    assert!(query::player(&world).expect("player").in_transit);

    assert!(sample(&mut movement, &world, &tick_events, 120, DOWN).is_empty());
}

#[test]
fn held_right_into_wall_never_leaves_spawn_cell() {
    let (mut world, events) = loaded_world(&["P1.."]);
    let mut movement = Movement::default();
    let mut pending = events;
    let mut collisions = 0;

    for frame in 0..60u64 {
        let commands = sample(&mut movement, &world, &pending, frame * 16, RIGHT);
        pending.clear();
        for command in commands {
            world::apply(&mut world, command, &mut pending);
        }
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut pending,
        );
        collisions += pending
            .iter()
            .filter(|event| matches!(event, Event::PlayerCollided { .. }))
            .count();

        let player = query::player(&world).expect("player");
        assert_eq!(player.cell(), LatticeCoord::new(0, 0));
    }

    assert!(collisions > 0, "player never touched the wall");
}
