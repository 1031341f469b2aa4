use dreamplaza_core::{Command, Event};
use dreamplaza_system_spawning::{Config, Spawning};
use dreamplaza_world::{self as world, query, World};
use glam::Vec3;

const SEED: u64 = 0x00c0_ffee;

fn world_with_terrain(width: u32, depth: u32, heights: Vec<f32>) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureTerrain {
            width,
            depth,
            cell_size: 1.0,
            heights,
        },
        &mut events,
    );
    world
}

fn spawn_positions(commands: &[Command]) -> Vec<Vec3> {
    commands
        .iter()
        .map(|command| match command {
            Command::SpawnAgent { position, .. } => *position,
            other => panic!("unexpected command emitted: {other:?}"),
        })
        .collect()
}

#[test]
fn stationary_player_seeds_each_chunk_once() {
    let world = world_with_terrain(64, 64, vec![0.0; 64 * 64]);
    let mut spawning = Spawning::new(Config::new(16.0, 1.2, SEED));
    let mut commands = Vec::new();

    spawning.handle(Vec3::new(1.0, 0.0, 1.0), query::terrain(&world), &mut commands);
    let first_batch = commands.len();
    assert!((9..=27).contains(&first_batch), "spawned {first_batch}");
    assert_eq!(spawning.seen_chunks(), 9);

    for _ in 0..50 {
        spawning.handle(Vec3::new(1.0, 0.0, 1.0), query::terrain(&world), &mut commands);
    }
    assert_eq!(commands.len(), first_batch, "no chunk is seeded twice");
}

#[test]
fn crossing_into_new_chunk_seeds_only_the_new_row() {
    let world = world_with_terrain(96, 96, vec![0.0; 96 * 96]);
    let mut spawning = Spawning::new(Config::new(16.0, 1.2, SEED).with_agents_per_chunk(2, 2));
    let mut commands = Vec::new();

    spawning.handle(Vec3::new(8.0, 0.0, 8.0), query::terrain(&world), &mut commands);
    assert_eq!(commands.len(), 18);
    commands.clear();

    spawning.handle(Vec3::new(24.0, 0.0, 8.0), query::terrain(&world), &mut commands);
    assert_eq!(commands.len(), 6, "three fresh chunks east of the player");
    assert_eq!(spawning.seen_chunks(), 12);
}

#[test]
fn spawns_snap_to_walkable_cell_centres() {
    let width = 32;
    let depth = 32;
    let heights: Vec<f32> = (0..width * depth)
        .map(|index| if index % width < 16 { 5.0 } else { 0.0 })
        .collect();
    let world = world_with_terrain(width, depth, heights);
    let terrain = query::terrain(&world);
    let mut spawning = Spawning::new(Config::new(8.0, 1.2, SEED));
    let mut commands = Vec::new();

    spawning.handle(Vec3::ZERO, terrain, &mut commands);

    assert!(!commands.is_empty());
    for position in spawn_positions(&commands) {
        let cell = terrain.world_to_grid(position.x, position.z);
        assert!(cell.x() >= 16, "spawned on blocked cell {cell:?}");
        assert_eq!(terrain.grid_to_world(cell), position);
    }
}

#[test]
fn blocked_terrain_marks_chunks_seen_without_spawning() {
    let blocked = world_with_terrain(16, 16, vec![4.0; 16 * 16]);
    let open = world_with_terrain(16, 16, vec![0.0; 16 * 16]);
    let mut spawning = Spawning::new(Config::new(16.0, 1.2, SEED));
    let mut commands = Vec::new();

    spawning.handle(Vec3::ZERO, query::terrain(&blocked), &mut commands);
    assert!(commands.is_empty());
    assert_eq!(spawning.seen_chunks(), 9);

    spawning.handle(Vec3::ZERO, query::terrain(&open), &mut commands);
    assert!(commands.is_empty(), "seen chunks are never revisited");
}

#[test]
fn spawn_commands_are_accepted_by_world() {
    let mut world = world_with_terrain(48, 48, vec![0.0; 48 * 48]);
    let mut spawning = Spawning::new(Config::new(16.0, 1.2, SEED).with_hit_points(3, 3));
    let mut commands = Vec::new();
    spawning.handle(Vec3::ZERO, query::terrain(&world), &mut commands);

    let mut events = Vec::new();
    for command in commands.iter().cloned() {
        world::apply(&mut world, command, &mut events);
    }

    assert_eq!(events.len(), commands.len());
    assert!(events
        .iter()
        .all(|event| matches!(event, Event::AgentSpawned { .. })));
    assert_eq!(query::agent_count(&world), commands.len());
    assert!(query::agent_view(&world)
        .iter()
        .all(|agent| agent.hit_points.get() == 3));
}

#[test]
fn identical_seeds_replay_identically() {
    let world = world_with_terrain(96, 96, vec![0.0; 96 * 96]);
    let path = [
        Vec3::ZERO,
        Vec3::new(17.0, 0.0, 3.0),
        Vec3::new(33.0, 0.0, -20.0),
        Vec3::new(-12.0, 0.0, 40.0),
    ];

    let replay = |seed: u64| {
        let mut spawning = Spawning::new(Config::new(16.0, 1.2, seed));
        let mut commands = Vec::new();
        for position in path {
            spawning.handle(position, query::terrain(&world), &mut commands);
        }
        commands
    };

    assert_eq!(replay(SEED), replay(SEED));
    assert_ne!(replay(SEED), replay(SEED + 1));
}

#[test]
fn chunks_off_the_terrain_are_seen_but_left_empty() {
    let world = world_with_terrain(16, 16, vec![0.0; 16 * 16]);
    let mut spawning = Spawning::new(Config::new(16.0, 1.2, SEED).with_agents_per_chunk(2, 2));
    let mut commands = Vec::new();

    spawning.handle(Vec3::ZERO, query::terrain(&world), &mut commands);

    assert_eq!(spawning.seen_chunks(), 9);
    assert_eq!(commands.len(), 8, "only the four chunks covering the terrain spawn");
    for position in spawn_positions(&commands) {
        assert!(position.x.abs() < 8.0 && position.z.abs() < 8.0);
    }
}
