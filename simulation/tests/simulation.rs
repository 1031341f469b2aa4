use std::time::Duration;

use dreamplaza_core::{AgentSnapshot, CollisionEvent, Event, EventKind, ProjectileId};
use dreamplaza_simulation::{Simulation, SimulationConfig};
use glam::Vec3;

const DT: Duration = Duration::from_millis(50);

fn small_config() -> SimulationConfig {
    SimulationConfig::from_toml_str(
        r#"
        [terrain]
        width = 48
        depth = 48
        height_scale = 0.0

        [spawning]
        chunk_size = 12.0
        agents_per_chunk = [1, 2]
        "#,
    )
    .expect("test config is valid")
}

fn scripted_player(frame: u64) -> Vec3 {
    let angle = frame as f32 * 0.02;
    Vec3::new(angle.cos() * 10.0, 0.0, angle.sin() * 10.0)
}

#[test]
fn first_frame_seeds_neighborhood_and_publishes() {
    let mut simulation = Simulation::new(&small_config()).expect("valid config");

    let report = simulation.frame(DT, Vec3::ZERO, &[]);

    assert_eq!(report.frame, 0);
    assert!(report.view_refreshed);
    assert!(matches!(
        report.events.first(),
        Some(Event::TerrainConfigured {
            width: 48,
            depth: 48
        })
    ));
    let spawned = report
        .events
        .iter()
        .filter(|event| matches!(event, Event::AgentSpawned { .. }))
        .count();
    assert!((9..=18).contains(&spawned), "spawned {spawned}");
    assert_eq!(simulation.stats().seeded_chunks, 9);
    let published = simulation.agent_view().len();
    assert!(published > 0 && published <= spawned, "published {published}");
}

#[test]
fn replaying_the_same_script_is_deterministic() {
    let run = || {
        let mut simulation = Simulation::new(&small_config()).expect("valid config");
        let mut log = Vec::new();
        for frame in 0..240 {
            if frame % 20 == 0 {
                let _ = simulation.fire(scripted_player(frame), Vec3::X);
            }
            log.push(simulation.frame(DT, scripted_player(frame), &[]));
        }
        (log, simulation.stats())
    };

    let (first_log, first_stats) = run();
    let (second_log, second_stats) = run();
    assert_eq!(first_log, second_log);
    assert_eq!(first_stats, second_stats);
    assert_eq!(first_stats.frames, 240);
}

#[test]
fn collisions_resolve_hits_through_the_loop() {
    let mut simulation = Simulation::new(&small_config()).expect("valid config");
    let _ = simulation.frame(DT, Vec3::ZERO, &[]);
    let target = *simulation
        .agent_view()
        .iter()
        .max_by(|a, b| a.position.length().total_cmp(&b.position.length()))
        .expect("neighborhood has agents");
    let projectile = simulation
        .fire(Vec3::ZERO, target.position)
        .expect("direction is usable");
    assert_eq!(simulation.projectile_view().len(), 1);

    let collision = CollisionEvent {
        projectile,
        other_entity: 42,
        other_is_agent: true,
        agent: Some(target.id),
    };
    let report = simulation.frame(DT, Vec3::ZERO, &[collision, collision]);

    assert!(report.events.contains(&Event::ProjectileFired {
        projectile,
        position: Vec3::ZERO
    }));
    assert!(report
        .events
        .contains(&Event::ProjectileConsumed { projectile }));
    let hits = report
        .events
        .iter()
        .filter(|event| matches!(event, Event::AgentHit { .. }))
        .count();
    assert_eq!(hits, 1);
    assert_eq!(simulation.stats().hits, 1);
    assert!(simulation.projectile_view().is_empty());
}

fn farthest_agent(simulation: &Simulation) -> AgentSnapshot {
    *simulation
        .agent_view()
        .iter()
        .max_by(|a, b| a.position.length().total_cmp(&b.position.length()))
        .expect("neighborhood has agents")
}

fn hit_on(report: &[Event], target: &AgentSnapshot) -> bool {
    report.iter().any(|event| {
        matches!(event, Event::AgentHit { agent, hit_points }
            if *agent == target.id && hit_points.get() + 1 == target.hit_points.get())
    })
}

#[test]
fn collision_lands_in_the_frame_its_projectile_expires() {
    let mut config = small_config();
    config.projectiles.lifetime_ms = 100;
    let mut simulation = Simulation::new(&config).expect("valid config");
    let step = Duration::from_millis(60);
    let _ = simulation.frame(step, Vec3::ZERO, &[]);
    let target = farthest_agent(&simulation);
    let projectile = simulation
        .fire(Vec3::ZERO, target.position)
        .expect("direction is usable");
    let _ = simulation.frame(step, Vec3::ZERO, &[]);
    assert_eq!(simulation.projectile_view().len(), 1);

    let collision = CollisionEvent {
        projectile,
        other_entity: 7,
        other_is_agent: true,
        agent: Some(target.id),
    };
    let report = simulation.frame(step, Vec3::ZERO, &[collision]);

    assert!(report
        .events
        .contains(&Event::ProjectileConsumed { projectile }));
    assert!(!report
        .events
        .contains(&Event::ProjectileExpired { projectile }));
    assert!(hit_on(&report.events, &target), "{:?}", report.events);
    assert_eq!(simulation.stats().hits, 1);
}

#[test]
fn caller_owned_projectiles_resolve_once() {
    let mut simulation = Simulation::new(&small_config()).expect("valid config");
    let _ = simulation.frame(DT, Vec3::ZERO, &[]);
    let target = farthest_agent(&simulation);
    let projectile = ProjectileId::new(500);
    let collision = CollisionEvent {
        projectile,
        other_entity: 7,
        other_is_agent: true,
        agent: Some(target.id),
    };

    let report = simulation.frame(DT, Vec3::ZERO, &[collision]);
    assert!(report
        .events
        .contains(&Event::ProjectileConsumed { projectile }));
    assert!(hit_on(&report.events, &target), "{:?}", report.events);

    let replay = simulation.frame(DT, Vec3::ZERO, &[collision]);
    assert!(!replay
        .events
        .iter()
        .any(|event| matches!(event, Event::ProjectileConsumed { .. } | Event::AgentHit { .. })));
    assert_eq!(simulation.stats().hits, 1);
}

#[test]
fn zero_direction_does_not_fire() {
    let mut simulation = Simulation::new(&small_config()).expect("valid config");
    assert_eq!(simulation.fire(Vec3::ZERO, Vec3::ZERO), None);
    assert!(simulation.projectile_view().is_empty());
}

#[test]
fn bus_subscribers_receive_filtered_events_until_unsubscribed() {
    let mut simulation = Simulation::new(&small_config()).expect("valid config");
    let spawns = simulation.bus_mut().subscribe(&[EventKind::AgentSpawned]);
    let everything = simulation.bus_mut().subscribe(&[]);

    let report = simulation.frame(DT, Vec3::ZERO, &[]);

    let received = simulation.bus_mut().drain(spawns);
    assert!(!received.is_empty());
    assert!(received
        .iter()
        .all(|event| event.kind() == EventKind::AgentSpawned));
    assert_eq!(simulation.bus_mut().drain(everything), report.events);

    assert!(simulation.bus_mut().unsubscribe(everything));
    let _ = simulation.frame(DT, Vec3::ZERO, &[]);
    assert!(simulation.bus_mut().drain(everything).is_empty());
}

#[test]
fn stationary_player_is_eventually_struck() {
    let mut simulation = Simulation::new(&small_config()).expect("valid config");
    let mut struck = 0;
    let mut refreshed_on_death = true;

    for _ in 0..1200 {
        let report = simulation.frame(DT, Vec3::ZERO, &[]);
        if report.events.iter().any(Event::is_agent_death) {
            struck += 1;
            refreshed_on_death &= report.view_refreshed;
        }
    }

    assert!(struck > 0, "no agent reached the player");
    assert!(refreshed_on_death, "deaths refresh the published view");
    let player = simulation.player();
    assert!(player.health() < player.max_health());
    assert_eq!(simulation.stats().seeded_chunks, 9, "player never moved");
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = SimulationConfig::default();
    config.terrain.width = 0;
    assert!(Simulation::new(&config).is_err());
}
