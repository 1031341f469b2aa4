use std::time::Duration;

use dreamplaza_core::{AgentId, AgentView, Command, Event, HitPoints};
use dreamplaza_system_publishing::{Config, Publisher};
use dreamplaza_world::{self as world, query, World};
use glam::Vec3;

fn tick(dt_ms: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(dt_ms),
    }
}

#[test]
fn first_frame_always_publishes() {
    let mut publisher = Publisher::new(Config::new(Duration::from_secs(5)));
    assert_eq!(publisher.revision(), 0);

    assert!(publisher.handle(&[], AgentView::default));
    assert_eq!(publisher.revision(), 1);
}

#[test]
fn refreshes_follow_interval_of_simulated_time() {
    let mut publisher = Publisher::new(Config::new(Duration::from_millis(200)));
    let mut captures = 0;
    let mut capture = || {
        captures += 1;
        AgentView::default()
    };

    assert!(publisher.handle(&[tick(16)], &mut capture));
    let mut refreshed = Vec::new();
    for _ in 0..25 {
        refreshed.push(publisher.handle(&[tick(50)], &mut capture));
    }

    let refreshes = refreshed.iter().filter(|refreshed| **refreshed).count();
    assert_eq!(refreshes, 6, "one refresh per four 50 ms frames");
    assert!(!refreshed[2]);
    assert!(refreshed[3]);
    assert_eq!(captures, 7, "views are only captured for refreshes");
    assert_eq!(publisher.revision(), 7);
}

#[test]
fn deaths_force_immediate_refresh() {
    let mut publisher = Publisher::default();
    assert!(publisher.handle(&[], AgentView::default));
    let agent = AgentId::new(3);

    assert!(!publisher.handle(&[tick(16)], AgentView::default));
    assert!(!publisher.handle(
        &[
            tick(16),
            Event::AgentHit {
                agent,
                hit_points: HitPoints::new(1)
            }
        ],
        AgentView::default
    ));
    assert!(publisher.handle(&[tick(16), Event::AgentKilled { agent }], AgentView::default));
    assert!(publisher.handle(&[Event::AgentStruckPlayer { agent }], AgentView::default));
    assert!(!publisher.handle(&[tick(16)], AgentView::default));
}

#[test]
fn published_view_tracks_world_between_refreshes() {
    let mut world = World::new();
    let mut publisher = Publisher::new(Config::new(Duration::from_millis(100)));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnAgent {
            position: Vec3::new(30.0, 0.0, 0.0),
            speed: 2.0,
            hit_points: HitPoints::new(2),
        },
        &mut events,
    );
    assert!(publisher.handle(&events, || query::agent_view(&world)));
    assert_eq!(publisher.view().len(), 1);

    events.clear();
    world::apply(
        &mut world,
        Command::SpawnAgent {
            position: Vec3::new(-30.0, 0.0, 0.0),
            speed: 2.0,
            hit_points: HitPoints::new(2),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(50),
        },
        &mut events,
    );
    assert!(!publisher.handle(&events, || query::agent_view(&world)));
    assert_eq!(publisher.view().len(), 1, "stale until the interval elapses");

    events.clear();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(50),
        },
        &mut events,
    );
    assert!(publisher.handle(&events, || query::agent_view(&world)));
    assert_eq!(publisher.view().len(), 2);
}
