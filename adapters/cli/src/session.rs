//! Scripted headless session that stands in for the renderer and physics.

use std::time::Duration;

use dreamplaza_core::{planar_distance, AgentSnapshot, CollisionEvent, Event, EventKind};
use dreamplaza_simulation::{Simulation, SimulationConfig};
use dreamplaza_world::query;
use glam::Vec3;
use serde::Serialize;
use tracing::info;

/// Radius of the sphere used for agent bodies in overlap tests.
const AGENT_BODY_RADIUS: f32 = 0.45;
/// Height of the agent body centre above its feet.
const AGENT_BODY_HEIGHT: f32 = 0.5;
/// Height the player fires from above their feet.
const MUZZLE_HEIGHT: f32 = 0.5;
/// Offset that keeps agent physics handles distinct from other bodies.
const AGENT_HANDLE_BASE: u64 = 1 << 32;

/// Parameters of a scripted session.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionOptions {
    pub(crate) frames: u64,
    pub(crate) fps: u32,
    pub(crate) fire_every: u64,
    pub(crate) fire_range: f32,
    pub(crate) walk_radius: f32,
}

/// Outcome of a scripted session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct SessionSummary {
    pub(crate) frames: u64,
    pub(crate) simulated_seconds: f32,
    pub(crate) survived: bool,
    pub(crate) player_health: u32,
    pub(crate) max_health: u32,
    pub(crate) shots: u64,
    pub(crate) hits: u64,
    pub(crate) kills: u64,
    pub(crate) strikes: u64,
    pub(crate) agents_alive: usize,
    pub(crate) seeded_chunks: usize,
    pub(crate) plans: u64,
    pub(crate) view_revision: u64,
}

/// Runs the scripted walk until the frame budget is spent or the player falls.
pub(crate) fn run(config: &SimulationConfig, options: SessionOptions) -> anyhow::Result<SessionSummary> {
    let mut simulation = Simulation::new(config)?;
    let strikes_feed = simulation
        .bus_mut()
        .subscribe(&[EventKind::AgentStruckPlayer]);

    let fps = options.fps.max(1);
    let dt = Duration::from_secs(1) / fps;
    let fire_every = options.fire_every.max(1);
    let mut collisions = Vec::new();
    let mut shots = 0;
    let mut strikes = 0;
    let mut frames = 0;

    while frames < options.frames {
        let player = scripted_position(frames, fps, options.walk_radius);
        let report = simulation.frame(dt, player, &collisions);
        frames += 1;

        strikes += simulation.bus_mut().drain(strikes_feed).len() as u64;
        if report
            .events
            .iter()
            .any(|event| matches!(event, Event::PlayerDamaged { remaining: 0, .. }))
        {
            info!(frame = report.frame, "player fell");
            break;
        }

        if report.frame % fire_every == 0 {
            let target = nearest_agent(simulation.agent_view().iter(), player, options.fire_range);
            if let Some(target) = target {
                let muzzle = player + Vec3::Y * MUZZLE_HEIGHT;
                let aim = target.position + Vec3::Y * AGENT_BODY_HEIGHT - muzzle;
                if simulation.fire(muzzle, aim).is_some() {
                    shots += 1;
                }
            }
        }

        collisions = detect_collisions(&simulation);
    }

    let stats = simulation.stats();
    let player = simulation.player();
    Ok(SessionSummary {
        frames,
        simulated_seconds: (dt * u32::try_from(frames).unwrap_or(u32::MAX)).as_secs_f32(),
        survived: player.health() > 0,
        player_health: player.health(),
        max_health: player.max_health(),
        shots,
        hits: stats.hits,
        kills: stats.kills,
        strikes,
        agents_alive: query::agent_count(simulation.world()),
        seeded_chunks: stats.seeded_chunks,
        plans: stats.plans,
        view_revision: stats.view_revision,
    })
}

/// Walks the player around a circle, one lap every twenty seconds.
fn scripted_position(frame: u64, fps: u32, radius: f32) -> Vec3 {
    let seconds = frame as f32 / fps as f32;
    let angle = seconds * std::f32::consts::TAU / 20.0;
    Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
}

fn nearest_agent<'a>(
    agents: impl Iterator<Item = &'a AgentSnapshot>,
    player: Vec3,
    range: f32,
) -> Option<&'a AgentSnapshot> {
    agents
        .map(|agent| (planar_distance(agent.position, player), agent))
        .filter(|(distance, _)| *distance <= range)
        .min_by(|(left, _), (right, _)| left.total_cmp(right))
        .map(|(_, agent)| agent)
}

/// Sphere overlap between every active projectile and every live agent body.
fn detect_collisions(simulation: &Simulation) -> Vec<CollisionEvent> {
    let agents = query::agent_view(simulation.world());
    let mut collisions = Vec::new();
    for projectile in simulation.projectile_view().iter() {
        for agent in agents.iter() {
            let centre = agent.position + Vec3::Y * AGENT_BODY_HEIGHT;
            if projectile.position.distance(centre) <= projectile.radius + AGENT_BODY_RADIUS {
                collisions.push(CollisionEvent {
                    projectile: projectile.id,
                    other_entity: AGENT_HANDLE_BASE + u64::from(agent.id.get()),
                    other_is_agent: true,
                    agent: Some(agent.id),
                });
            }
        }
    }
    collisions
}
