#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Dream Plaza.

pub mod grid;
pub mod navigation;
pub mod terrain;

mod agents;
mod projectiles;

use std::time::Duration;

use dreamplaza_core::{planar_distance, Command, Event};
use glam::Vec3;
use tracing::{debug, trace};

use crate::{
    agents::{AgentRegistry, Steering},
    grid::TerrainGrid,
    projectiles::ProjectileRegistry,
};

const DEFAULT_CONTACT_DISTANCE: f32 = 1.0;
const DEFAULT_CONTACT_DAMAGE: u32 = 10;
const DEFAULT_ARRIVAL_DISTANCE: f32 = 0.3;
const DEFAULT_CHASE_FRACTION: f32 = 0.6;
const DEFAULT_MAX_HEALTH: u32 = 100;

/// Position and health of the player as tracked by the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerVitals {
    position: Vec3,
    health: u32,
    max_health: u32,
}

impl PlayerVitals {
    const fn new(max_health: u32) -> Self {
        Self {
            position: Vec3::ZERO,
            health: max_health,
            max_health,
        }
    }

    /// Last reported world position of the player.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Health the player has left, never above [`Self::max_health`].
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Maximum health of the player.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    fn damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }
}

#[derive(Clone, Copy, Debug)]
struct Contact {
    distance: f32,
    damage: u32,
}

/// Represents the authoritative Dream Plaza world state.
#[derive(Debug)]
pub struct World {
    terrain: TerrainGrid,
    agents: AgentRegistry,
    projectiles: ProjectileRegistry,
    player: PlayerVitals,
    contact: Contact,
    steering: Steering,
    clock: Duration,
}

impl World {
    /// Creates an empty world with default tuning and no terrain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            terrain: TerrainGrid::default(),
            agents: AgentRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            player: PlayerVitals::new(DEFAULT_MAX_HEALTH),
            contact: Contact {
                distance: DEFAULT_CONTACT_DISTANCE,
                damage: DEFAULT_CONTACT_DAMAGE,
            },
            steering: Steering {
                arrival_distance: DEFAULT_ARRIVAL_DISTANCE,
                chase_fraction: DEFAULT_CHASE_FRACTION,
            },
            clock: Duration::ZERO,
        }
    }

    fn resolve_contact(&mut self, out_events: &mut Vec<Event>) {
        let player = self.player.position;
        let contact = self.contact;
        for agent in self.agents.iter_alive_mut() {
            if planar_distance(agent.position, player) >= contact.distance {
                continue;
            }
            agent.alive = false;
            let remaining = self.player.damage(contact.damage);
            debug!(agent = agent.id.get(), remaining, "agent struck player");
            out_events.push(Event::AgentStruckPlayer { agent: agent.id });
            out_events.push(Event::PlayerDamaged {
                amount: contact.damage,
                remaining,
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTerrain {
            width,
            depth,
            cell_size,
            heights,
        } => {
            world.terrain = TerrainGrid::new(width, depth, cell_size, heights);
            debug!(width, depth, cell_size, "terrain configured");
            out_events.push(Event::TerrainConfigured { width, depth });
        }
        Command::ConfigureContact { distance, damage } => {
            world.contact = Contact { distance, damage };
        }
        Command::ConfigureSteering {
            arrival_distance,
            chase_fraction,
        } => {
            world.steering = Steering {
                arrival_distance,
                chase_fraction,
            };
        }
        Command::ConfigurePlayer { max_health } => {
            let position = world.player.position;
            world.player = PlayerVitals::new(max_health);
            world.player.position = position;
        }
        Command::SetPlayerPosition { position } => {
            world.player.position = position;
        }
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.projectiles.age(dt, out_events);
            world.resolve_contact(out_events);
            let removed = world.agents.sweep();
            if removed > 0 {
                trace!(removed, remaining = world.agents.len(), "swept dead agents");
            }
        }
        Command::SpawnAgent {
            position,
            speed,
            hit_points,
        } => {
            if hit_points.is_depleted() {
                trace!("ignoring spawn without hit points");
                return;
            }
            let agent = world.agents.spawn(position, speed, hit_points);
            out_events.push(Event::AgentSpawned {
                agent,
                position,
                hit_points,
            });
        }
        Command::AssignRoute { agent, route } => {
            let now = world.clock;
            let Some(entry) = world.agents.get_mut(agent).filter(|entry| entry.alive) else {
                return;
            };
            match route {
                Some(route) => {
                    let waypoints = route.len();
                    entry.assign_route(Some(route), now);
                    out_events.push(Event::RouteAssigned { agent, waypoints });
                }
                None => {
                    entry.assign_route(None, now);
                    out_events.push(Event::RouteCleared { agent });
                }
            }
        }
        Command::AdvanceAgent { agent, dt } => {
            let player = world.player.position;
            let steering = world.steering;
            if let Some(entry) = world.agents.get_mut(agent).filter(|entry| entry.alive) {
                entry.advance(dt.as_secs_f32(), player, steering);
            }
        }
        Command::FireProjectile {
            position,
            velocity,
            color,
            radius,
            lifetime,
        } => {
            let projectile = world
                .projectiles
                .fire(position, velocity, color, radius, lifetime);
            out_events.push(Event::ProjectileFired {
                projectile,
                position,
            });
        }
        Command::ResolveHit { agent, projectile } => {
            if !world.projectiles.consume(projectile) {
                trace!(projectile = projectile.get(), "ignoring retired projectile");
                return;
            }
            out_events.push(Event::ProjectileConsumed { projectile });

            let Some(entry) = world.agents.get_mut(agent) else {
                return;
            };
            let Some(hit_points) = entry.take_hit() else {
                return;
            };
            out_events.push(Event::AgentHit { agent, hit_points });
            if hit_points.is_depleted() {
                debug!(agent = agent.get(), "agent killed");
                out_events.push(Event::AgentKilled { agent });
            }
        }
    }
}

/// Read-only queries over the world state.
pub mod query {
    use std::time::Duration;

    use super::{PlayerVitals, World};
    use crate::grid::TerrainGrid;
    use dreamplaza_core::{
        AgentId, AgentPlanSnapshot, AgentSnapshot, AgentView, ProjectileView,
    };

    /// Provides read-only access to the configured terrain grid.
    #[must_use]
    pub fn terrain(world: &World) -> &TerrainGrid {
        &world.terrain
    }

    /// Total simulated time accumulated by `Tick` commands.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Position and health of the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerVitals {
        world.player
    }

    /// Captures a read-only view of every live agent.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(
            world
                .agents
                .iter_alive()
                .map(|agent| agent.snapshot())
                .collect(),
        )
    }

    /// Snapshot of a single agent, if it exists and is alive.
    #[must_use]
    pub fn agent(world: &World, agent: AgentId) -> Option<AgentSnapshot> {
        world
            .agents
            .get(agent)
            .filter(|entry| entry.alive)
            .map(|entry| entry.snapshot())
    }

    /// Planning state of every live agent in identifier order.
    #[must_use]
    pub fn plan_snapshots(world: &World) -> Vec<AgentPlanSnapshot> {
        world
            .agents
            .iter_alive()
            .map(|agent| agent.plan_snapshot())
            .collect()
    }

    /// Captures a read-only view of every active projectile.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Number of live agents.
    #[must_use]
    pub fn agent_count(world: &World) -> usize {
        world.agents.iter_alive().count()
    }
}
