#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame loop that wires the Dream Plaza world to its systems.
//!
//! [`Simulation::frame`] runs one fixed-order pass: the player position is
//! recorded, chunks around the player are seeded, the collisions reported
//! since the last frame are resolved, time advances, agents plan and move,
//! the throttled agent view is refreshed, and every event produced along the
//! way is broadcast on the [`EventBus`].
//!
//! Collisions resolve before `Tick` ages projectiles, so a projectile that
//! hit while still active delivers even if its lifetime ends this frame.

pub mod bus;
pub mod config;

use std::time::Duration;

use dreamplaza_core::{AgentView, CollisionEvent, Command, Event, ProjectileId, ProjectileView};
use dreamplaza_system_combat::Combat;
use dreamplaza_system_movement::Movement;
use dreamplaza_system_publishing::Publisher;
use dreamplaza_system_spawning::Spawning;
use dreamplaza_world::{self as world, query, terrain, PlayerVitals, World};
use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

pub use crate::{
    bus::{EventBus, SubscriptionId},
    config::{ConfigError, SimulationConfig},
};

/// Outcome of a single [`Simulation::frame`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Zero-based index of the frame.
    pub frame: u64,
    /// Every event the world reported during the frame, in order.
    pub events: Vec<Event>,
    /// Whether the published agent view was refreshed.
    pub view_refreshed: bool,
    /// Player health at the end of the frame.
    pub player_health: u32,
}

/// Cumulative counters describing a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames simulated so far.
    pub frames: u64,
    /// Chunks seeded by the spawning system.
    pub seeded_chunks: usize,
    /// Route planning attempts.
    pub plans: u64,
    /// Projectile hits on live agents.
    pub hits: u64,
    /// Agents killed by projectiles.
    pub kills: u64,
    /// Revision of the published agent view.
    pub view_revision: u64,
}

/// Owns the world, its systems and the event bus for one session.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    spawning: Spawning,
    movement: Movement,
    combat: Combat,
    publisher: Publisher,
    bus: EventBus,
    projectiles: config::ProjectileConfig,
    pending: Vec<Event>,
    frame: u64,
}

impl Simulation {
    /// Validates the configuration, generates terrain and configures a fresh
    /// world.
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let terrain_config = &config.terrain;
        let mut rng = ChaCha8Rng::seed_from_u64(terrain_config.seed);
        let heights = terrain::generate_heights(
            terrain_config.width,
            terrain_config.depth,
            terrain_config.height_scale,
            &mut rng,
        );

        let mut world = World::new();
        let mut pending = Vec::new();
        let setup = [
            Command::ConfigureTerrain {
                width: terrain_config.width,
                depth: terrain_config.depth,
                cell_size: terrain_config.cell_size,
                heights,
            },
            Command::ConfigureContact {
                distance: config.agents.contact_distance,
                damage: config.agents.contact_damage,
            },
            Command::ConfigureSteering {
                arrival_distance: config.agents.arrival_distance,
                chase_fraction: config.agents.chase_fraction,
            },
            Command::ConfigurePlayer {
                max_health: config.player.max_health,
            },
        ];
        apply_all(&mut world, setup, &mut pending);

        info!(
            width = terrain_config.width,
            depth = terrain_config.depth,
            terrain_seed = terrain_config.seed,
            spawn_seed = config.spawning.seed,
            "simulation ready"
        );

        Ok(Self {
            world,
            spawning: Spawning::new(config.spawning()),
            movement: Movement::new(config.movement()),
            combat: Combat::new(),
            publisher: Publisher::new(config.publishing()),
            bus: EventBus::new(),
            projectiles: config.projectiles.clone(),
            pending,
            frame: 0,
        })
    }

    /// Advances the session by `dt` using the player position and the
    /// collisions reported by the physics collaborator since the last frame.
    pub fn frame(
        &mut self,
        dt: Duration,
        player_position: Vec3,
        collisions: &[CollisionEvent],
    ) -> FrameReport {
        let mut events = std::mem::take(&mut self.pending);
        let mut commands = vec![Command::SetPlayerPosition {
            position: player_position,
        }];

        self.spawning
            .handle(player_position, query::terrain(&self.world), &mut commands);
        apply_all(&mut self.world, commands.drain(..), &mut events);

        let mut hit_events = Vec::new();
        self.combat.handle(collisions, &mut commands);
        apply_all(&mut self.world, commands.drain(..), &mut hit_events);
        self.combat.observe(&hit_events);
        events.append(&mut hit_events);

        let mut tick_events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut tick_events);
        self.movement.handle(
            &tick_events,
            query::clock(&self.world),
            player_position,
            &query::plan_snapshots(&self.world),
            query::terrain(&self.world),
            &mut commands,
        );
        events.append(&mut tick_events);
        apply_all(&mut self.world, commands.drain(..), &mut events);

        let world = &self.world;
        let view_refreshed = self
            .publisher
            .handle(&events, || query::agent_view(world));

        self.bus.publish(&events);

        let report = FrameReport {
            frame: self.frame,
            events,
            view_refreshed,
            player_health: query::player(&self.world).health(),
        };
        debug!(
            frame = report.frame,
            events = report.events.len(),
            agents = query::agent_count(&self.world),
            "frame complete"
        );
        self.frame = self.frame.saturating_add(1);
        report
    }

    /// Launches a projectile from `origin` along `direction` using the
    /// configured speed, radius, lifetime and color.
    ///
    /// Returns `None` when `direction` has no usable length. The resulting
    /// events are reported with the next frame.
    pub fn fire(&mut self, origin: Vec3, direction: Vec3) -> Option<ProjectileId> {
        let direction = direction.try_normalize()?;
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::FireProjectile {
                position: origin,
                velocity: direction * self.projectiles.speed,
                color: self.projectiles.color(),
                radius: self.projectiles.radius,
                lifetime: self.projectiles.lifetime(),
            },
            &mut events,
        );
        let fired = events.iter().find_map(|event| match event {
            Event::ProjectileFired { projectile, .. } => Some(*projectile),
            _ => None,
        });
        self.pending.append(&mut events);
        fired
    }

    /// Most recently published agent view.
    #[must_use]
    pub fn agent_view(&self) -> &AgentView {
        self.publisher.view()
    }

    /// Active projectiles.
    #[must_use]
    pub fn projectile_view(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Position and health of the player.
    #[must_use]
    pub fn player(&self) -> PlayerVitals {
        query::player(&self.world)
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Event bus used to observe the session.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Cumulative counters for the session so far.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            frames: self.frame,
            seeded_chunks: self.spawning.seen_chunks(),
            plans: self.movement.plans(),
            hits: self.combat.hits(),
            kills: self.combat.kills(),
            view_revision: self.publisher.revision(),
        }
    }
}

fn apply_all(
    world: &mut World,
    commands: impl IntoIterator<Item = Command>,
    out_events: &mut Vec<Event>,
) {
    for command in commands {
        world::apply(world, command, out_events);
    }
}
