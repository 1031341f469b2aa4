#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dream Plaza simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values that
//! systems and presentation layers react to. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when a session boots.
pub const WELCOME_BANNER: &str = "Welcome to Dream Plaza.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs the terrain heightmap that backs the navigation grid.
    ConfigureTerrain {
        /// Number of cells along the x axis.
        width: u32,
        /// Number of cells along the z axis.
        depth: u32,
        /// Side length of a single square cell in world units.
        cell_size: f32,
        /// Elevation samples indexed by `x + z * width`.
        heights: Vec<f32>,
    },
    /// Updates how agents damage the player on contact.
    ConfigureContact {
        /// Planar distance below which an agent strikes the player.
        distance: f32,
        /// Health removed from the player per strike.
        damage: u32,
    },
    /// Updates how agents steer along routes and toward the player.
    ConfigureSteering {
        /// Distance at which a waypoint counts as reached.
        arrival_distance: f32,
        /// Fraction of the agent's speed used when chasing without a route.
        chase_fraction: f32,
    },
    /// Resets the player's health pool to the provided maximum.
    ConfigurePlayer {
        /// Maximum and starting health of the player.
        max_health: u32,
    },
    /// Records the player's world position reported by the physics collaborator.
    SetPlayerPosition {
        /// Current player position in world space.
        position: Vec3,
    },
    /// Advances the simulation clock, ages projectiles, and resolves contact.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new agent enter the world.
    SpawnAgent {
        /// World position the agent starts at.
        position: Vec3,
        /// Movement speed in world units per second.
        speed: f32,
        /// Starting hit points; zero is rejected.
        hit_points: HitPoints,
    },
    /// Replaces an agent's route, or clears it when `route` is `None`.
    AssignRoute {
        /// Agent receiving the route.
        agent: AgentId,
        /// Ordered world-space waypoints, or `None` when no path exists.
        route: Option<Vec<Vec3>>,
    },
    /// Moves an agent along its route or straight at the player.
    AdvanceAgent {
        /// Agent being moved.
        agent: AgentId,
        /// Duration of simulated time the movement covers.
        dt: Duration,
    },
    /// Launches a projectile into the world.
    FireProjectile {
        /// Launch position.
        position: Vec3,
        /// Initial velocity in world units per second.
        velocity: Vec3,
        /// Appearance of the projectile.
        color: ProjectileColor,
        /// Collision radius reported to the physics collaborator.
        radius: f32,
        /// Time until the projectile expires.
        lifetime: Duration,
    },
    /// Resolves a projectile striking an agent.
    ResolveHit {
        /// Agent reported by the collision.
        agent: AgentId,
        /// Projectile that produced the collision.
        projectile: ProjectileId,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new terrain grid was installed.
    TerrainConfigured {
        /// Number of cells along the x axis.
        width: u32,
        /// Number of cells along the z axis.
        depth: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an agent entered the world.
    AgentSpawned {
        /// Identifier allocated to the agent.
        agent: AgentId,
        /// Position the agent spawned at.
        position: Vec3,
        /// Starting hit points.
        hit_points: HitPoints,
    },
    /// Reports that an agent received a fresh route.
    RouteAssigned {
        /// Agent that was routed.
        agent: AgentId,
        /// Number of waypoints in the route.
        waypoints: usize,
    },
    /// Reports that an agent's route was cleared because no path exists.
    RouteCleared {
        /// Agent whose route was cleared.
        agent: AgentId,
    },
    /// Reports that an agent reached the player and expended itself.
    AgentStruckPlayer {
        /// Agent that made contact.
        agent: AgentId,
    },
    /// Reports that the player lost health.
    PlayerDamaged {
        /// Health removed by the strike.
        amount: u32,
        /// Health left after the strike.
        remaining: u32,
    },
    /// Reports that a projectile damaged an agent.
    AgentHit {
        /// Agent that was hit.
        agent: AgentId,
        /// Hit points left after the hit.
        hit_points: HitPoints,
    },
    /// Reports that an agent ran out of hit points.
    AgentKilled {
        /// Agent that was killed.
        agent: AgentId,
    },
    /// Confirms that a projectile entered the world.
    ProjectileFired {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Launch position.
        position: Vec3,
    },
    /// Reports that a projectile delivered its hit and left the world.
    ProjectileConsumed {
        /// Projectile that was consumed.
        projectile: ProjectileId,
    },
    /// Reports that a projectile outlived its lifetime.
    ProjectileExpired {
        /// Projectile that expired.
        projectile: ProjectileId,
    },
}

impl Event {
    /// Returns the payload-free discriminant of the event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::TerrainConfigured { .. } => EventKind::TerrainConfigured,
            Self::TimeAdvanced { .. } => EventKind::TimeAdvanced,
            Self::AgentSpawned { .. } => EventKind::AgentSpawned,
            Self::RouteAssigned { .. } => EventKind::RouteAssigned,
            Self::RouteCleared { .. } => EventKind::RouteCleared,
            Self::AgentStruckPlayer { .. } => EventKind::AgentStruckPlayer,
            Self::PlayerDamaged { .. } => EventKind::PlayerDamaged,
            Self::AgentHit { .. } => EventKind::AgentHit,
            Self::AgentKilled { .. } => EventKind::AgentKilled,
            Self::ProjectileFired { .. } => EventKind::ProjectileFired,
            Self::ProjectileConsumed { .. } => EventKind::ProjectileConsumed,
            Self::ProjectileExpired { .. } => EventKind::ProjectileExpired,
        }
    }

    /// Reports whether the event removes an agent from play.
    #[must_use]
    pub const fn is_agent_death(&self) -> bool {
        matches!(
            self,
            Self::AgentKilled { .. } | Self::AgentStruckPlayer { .. }
        )
    }
}

/// Payload-free discriminant used to filter [`Event`] subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// See [`Event::TerrainConfigured`].
    TerrainConfigured,
    /// See [`Event::TimeAdvanced`].
    TimeAdvanced,
    /// See [`Event::AgentSpawned`].
    AgentSpawned,
    /// See [`Event::RouteAssigned`].
    RouteAssigned,
    /// See [`Event::RouteCleared`].
    RouteCleared,
    /// See [`Event::AgentStruckPlayer`].
    AgentStruckPlayer,
    /// See [`Event::PlayerDamaged`].
    PlayerDamaged,
    /// See [`Event::AgentHit`].
    AgentHit,
    /// See [`Event::AgentKilled`].
    AgentKilled,
    /// See [`Event::ProjectileFired`].
    ProjectileFired,
    /// See [`Event::ProjectileConsumed`].
    ProjectileConsumed,
    /// See [`Event::ProjectileExpired`].
    ProjectileExpired,
}

/// Collision reported by the physics collaborator for a projectile body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    /// Projectile whose body collided.
    pub projectile: ProjectileId,
    /// Physics handle of the other body.
    pub other_entity: u64,
    /// Whether the other body carries the agent tag.
    pub other_is_agent: bool,
    /// Agent identifier stored on the tagged body, if any.
    pub agent: Option<AgentId>,
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Remaining durability of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HitPoints(u32);

impl HitPoints {
    /// Creates a hit point pool holding the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }

    /// Returns the pool after losing a single point, saturating at zero.
    #[must_use]
    pub const fn decremented(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

/// Location of a single navigation grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    z: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Zero-based index of the cell along the x axis.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based index of the cell along the z axis.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x().abs_diff(other.x()) + self.z().abs_diff(other.z())
    }
}

/// Square region of world space used to batch agent spawning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    x: i32,
    z: i32,
}

impl ChunkKey {
    /// Creates a chunk key from chunk-space coordinates.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Derives the chunk containing the provided world position.
    #[must_use]
    pub fn containing(position: Vec3, chunk_size: f32) -> Self {
        if chunk_size <= 0.0 {
            return Self::new(0, 0);
        }
        Self::new(
            (position.x / chunk_size).floor() as i32,
            (position.z / chunk_size).floor() as i32,
        )
    }

    /// Chunk index along the x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Chunk index along the z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Enumerates this chunk and its eight neighbors in row-major order.
    pub fn neighborhood(self) -> impl Iterator<Item = ChunkKey> {
        (-1..=1).flat_map(move |dz| {
            (-1..=1).map(move |dx| {
                ChunkKey::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
            })
        })
    }
}

/// Visual appearance applied to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl ProjectileColor {
    /// Creates a new projectile color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Immutable representation of a live agent published to consumers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// World position of the agent.
    pub position: Vec3,
    /// Hit points the agent has left.
    pub hit_points: HitPoints,
}

/// Read-only snapshot describing all live agents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Number of agents captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Planning state of a live agent consumed by the movement system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentPlanSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// World position of the agent.
    pub position: Vec3,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Whether the agent currently holds a route.
    pub has_route: bool,
    /// Simulation time of the last planning attempt, if any.
    pub planned_at: Option<Duration>,
}

/// Immutable representation of an active projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Current world position.
    pub position: Vec3,
    /// Current velocity.
    pub velocity: Vec3,
    /// Appearance of the projectile.
    pub color: ProjectileColor,
    /// Collision radius.
    pub radius: f32,
    /// Time left before the projectile expires.
    pub remaining: Duration,
}

/// Read-only snapshot describing all active projectiles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no projectiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Distance between two points measured on the horizontal plane.
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}
