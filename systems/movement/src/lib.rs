#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure movement system that plans agent routes toward the player and steers
//! them along those routes.

use std::time::Duration;

use dreamplaza_core::{planar_distance, AgentPlanSnapshot, Command, Event};
use dreamplaza_world::{
    grid::TerrainGrid,
    navigation::{find_path, neighbors_4, WalkableSet},
};
use glam::Vec3;
use tracing::debug;

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    engagement_radius: f32,
    replan_interval: Duration,
    walkable_threshold: f32,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// Agents farther than `engagement_radius` from the player stay idle, routed
    /// agents are re-planned once `replan_interval` has elapsed since their last
    /// plan, and cells at or above `walkable_threshold` are impassable.
    #[must_use]
    pub const fn new(
        engagement_radius: f32,
        replan_interval: Duration,
        walkable_threshold: f32,
    ) -> Self {
        Self {
            engagement_radius,
            replan_interval,
            walkable_threshold,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(40.0, Duration::from_millis(500), 1.2)
    }
}

/// Pure system that emits routing and steering commands for engaged agents.
#[derive(Debug, Default)]
pub struct Movement {
    config: Config,
    plans: u64,
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, plans: 0 }
    }

    /// Consumes world events and planning snapshots to emit movement commands.
    ///
    /// Nothing happens unless the batch advanced time. Each engaged agent that
    /// needs a plan receives an `AssignRoute` computed against a freshly
    /// derived walkable set, followed by an `AdvanceAgent` covering the
    /// elapsed time.
    pub fn handle(
        &mut self,
        events: &[Event],
        now: Duration,
        player: Vec3,
        agents: &[AgentPlanSnapshot],
        terrain: &TerrainGrid,
        out: &mut Vec<Command>,
    ) {
        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if elapsed.is_zero() {
            return;
        }

        let mut walkable = None;
        for agent in agents {
            if planar_distance(agent.position, player) > self.config.engagement_radius {
                continue;
            }

            if self.needs_plan(agent, now) {
                let walkable = walkable.get_or_insert_with(|| {
                    WalkableSet::from_heights(terrain.heights(), self.config.walkable_threshold)
                });
                let route = plan_route(agent.position, player, terrain, walkable);
                self.plans = self.plans.saturating_add(1);
                debug!(
                    agent = agent.id.get(),
                    waypoints = route.as_ref().map_or(0, Vec::len),
                    "re-planned route"
                );
                out.push(Command::AssignRoute {
                    agent: agent.id,
                    route,
                });
            }

            out.push(Command::AdvanceAgent {
                agent: agent.id,
                dt: elapsed,
            });
        }
    }

    /// Number of planning attempts performed so far.
    #[must_use]
    pub fn plans(&self) -> u64 {
        self.plans
    }

    fn needs_plan(&self, agent: &AgentPlanSnapshot, now: Duration) -> bool {
        if !agent.has_route {
            return true;
        }
        match agent.planned_at {
            Some(planned_at) => now.saturating_sub(planned_at) > self.config.replan_interval,
            None => true,
        }
    }
}

fn plan_route(
    from: Vec3,
    to: Vec3,
    terrain: &TerrainGrid,
    walkable: &WalkableSet,
) -> Option<Vec<Vec3>> {
    let start = terrain.world_to_grid(from.x, from.z);
    let goal = terrain.world_to_grid(to.x, to.z);
    let cells = find_path(
        start,
        goal,
        terrain.width(),
        terrain.depth(),
        walkable,
        neighbors_4,
    )?;
    Some(
        cells
            .into_iter()
            .map(|cell| terrain.grid_to_world(cell))
            .collect(),
    )
}
