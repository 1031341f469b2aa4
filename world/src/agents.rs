//! Authoritative agent registry and per-agent steering.

use std::{collections::BTreeMap, time::Duration};

use dreamplaza_core::{AgentId, AgentPlanSnapshot, AgentSnapshot, HitPoints};
use glam::Vec3;

/// Steering parameters shared by every agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Steering {
    /// Distance at which a waypoint counts as reached.
    pub(crate) arrival_distance: f32,
    /// Fraction of an agent's speed used when chasing without a route.
    pub(crate) chase_fraction: f32,
}

/// Mutable state of a single agent.
#[derive(Clone, Debug)]
pub(crate) struct Agent {
    pub(crate) id: AgentId,
    pub(crate) position: Vec3,
    pub(crate) speed: f32,
    route: Option<Vec<Vec3>>,
    cursor: usize,
    pub(crate) alive: bool,
    planned_at: Option<Duration>,
    pub(crate) hit_points: HitPoints,
}

impl Agent {
    fn new(id: AgentId, position: Vec3, speed: f32, hit_points: HitPoints) -> Self {
        Self {
            id,
            position,
            speed,
            route: None,
            cursor: 0,
            alive: true,
            planned_at: None,
            hit_points,
        }
    }

    /// Installs a freshly planned route, or clears it, stamping the plan time.
    pub(crate) fn assign_route(&mut self, route: Option<Vec<Vec3>>, now: Duration) {
        self.route = route;
        self.cursor = 0;
        self.planned_at = Some(now);
    }

    /// Moves the agent for `dt` seconds along its route or toward `player`.
    pub(crate) fn advance(&mut self, dt: f32, player: Vec3, steering: Steering) {
        let step = self.speed * dt;
        if step.is_nan() || step <= 0.0 {
            return;
        }

        if let Some(waypoint) = self.current_waypoint() {
            let offset = waypoint - self.position;
            let distance = offset.length();
            if distance > f32::EPSILON {
                self.position += offset / distance * step.min(distance);
            }
            if self.position.distance(waypoint) < steering.arrival_distance {
                self.cursor += 1;
            }
            return;
        }

        let mut offset = player - self.position;
        offset.y = 0.0;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        let travel = (step * steering.chase_fraction).min(distance);
        self.position += offset / distance * travel;
    }

    /// Removes a single hit point, marking the agent dead when none remain.
    ///
    /// Returns the remaining pool, or `None` when the agent was already dead.
    pub(crate) fn take_hit(&mut self) -> Option<HitPoints> {
        if !self.alive {
            return None;
        }
        self.hit_points = self.hit_points.decremented();
        if self.hit_points.is_depleted() {
            self.alive = false;
        }
        Some(self.hit_points)
    }

    fn current_waypoint(&self) -> Option<Vec3> {
        self.route
            .as_ref()
            .and_then(|route| route.get(self.cursor).copied())
    }

    pub(crate) fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            position: self.position,
            hit_points: self.hit_points,
        }
    }

    pub(crate) fn plan_snapshot(&self) -> AgentPlanSnapshot {
        AgentPlanSnapshot {
            id: self.id,
            position: self.position,
            speed: self.speed,
            has_route: self.route.is_some(),
            planned_at: self.planned_at,
        }
    }
}

/// Registry that stores agents and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct AgentRegistry {
    entries: BTreeMap<AgentId, Agent>,
    next_agent_id: AgentId,
}

impl AgentRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_agent_id: AgentId::new(0),
        }
    }

    /// Inserts a new live agent and returns its freshly allocated identifier.
    pub(crate) fn spawn(&mut self, position: Vec3, speed: f32, hit_points: HitPoints) -> AgentId {
        let id = self.next_agent_id;
        self.next_agent_id = AgentId::new(id.get().saturating_add(1));
        let _ = self
            .entries
            .insert(id, Agent::new(id, position, speed, hit_points));
        id
    }

    pub(crate) fn get(&self, id: AgentId) -> Option<&Agent> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.entries.get_mut(&id)
    }

    /// Iterates over live agents in identifier order.
    pub(crate) fn iter_alive(&self) -> impl Iterator<Item = &Agent> {
        self.entries.values().filter(|agent| agent.alive)
    }

    /// Iterates mutably over live agents in identifier order.
    pub(crate) fn iter_alive_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.entries.values_mut().filter(|agent| agent.alive)
    }

    /// Drops every dead agent, returning how many were removed.
    pub(crate) fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, agent| agent.alive);
        before - self.entries.len()
    }

    /// Number of agents held, including dead agents awaiting the next sweep.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
