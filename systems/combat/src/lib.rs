#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns physics collisions into hit resolution commands.

use std::collections::BTreeSet;

use dreamplaza_core::{CollisionEvent, Command, Event, ProjectileId};
use tracing::trace;

/// Combat system that filters collisions and tallies their outcome.
#[derive(Debug, Default)]
pub struct Combat {
    forwarded: BTreeSet<ProjectileId>,
    hits: u64,
    kills: u64,
}

impl Combat {
    /// Creates a new combat system with empty tallies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::ResolveHit` for collisions between projectiles and agents.
    ///
    /// Collisions with untagged bodies or without an agent identifier are
    /// dropped, and each projectile is forwarded at most once per batch.
    pub fn handle(&mut self, collisions: &[CollisionEvent], out: &mut Vec<Command>) {
        self.forwarded.clear();

        for collision in collisions {
            let Some(agent) = collision.agent.filter(|_| collision.other_is_agent) else {
                trace!(
                    projectile = collision.projectile.get(),
                    other = collision.other_entity,
                    "ignoring non-agent collision"
                );
                continue;
            };
            if !self.forwarded.insert(collision.projectile) {
                continue;
            }
            out.push(Command::ResolveHit {
                agent,
                projectile: collision.projectile,
            });
        }
    }

    /// Updates the hit and kill tallies from world events.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::AgentHit { .. } => self.hits = self.hits.saturating_add(1),
                Event::AgentKilled { .. } => self.kills = self.kills.saturating_add(1),
                _ => {}
            }
        }
    }

    /// Total hits landed on live agents.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Total agents killed by projectiles.
    #[must_use]
    pub fn kills(&self) -> u64 {
        self.kills
    }
}
