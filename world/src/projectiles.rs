//! Active projectile bookkeeping.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use dreamplaza_core::{Event, ProjectileColor, ProjectileId, ProjectileSnapshot};
use glam::Vec3;

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) color: ProjectileColor,
    pub(crate) radius: f32,
    pub(crate) lifetime: Duration,
    pub(crate) age: Duration,
}

impl Projectile {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            color: self.color,
            radius: self.radius,
            remaining: self.lifetime.saturating_sub(self.age),
        }
    }
}

/// Registry of projectiles fired by the world, plus the identifiers of every
/// projectile that has already delivered its hit or expired.
///
/// Projectiles owned by the caller never enter `entries`; their identifiers
/// only land in `retired` once they deliver a hit. The retired set lives for
/// the whole session and grows with every projectile.
#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, Projectile>,
    retired: BTreeSet<ProjectileId>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            retired: BTreeSet::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn fire(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        color: ProjectileColor,
        radius: f32,
        lifetime: Duration,
    ) -> ProjectileId {
        let mut id = self.next_projectile_id;
        while self.retired.contains(&id) || self.entries.contains_key(&id) {
            id = ProjectileId::new(id.get().saturating_add(1));
        }
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            Projectile {
                id,
                position,
                velocity,
                color,
                radius,
                lifetime,
                age: Duration::ZERO,
            },
        );
        id
    }

    /// Retires the projectile so it delivers its single hit.
    ///
    /// Returns `false` when the identifier already delivered a hit or expired.
    /// Identifiers the registry never fired belong to the caller and are
    /// retired on their first hit.
    pub(crate) fn consume(&mut self, id: ProjectileId) -> bool {
        if !self.retired.insert(id) {
            return false;
        }
        let _ = self.entries.remove(&id);
        true
    }

    /// Integrates positions and retires projectiles that outlived their lifetime.
    pub(crate) fn age(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let seconds = dt.as_secs_f32();
        for projectile in self.entries.values_mut() {
            projectile.position += projectile.velocity * seconds;
            projectile.age = projectile.age.saturating_add(dt);
        }

        let expired: Vec<ProjectileId> = self
            .entries
            .values()
            .filter(|projectile| projectile.age >= projectile.lifetime)
            .map(|projectile| projectile.id)
            .collect();
        for projectile in expired {
            let _ = self.entries.remove(&projectile);
            let _ = self.retired.insert(projectile);
            out_events.push(Event::ProjectileExpired { projectile });
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYAN: ProjectileColor = ProjectileColor::from_rgb(0x66, 0xff, 0xff);

    #[test]
    fn projectiles_expire_after_lifetime() {
        let mut registry = ProjectileRegistry::new();
        let id = registry.fire(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            CYAN,
            0.18,
            Duration::from_millis(300),
        );
        let mut events = Vec::new();

        registry.age(Duration::from_millis(200), &mut events);
        assert!(events.is_empty());
        let snapshot = registry.iter().next().expect("still active").snapshot();
        assert!((snapshot.position.x - 2.0).abs() < 1e-5);
        assert_eq!(snapshot.remaining, Duration::from_millis(100));

        registry.age(Duration::from_millis(100), &mut events);
        assert_eq!(events, vec![Event::ProjectileExpired { projectile: id }]);
        assert!(!registry.consume(id));
    }

    #[test]
    fn consumed_projectiles_cannot_be_consumed_again() {
        let mut registry = ProjectileRegistry::new();
        let id = registry.fire(Vec3::ZERO, Vec3::ZERO, CYAN, 0.18, Duration::from_secs(1));
        assert!(registry.consume(id));
        assert!(!registry.consume(id));
        assert_eq!(registry.iter().count(), 0);
        let next = registry.fire(Vec3::ZERO, Vec3::ZERO, CYAN, 0.18, Duration::from_secs(1));
        assert_ne!(id, next);
    }

    #[test]
    fn caller_owned_projectiles_hit_once() {
        let mut registry = ProjectileRegistry::new();
        let external = ProjectileId::new(1);
        assert!(registry.consume(external));
        assert!(!registry.consume(external));

        let first = registry.fire(Vec3::ZERO, Vec3::ZERO, CYAN, 0.18, Duration::from_secs(1));
        let second = registry.fire(Vec3::ZERO, Vec3::ZERO, CYAN, 0.18, Duration::from_secs(1));
        assert_eq!(first, ProjectileId::new(0));
        assert_eq!(second, ProjectileId::new(2));
    }
}
