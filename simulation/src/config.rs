//! Session configuration loaded from TOML.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use dreamplaza_core::ProjectileColor;
use dreamplaza_system_movement::Config as MovementConfig;
use dreamplaza_system_publishing::Config as PublishingConfig;
use dreamplaza_system_spawning::Config as SpawningConfig;
use serde::Deserialize;
use thiserror::Error;

/// Largest heightmap, in cells, a session may generate.
pub const MAX_TERRAIN_CELLS: u64 = 1 << 22;

/// Errors raised while loading or validating a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration at {}", .path.display())]
    Read {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration is not valid TOML or does not match the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed correctly but lies outside its accepted range.
    #[error("invalid configuration: {field} {reason}")]
    Invalid {
        /// Dotted path of the offending key.
        field: &'static str,
        /// Constraint that was violated.
        reason: &'static str,
    },
}

/// Complete tuning of a simulation session.
///
/// Every section and key is optional; omitted values fall back to the
/// defaults documented on each field.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Heightmap generation and walkability.
    pub terrain: TerrainConfig,
    /// Agent contact and steering behavior.
    pub agents: AgentConfig,
    /// Chunk seeding.
    pub spawning: SpawningSection,
    /// Agent view publication.
    pub publishing: PublishingSection,
    /// Projectile defaults used by `Simulation::fire`.
    pub projectiles: ProjectileConfig,
    /// Player vitals.
    pub player: PlayerConfig,
}

/// `[terrain]` section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerrainConfig {
    /// Cells along x. Defaults to 96.
    pub width: u32,
    /// Cells along z. Defaults to 96.
    pub depth: u32,
    /// Side length of a cell. Defaults to 1.0.
    pub cell_size: f32,
    /// Amplitude applied to the generated heightmap. Defaults to 3.6.
    pub height_scale: f32,
    /// Cells strictly below this height are walkable. Defaults to 1.2.
    pub walkable_below: f32,
    /// Seed for heightmap jitter.
    pub seed: u64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 96,
            depth: 96,
            cell_size: 1.0,
            height_scale: 3.6,
            walkable_below: 1.2,
            seed: 0x5eed_0fd4_e4,
        }
    }
}

/// `[agents]` section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Planar distance at which an agent strikes the player. Defaults to 1.0.
    pub contact_distance: f32,
    /// Health removed per strike. Defaults to 10.
    pub contact_damage: u32,
    /// Planar distance within which agents plan and move. Defaults to 40.0.
    pub engagement_radius: f32,
    /// Minimum age of a route before it is re-planned. Defaults to 500 ms.
    pub replan_interval_ms: u64,
    /// Distance at which a waypoint counts as reached. Defaults to 0.3.
    pub arrival_distance: f32,
    /// Fraction of speed used when chasing without a route. Defaults to 0.6.
    pub chase_fraction: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            contact_distance: 1.0,
            contact_damage: 10,
            engagement_radius: 40.0,
            replan_interval_ms: 500,
            arrival_distance: 0.3,
            chase_fraction: 0.6,
        }
    }
}

/// `[spawning]` section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawningSection {
    /// Side length of a spawn chunk. Defaults to 16.0.
    pub chunk_size: f32,
    /// Inclusive `[min, max]` agents per chunk. Defaults to `[1, 3]`.
    pub agents_per_chunk: [u32; 2],
    /// Half-open `[min, max)` agent speed. Defaults to `[1.5, 3.0]`.
    pub speed: [f32; 2],
    /// Inclusive `[min, max]` starting hit points. Defaults to `[2, 4]`.
    pub hit_points: [u32; 2],
    /// Seed for spawn placement and attributes.
    pub seed: u64,
}

impl Default for SpawningSection {
    fn default() -> Self {
        Self {
            chunk_size: 16.0,
            agents_per_chunk: [1, 3],
            speed: [1.5, 3.0],
            hit_points: [2, 4],
            seed: 0x00c0_ffee,
        }
    }
}

/// `[publishing]` section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishingSection {
    /// Minimum simulated time between agent view refreshes. Defaults to 200 ms.
    pub interval_ms: u64,
}

impl Default for PublishingSection {
    fn default() -> Self {
        Self { interval_ms: 200 }
    }
}

/// `[projectiles]` section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectileConfig {
    /// Launch speed. Defaults to 18.0.
    pub speed: f32,
    /// Collision radius. Defaults to 0.18.
    pub radius: f32,
    /// Lifetime before expiry. Defaults to 1800 ms.
    pub lifetime_ms: u64,
    /// RGB color. Defaults to `[102, 255, 255]`.
    pub color: [u8; 3],
}

impl ProjectileConfig {
    pub(crate) fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    pub(crate) fn color(&self) -> ProjectileColor {
        let [red, green, blue] = self.color;
        ProjectileColor::from_rgb(red, green, blue)
    }
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 18.0,
            radius: 0.18,
            lifetime_ms: 1800,
            color: [0x66, 0xff, 0xff],
        }
    }
}

/// `[player]` section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Starting and maximum health. Defaults to 100.
    pub max_health: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { max_health: 100 }
    }
}

impl SimulationConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks that every value lies inside its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let terrain = &self.terrain;
        ensure(terrain.width > 0, "terrain.width", "must be positive")?;
        ensure(terrain.depth > 0, "terrain.depth", "must be positive")?;
        ensure(
            u64::from(terrain.width) * u64::from(terrain.depth) <= MAX_TERRAIN_CELLS,
            "terrain.width",
            "times terrain.depth exceeds the cell limit",
        )?;
        ensure(positive(terrain.cell_size), "terrain.cell_size", "must be positive")?;
        ensure(
            terrain.height_scale.is_finite(),
            "terrain.height_scale",
            "must be finite",
        )?;
        ensure(
            terrain.walkable_below.is_finite(),
            "terrain.walkable_below",
            "must be finite",
        )?;

        let agents = &self.agents;
        ensure(
            agents.contact_distance.is_finite() && agents.contact_distance >= 0.0,
            "agents.contact_distance",
            "must be zero or positive",
        )?;
        ensure(
            positive(agents.engagement_radius),
            "agents.engagement_radius",
            "must be positive",
        )?;
        ensure(
            positive(agents.arrival_distance),
            "agents.arrival_distance",
            "must be positive",
        )?;
        ensure(
            (0.0..=1.0).contains(&agents.chase_fraction),
            "agents.chase_fraction",
            "must lie between 0 and 1",
        )?;

        let spawning = &self.spawning;
        ensure(
            positive(spawning.chunk_size),
            "spawning.chunk_size",
            "must be positive",
        )?;
        let [min_agents, max_agents] = spawning.agents_per_chunk;
        ensure(
            min_agents <= max_agents,
            "spawning.agents_per_chunk",
            "minimum exceeds maximum",
        )?;
        let [min_speed, max_speed] = spawning.speed;
        ensure(
            positive(min_speed) && max_speed.is_finite() && min_speed <= max_speed,
            "spawning.speed",
            "must be an ascending positive range",
        )?;
        let [min_hp, max_hp] = spawning.hit_points;
        ensure(
            min_hp > 0 && min_hp <= max_hp,
            "spawning.hit_points",
            "must be an ascending range starting at one or more",
        )?;

        let projectiles = &self.projectiles;
        ensure(
            positive(projectiles.speed),
            "projectiles.speed",
            "must be positive",
        )?;
        ensure(
            positive(projectiles.radius),
            "projectiles.radius",
            "must be positive",
        )?;
        ensure(
            projectiles.lifetime_ms > 0,
            "projectiles.lifetime_ms",
            "must be positive",
        )?;

        ensure(
            self.player.max_health > 0,
            "player.max_health",
            "must be positive",
        )
    }

    /// Movement system configuration derived from the `[agents]` and
    /// `[terrain]` sections.
    #[must_use]
    pub fn movement(&self) -> MovementConfig {
        MovementConfig::new(
            self.agents.engagement_radius,
            Duration::from_millis(self.agents.replan_interval_ms),
            self.terrain.walkable_below,
        )
    }

    /// Spawning system configuration derived from the `[spawning]` section.
    #[must_use]
    pub fn spawning(&self) -> SpawningConfig {
        let spawning = &self.spawning;
        SpawningConfig::new(
            spawning.chunk_size,
            self.terrain.walkable_below,
            spawning.seed,
        )
        .with_agents_per_chunk(spawning.agents_per_chunk[0], spawning.agents_per_chunk[1])
        .with_speed(spawning.speed[0], spawning.speed[1])
        .with_hit_points(spawning.hit_points[0], spawning.hit_points[1])
    }

    /// Publisher configuration derived from the `[publishing]` section.
    #[must_use]
    pub fn publishing(&self) -> PublishingConfig {
        PublishingConfig::new(Duration::from_millis(self.publishing.interval_ms))
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn ensure(condition: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SimulationConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.terrain.width, 96);
        assert_eq!(config.agents.replan_interval_ms, 500);
        assert_eq!(config.projectiles.color(), ProjectileColor::from_rgb(0x66, 0xff, 0xff));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [terrain]
            width = 48
            seed = 7

            [spawning]
            agents_per_chunk = [2, 2]
            "#,
        )
        .expect("partial config is valid");

        assert_eq!(config.terrain.width, 48);
        assert_eq!(config.terrain.depth, 96);
        assert_eq!(config.terrain.seed, 7);
        assert_eq!(config.spawning.agents_per_chunk, [2, 2]);
        assert_eq!(config.spawning.hit_points, [2, 4]);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let error = SimulationConfig::from_toml_str("[spawning]\nhit_points = [0, 3]\n")
            .expect_err("zero hit points are invalid");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "spawning.hit_points",
                ..
            }
        ));

        let error = SimulationConfig::from_toml_str("[agents]\nchase_fraction = 1.5\n")
            .expect_err("chase fraction above one is invalid");
        assert_eq!(
            error.to_string(),
            "invalid configuration: agents.chase_fraction must lie between 0 and 1"
        );
    }

    #[test]
    fn oversized_terrain_is_rejected() {
        let error = SimulationConfig::from_toml_str("[terrain]\nwidth = 100000\ndepth = 100000\n")
            .expect_err("terrain above the cell limit is invalid");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "terrain.width",
                ..
            }
        ));

        let mut config = SimulationConfig::default();
        config.terrain.width = 2048;
        config.terrain.depth = 2048;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let error = SimulationConfig::from_toml_str("[terrain]\nwidht = 12\n")
            .expect_err("typos are reported");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = SimulationConfig::from_path("does/not/exist.toml")
            .expect_err("missing file is an error");
        assert!(error.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn derived_system_configs_follow_sections() {
        let mut config = SimulationConfig::default();
        config.agents.replan_interval_ms = 750;
        config.publishing.interval_ms = 50;

        assert_eq!(
            config.movement(),
            MovementConfig::new(40.0, Duration::from_millis(750), 1.2)
        );
        assert_eq!(
            config.publishing(),
            PublishingConfig::new(Duration::from_millis(50))
        );
        assert_eq!(
            config.spawning(),
            SpawningConfig::new(16.0, 1.2, 0x00c0_ffee)
        );
    }
}
