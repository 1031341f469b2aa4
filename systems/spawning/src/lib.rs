#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Chunk-driven spawning system that populates the plaza around the player.

use std::collections::BTreeSet;

use dreamplaza_core::{ChunkKey, Command, HitPoints};
use dreamplaza_world::{grid::TerrainGrid, navigation::WalkableSet};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    chunk_size: f32,
    walkable_threshold: f32,
    rng_seed: u64,
    agents_per_chunk: (u32, u32),
    speed: (f32, f32),
    hit_points: (u32, u32),
}

impl Config {
    /// Creates a configuration with the default population ranges: one to three
    /// agents per chunk, speeds in `1.5..3.0` and two to four hit points.
    #[must_use]
    pub const fn new(chunk_size: f32, walkable_threshold: f32, rng_seed: u64) -> Self {
        Self {
            chunk_size,
            walkable_threshold,
            rng_seed,
            agents_per_chunk: (1, 3),
            speed: (1.5, 3.0),
            hit_points: (2, 4),
        }
    }

    /// Overrides the inclusive range of agents seeded per chunk.
    #[must_use]
    pub const fn with_agents_per_chunk(mut self, min: u32, max: u32) -> Self {
        self.agents_per_chunk = (min, max);
        self
    }

    /// Overrides the half-open range agent speeds are drawn from.
    #[must_use]
    pub const fn with_speed(mut self, min: f32, max: f32) -> Self {
        self.speed = (min, max);
        self
    }

    /// Overrides the inclusive range of starting hit points.
    #[must_use]
    pub const fn with_hit_points(mut self, min: u32, max: u32) -> Self {
        self.hit_points = (min, max);
        self
    }
}

/// Pure system that seeds each chunk near the player exactly once.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    rng: ChaCha8Rng,
    seen: BTreeSet<ChunkKey>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            seen: BTreeSet::new(),
        }
    }

    /// Emits spawn commands for every unseen chunk around the player.
    ///
    /// The player's chunk and its eight neighbors are visited in row-major
    /// order. Each unseen chunk is marked seen before it is populated, so a
    /// chunk without walkable terrain, or lying entirely off the terrain,
    /// stays empty for the rest of the session.
    pub fn handle(&mut self, player_position: Vec3, terrain: &TerrainGrid, out: &mut Vec<Command>) {
        let centre = ChunkKey::containing(player_position, self.config.chunk_size);
        let mut walkable = None;

        for chunk in centre.neighborhood() {
            if !self.seen.insert(chunk) {
                continue;
            }
            if !overlaps_terrain(chunk, self.config.chunk_size, terrain) {
                debug!(chunk_x = chunk.x(), chunk_z = chunk.z(), "chunk lies off the terrain");
                continue;
            }
            let walkable = walkable.get_or_insert_with(|| {
                WalkableSet::from_heights(terrain.heights(), self.config.walkable_threshold)
            });
            let before = out.len();
            self.populate(chunk, terrain, walkable, out);
            debug!(
                chunk_x = chunk.x(),
                chunk_z = chunk.z(),
                spawned = out.len() - before,
                "seeded chunk"
            );
        }
    }

    /// Number of chunks that have already been seeded.
    #[must_use]
    pub fn seen_chunks(&self) -> usize {
        self.seen.len()
    }

    fn populate(
        &mut self,
        chunk: ChunkKey,
        terrain: &TerrainGrid,
        walkable: &WalkableSet,
        out: &mut Vec<Command>,
    ) {
        let (min_count, max_count) = self.config.agents_per_chunk;
        let count = draw_u32(&mut self.rng, min_count, max_count);
        let chunk_size = self.config.chunk_size;

        for _ in 0..count {
            let x = (chunk.x() as f32 + self.rng.gen::<f32>()) * chunk_size;
            let z = (chunk.z() as f32 + self.rng.gen::<f32>()) * chunk_size;
            let (min_speed, max_speed) = self.config.speed;
            let speed = draw_f32(&mut self.rng, min_speed, max_speed);
            let (min_hp, max_hp) = self.config.hit_points;
            let hit_points = draw_u32(&mut self.rng, min_hp, max_hp);

            let origin = terrain.world_to_grid(x, z);
            let Some(cell) = walkable.nearest_walkable(origin, terrain.width(), terrain.depth())
            else {
                return;
            };
            out.push(Command::SpawnAgent {
                position: terrain.grid_to_world(cell),
                speed,
                hit_points: HitPoints::new(hit_points),
            });
        }
    }
}

fn overlaps_terrain(chunk: ChunkKey, chunk_size: f32, terrain: &TerrainGrid) -> bool {
    let span = |index: i32, cells: u32| {
        let half_extent = cells as f32 * terrain.cell_size() / 2.0;
        let start = index as f32 * chunk_size;
        start < half_extent && start + chunk_size > -half_extent
    };
    span(chunk.x(), terrain.width()) && span(chunk.z(), terrain.depth())
}

fn draw_u32(rng: &mut ChaCha8Rng, min: u32, max: u32) -> u32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

fn draw_f32(rng: &mut ChaCha8Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}
