//! Navigation grid laid over the terrain heightmap.

use dreamplaza_core::CellCoord;
use glam::Vec3;

/// Dense terrain grid centred on the world origin.
///
/// The grid spans `width * cell_size` world units along x and
/// `depth * cell_size` along z, with cell `(0, 0)` at the most negative corner.
/// Heights are stored row-major (`x + z * width`) and are never mutated after
/// construction. Samples missing from a short heightmap read as zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainGrid {
    width: u32,
    depth: u32,
    cell_size: f32,
    heights: Vec<f32>,
}

impl TerrainGrid {
    /// Creates a grid from the provided dimensions and heightmap.
    ///
    /// The heightmap is truncated or zero-padded to `width * depth` samples.
    #[must_use]
    pub fn new(width: u32, depth: u32, cell_size: f32, mut heights: Vec<f32>) -> Self {
        let cell_count = cell_count(width, depth);
        heights.resize(cell_count, 0.0);
        Self {
            width,
            depth,
            cell_size,
            heights,
        }
    }

    /// Creates a grid of the provided size with every sample at zero elevation.
    #[must_use]
    pub fn flat(width: u32, depth: u32, cell_size: f32) -> Self {
        Self::new(width, depth, cell_size, Vec::new())
    }

    /// Number of cells along the x axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cells along the z axis.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Side length of a single cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Elevation samples in row-major order.
    #[must_use]
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.heights.len()
    }

    /// Maps a world coordinate to the clamped cell that contains it.
    #[must_use]
    pub fn world_to_grid(&self, x: f32, z: f32) -> CellCoord {
        CellCoord::new(
            axis_to_cell(x, self.width, self.cell_size),
            axis_to_cell(z, self.depth, self.cell_size),
        )
    }

    /// Maps a cell to the world-space point at its center, elevated to the
    /// terrain height.
    #[must_use]
    pub fn grid_to_world(&self, cell: CellCoord) -> Vec3 {
        Vec3::new(
            cell_to_axis(cell.x(), self.width, self.cell_size),
            self.height_at(cell),
            cell_to_axis(cell.z(), self.depth, self.cell_size),
        )
    }

    /// Elevation of the provided cell, or zero outside the grid.
    #[must_use]
    pub fn height_at(&self, cell: CellCoord) -> f32 {
        self.index(cell)
            .and_then(|index| self.heights.get(index).copied())
            .unwrap_or(0.0)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.width && cell.z() < self.depth
    }

    /// Flattened row-major index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let x = usize::try_from(cell.x()).ok()?;
        let z = usize::try_from(cell.z()).ok()?;
        z.checked_mul(width)?.checked_add(x)
    }

    /// Cell addressed by a flattened row-major index.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count() {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let x = u32::try_from(index % width).ok()?;
        let z = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(x, z))
    }
}

fn cell_count(width: u32, depth: u32) -> usize {
    let cells = u64::from(width) * u64::from(depth);
    usize::try_from(cells).unwrap_or(0)
}

fn axis_to_cell(value: f32, count: u32, cell_size: f32) -> u32 {
    if count == 0 || cell_size <= 0.0 {
        return 0;
    }

    let half_extent = count as f32 * cell_size / 2.0;
    let raw = ((value + half_extent) / cell_size).floor();
    let last = count - 1;
    if raw.is_nan() || raw <= 0.0 {
        0
    } else if raw >= last as f32 {
        last
    } else {
        raw as u32
    }
}

fn cell_to_axis(index: u32, count: u32, cell_size: f32) -> f32 {
    let half_extent = count as f32 * cell_size / 2.0;
    (index as f32 + 0.5) * cell_size - half_extent
}
