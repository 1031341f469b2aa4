//! Walkability derivation and grid A* search.

use dreamplaza_core::CellCoord;

/// Dense set of cells an agent may occupy.
///
/// The set is derived from terrain heights on demand and carries no state
/// between planning passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkableSet {
    cells: Vec<bool>,
    count: usize,
}

impl WalkableSet {
    /// Marks every cell whose height lies strictly below `threshold`.
    #[must_use]
    pub fn from_heights(heights: &[f32], threshold: f32) -> Self {
        Self::from_cells(heights.iter().map(|height| *height < threshold).collect())
    }

    /// Wraps an explicit per-cell walkability mask.
    #[must_use]
    pub fn from_cells(cells: Vec<bool>) -> Self {
        let count = cells.iter().filter(|walkable| **walkable).count();
        Self { cells, count }
    }

    /// Reports whether the cell at the flattened index is walkable.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    /// Number of walkable cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Reports whether no cell is walkable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Finds the walkable cell closest to `origin` by Chebyshev ring.
    ///
    /// Rings are scanned row-major, so among equally distant candidates the
    /// one with the lowest z, then lowest x, wins.
    #[must_use]
    pub fn nearest_walkable(&self, origin: CellCoord, width: u32, depth: u32) -> Option<CellCoord> {
        if width == 0 || depth == 0 || self.is_empty() {
            return None;
        }

        let width_i = i64::from(width);
        let depth_i = i64::from(depth);
        let origin_x = i64::from(origin.x()).min(width_i - 1);
        let origin_z = i64::from(origin.z()).min(depth_i - 1);
        let max_radius = width_i.max(depth_i);

        for radius in 0..=max_radius {
            for z in (origin_z - radius)..=(origin_z + radius) {
                if z < 0 || z >= depth_i {
                    continue;
                }
                for x in (origin_x - radius)..=(origin_x + radius) {
                    if x < 0 || x >= width_i {
                        continue;
                    }
                    let on_ring = (x - origin_x).abs() == radius || (z - origin_z).abs() == radius;
                    if !on_ring {
                        continue;
                    }
                    let index = usize::try_from(z * width_i + x).ok()?;
                    if self.contains(index) {
                        return Some(CellCoord::new(x as u32, z as u32));
                    }
                }
            }
        }

        None
    }
}

/// Four-connected neighbors of a flattened cell index.
///
/// Yields left, right, up (decreasing z), then down (increasing z), skipping
/// neighbors that fall outside the grid.
#[must_use]
pub fn neighbors_4(index: usize, width: u32, depth: u32) -> Neighbors {
    let mut neighbors = Neighbors::default();
    let (Ok(width), Ok(depth)) = (usize::try_from(width), usize::try_from(depth)) else {
        return neighbors;
    };
    if width == 0 || index >= width.saturating_mul(depth) {
        return neighbors;
    }

    let x = index % width;
    let z = index / width;
    if x > 0 {
        neighbors.push(index - 1);
    }
    if x + 1 < width {
        neighbors.push(index + 1);
    }
    if z > 0 {
        neighbors.push(index - width);
    }
    if z + 1 < depth {
        neighbors.push(index + width);
    }
    neighbors
}

/// Fixed-capacity iterator over up to four neighbor indices.
#[derive(Clone, Debug, Default)]
pub struct Neighbors {
    buffer: [usize; 4],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn push(&mut self, index: usize) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = index;
            self.len += 1;
        }
    }
}

impl Iterator for Neighbors {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }
        let value = self.buffer[self.cursor];
        self.cursor += 1;
        Some(value)
    }
}

/// Computes a shortest 4-connected path from `start` to `goal`.
///
/// Uses a Manhattan heuristic with unit edge costs. The frontier keeps
/// insertion order and is scanned linearly; the first node holding the
/// strictly lowest f-score is expanded, which keeps output paths deterministic.
/// The start cell is expanded even when it is not walkable, every other cell
/// must be in `walkable`. Returns the cells from start to goal inclusive, or
/// `None` when the goal cannot be reached.
///
/// Each expansion costs a scan of the whole frontier, which is fine for the
/// small search areas agents plan over but grows quadratically with grid size.
pub fn find_path<F, I>(
    start: CellCoord,
    goal: CellCoord,
    width: u32,
    depth: u32,
    walkable: &WalkableSet,
    mut neighbors: F,
) -> Option<Vec<CellCoord>>
where
    F: FnMut(usize, u32, u32) -> I,
    I: IntoIterator<Item = usize>,
{
    let width_usize = usize::try_from(width).ok()?;
    let depth_usize = usize::try_from(depth).ok()?;
    let cell_count = width_usize.checked_mul(depth_usize)?;
    if cell_count == 0 {
        return None;
    }
    if start.x() >= width || start.z() >= depth || goal.x() >= width || goal.z() >= depth {
        return None;
    }

    let start_index = index(width_usize, start)?;
    let goal_index = index(width_usize, goal)?;
    let heuristic = |node: usize| -> u32 {
        let x = (node % width_usize) as u32;
        let z = (node / width_usize) as u32;
        x.abs_diff(goal.x()) + z.abs_diff(goal.z())
    };

    let mut g_score = vec![u32::MAX; cell_count];
    let mut f_score = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<usize>> = vec![None; cell_count];
    let mut in_open = vec![false; cell_count];
    let mut open: Vec<usize> = vec![start_index];

    g_score[start_index] = 0;
    f_score[start_index] = heuristic(start_index);
    in_open[start_index] = true;

    while !open.is_empty() {
        let mut best: Option<(usize, u32)> = None;
        for (slot, node) in open.iter().enumerate() {
            let score = f_score[*node];
            if best.map_or(true, |(_, best_score)| score < best_score) {
                best = Some((slot, score));
            }
        }
        let Some((slot, _)) = best else {
            break;
        };

        let current = open.remove(slot);
        in_open[current] = false;

        if current == goal_index {
            return Some(reconstruct(&came_from, current, width_usize));
        }

        let tentative = g_score[current].saturating_add(1);
        for neighbor in neighbors(current, width, depth) {
            if neighbor >= cell_count || !walkable.contains(neighbor) {
                continue;
            }
            if tentative < g_score[neighbor] {
                came_from[neighbor] = Some(current);
                g_score[neighbor] = tentative;
                f_score[neighbor] = tentative.saturating_add(heuristic(neighbor));
                if !in_open[neighbor] {
                    in_open[neighbor] = true;
                    open.push(neighbor);
                }
            }
        }
    }

    None
}

fn reconstruct(came_from: &[Option<usize>], goal: usize, width: usize) -> Vec<CellCoord> {
    let mut path = Vec::new();
    let mut cursor = Some(goal);
    while let Some(node) = cursor {
        path.push(CellCoord::new((node % width) as u32, (node / width) as u32));
        cursor = came_from[node];
    }
    path.reverse();
    path
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let x = usize::try_from(cell.x()).ok()?;
    let z = usize::try_from(cell.z()).ok()?;
    z.checked_mul(width)?.checked_add(x)
}
