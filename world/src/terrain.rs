//! Procedural heightmap generation for the plaza terrain.

use rand::Rng;

/// Generates a smooth heightmap centred around zero elevation.
///
/// Each sample blends a low-frequency sine ridge along x and cosine swell along
/// z with a small random jitter, scaled by `height_scale`. The map is then
/// softened with two 3x3 box-blur passes and shifted so that the midpoint of
/// its range sits at zero. Samples are returned row-major (`x + z * width`).
pub fn generate_heights<R>(width: u32, depth: u32, height_scale: f32, rng: &mut R) -> Vec<f32>
where
    R: Rng,
{
    let (Ok(width), Ok(depth)) = (usize::try_from(width), usize::try_from(depth)) else {
        return Vec::new();
    };
    let Some(cell_count) = width.checked_mul(depth) else {
        return Vec::new();
    };
    if cell_count == 0 {
        return Vec::new();
    }

    let mut heights = Vec::with_capacity(cell_count);
    for z in 0..depth {
        for x in 0..width {
            let nx = x as f32 / width as f32 - 0.5;
            let nz = z as f32 / depth as f32 - 0.5;
            let jitter = (rng.gen::<f32>() - 0.5) * 0.12;
            let base = (nx * 6.0).sin() * 0.4 + (nz * 4.0).cos() * 0.35 + jitter;
            heights.push(base * height_scale);
        }
    }

    let heights = box_blur(&box_blur(&heights, width, depth), width, depth);
    recentre(heights)
}

fn box_blur(source: &[f32], width: usize, depth: usize) -> Vec<f32> {
    let mut blurred = Vec::with_capacity(source.len());
    for z in 0..depth {
        for x in 0..width {
            let mut sum = 0.0;
            let mut samples = 0u32;
            for nz in z.saturating_sub(1)..=(z + 1).min(depth - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                    sum += source[nx + nz * width];
                    samples += 1;
                }
            }
            blurred.push(sum / samples as f32);
        }
    }
    blurred
}

fn recentre(mut heights: Vec<f32>) -> Vec<f32> {
    let (min, max) = heights
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), height| {
            (min.min(*height), max.max(*height))
        });
    if !min.is_finite() || !max.is_finite() {
        return heights;
    }
    let mid = (min + max) / 2.0;
    for height in &mut heights {
        *height -= mid;
    }
    heights
}
