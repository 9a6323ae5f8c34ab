//! Fixed-step ray march over the tile grid.
//!
//! The march only finds a candidate cell; exact distances come from
//! `intersect`. Positional error is bounded by half the step.

use crate::geometry::Vec2;
use crate::world::TileGrid;

/// Step used by the reference scene, in map units.
pub const DEFAULT_STEP: f32 = 0.005;

// hit cell first, then orthogonal, then diagonal neighbours
const NEIGHBOURS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (-1, 0),
    (1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

#[derive(Debug, Clone, PartialEq)]
pub struct MarchHit {
    pub cell: (i32, i32),
    pub material: u8,
    /// Marched distance when the cell was entered (coarse, not exact).
    pub travelled: f32,
    candidates: [(i32, i32); 9],
    len: usize,
}

impl MarchHit {
    fn new(grid: &TileGrid, cell: (i32, i32), material: u8, travelled: f32) -> Self {
        let mut candidates = [cell; 9];
        let mut len = 1;
        for (dx, dy) in NEIGHBOURS {
            let n = (cell.0 + dx, cell.1 + dy);
            if grid.is_wall(n.0, n.1) {
                candidates[len] = n;
                len += 1;
            }
        }
        Self {
            cell,
            material,
            travelled,
            candidates,
            len,
        }
    }

    /// Occupied cells whose edges may hold the true nearest hit.
    pub fn candidates(&self) -> &[(i32, i32)] {
        &self.candidates[..self.len]
    }
}

/// Walks from `origin` along unit `dir` until an occupied tile is sampled.
///
/// Returns `None` when `max_range` is exceeded or the ray leaves the map.
/// The walk takes at most `ceil(max_range / step)` samples.
pub fn march(grid: &TileGrid, origin: Vec2, dir: Vec2, max_range: f32, step: f32) -> Option<MarchHit> {
    debug_assert!(step > 0.0);
    let samples = (max_range / step).ceil() as usize;

    for i in 0..samples {
        let travelled = i as f32 * step;
        let x = (origin[0] + travelled * dir[0]).floor() as i32;
        let y = (origin[1] + travelled * dir[1]).floor() as i32;
        match grid.tile(x, y)? {
            0 => continue,
            material => return Some(MarchHit::new(grid, (x, y), material, travelled)),
        }
    }

    None
}
