// Copyright (c) 2026 rezky_nightky

use crate::grid::Grid;

pub const DEFAULT_DECAY: f64 = 0.9;

/// Scales every cell's velocity by `decay`.
pub fn step_damping(grid: &mut Grid, decay: f64) {
    for cell in grid.cells_mut() {
        cell.velocity *= decay;
    }
}
