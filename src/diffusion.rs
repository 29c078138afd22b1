// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::grid::{CellDelta, Grid};
use crate::palette::Palette;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffusionParams {
    /// Fraction of the gap to the neighbourhood mean closed per step.
    pub influence: f64,
    /// Amplitude of the per-cell noise added to velocity.
    pub jitter: f64,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        Self {
            influence: 0.09,
            jitter: 0.01,
        }
    }
}

/// One diffusion tick over the whole grid.
///
/// Every cell relaxes its velocity toward the mean of its in-bounds
/// 8-neighbours, picks up a little noise, then advances its palette index.
/// Neighbour velocities come from a snapshot taken before the step, so the
/// result does not depend on iteration order.
///
/// Returns the cells whose rendered glyph changed.
pub fn step_diffusion<R: Rng + ?Sized>(
    grid: &mut Grid,
    palette: &Palette,
    params: DiffusionParams,
    rng: &mut R,
) -> Vec<CellDelta> {
    let prev: Vec<f64> = grid.cells().iter().map(|c| c.velocity).collect();
    let cols = grid.cols();
    let mut next = Vec::with_capacity(prev.len());

    for row in 0..grid.rows() {
        for col in 0..cols {
            let i = row * cols + col;
            let (sum, count) = grid
                .neighbors(row, col)
                .fold((0.0, 0usize), |(s, n), ni| (s + prev[ni], n + 1));
            let avg = if count > 0 { sum / count as f64 } else { prev[i] };
            let noise = rng.random::<f64>() - 0.5;
            next.push(prev[i] + (avg - prev[i]) * params.influence + noise * params.jitter);
        }
    }

    let mut deltas = Vec::new();
    for (i, (cell, velocity)) in grid.cells_mut().iter_mut().zip(next).enumerate() {
        cell.velocity = velocity;
        cell.char_index = palette.wrap(cell.char_index + velocity);
        let ch = palette.glyph(cell.char_index);
        if ch != cell.rendered {
            cell.rendered = ch;
            deltas.push(CellDelta {
                row: i / cols,
                col: i % cols,
                ch,
            });
        }
    }
    deltas
}
