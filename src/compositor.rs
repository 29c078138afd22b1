// Copyright (c) 2026 rezky_nightky

use tracing::warn;

use crate::grid::{CellDelta, Grid, TargetGrid};

/// Character written into the border ring around the text.
pub const BLANK: char = ' ';

/// Lines of literal text to lay over the grid, ragged lengths allowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBlock {
    lines: Vec<Vec<char>>,
}

impl TextBlock {
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.as_ref().chars().collect()).collect(),
        }
    }

    pub fn lines(&self) -> &[Vec<char>] {
        &self.lines
    }

    pub fn width(&self) -> usize {
        self.lines.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Top row of the block when centred vertically in `grid_rows` rows.
    /// Negative when the block is taller than the grid allows.
    pub fn anchor_row(&self, grid_rows: usize) -> i64 {
        (grid_rows / 2) as i64 - (self.height() / 2) as i64
    }

    /// Whether the block and its border ring fit inside the grid.
    pub fn fits(&self, grid_rows: usize, grid_cols: usize, anchor_col: i64) -> bool {
        let top = self.anchor_row(grid_rows) - 1;
        let bottom = self.anchor_row(grid_rows) + self.height() as i64;
        let left = anchor_col - 1;
        let right = anchor_col + self.width() as i64;
        top >= 0 && left >= 0 && bottom < grid_rows as i64 && right < grid_cols as i64
    }
}

/// Every in-grid cell the block writes to, with its glyph: the border ring
/// first, then the text. Positions that land outside the grid are skipped.
fn placements(rows: usize, cols: usize, block: &TextBlock, anchor_col: i64) -> Vec<CellDelta> {
    let (rows_i, cols_i) = (rows as i64, cols as i64);
    let width = block.width() as i64;
    let height = block.height() as i64;
    let top = block.anchor_row(rows);

    let mut out = Vec::new();
    let mut put = |r: i64, c: i64, ch: char| {
        if (0..rows_i).contains(&r) && (0..cols_i).contains(&c) {
            out.push(CellDelta {
                row: r as usize,
                col: c as usize,
                ch,
            });
        }
    };

    for c in (anchor_col - 1)..=(anchor_col + width) {
        put(top - 1, c, BLANK);
        put(top + height, c, BLANK);
    }
    for r in top..(top + height) {
        put(r, anchor_col - 1, BLANK);
        put(r, anchor_col + width, BLANK);
    }

    for (i, line) in block.lines().iter().enumerate() {
        for (j, &ch) in line.iter().enumerate() {
            put(top + i as i64, anchor_col + j as i64, ch);
        }
    }

    out
}

/// Target glyph for every cell once the text block is placed.
///
/// Cells outside the text and its one-cell border ring keep their current
/// glyph.
pub fn compose_targets(grid: &Grid, block: &TextBlock, anchor_col: i64) -> TargetGrid {
    let mut targets = grid.rendered();
    for p in placements(grid.rows(), grid.cols(), block, anchor_col) {
        targets[p.row][p.col] = p.ch;
    }
    targets
}

/// Writes the composed text into the grid and returns the full target grid
/// along with every cell the ring and text cover, including cells that
/// already showed their target glyph.
pub fn compose_text(
    grid: &mut Grid,
    block: &TextBlock,
    anchor_col: i64,
) -> (TargetGrid, Vec<CellDelta>) {
    if !block.fits(grid.rows(), grid.cols(), anchor_col) {
        warn!(
            rows = grid.rows(),
            cols = grid.cols(),
            block_width = block.width(),
            block_height = block.height(),
            anchor_col,
            "text block does not fit the grid; clipping"
        );
    }
    let targets = compose_targets(grid, block, anchor_col);
    grid.apply_targets(&targets);
    let covered = placements(grid.rows(), grid.cols(), block, anchor_col);
    (targets, covered)
}
