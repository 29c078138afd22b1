// Copyright (c) 2026 rezky_nightky

use rand::{
    distr::{Distribution, Uniform},
    Rng,
};

use crate::error::{Error, Result};
use crate::palette::Palette;

/// Upper bound (exclusive) of a cell's starting velocity.
pub const MAX_INITIAL_VELOCITY: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub char_index: f64,
    pub velocity: f64,
    pub rendered: char,
}

/// A cell whose displayed character should move to `ch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellDelta {
    pub row: usize,
    pub col: usize,
    pub ch: char,
}

/// Row-major store of every cell. Dimensions never change after creation.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

/// Per-row target characters, same shape as the grid it was computed from.
pub type TargetGrid = Vec<Vec<char>>;

impl Grid {
    pub fn new<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        palette: &Palette,
        rng: &mut R,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyGrid { rows, cols });
        }

        let index_dist =
            Uniform::new(0.0, palette.len() as f64).map_err(|_| Error::EmptyPalette)?;
        let velocity_dist = Uniform::new(0.0, MAX_INITIAL_VELOCITY).expect("valid range");

        let cells = (0..rows * cols)
            .map(|_| {
                let char_index = index_dist.sample(rng);
                Cell {
                    char_index,
                    velocity: velocity_dist.sample(rng),
                    rendered: palette.glyph(char_index),
                }
            })
            .collect();

        Ok(Self { rows, cols, cells })
    }

    /// Grid size covering a `width` x `height` viewport with cells `pitch`
    /// units wide, rounding partial cells up. Returns `(rows, cols)`.
    pub fn dimensions_for(width: u32, height: u32, pitch: u32) -> Result<(usize, usize)> {
        if pitch == 0 {
            return Err(Error::ZeroPitch);
        }
        let rows = height.div_ceil(pitch) as usize;
        let cols = width.div_ceil(pitch) as usize;
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyGrid { rows, cols });
        }
        Ok((rows, cols))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row * self.cols + col)
    }

    #[allow(dead_code)]
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    /// Flat indices of the 8-connected neighbours inside the grid.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = usize> + '_ {
        let r0 = row.saturating_sub(1);
        let r1 = (row + 1).min(self.rows - 1);
        let c0 = col.saturating_sub(1);
        let c1 = (col + 1).min(self.cols - 1);
        (r0..=r1).flat_map(move |r| {
            (c0..=c1)
                .filter(move |&c| !(r == row && c == col))
                .map(move |c| r * self.cols + c)
        })
    }

    /// Current rendered characters, one `Vec` per row.
    pub fn rendered(&self) -> TargetGrid {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|c| c.rendered).collect())
            .collect()
    }

    /// Overrides rendered characters with `targets`, returning cells that
    /// actually changed. Rows or columns beyond the grid are ignored.
    pub fn apply_targets(&mut self, targets: &TargetGrid) -> Vec<CellDelta> {
        let mut deltas = Vec::new();
        for (row, line) in targets.iter().enumerate().take(self.rows) {
            for (col, &ch) in line.iter().enumerate().take(self.cols) {
                let cell = &mut self.cells[row * self.cols + col];
                if cell.rendered != ch {
                    cell.rendered = ch;
                    deltas.push(CellDelta { row, col, ch });
                }
            }
        }
        deltas
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn grid(rows: usize, cols: usize) -> Grid {
        let mut rng = StdRng::seed_from_u64(7);
        Grid::new(rows, cols, &Palette::default(), &mut rng).unwrap()
    }

    #[test]
    fn new_rejects_empty_dimensions() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = Palette::default();
        assert!(matches!(
            Grid::new(0, 4, &p, &mut rng),
            Err(Error::EmptyGrid { rows: 0, cols: 4 })
        ));
        assert!(Grid::new(3, 0, &p, &mut rng).is_err());
    }

    #[test]
    fn new_cells_start_within_bounds() {
        let g = grid(12, 17);
        let p = Palette::default();
        assert_eq!(g.cells().len(), 12 * 17);
        for c in g.cells() {
            assert!((0.0..4.0).contains(&c.char_index));
            assert!((0.0..MAX_INITIAL_VELOCITY).contains(&c.velocity));
            assert_eq!(c.rendered, p.glyph(c.char_index));
        }
    }

    #[test]
    fn dimensions_round_partial_cells_up() {
        assert_eq!(Grid::dimensions_for(1280, 720, 20).unwrap(), (36, 64));
        assert_eq!(Grid::dimensions_for(1281, 701, 20).unwrap(), (36, 65));
        assert_eq!(Grid::dimensions_for(80, 24, 1).unwrap(), (24, 80));
        assert!(matches!(
            Grid::dimensions_for(80, 24, 0),
            Err(Error::ZeroPitch)
        ));
        assert!(Grid::dimensions_for(0, 24, 1).is_err());
    }

    #[test]
    fn neighbor_counts_depend_on_position() {
        let g = grid(4, 5);
        assert_eq!(g.neighbors(0, 0).count(), 3);
        assert_eq!(g.neighbors(3, 4).count(), 3);
        assert_eq!(g.neighbors(0, 2).count(), 5);
        assert_eq!(g.neighbors(2, 0).count(), 5);
        assert_eq!(g.neighbors(1, 2).count(), 8);

        let mut n: Vec<usize> = g.neighbors(0, 0).collect();
        n.sort_unstable();
        assert_eq!(n, vec![1, 5, 6]);
    }

    #[test]
    fn single_cell_grid_has_no_neighbors() {
        let g = grid(1, 1);
        assert_eq!(g.neighbors(0, 0).count(), 0);
    }

    #[test]
    fn apply_targets_reports_only_changes() {
        let mut g = grid(2, 2);
        let mut targets = g.rendered();
        targets[1][0] = 'Z';
        let deltas = g.apply_targets(&targets);
        assert_eq!(
            deltas,
            vec![CellDelta {
                row: 1,
                col: 0,
                ch: 'Z'
            }]
        );
        assert_eq!(g.get(1, 0).unwrap().rendered, 'Z');
        assert!(g.apply_targets(&targets).is_empty());
    }
}
