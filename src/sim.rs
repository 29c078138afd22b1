// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, trace};

use crate::compositor::{compose_text, TextBlock};
use crate::damping::{step_damping, DEFAULT_DECAY};
use crate::diffusion::{step_diffusion, DiffusionParams};
use crate::error::{Error, Result};
use crate::grid::{CellDelta, Grid, TargetGrid};
use crate::palette::Palette;
use crate::phase::{Phase, PhaseController, PhaseEvent, PhaseSchedule};

pub const DEFAULT_TEXT: [&str; 3] = ["ABOUT  ", "WORK   ", "CONTACT"];
pub const DEFAULT_ANCHOR_COL: i64 = 10;

#[derive(Clone, Debug)]
pub struct SimConfig {
    pub palette: Palette,
    pub diffusion: DiffusionParams,
    pub decay: f64,
    pub schedule: PhaseSchedule,
    pub text: TextBlock,
    pub anchor_col: i64,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            diffusion: DiffusionParams::default(),
            decay: DEFAULT_DECAY,
            schedule: PhaseSchedule::default(),
            text: TextBlock::new(&DEFAULT_TEXT),
            anchor_col: DEFAULT_ANCHOR_COL,
            seed: 0x1234567,
        }
    }
}

/// What one tick changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tick {
    pub events: Vec<PhaseEvent>,
    /// Glyph changes from the diffusion step.
    pub drift: Vec<CellDelta>,
    /// Every cell covered by the text block and its ring, changed or not.
    /// Only non-empty on the tick that freezes the grid.
    pub reveal: Vec<CellDelta>,
}

/// Owns the grid and everything that mutates it.
///
/// `tick` is the only entry point that changes state: phase timers are
/// checked first, then the steps for the current phase run to completion.
pub struct Simulation {
    grid: Grid,
    palette: Palette,
    diffusion: DiffusionParams,
    decay: f64,
    controller: PhaseController,
    text: TextBlock,
    anchor_col: i64,
    composed: Option<TargetGrid>,
    rng: StdRng,
    ticks: u64,
}

impl Simulation {
    pub fn new(rows: usize, cols: usize, cfg: SimConfig) -> Result<Self> {
        if cfg.text.height() == 0 {
            return Err(Error::NoText);
        }
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let grid = Grid::new(rows, cols, &cfg.palette, &mut rng)?;
        info!(
            rows,
            cols,
            seed = cfg.seed,
            palette = %cfg.palette.chars().iter().collect::<String>(),
            "simulation created"
        );
        Ok(Self {
            grid,
            palette: cfg.palette,
            diffusion: cfg.diffusion,
            decay: cfg.decay,
            controller: PhaseController::new(cfg.schedule),
            text: cfg.text,
            anchor_col: cfg.anchor_col,
            composed: None,
            rng,
            ticks: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// The composed target grid, once frozen.
    #[allow(dead_code)]
    pub fn composed(&self) -> Option<&TargetGrid> {
        self.composed.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self, elapsed: Duration) -> Tick {
        let mut out = Tick {
            events: self.controller.advance(elapsed),
            ..Tick::default()
        };

        if out.events.contains(&PhaseEvent::Frozen) && self.composed.is_none() {
            let (targets, deltas) = compose_text(&mut self.grid, &self.text, self.anchor_col);
            debug!(covered = deltas.len(), "text block composed");
            self.composed = Some(targets);
            out.reveal = deltas;
        }

        if self.controller.runs_diffusion() {
            out.drift = step_diffusion(
                &mut self.grid,
                &self.palette,
                self.diffusion,
                &mut self.rng,
            );
        }
        if self.controller.runs_damping() {
            step_damping(&mut self.grid, self.decay);
        }

        self.ticks += 1;
        trace!(tick = self.ticks, drift = out.drift.len(), "tick");
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::grid::Cell;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn sim(seed: u64) -> Simulation {
        let cfg = SimConfig {
            text: TextBlock::new(&["AB", "CD"]),
            anchor_col: 5,
            seed,
            ..SimConfig::default()
        };
        Simulation::new(10, 12, cfg).unwrap()
    }

    fn velocities(s: &Simulation) -> Vec<f64> {
        s.grid().cells().iter().map(|c| c.velocity).collect()
    }

    #[test]
    fn empty_text_is_rejected() {
        let cfg = SimConfig {
            text: TextBlock::new::<&str>(&[]),
            ..SimConfig::default()
        };
        assert!(matches!(Simulation::new(4, 4, cfg), Err(Error::NoText)));
    }

    #[test]
    fn same_seed_gives_same_run() {
        let mut a = sim(5);
        let mut b = sim(5);
        for t in (0..3500).step_by(16) {
            assert_eq!(a.tick(ms(t)), b.tick(ms(t)));
        }
        assert_eq!(a.grid().rendered(), b.grid().rendered());
    }

    #[test]
    fn intro_diffuses_without_damping() {
        let mut s = sim(1);
        let t = s.tick(ms(16));
        assert!(t.events.is_empty());
        assert!(t.reveal.is_empty());
        assert_eq!(s.phase(), Phase::Intro);
    }

    #[test]
    fn damping_runs_after_diffusion_in_the_same_tick() {
        let mut s = sim(2);
        s.tick(ms(1000));

        // replay the diffusion step alone on a copy, then damp it by hand
        let mut grid = s.grid.clone();
        let mut rng = s.rng.clone();
        step_diffusion(&mut grid, &s.palette, s.diffusion, &mut rng);
        let expected: Vec<f64> = grid
            .cells()
            .iter()
            .map(|c: &Cell| c.velocity * DEFAULT_DECAY)
            .collect();

        let t = s.tick(ms(2000));
        assert_eq!(t.events, vec![PhaseEvent::DampingStarted]);
        assert_eq!(velocities(&s), expected);
    }

    #[test]
    fn freeze_composes_once_and_stops_mutation() {
        let mut s = sim(3);
        s.tick(ms(100));
        s.tick(ms(2100));
        let t = s.tick(ms(3000));
        assert_eq!(t.events, vec![PhaseEvent::Frozen]);
        assert!(t.drift.is_empty());
        assert!(!t.reveal.is_empty());
        assert_eq!(s.phase(), Phase::Frozen);

        let composed = s.composed().cloned().unwrap();
        assert_eq!(composed[4][5], 'A');
        assert_eq!(composed[5][6], 'D');
        assert_eq!(s.grid().rendered(), composed);

        let frozen: Vec<Cell> = s.grid().cells().to_vec();
        for t in (3016..6000).step_by(16) {
            let tick = s.tick(ms(t));
            assert_eq!(tick, Tick::default());
        }
        assert_eq!(s.grid().cells(), frozen.as_slice());
    }

    #[test]
    fn reveal_covers_text_cells_that_already_match() {
        let cfg = SimConfig {
            palette: Palette::new("K").unwrap(),
            text: TextBlock::new(&["WORK"]),
            anchor_col: 2,
            ..SimConfig::default()
        };
        let mut s = Simulation::new(10, 12, cfg).unwrap();
        let t = s.tick(ms(5000));

        // the field is all 'K', so only the ring and "WOR" change glyph
        let k = CellDelta {
            row: 5,
            col: 5,
            ch: 'K',
        };
        assert!(t.reveal.contains(&k));
        assert_eq!(t.reveal.len(), 6 * 2 + 2 + 4);
    }

    #[test]
    fn late_first_tick_still_composes_once() {
        let mut s = sim(4);
        let t = s.tick(ms(60_000));
        assert_eq!(
            t.events,
            vec![PhaseEvent::DampingStarted, PhaseEvent::Frozen]
        );
        assert!(!t.reveal.is_empty());
        assert!(s.composed().is_some());
        assert!(s.tick(ms(60_016)).reveal.is_empty());
    }
}
