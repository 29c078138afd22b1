// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use tracing::info;

use crate::config::{RunConfig, SizeSpec};
use crate::error::Result;
use crate::grid::Grid;
use crate::phase::Phase;
use crate::sim::Simulation;

/// Runs the whole intro on a simulated clock, one tick per `cfg.tick`, and
/// returns the simulation once it has frozen.
pub fn simulate(cfg: &RunConfig, size: SizeSpec) -> Result<Simulation> {
    let (rows, cols) = Grid::dimensions_for(size.cols as u32, size.rows as u32, cfg.pitch)?;
    let mut sim = Simulation::new(rows, cols, cfg.sim.clone())?;

    let step = cfg.tick.max(Duration::from_micros(1));
    let mut elapsed = Duration::ZERO;
    while sim.phase() != Phase::Frozen {
        sim.tick(elapsed);
        elapsed += step;
    }
    info!(
        ticks = sim.ticks(),
        elapsed_ms = elapsed.as_millis() as u64,
        "headless run frozen"
    );
    Ok(sim)
}

/// Final grid as text, one line per row.
pub fn render(sim: &Simulation) -> String {
    let mut out = String::new();
    for row in sim.grid().rendered() {
        out.extend(row);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::compositor::TextBlock;
    use crate::sim::SimConfig;

    fn run_config(seed: u64) -> RunConfig {
        RunConfig {
            sim: SimConfig {
                text: TextBlock::new(&["HI", "YOU"]),
                anchor_col: 3,
                seed,
                ..SimConfig::default()
            },
            pitch: 1,
            tick: Duration::from_millis(16),
            drift: Duration::from_millis(1200),
            reveal: Duration::from_millis(2000),
            duration: None,
            color: false,
        }
    }

    #[test]
    fn headless_run_ends_frozen_with_text_in_place() {
        let sim = simulate(&run_config(8), SizeSpec { cols: 12, rows: 7 }).unwrap();
        assert_eq!(sim.phase(), Phase::Frozen);
        // about 3000ms of 16ms ticks
        assert!(sim.ticks() >= 188 && sim.ticks() <= 190);

        let text = render(&sim);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        // 7 rows, 2 lines: anchor row 3 - 1 = 2
        assert_eq!(&lines[1][2..7], "     ");
        // "HI" is narrower than the block, so column 5 keeps its field glyph
        assert_eq!(&lines[2][2..5], " HI");
        assert_eq!(&lines[2][6..7], " ");
        assert_eq!(&lines[3][2..7], " YOU ");
        assert_eq!(&lines[4][2..7], "     ");
    }

    #[test]
    fn headless_runs_are_reproducible() {
        let size = SizeSpec { cols: 20, rows: 9 };
        let a = render(&simulate(&run_config(77), size).unwrap());
        let b = render(&simulate(&run_config(77), size).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn pitch_shrinks_the_grid() {
        let mut cfg = run_config(1);
        cfg.pitch = 2;
        let sim = simulate(&cfg, SizeSpec { cols: 21, rows: 10 }).unwrap();
        assert_eq!(sim.grid().cols(), 11);
        assert_eq!(sim.grid().rows(), 5);
    }
}
