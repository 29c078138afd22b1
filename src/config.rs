// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use crate::compositor::TextBlock;
use crate::diffusion::DiffusionParams;
use crate::error::{Error, Result};
use crate::palette::{palette_from_preset, Palette};
use crate::phase::PhaseSchedule;
use crate::sim::{SimConfig, DEFAULT_ANCHOR_COL, DEFAULT_TEXT};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphdrift --palette KH+/ --influence 0.09 --jitter 0.01 --decay 0.9 --intro-ms 3000 --damping-lead-ms 1000 --drift-ms 1200 --reveal-ms 2000 --anchor-col 10 --fps 60";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if let Some(rest) = line.strip_prefix("  glyphdrift") {
            out.push_str("  \x1b[1;34mglyphdrift\x1b[0m");
            out.push_str(rest);
        } else if line.ends_with(':') {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

/// Viewport size for headless runs, written `COLSxROWS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeSpec {
    pub cols: u16,
    pub rows: u16,
}

impl FromStr for SizeSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (a, b) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| "expected: COLSxROWS".to_string())?;
        let cols: u16 = a
            .trim()
            .parse()
            .map_err(|_| "invalid column count".to_string())?;
        let rows: u16 = b
            .trim()
            .parse()
            .map_err(|_| "invalid row count".to_string())?;
        if cols == 0 || rows == 0 {
            return Err("size must be >0 in both directions".to_string());
        }
        Ok(Self { cols, rows })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphdrift", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "headless",
        help_heading = "GENERAL",
        help = "Run on a simulated clock without a terminal and print the final grid"
    )]
    pub headless: bool,

    #[arg(
        long = "size",
        default_value = "80x24",
        help_heading = "GENERAL",
        help = "Viewport for --headless, in cells: COLSxROWS"
    )]
    pub size: SizeSpec,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "mono",
        help_heading = "GENERAL",
        help = "Disable colors (also honoured: NO_COLOR)"
    )]
    pub mono: bool,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write logs to this file (filter with GLYPHDRIFT_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "seed",
        help_heading = "SIMULATION",
        help = "Random seed for a reproducible run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "palette",
        help_heading = "SIMULATION",
        help = "Glyphs cells cycle through, in order [default: KH+/]"
    )]
    pub palette: Option<String>,

    #[arg(
        long = "palette-preset",
        conflicts_with = "palette",
        help_heading = "SIMULATION",
        help = "Named palette (see --list-palettes)"
    )]
    pub palette_preset: Option<String>,

    #[arg(
        long = "influence",
        default_value_t = 0.09,
        help_heading = "SIMULATION",
        help = "Pull toward the neighbourhood mean velocity per tick (min 0 max 1)"
    )]
    pub influence: f64,

    #[arg(
        long = "jitter",
        default_value_t = 0.01,
        help_heading = "SIMULATION",
        help = "Velocity noise amplitude per tick (min 0 max 1)"
    )]
    pub jitter: f64,

    #[arg(
        long = "decay",
        default_value_t = 0.9,
        help_heading = "SIMULATION",
        help = "Velocity multiplier per tick while damping (min 0 max 1)"
    )]
    pub decay: f64,

    #[arg(
        long = "pitch",
        default_value_t = 1,
        help_heading = "SIMULATION",
        help = "Cell pitch in terminal cells (min 1 max 16)"
    )]
    pub pitch: u32,

    #[arg(
        short = 't',
        long = "text",
        help_heading = "TEXT",
        help = "Line of the final text block; repeat for more lines [default: ABOUT, WORK, CONTACT]"
    )]
    pub text: Vec<String>,

    #[arg(
        long = "anchor-col",
        default_value_t = DEFAULT_ANCHOR_COL,
        allow_negative_numbers = true,
        help_heading = "TEXT",
        help = "Column of the first text character"
    )]
    pub anchor_col: i64,

    #[arg(
        long = "intro-ms",
        default_value_t = 3000,
        help_heading = "TIMING",
        help = "Time until the text appears, in ms (min 1 max 600000)"
    )]
    pub intro_ms: u64,

    #[arg(
        long = "damping-lead-ms",
        default_value_t = 1000,
        help_heading = "TIMING",
        help = "How long before the text damping begins, in ms (max 600000)"
    )]
    pub damping_lead_ms: u64,

    #[arg(
        long = "drift-ms",
        default_value_t = 1200,
        help_heading = "TIMING",
        help = "Glyph transition time while drifting, in ms (max 60000)"
    )]
    pub drift_ms: u64,

    #[arg(
        long = "reveal-ms",
        default_value_t = 2000,
        help_heading = "TIMING",
        help = "Glyph transition time for the text reveal, in ms (max 60000)"
    )]
    pub reveal_ms: u64,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "TIMING",
        help = "Ticks per second (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "list-palettes",
        help_heading = "HELP",
        help = "List available palette presets and exit"
    )]
    pub list_palettes: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

fn require_f64_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<f64> {
    if !v.is_finite() {
        return Err(Error::NotFinite { name, value: v });
    }
    if v < min || v > max {
        return Err(Error::OutOfRange {
            name,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

fn require_u64_range(name: &'static str, v: u64, min: u64, max: u64) -> Result<u64> {
    if v < min || v > max {
        return Err(Error::OutOfRange {
            name,
            value: v as f64,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(v)
}

/// Everything the front end needs besides the simulation itself.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub sim: SimConfig,
    pub pitch: u32,
    pub tick: Duration,
    pub drift: Duration,
    pub reveal: Duration,
    pub duration: Option<Duration>,
    pub color: bool,
}

impl Args {
    /// Validates every numeric flag and resolves the palette and text.
    pub fn run_config(&self) -> Result<RunConfig> {
        let influence = require_f64_range("--influence", self.influence, 0.0, 1.0)?;
        let jitter = require_f64_range("--jitter", self.jitter, 0.0, 1.0)?;
        let decay = require_f64_range("--decay", self.decay, 0.0, 1.0)?;
        let fps = require_f64_range("--fps", self.fps, 1.0, 240.0)?;
        let pitch = require_u64_range("--pitch", self.pitch as u64, 1, 16)? as u32;
        let intro = require_u64_range("--intro-ms", self.intro_ms, 1, 600_000)?;
        let lead = require_u64_range("--damping-lead-ms", self.damping_lead_ms, 0, 600_000)?;
        let drift = require_u64_range("--drift-ms", self.drift_ms, 0, 60_000)?;
        let reveal = require_u64_range("--reveal-ms", self.reveal_ms, 0, 60_000)?;

        let duration = match self.duration {
            Some(s) if !s.is_finite() => {
                return Err(Error::NotFinite {
                    name: "--duration",
                    value: s,
                })
            }
            Some(s) if s > 0.0 => Some(Duration::from_secs_f64(require_f64_range(
                "--duration",
                s,
                0.1,
                86400.0,
            )?)),
            _ => None,
        };

        let palette = match (&self.palette, &self.palette_preset) {
            (Some(chars), _) => Palette::new(chars)?,
            (None, Some(name)) => palette_from_preset(name)?,
            (None, None) => Palette::default(),
        };

        let text = if self.text.is_empty() {
            TextBlock::new(&DEFAULT_TEXT)
        } else {
            TextBlock::new(&self.text)
        };

        let seed = self.seed.unwrap_or_else(rand::random);

        Ok(RunConfig {
            sim: SimConfig {
                palette,
                diffusion: DiffusionParams { influence, jitter },
                decay,
                schedule: PhaseSchedule::from_intro(
                    Duration::from_millis(intro),
                    Duration::from_millis(lead),
                ),
                text,
                anchor_col: self.anchor_col,
                seed,
            },
            pitch,
            tick: Duration::from_secs_f64(1.0 / fps),
            drift: Duration::from_millis(drift),
            reveal: Duration::from_millis(reveal),
            duration,
            color: !self.mono && std::env::var_os("NO_COLOR").is_none(),
        })
    }
}
