// Copyright (c) 2026 rezky_nightky

/// Everything that can go wrong before the first tick.
///
/// The simulation itself has no failure modes once it is running; all of
/// these are configuration problems caught at startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("grid dimensions must be positive (got {rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("cell pitch must be at least 1")]
    ZeroPitch,

    #[error("palette must contain at least one character")]
    EmptyPalette,

    #[error("unknown palette preset: {0} (see --list-palettes)")]
    UnknownPalette(String),

    #[error("at least one --text line is required")]
    NoText,

    #[error("failed to apply {name} {value} (must be a finite number)")]
    NotFinite { name: &'static str, value: f64 },

    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
