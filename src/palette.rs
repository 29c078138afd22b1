// Copyright (c) 2026 rezky_nightky

use crate::error::{Error, Result};

pub const DEFAULT_PALETTE: &str = "KH+/";

/// Ordered set of glyphs a cell cycles through.
///
/// Cells hold a fractional index into this list; the glyph shown is the one at
/// `floor(index)`. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    chars: Vec<char>,
}

impl Palette {
    pub fn new(chars: &str) -> Result<Self> {
        let chars: Vec<char> = chars.chars().collect();
        if chars.is_empty() {
            return Err(Error::EmptyPalette);
        }
        Ok(Self { chars })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Wraps `index` into `[0, len)`, also for negative drift.
    pub fn wrap(&self, index: f64) -> f64 {
        let len = self.chars.len() as f64;
        let v = index.rem_euclid(len);
        // rem_euclid rounds tiny negatives up to exactly `len`
        if v >= len || !v.is_finite() {
            0.0
        } else {
            v
        }
    }

    pub fn glyph(&self, index: f64) -> char {
        let last = self.chars.len() - 1;
        let i = if index.is_finite() && index > 0.0 {
            (index.floor() as usize).min(last)
        } else {
            0
        };
        self.chars[i]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            chars: DEFAULT_PALETTE.chars().collect(),
        }
    }
}

pub fn palette_from_preset(name: &str) -> Result<Palette> {
    let name = name.trim().to_ascii_lowercase();
    let chars = match name.as_str() {
        "default" | "khplus" => DEFAULT_PALETTE,
        "slashes" | "rain" => "/|\\-",
        "binary" | "bin" | "01" => "01",
        "blocks" | "shade" => " \u{2591}\u{2592}\u{2593}\u{2588}",
        "dots" | "minimal" => " .:-=+*#",
        "hex" | "hexadecimal" => "0123456789ABCDEF",
        "arrows" => "\u{2190}\u{2191}\u{2192}\u{2193}",
        "dna" => "ACGT",
        _ => return Err(Error::UnknownPalette(name)),
    };
    Palette::new(chars)
}

pub fn print_list_palettes() {
    println!("AVAILABLE PALETTE PRESETS:");
    println!("NOTE: Use only the VALUE (left side) with --palette-preset.");
    println!();
    println!("VALUE        GLYPHS");
    println!("default      KH+/ (alias: khplus)");
    println!("slashes      /|\\- (alias: rain)");
    println!("binary       01 (aliases: bin, 01)");
    println!("blocks       shading blocks (alias: shade)");
    println!("dots         .:-=+*# (alias: minimal)");
    println!("hex          0-9 and A-F (alias: hexadecimal)");
    println!("arrows       arrow symbols");
    println!("dna          ACGT");
}
