// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crossterm::style::Color;

use crate::cell::Cell;
use crate::frame::Frame;

/// Easing curves, named after their GSAP counterparts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// `power1.inOut`
    Power1InOut,
    /// `power2.out`
    Power2Out,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::Power2Out => 1.0 - (1.0 - t).powi(3),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionStyle {
    pub duration: Duration,
    pub easing: Easing,
    /// Brightness reached at the end of the transition, 0..=1.
    pub peak: f32,
    pub bold: bool,
}

impl TransitionStyle {
    pub fn drift(duration: Duration) -> Self {
        Self {
            duration,
            easing: Easing::Power1InOut,
            peak: 0.55,
            bold: false,
        }
    }

    pub fn reveal(duration: Duration) -> Self {
        Self {
            duration,
            easing: Easing::Power2Out,
            peak: 1.0,
            bold: true,
        }
    }
}

/// Brightness a freshly changed glyph starts from.
const FLOOR: f32 = 0.15;

#[derive(Clone, Copy, Debug)]
struct Slot {
    ch: char,
    start: Instant,
    from: f32,
    style: TransitionStyle,
}

impl Slot {
    fn progress(&self, now: Instant) -> f32 {
        let total = self.style.duration.as_secs_f32();
        if total <= 0.0 {
            return 1.0;
        }
        (now.saturating_duration_since(self.start).as_secs_f32() / total).min(1.0)
    }

    fn brightness(&self, now: Instant) -> f32 {
        let e = self.style.easing.apply(self.progress(now));
        self.from + (self.style.peak - self.from) * e
    }

    fn done(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Per-cell visual state between the simulation and the frame.
///
/// A request switches the cell to its new glyph at once and ramps its
/// brightness along the style's easing. A newer request for a cell replaces
/// the running one; asking for the glyph already shown changes nothing.
pub struct Animator {
    rows: usize,
    cols: usize,
    slots: Vec<Slot>,
    active: Vec<usize>,
    active_map: Vec<bool>,
    color: bool,
    pitch: usize,
}

impl Animator {
    pub fn new(initial: &[Vec<char>], style: TransitionStyle, now: Instant, color: bool) -> Self {
        let rows = initial.len();
        let cols = initial.first().map(Vec::len).unwrap_or(0);
        let settled = now.checked_sub(style.duration).unwrap_or(now);
        let slots = initial
            .iter()
            .flatten()
            .map(|&ch| Slot {
                ch,
                start: settled,
                from: style.peak,
                style,
            })
            .collect::<Vec<_>>();
        let len = slots.len();
        Self {
            rows,
            cols,
            slots,
            active: Vec::new(),
            active_map: vec![false; len],
            color,
            pitch: 1,
        }
    }

    /// Spreads grid cells `pitch` screen cells apart.
    pub fn with_pitch(mut self, pitch: usize) -> Self {
        self.pitch = pitch.max(1);
        self
    }

    #[allow(dead_code)]
    pub fn glyph(&self, row: usize, col: usize) -> Option<char> {
        self.index(row, col).map(|i| self.slots[i].ch)
    }

    pub fn is_animating(&self) -> bool {
        !self.active.is_empty()
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row * self.cols + col)
    }

    pub fn request(
        &mut self,
        row: usize,
        col: usize,
        ch: char,
        style: TransitionStyle,
        now: Instant,
    ) {
        let Some(i) = self.index(row, col) else {
            return;
        };
        let slot = &mut self.slots[i];
        if slot.ch == ch && slot.style == style {
            return;
        }
        let from = slot.brightness(now).min(FLOOR.max(style.peak * 0.3));
        *slot = Slot {
            ch,
            start: now,
            from,
            style,
        };
        if !self.active_map[i] {
            self.active_map[i] = true;
            self.active.push(i);
        }
    }

    fn cell_for(&self, slot: &Slot, now: Instant) -> Cell {
        let fg = if self.color && slot.ch != ' ' {
            Some(grey(slot.brightness(now)))
        } else {
            None
        };
        Cell {
            ch: slot.ch,
            fg,
            bold: slot.style.bold && slot.ch != ' ',
        }
    }

    fn put(&self, frame: &mut Frame, i: usize, now: Instant) {
        let x = (i % self.cols) * self.pitch;
        let y = (i / self.cols) * self.pitch;
        if x > u16::MAX as usize || y > u16::MAX as usize {
            return;
        }
        frame.set(x as u16, y as u16, self.cell_for(&self.slots[i], now));
    }

    /// Draws every cell into `frame`. Cells beyond the frame are skipped.
    pub fn render_all(&mut self, frame: &mut Frame, now: Instant) {
        for i in 0..self.slots.len() {
            self.put(frame, i, now);
        }
        self.retire(now);
    }

    /// Draws only cells with a running transition.
    pub fn render(&mut self, frame: &mut Frame, now: Instant) {
        for &i in &self.active {
            self.put(frame, i, now);
        }
        self.retire(now);
    }

    fn retire(&mut self, now: Instant) {
        let slots = &self.slots;
        let active_map = &mut self.active_map;
        self.active.retain(|&i| {
            let keep = !slots[i].done(now);
            if !keep {
                active_map[i] = false;
            }
            keep
        });
    }
}

/// Maps 0..=1 onto the 24-step xterm greyscale ramp.
fn grey(level: f32) -> Color {
    let step = (level.clamp(0.0, 1.0) * 23.0).round() as u8;
    Color::AnsiValue(232 + step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn animator(now: Instant) -> Animator {
        let initial = vec![vec!['K', 'H'], vec!['+', '/']];
        Animator::new(&initial, TransitionStyle::drift(ms(1200)), now, true)
    }

    #[test]
    fn easing_curves_hit_their_endpoints() {
        for e in [Easing::Linear, Easing::Power1InOut, Easing::Power2Out] {
            assert_eq!(e.apply(0.0), 0.0);
            assert_eq!(e.apply(1.0), 1.0);
            assert_eq!(e.apply(-3.0), 0.0);
            assert_eq!(e.apply(7.0), 1.0);
        }
        assert_eq!(Easing::Power1InOut.apply(0.5), 0.5);
        assert!((Easing::Power1InOut.apply(0.25) - 0.125).abs() < 1e-6);
        assert!((Easing::Power2Out.apply(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn request_switches_glyph_and_starts_ramp() {
        let now = Instant::now();
        let mut a = animator(now);
        assert!(!a.is_animating());

        a.request(0, 1, 'K', TransitionStyle::drift(ms(1200)), now);
        assert_eq!(a.glyph(0, 1), Some('K'));
        assert!(a.is_animating());

        let mut f = Frame::new(2, 2);
        a.render(&mut f, now);
        let start = f.get(1, 0).unwrap().fg;
        a.render(&mut f, now + ms(1200));
        let end = f.get(1, 0).unwrap().fg;
        assert_ne!(start, end);
        assert_eq!(end, Some(grey(0.55)));
        assert!(!a.is_animating());
    }

    #[test]
    fn repeated_request_for_same_glyph_is_ignored() {
        let now = Instant::now();
        let mut a = animator(now);
        let style = TransitionStyle::drift(ms(1200));
        a.request(1, 1, 'K', style, now);
        a.request(1, 1, 'K', style, now + ms(600));
        let mut f = Frame::new(2, 2);
        a.render(&mut f, now + ms(1200));
        assert!(!a.is_animating());
    }

    #[test]
    fn reveal_replaces_running_drift() {
        let now = Instant::now();
        let mut a = animator(now);
        a.request(0, 0, 'H', TransitionStyle::drift(ms(1200)), now);
        a.request(0, 0, 'A', TransitionStyle::reveal(ms(2000)), now + ms(100));
        assert_eq!(a.glyph(0, 0), Some('A'));

        let mut f = Frame::new(2, 2);
        a.render(&mut f, now + ms(2100));
        let c = f.get(0, 0).unwrap();
        assert_eq!(c.ch, 'A');
        assert!(c.bold);
        assert_eq!(c.fg, Some(grey(1.0)));
    }

    #[test]
    fn reveal_of_the_shown_glyph_still_restyles_it() {
        let now = Instant::now();
        let mut a = animator(now);
        a.request(0, 0, 'K', TransitionStyle::reveal(ms(2000)), now);
        assert!(a.is_animating());

        let mut f = Frame::new(2, 2);
        a.render(&mut f, now + ms(2000));
        let c = f.get(0, 0).unwrap();
        assert_eq!(c.ch, 'K');
        assert!(c.bold);
        assert_eq!(c.fg, Some(grey(1.0)));
    }

    #[test]
    fn blank_cells_have_no_color() {
        let now = Instant::now();
        let mut a = animator(now);
        a.request(1, 0, ' ', TransitionStyle::reveal(ms(2000)), now);
        let mut f = Frame::new(2, 2);
        a.render_all(&mut f, now);
        let c = f.get(0, 1).unwrap();
        assert_eq!(c.ch, ' ');
        assert_eq!(c.fg, None);
        assert!(!c.bold);
    }

    #[test]
    fn pitch_spreads_cells_on_screen() {
        let now = Instant::now();
        let mut a = animator(now).with_pitch(2);
        let mut f = Frame::new(4, 4);
        a.render_all(&mut f, now);
        assert_eq!(f.get(2, 2).unwrap().ch, '/');
        assert_eq!(f.get(2, 0).unwrap().ch, 'H');
        assert_eq!(f.get(1, 0).unwrap().ch, ' ');
    }

    #[test]
    fn out_of_range_request_is_dropped() {
        let now = Instant::now();
        let mut a = animator(now);
        a.request(5, 5, 'X', TransitionStyle::drift(ms(10)), now);
        assert!(!a.is_animating());
    }
}
