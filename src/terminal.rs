// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Raw-mode alternate screen. Restores the terminal when dropped.
pub struct Terminal {
    stdout: Stdout,
    run_buf: String,
    dirty_buf: Vec<usize>,
}

#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bold: bool,
}

impl Pen {
    fn apply(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            run_buf: String::with_capacity(64),
            dirty_buf: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let total = frame.width as usize * frame.height as usize;
        let full = frame.is_dirty_all() || frame.dirty_indices().len() >= total / 3;

        if full {
            self.draw_full(frame)?;
        } else {
            self.draw_dirty(frame)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame) -> Result<()> {
        let mut pen = Pen::default();
        self.stdout.queue(ResetColor)?;
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                pen.apply(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
            }
        }
        Ok(())
    }

    /// Writes changed cells, batching horizontal runs that share a style.
    fn draw_dirty(&mut self, frame: &Frame) -> Result<()> {
        let width = frame.width as usize;
        if width == 0 {
            return Ok(());
        }

        self.dirty_buf.clear();
        self.dirty_buf.extend_from_slice(frame.dirty_indices());
        self.dirty_buf.sort_unstable();

        let mut pen = Pen::default();
        self.stdout.queue(ResetColor)?;

        let mut i = 0usize;
        while i < self.dirty_buf.len() {
            let start = self.dirty_buf[i];
            let first = frame.cell_at_index(start);

            self.run_buf.clear();
            self.run_buf.push(first.ch);
            let mut last = start;
            let mut j = i + 1;
            while j < self.dirty_buf.len() {
                let idx = self.dirty_buf[j];
                let cell = frame.cell_at_index(idx);
                if idx != last + 1
                    || idx % width == 0
                    || cell.fg != first.fg
                    || cell.bold != first.bold
                {
                    break;
                }
                self.run_buf.push(cell.ch);
                last = idx;
                j += 1;
            }

            let x = (start % width) as u16;
            let y = (start / width) as u16;
            self.stdout.queue(cursor::MoveTo(x, y))?;
            pen.apply(&mut self.stdout, &first)?;
            self.stdout.queue(Print(self.run_buf.as_str()))?;

            i = j;
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
