// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::frame::Frame;
use crate::palette::Palette;

/// Raw-mode + alternate-screen session. Construction fully prepares the
/// terminal or unwinds everything it managed to do; Drop restores the
/// user's shell no matter how the run ends.
pub struct Terminal {
    stdout: Stdout,
    scratch: Vec<usize>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            scratch: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    /// Paint the frame's pending changes, resolving each cell's shade
    /// through the active palette. A fully-dirty frame repaints everything;
    /// otherwise only the dirty cells are touched, with color state cached
    /// across the queue to keep the escape stream short.
    pub fn draw(&mut self, frame: &mut Frame, palette: &Palette) -> Result<()> {
        let mut cur_fg: Option<Option<Color>> = None;
        let mut cur_bold: Option<bool> = None;

        if frame.is_dirty_all() {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    let cell = frame.cell_at_index(idx);
                    let (fg, bold) = palette.attr(cell.shade);
                    queue_attrs(&mut self.stdout, fg, bold, &mut cur_fg, &mut cur_bold)?;
                    self.stdout.queue(Print(cell.ch))?;
                }
            }
        } else {
            self.scratch.clear();
            self.scratch.extend_from_slice(frame.dirty_indices());
            self.scratch.sort_unstable();

            let width = frame.width as usize;
            let mut cur_pos: Option<(u16, u16)> = None;
            for &idx in &self.scratch {
                let x = (idx % width) as u16;
                let y = (idx / width) as u16;
                if y >= frame.height {
                    continue;
                }
                if cur_pos != Some((x, y)) {
                    self.stdout.queue(cursor::MoveTo(x, y))?;
                }

                let cell = frame.cell_at_index(idx);
                let (fg, bold) = palette.attr(cell.shade);
                queue_attrs(&mut self.stdout, fg, bold, &mut cur_fg, &mut cur_bold)?;
                self.stdout.queue(Print(cell.ch))?;

                let next_x = x.saturating_add(1);
                cur_pos = if next_x < frame.width {
                    Some((next_x, y))
                } else {
                    None
                };
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

fn queue_attrs(
    out: &mut Stdout,
    fg: Option<Color>,
    bold: bool,
    cur_fg: &mut Option<Option<Color>>,
    cur_bold: &mut Option<bool>,
) -> Result<()> {
    if *cur_fg != Some(fg) {
        out.queue(SetForegroundColor(fg.unwrap_or(Color::Reset)))?;
        *cur_fg = Some(fg);
    }
    if *cur_bold != Some(bold) {
        out.queue(SetAttribute(if bold {
            Attribute::Bold
        } else {
            Attribute::NormalIntensity
        }))?;
        *cur_bold = Some(bold);
    }
    Ok(())
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

/// Shared by Drop, the panic hook, and the signal handlers. Every step is
/// attempted even if an earlier one fails.
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
