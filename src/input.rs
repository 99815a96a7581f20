// Copyright (c) 2026 rezky_nightky

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::palette::Scheme;

/// Everything the frame loop can be asked to do. Key-code mapping lives
/// here; what a command means against the tunables is the loop's business.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    TogglePause,
    OpenMenu,
    /// Less frame delay.
    SpeedUp,
    /// More frame delay.
    SpeedDown,
    /// Lower spawn period.
    DensityUp,
    /// Higher spawn period.
    DensityDown,
    LengthUp,
    LengthDown,
    ShiftScheme(i32),
    SelectScheme(Scheme),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Command(Command),
    /// A pressed key with no binding. Screensaver mode quits on these too.
    OtherKey,
    Resize(u16, u16),
}

/// Non-blocking poll: returns immediately with None once no event is
/// pending. Repeat and release key events are swallowed without ending the
/// drain.
pub fn poll_input() -> io::Result<Option<InputEvent>> {
    while event::poll(Duration::from_millis(0))? {
        match event::read()? {
            Event::Resize(w, h) => return Ok(Some(InputEvent::Resize(w, h))),
            Event::Key(k) if k.kind == KeyEventKind::Press => {
                return Ok(Some(match map_key(k.code) {
                    Some(cmd) => InputEvent::Command(cmd),
                    None => InputEvent::OtherKey,
                }));
            }
            _ => {}
        }
    }
    Ok(None)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuInput {
    Key(KeyCode),
    Resize(u16, u16),
}

/// Blocking read for the modal menu, which has nothing to animate while it
/// waits. Any key press comes back raw; the menu decides what it means.
pub fn wait_input() -> io::Result<MenuInput> {
    loop {
        match event::read()? {
            Event::Resize(w, h) => return Ok(MenuInput::Resize(w, h)),
            Event::Key(k) if k.kind == KeyEventKind::Press => return Ok(MenuInput::Key(k.code)),
            _ => {}
        }
    }
}

pub fn map_key(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(Command::Quit),
        KeyCode::Char(' ') => Some(Command::TogglePause),
        KeyCode::Char('m' | 'M') => Some(Command::OpenMenu),
        KeyCode::Up => Some(Command::SpeedUp),
        KeyCode::Down => Some(Command::SpeedDown),
        KeyCode::Left => Some(Command::ShiftScheme(-1)),
        KeyCode::Right => Some(Command::ShiftScheme(1)),
        KeyCode::Char('w' | 'W') => Some(Command::DensityUp),
        KeyCode::Char('s' | 'S') => Some(Command::DensityDown),
        KeyCode::Char('d' | 'D') => Some(Command::LengthUp),
        KeyCode::Char('a' | 'A') => Some(Command::LengthDown),
        KeyCode::Char('x' | 'X') => Some(Command::SelectScheme(Scheme::Test)),
        KeyCode::Char('g' | 'G') => Some(Command::SelectScheme(Scheme::Green)),
        KeyCode::Char('b' | 'B') => Some(Command::SelectScheme(Scheme::Blue)),
        KeyCode::Char('r' | 'R') => Some(Command::SelectScheme(Scheme::Red)),
        KeyCode::Char('y' | 'Y') => Some(Command::SelectScheme(Scheme::Yellow)),
        _ => None,
    }
}
