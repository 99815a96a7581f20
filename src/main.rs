// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod config;
mod drop;
mod frame;
mod input;
mod palette;
mod rain;
mod terminal;

use std::io;
use std::thread;
use std::time::Duration;

use clap::Parser;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::cell::Cell;
use crate::charset::{charset_from_str, default_to_ascii};
use crate::config::{
    Args, Tunables, MAX_DELAY_MS, MAX_HEIGHT_FRACTION, MAX_PERIOD, MIN_DELAY_MS,
    MIN_HEIGHT_FRACTION, MIN_PERIOD,
};
use crate::drop::RegistryStats;
use crate::frame::Frame;
use crate::input::{Command, InputEvent, MenuInput};
use crate::palette::{
    detect_color_mode, parse_scheme, print_list_colors, ColorMode, Palette, Shade,
};
use crate::rain::Rain;
use crate::terminal::{restore_terminal_best_effort, Terminal};

fn require_u64_range(name: &str, v: u64, min: u64, max: u64) -> u64 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_u32_range(name: &str, v: u32, min: u32, max: u32) -> u32 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn resolve_color_mode(args: &Args) -> ColorMode {
    match args.colormode {
        None => detect_color_mode(),
        Some(0) => ColorMode::Mono,
        Some(8) => ColorMode::Color256,
        Some(24) => ColorMode::TrueColor,
        Some(m) => {
            eprintln!("invalid --colormode: {} (allowed: 0,8,24)", m);
            std::process::exit(1);
        }
    }
}

const MENU_LINES: [&str; 15] = [
    "Press any key to exit menu",
    "",
    "MENU:            M",
    "QUIT:            Q or ESCAPE",
    "Play / Pause:    SPACE",
    "",
    "Change Speed:    UP and DOWN",
    "Change Color:    LEFT and RIGHT",
    "Change Length:   A and D",
    "Change Density:  W and S",
    "",
    "Color Red:       R",
    "Color Green:     G",
    "Color Blue:      B",
    "Color Yellow:    Y",
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum MenuOutcome {
    Resume,
    Quit,
}

/// Modal control menu. Entering it discards every in-flight drop; the
/// simulation restarts from an empty field on resume.
fn run_menu(
    term: &mut Terminal,
    frame: &mut Frame,
    palette: &Palette,
    rain: &mut Rain,
) -> io::Result<MenuOutcome> {
    rain.clear_drops();
    loop {
        frame.clear_all();
        for (row, line) in MENU_LINES.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if col >= frame.width as usize || row >= frame.height as usize {
                    break;
                }
                let cell = Cell {
                    ch,
                    shade: Shade::Lead,
                };
                frame.set(col as u16, row as u16, cell);
            }
        }
        term.draw(frame, palette)?;

        match input::wait_input()? {
            MenuInput::Resize(nw, nh) => *frame = Frame::new(nw, nh),
            MenuInput::Key(code) => {
                if input::map_key(code) == Some(Command::Quit) {
                    return Ok(MenuOutcome::Quit);
                }
                break;
            }
        }
    }
    frame.clear_all();
    Ok(MenuOutcome::Resume)
}

fn print_diagnostics(stats: RegistryStats) {
    println!("drops created: {}", stats.created);
    println!("drops destroyed: {}", stats.destroyed);
    println!("drops leaked: {}", stats.created - stats.destroyed);
    println!("max live drops: {}", stats.high_water);
}

fn main() -> io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let args = Args::parse();

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    let mut tunables = Tunables {
        delay_ms: require_u64_range("--delay", args.delay, MIN_DELAY_MS, MAX_DELAY_MS),
        period: require_u32_range("--period", args.period, MIN_PERIOD, MAX_PERIOD),
        height_fraction: require_f64_range(
            "--height",
            args.height,
            MIN_HEIGHT_FRACTION,
            MAX_HEIGHT_FRACTION,
        ),
    };

    let scheme = match parse_scheme(&args.color) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let color_mode = resolve_color_mode(&args);

    let glyphs = match charset_from_str(&args.charset, default_to_ascii()) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut palette = Palette::new(scheme, color_mode);
    let mut rain = Rain::new(glyphs, args.seed);

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let mut frame = Frame::new(w, h);

    if !args.screensaver && run_menu(&mut term, &mut frame, &palette, &mut rain)? == MenuOutcome::Quit
    {
        drop(term);
        print_diagnostics(rain.stats());
        return Ok(());
    }

    let mut running = true;
    let mut paused = false;

    while running {
        // Drain pending input; while paused this loop is also the idle
        // cadence, repainting only and never stepping the simulation.
        loop {
            while let Some(ev) = input::poll_input()? {
                match ev {
                    InputEvent::Resize(nw, nh) => {
                        frame = Frame::new(nw, nh);
                    }
                    InputEvent::Command(_) | InputEvent::OtherKey if args.screensaver => {
                        running = false;
                    }
                    InputEvent::OtherKey => {}
                    InputEvent::Command(cmd) => match cmd {
                        Command::Quit => running = false,
                        Command::TogglePause => paused = !paused,
                        Command::OpenMenu => {
                            if run_menu(&mut term, &mut frame, &palette, &mut rain)?
                                == MenuOutcome::Quit
                            {
                                running = false;
                            }
                            paused = false;
                        }
                        Command::SpeedUp => tunables.shift_delay(-1),
                        Command::SpeedDown => tunables.shift_delay(1),
                        Command::DensityUp => tunables.shift_period(-1),
                        Command::DensityDown => tunables.shift_period(1),
                        Command::LengthUp => tunables.shift_height(1),
                        Command::LengthDown => tunables.shift_height(-1),
                        Command::ShiftScheme(d) => {
                            palette.shift(d);
                            frame.mark_all_dirty();
                        }
                        Command::SelectScheme(s) => {
                            palette.activate(s);
                            frame.mark_all_dirty();
                        }
                    },
                }
            }

            if !running || !paused {
                break;
            }
            if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
                term.draw(&mut frame, &palette)?;
            }
            thread::sleep(Duration::from_millis(tunables.delay_ms));
        }
        if !running {
            break;
        }

        let (w, h) = (frame.width, frame.height);
        rain.step(w, h, &mut frame);
        rain.spawn(w, h, &tunables)
            .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;

        if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
            term.draw(&mut frame, &palette)?;
        }
        thread::sleep(Duration::from_millis(tunables.delay_ms));
    }

    rain.clear_drops();
    drop(term);
    print_diagnostics(rain.stats());
    Ok(())
}
