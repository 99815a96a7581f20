// Copyright (c) 2026 rezky_nightky

use clap::builder::styling::{AnsiColor, Color, Effects, Style};
use clap::builder::Styles;
use clap::Parser;

pub const MIN_DELAY_MS: u64 = 10;
pub const MAX_DELAY_MS: u64 = 200;
const DELAY_STEP_MS: u64 = 10;

pub const MIN_PERIOD: u32 = 20;
pub const MAX_PERIOD: u32 = 200;
const PERIOD_STEP: u32 = 5;

pub const MIN_HEIGHT_FRACTION: f64 = 0.06;
pub const MAX_HEIGHT_FRACTION: f64 = 1.01;
const HEIGHT_FRACTION_STEP: f64 = 0.05;

/// Live-adjustable simulation parameters. One instance is threaded by
/// reference through the frame loop, the spawn policy, and the input
/// handlers; there are no ambient globals. Shifts that would leave a range
/// are ignored, so hammering a key parks the value at the bound.
#[derive(Clone, Copy, Debug)]
pub struct Tunables {
    /// Sleep between frames; lower is faster rain.
    pub delay_ms: u64,
    /// Per-column spawn period; lower is denser rain.
    pub period: u32,
    /// Upper bound on streak length as a fraction of the visible height.
    pub height_fraction: f64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            delay_ms: 100,
            period: 50,
            height_fraction: 0.5,
        }
    }
}

impl Tunables {
    pub fn shift_delay(&mut self, direction: i32) {
        if direction > 0 && self.delay_ms + DELAY_STEP_MS <= MAX_DELAY_MS {
            self.delay_ms += DELAY_STEP_MS;
        } else if direction < 0 && self.delay_ms >= MIN_DELAY_MS + DELAY_STEP_MS {
            self.delay_ms -= DELAY_STEP_MS;
        }
    }

    pub fn shift_period(&mut self, direction: i32) {
        if direction > 0 && self.period + PERIOD_STEP <= MAX_PERIOD {
            self.period += PERIOD_STEP;
        } else if direction < 0 && self.period >= MIN_PERIOD + PERIOD_STEP {
            self.period -= PERIOD_STEP;
        }
    }

    pub fn shift_height(&mut self, direction: i32) {
        if direction > 0 && self.height_fraction < MAX_HEIGHT_FRACTION {
            self.height_fraction += HEIGHT_FRACTION_STEP;
        } else if direction < 0 && self.height_fraction > MIN_HEIGHT_FRACTION {
            self.height_fraction -= HEIGHT_FRACTION_STEP;
        }
    }
}

fn clap_styles() -> Styles {
    Styles::styled()
        .header(
            Style::new()
                .effects(Effects::BOLD)
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .usage(
            Style::new()
                .effects(Effects::BOLD)
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta))))
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphrain", version, about, styles = clap_styles())]
pub struct Args {
    #[arg(
        short = 'c',
        long = "color",
        default_value = "green",
        help_heading = "APPEARANCE",
        help = "Color scheme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,8,24). Default: auto-detect from COLORTERM/TERM"
    )]
    pub colormode: Option<u8>,

    #[arg(
        long = "charset",
        default_value = "auto",
        help_heading = "APPEARANCE",
        help = "Glyph set (auto, matrix, ascii)"
    )]
    pub charset: String,

    #[arg(
        short = 'd',
        long = "delay",
        default_value_t = 100,
        help_heading = "SIMULATION",
        help = "Frame delay in ms (min 10 max 200)"
    )]
    pub delay: u64,

    #[arg(
        short = 'p',
        long = "period",
        default_value_t = 50,
        help_heading = "SIMULATION",
        help = "Spawn period, lower is denser (min 20 max 200)"
    )]
    pub period: u32,

    #[arg(
        short = 'H',
        long = "height",
        default_value_t = 0.5,
        help_heading = "SIMULATION",
        help = "Max streak height as a fraction of the screen (min 0.06 max 1.01)"
    )]
    pub height: f64,

    #[arg(
        long = "seed",
        help_heading = "SIMULATION",
        help = "Seed the RNG for a reproducible run"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress, skip the menu)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color schemes and exit"
    )]
    pub list_colors: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_pins_at_exact_bounds() {
        let mut t = Tunables::default();
        for _ in 0..100 {
            t.shift_period(1);
        }
        assert_eq!(t.period, MAX_PERIOD);
        for _ in 0..100 {
            t.shift_period(-1);
        }
        assert_eq!(t.period, MIN_PERIOD);
    }

    #[test]
    fn delay_pins_at_exact_bounds() {
        let mut t = Tunables::default();
        for _ in 0..100 {
            t.shift_delay(1);
        }
        assert_eq!(t.delay_ms, MAX_DELAY_MS);
        for _ in 0..100 {
            t.shift_delay(-1);
        }
        assert_eq!(t.delay_ms, MIN_DELAY_MS);
    }

    #[test]
    fn height_saturates_and_stops_moving() {
        let mut t = Tunables::default();
        for _ in 0..100 {
            t.shift_height(-1);
        }
        let floor = t.height_fraction;
        t.shift_height(-1);
        assert_eq!(t.height_fraction, floor);
        assert!(floor < MIN_HEIGHT_FRACTION + HEIGHT_FRACTION_STEP);

        for _ in 0..100 {
            t.shift_height(1);
        }
        let ceil = t.height_fraction;
        t.shift_height(1);
        assert_eq!(t.height_fraction, ceil);
        assert!(ceil > MAX_HEIGHT_FRACTION - HEIGHT_FRACTION_STEP);
    }

    #[test]
    fn zero_direction_is_a_noop() {
        let mut t = Tunables::default();
        let before = t;
        t.shift_delay(0);
        t.shift_period(0);
        t.shift_height(0);
        assert_eq!(t.delay_ms, before.delay_ms);
        assert_eq!(t.period, before.period);
        assert_eq!(t.height_fraction, before.height_fraction);
    }
}
