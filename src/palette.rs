// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

pub const NUM_TRAIL_SHADES: u8 = 4;

/// Color classification of a drawn glyph. The leading character of a streak
/// is always the bright lead shade; everything behind it cools into one of
/// the trail shades. Mapping a shade to a concrete color is owned by the
/// active scheme, not by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shade {
    Lead,
    Trail(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    Test,
    Green,
    Blue,
    Red,
    Yellow,
}

impl Scheme {
    pub const ALL: [Scheme; 5] = [
        Scheme::Test,
        Scheme::Green,
        Scheme::Blue,
        Scheme::Red,
        Scheme::Yellow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scheme::Test => "test",
            Scheme::Green => "green",
            Scheme::Blue => "blue",
            Scheme::Red => "red",
            Scheme::Yellow => "yellow",
        }
    }

    fn trail_rgb(self) -> [(u8, u8, u8); NUM_TRAIL_SHADES as usize] {
        match self {
            Scheme::Test => [(255, 0, 0), (0, 255, 0), (0, 0, 255), (255, 255, 0)],
            Scheme::Green => [(34, 180, 85), (128, 206, 135), (56, 165, 49), (32, 72, 41)],
            Scheme::Blue => [(74, 184, 249), (9, 65, 152), (14, 35, 115), (9, 0, 136)],
            Scheme::Red => [(212, 0, 0), (240, 57, 57), (148, 0, 0), (92, 16, 16)],
            Scheme::Yellow => [(242, 226, 76), (189, 171, 8), (176, 161, 27), (150, 135, 0)],
        }
    }
}

pub fn parse_scheme(s: &str) -> Result<Scheme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "test" => Ok(Scheme::Test),
        "green" => Ok(Scheme::Green),
        "blue" => Ok(Scheme::Blue),
        "red" => Ok(Scheme::Red),
        "yellow" => Ok(Scheme::Yellow),
        _ => Err(format!("invalid color: {} (see --list-colors)", s)),
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cr = CUBE_LEVELS[r6 as usize];
    let cg = CUBE_LEVELS[g6 as usize];
    let cb = CUBE_LEVELS[b6 as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cr, cg, cb);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let (gr, gg, gb) = if gray_idx == 16 {
        (0, 0, 0)
    } else if gray_idx == 231 {
        (255, 255, 255)
    } else {
        let v = 8 + 10 * (gray_idx - 232);
        (v, v, v)
    };
    let gray_dist = dist2(r, g, b, gr, gg, gb);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn resolve(mode: ColorMode, rgb: (u8, u8, u8)) -> Option<Color> {
    let (r, g, b) = rgb;
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
    }
}

/// The active scheme plus the terminal's color capability. Shade ids stay
/// stable across scheme changes; only the resolution here changes.
#[derive(Clone, Debug)]
pub struct Palette {
    pub scheme: Scheme,
    mode: ColorMode,
    trail: [Option<Color>; NUM_TRAIL_SHADES as usize],
    lead: Option<Color>,
}

impl Palette {
    pub fn new(scheme: Scheme, mode: ColorMode) -> Self {
        let rgb = scheme.trail_rgb();
        let mut trail = [None; NUM_TRAIL_SHADES as usize];
        for (slot, &c) in trail.iter_mut().zip(rgb.iter()) {
            *slot = resolve(mode, c);
        }
        Self {
            scheme,
            mode,
            trail,
            lead: resolve(mode, (255, 255, 255)),
        }
    }

    pub fn activate(&mut self, scheme: Scheme) {
        *self = Palette::new(scheme, self.mode);
    }

    /// Cycle to the adjacent scheme, wrapping at both ends.
    pub fn shift(&mut self, direction: i32) {
        let n = Scheme::ALL.len() as i32;
        let cur = Scheme::ALL
            .iter()
            .position(|&s| s == self.scheme)
            .unwrap_or(0) as i32;
        let next = (cur + direction.signum() + n) % n;
        self.activate(Scheme::ALL[next as usize]);
    }

    /// Foreground color and bold flag for a shade. The lead shade is always
    /// bright and bold; trail indices past the table clamp to the darkest.
    pub fn attr(&self, shade: Shade) -> (Option<Color>, bool) {
        match shade {
            Shade::Lead => (self.lead, true),
            Shade::Trail(i) => {
                let i = (i.min(NUM_TRAIL_SHADES - 1)) as usize;
                (self.trail[i], false)
            }
        }
    }
}

pub fn detect_color_mode() -> ColorMode {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = std::env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }

    ColorMode::Color256
}

pub fn print_list_colors() {
    println!("AVAILABLE COLORS:");
    println!("NOTE: Use the VALUE with --color; single keys switch live.");
    println!();
    println!("VALUE    KEY");
    for s in Scheme::ALL {
        let key = match s {
            Scheme::Test => 'X',
            _ => s.name().chars().next().unwrap_or('?').to_ascii_uppercase(),
        };
        println!("{:<8} {}", s.name(), key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_wraps_both_directions() {
        let mut p = Palette::new(Scheme::Test, ColorMode::TrueColor);
        p.shift(-1);
        assert_eq!(p.scheme, Scheme::Yellow);
        p.shift(1);
        assert_eq!(p.scheme, Scheme::Test);
        for _ in 0..Scheme::ALL.len() {
            p.shift(1);
        }
        assert_eq!(p.scheme, Scheme::Test);
    }

    #[test]
    fn mono_resolves_to_no_color() {
        let p = Palette::new(Scheme::Green, ColorMode::Mono);
        let (fg, bold) = p.attr(Shade::Lead);
        assert_eq!(fg, None);
        assert!(bold);
        assert_eq!(p.attr(Shade::Trail(2)).0, None);
    }

    #[test]
    fn trail_index_clamps_to_darkest() {
        let p = Palette::new(Scheme::Green, ColorMode::TrueColor);
        assert_eq!(p.attr(Shade::Trail(250)).0, p.attr(Shade::Trail(3)).0);
    }

    #[test]
    fn ansi256_hits_cube_corners() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 0, 0), 196);
        assert_eq!(rgb_to_ansi256(0, 255, 0), 46);
    }
}
