// Copyright (c) 2026 rezky_nightky

use std::collections::TryReserveError;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Tunables;
use crate::drop::{DropRegistry, RegistryStats};
use crate::frame::Frame;
use crate::palette::{Shade, NUM_TRAIL_SHADES};

/// Columns whose margin is within this many rows of the top accept no new
/// drop this frame.
pub const MIN_CLEARANCE: i32 = 5;

/// Horizontal tolerance past the right edge before a drop is culled, so a
/// shrink resize doesn't visibly pop streaks.
pub const X_SLACK: u16 = 10;

/// Margin sentinel for a column with no live drop this frame.
pub const NO_DROP: i32 = i32::MAX;

/// Per-column minimum of `row - length` across the drops seen this frame.
/// Rebuilt from scratch every frame; the backing storage grows to the
/// terminal width and never shrinks.
pub struct MarginTracker {
    margins: Vec<i32>,
}

impl MarginTracker {
    pub fn new() -> Self {
        Self {
            margins: Vec::new(),
        }
    }

    /// Grow to at least `width` and reinitialize every in-range entry.
    /// Must run before any observe/get in a frame.
    pub fn begin_frame(&mut self, width: u16) {
        let w = width as usize;
        if self.margins.len() < w {
            self.margins.resize(w, NO_DROP);
        }
        for m in &mut self.margins[..w] {
            *m = NO_DROP;
        }
    }

    pub fn observe(&mut self, column: u16, top: i32) {
        if let Some(m) = self.margins.get_mut(column as usize) {
            if top < *m {
                *m = top;
            }
        }
    }

    pub fn get(&self, column: u16) -> i32 {
        self.margins
            .get(column as usize)
            .copied()
            .unwrap_or(NO_DROP)
    }

    #[allow(dead_code)]
    pub fn capacity(&self) -> usize {
        self.margins.len()
    }
}

/// The simulation engine: the drop registry, the margin tracker, and the
/// RNG driving glyph choice, trail shading, streak length, and spawns.
pub struct Rain {
    registry: DropRegistry,
    margins: MarginTracker,
    glyphs: Vec<char>,
    rng: StdRng,
}

impl Rain {
    pub fn new(glyphs: Vec<char>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        let glyphs = if glyphs.is_empty() {
            vec!['0', '1']
        } else {
            glyphs
        };
        Self {
            registry: DropRegistry::new(),
            margins: MarginTracker::new(),
            glyphs,
            rng,
        }
    }

    /// Advance every live drop one row in a single pass: cool the previous
    /// lead into a random trail shade, fold the trailing edge into the
    /// margin tracker, step down, erase the cell that just fell out of the
    /// streak, draw the new lead. The erase uses the post-step row so the
    /// colored rows for a drop are always exactly `(row - length, row]`.
    /// Drops whose column is off-screen advance nothing and simply wait for
    /// the removal test.
    pub fn step(&mut self, width: u16, height: u16, frame: &mut Frame) {
        self.margins.begin_frame(width);
        let glyph_count = self.glyphs.len();

        let mut cur = self.registry.head();
        while let Some(h) = cur {
            let d = self.registry.get_mut(h).expect("cursor yields live handles");
            if d.column < width {
                let cool = Shade::Trail(self.rng.random_range(0..NUM_TRAIL_SHADES));
                frame.write_glyph(d.row, d.column, d.last_glyph, cool);
                self.margins.observe(d.column, d.row - d.length);
                d.row += 1;
                frame.write_blank(d.row - d.length, d.column);
                let glyph = self.glyphs[self.rng.random_range(0..glyph_count)];
                frame.write_glyph(d.row, d.column, glyph, Shade::Lead);
                d.last_glyph = glyph;
            }

            let (column, row, length) = (d.column, d.row, d.length);
            let off_right = (column as u32) > (width as u32) + (X_SLACK as u32);
            let off_bottom = row - length > height as i32;
            cur = if off_right || off_bottom {
                self.registry.remove(h)
            } else {
                self.registry.next(h)
            };
        }
    }

    /// Per-column spawn decisions, independent draws. A column is skipped
    /// while any of its drops is still within MIN_CLEARANCE of the top;
    /// otherwise one draw decides: hit the 1-in-period residue AND land
    /// under the column's margin, which biases spawns toward columns with
    /// more open headroom. Empty columns carry the sentinel margin, making
    /// the second test vacuous there.
    pub fn spawn(
        &mut self,
        width: u16,
        height: u16,
        cfg: &Tunables,
    ) -> Result<(), TryReserveError> {
        let modulus = (height as u32).max(1);
        let period = cfg.period.max(1);
        for column in 0..width {
            let margin = self.margins.get(column);
            if margin < MIN_CLEARANCE {
                continue;
            }
            let draw: u32 = self.rng.random();
            if draw % period != 1 {
                continue;
            }
            if ((draw % modulus) as i32) < margin {
                self.registry
                    .create(column, height as i32, cfg.height_fraction, &mut self.rng)?;
            }
        }
        Ok(())
    }

    /// Discard every in-flight drop. Menu entry and teardown both reset
    /// through here.
    pub fn clear_drops(&mut self) {
        self.registry.clear();
    }

    #[allow(dead_code)]
    pub fn live(&self) -> usize {
        self.registry.len()
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }
}
