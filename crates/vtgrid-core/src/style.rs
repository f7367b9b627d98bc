//! Colour palette and text style.
//!
//! Colours are resolved to concrete RGB at the moment an SGR parameter is
//! applied, so a cell never stores a palette index. This is what makes the
//! eager reverse-video swap (SGR 7/27) well-defined: later colour SGRs write
//! into the swapped slots, matching xterm.

/// 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The 16 named ANSI colours (Solarized light), indexed 0..=15 in the order
/// black, red, green, yellow, blue, magenta, cyan, white, then the bright
/// variants of the same.
pub const ANSI_PALETTE: [Rgb; 16] = [
    Rgb::new(7, 54, 66),    // black
    Rgb::new(220, 50, 47),  // red
    Rgb::new(13, 153, 0),   // green
    Rgb::new(181, 137, 0),  // yellow
    Rgb::new(38, 139, 210), // blue
    Rgb::new(221, 54, 130), // magenta
    Rgb::new(42, 161, 152), // cyan
    Rgb::new(238, 232, 213),// white
    Rgb::new(0, 43, 54),    // bright black
    Rgb::new(203, 75, 22),  // bright red
    Rgb::new(88, 110, 117), // bright green
    Rgb::new(101, 123, 131),// bright yellow
    Rgb::new(131, 148, 150),// bright blue
    Rgb::new(108, 113, 196),// bright magenta
    Rgb::new(147, 161, 161),// bright cyan
    Rgb::new(253, 246, 227),// bright white
];

/// Look up one of the 16 named ANSI colours.
///
/// Indices past 15 alias the last entry; callers mask before calling.
#[must_use]
pub fn ansi_color(index: u8) -> Rgb {
    ANSI_PALETTE[(index as usize).min(15)]
}

/// Convert a 256-colour palette index to RGB.
///
/// 0..=15 alias the ANSI palette, 16..=231 form the 6x6x6 cube with the
/// xterm channel steps {0, 95, 135, 175, 215, 255}, and 232..=255 form a
/// 24-step greyscale ramp (8, 18, ..., 238).
#[must_use]
pub fn xterm_256(index: u8) -> Rgb {
    const STEPS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    match index {
        0..=15 => ansi_color(index),
        16..=231 => {
            let n = index - 16;
            let r = n / 36;
            let g = (n / 6) % 6;
            let b = n % 6;
            Rgb::new(STEPS[r as usize], STEPS[g as usize], STEPS[b as usize])
        }
        232..=255 => {
            let v = 8 + 10 * (index - 232);
            Rgb::new(v, v, v)
        }
    }
}

/// Font weight selected by SGR 1 / SGR 22.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// The active text style applied to newly written cells.
///
/// Default foreground is the palette's black, default background its white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Rgb,
    pub bg: Rgb,
    pub weight: FontWeight,
    pub blink: bool,
    /// Whether fg/bg are currently swapped (SGR 7 active).
    reversed: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fg: ANSI_PALETTE[0],
            bg: ANSI_PALETTE[7],
            weight: FontWeight::Regular,
            blink: false,
            reversed: false,
        }
    }
}

impl Style {
    /// Reset to the default style (SGR 0).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether SGR 7 is currently in effect.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// SGR 7 / SGR 27: swap foreground and background eagerly.
    ///
    /// The swap happens at most once per direction, so repeated SGR 7 is
    /// idempotent and 7 followed by 27 restores the prior style exactly.
    pub fn set_reversed(&mut self, reversed: bool) {
        if self.reversed != reversed {
            core::mem::swap(&mut self.fg, &mut self.bg);
            self.reversed = reversed;
        }
    }

    /// Reset the foreground to the default (SGR 39).
    ///
    /// Writes the slot currently rendered as foreground; with SGR 7 active
    /// that is the swapped slot, as xterm does.
    pub fn reset_fg(&mut self) {
        self.fg = ANSI_PALETTE[0];
    }

    /// Reset the background to the default (SGR 49).
    pub fn reset_bg(&mut self) {
        self.bg = ANSI_PALETTE[7];
    }
}
