//! The terminal engine: byte stream in, grid mutations and replies out.
//!
//! `Terminal` owns the grid, the mode set, the active style, the escape
//! parser state, and the UTF-8 decoder. One call to [`Terminal::advance`]
//! consumes exactly one byte; the outcome is either a grid mutation (with
//! the current style), a reply written through the [`Host`], or nothing.
//!
//! The escape-sequence states themselves are driven from the `parser`
//! module; this file covers construction, ground-state dispatch, and the
//! operations the PTY worker calls directly.
//!
//! # Invariants
//!
//! 1. The grid is always `rows x cols` with `rows, cols >= 1`; the cursor
//!    satisfies `row < rows` and `col <= cols` (the rest column past the
//!    last cell is the deferred-wrap state).
//! 2. No input byte sequence can corrupt the grid: unknown escapes are
//!    logged and dropped, and the parser returns to ground.
//! 3. Replies are emitted in input order; the parser is single-threaded
//!    over its byte stream.

use crate::grid::Grid;
use crate::host::Host;
use crate::modes::Modes;
use crate::style::Style;
use crate::utf8::Utf8Decoder;

/// Escape-sequence parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    Ground,
    /// ESC seen; possibly holding intermediates (`#`, `(`, `)`).
    Escape,
    /// Inside CSI, accumulating parameter and intermediate bytes.
    Csi,
    /// Inside OSC, accumulating the text parameter.
    Osc,
    /// Inside DCS; accumulated and discarded.
    Dcs,
}

/// VT100/VT220/xterm terminal state machine.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub(crate) grid: Grid,
    pub(crate) modes: Modes,
    pub(crate) style: Style,
    pub(crate) state: ParseState,
    /// Parameter/intermediate bytes of the sequence in flight.
    pub(crate) seq: Vec<u8>,
    utf8: Utf8Decoder,
}

impl Terminal {
    /// Create a terminal with a blank grid. Dimensions clamp to 1x1.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            modes: Modes::default(),
            style: Style::default(),
            state: ParseState::Ground,
            seq: Vec::new(),
            utf8: Utf8Decoder::new(),
        }
    }

    // ── Read surface ────────────────────────────────────────────────

    /// The cell grid (and scrollback, cursor, region, tab stops).
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Active mode bits.
    #[must_use]
    pub fn modes(&self) -> Modes {
        self.modes
    }

    /// The style newly printed cells receive.
    #[must_use]
    pub fn style(&self) -> Style {
        self.style
    }

    /// Current parser state.
    #[must_use]
    pub fn state(&self) -> ParseState {
        self.state
    }

    // ── Host-driven operations ──────────────────────────────────────

    /// Resize the grid (façade path). The caller owns propagating the new
    /// window size to the PTY.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.grid.resize_to(rows, cols);
    }

    /// Change the scrollback line cap.
    pub fn set_scrollback_capacity(&mut self, capacity: usize) {
        self.grid.set_scrollback_capacity(capacity);
    }

    /// Restore power-on state: blank grid of the same size, default modes
    /// and style, parser at ground, history cleared.
    pub fn reset(&mut self) {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        *self = Self::new(rows, cols);
    }

    /// Print a host message on its own line with the current style.
    ///
    /// Used by the PTY worker to announce a child restart in-band.
    pub fn insert_notice(&mut self, message: &str) {
        if self.grid.cursor().1 > 0 {
            self.grid.index_down();
            self.grid.set_col(0);
        }
        for ch in message.chars() {
            self.insert_printable(ch);
        }
        self.grid.index_down();
        self.grid.set_col(0);
    }

    // ── Byte stream ─────────────────────────────────────────────────

    /// Feed a chunk of child output.
    pub fn feed(&mut self, bytes: &[u8], host: &mut dyn Host) {
        for &byte in bytes {
            self.advance(byte, host);
        }
    }

    /// Advance the state machine by one byte.
    pub fn advance(&mut self, byte: u8, host: &mut dyn Host) {
        match self.state {
            ParseState::Ground => self.ground(byte),
            ParseState::Escape => self.escape(byte),
            ParseState::Csi => self.csi(byte, host),
            ParseState::Osc => self.osc(byte, host),
            ParseState::Dcs => self.dcs(byte),
        }
    }

    fn ground(&mut self, byte: u8) {
        // A multi-byte scalar in flight owns every byte until it completes
        // or the decoder rejects.
        if self.utf8.is_pending() {
            if let Some(ch) = self.utf8.feed(byte) {
                self.insert_printable(ch);
            }
            return;
        }

        match byte {
            0x1b => {
                self.seq.clear();
                self.state = ParseState::Escape;
            }
            b'\r' => self.grid.set_col(0),
            b'\n' => self.grid.index_down(),
            0x08 => self.grid.backspace(),
            b'\t' => self.grid.tab_forward(),
            0x20..=0x7E | 0xC2..=0xF4 => {
                if let Some(ch) = self.utf8.feed(byte) {
                    self.insert_printable(ch);
                }
            }
            // Remaining C0 controls, DEL, and stray continuation bytes.
            _ => {}
        }
    }

    pub(crate) fn insert_printable(&mut self, ch: char) {
        self.grid.insert_cell(
            ch,
            self.style,
            self.modes.contains(Modes::AUTOWRAP),
            self.modes.contains(Modes::INSERT),
        );
    }

    pub(crate) fn origin(&self) -> bool {
        self.modes.contains(Modes::ORIGIN)
    }
}
