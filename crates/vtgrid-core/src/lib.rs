#![forbid(unsafe_code)]

//! Host-agnostic VT/ANSI terminal engine.
//!
//! `vtgrid-core` is the platform-independent terminal model at the heart of
//! vtgrid. It owns grid state, VT escape-sequence parsing, cursor positioning,
//! and scrollback — all without any host I/O dependencies.
//!
//! # Primary responsibilities
//!
//! - **Style**: colour palette (Solarized light), 256-colour map, text style.
//! - **Grid**: 2D cell matrix with cursor, scroll region, tab stops, and a
//!   bounded scrollback ring.
//! - **Utf8Decoder**: strict UTF-8 state machine (overlongs and surrogates
//!   rejected, malformed input dropped).
//! - **Terminal**: the VT100/VT220/xterm escape parser driving the grid and
//!   synthesising query replies.
//! - **Host**: the narrow collaborator seam for PTY writes, clipboard, and
//!   window control.
//!
//! # Design principles
//!
//! - **No I/O**: all types are pure data + logic; a host adapter supplies the
//!   byte stream (see the companion `vtgrid-pty` crate).
//! - **Deterministic**: identical byte sequences always produce identical
//!   state, and no input can corrupt the grid.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.

pub mod cell;
pub mod grid;
pub mod host;
pub mod modes;
pub mod parser;
pub mod scrollback;
pub mod style;
pub mod terminal;
pub mod utf8;

pub use cell::{Cell, WIDE_STUB};
pub use grid::{Grid, SavedCursor};
pub use host::{Host, NullHost};
pub use modes::Modes;
pub use scrollback::Scrollback;
pub use style::{ANSI_PALETTE, FontWeight, Rgb, Style, ansi_color, xterm_256};
pub use terminal::{ParseState, Terminal};
pub use utf8::{Utf8Decoder, Utf8State};
