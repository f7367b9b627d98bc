//! DEC private and ANSI mode tracking.

use bitflags::bitflags;

bitflags! {
    /// Terminal mode bits toggled by CSI h / CSI l.
    ///
    /// Modes the grammar accepts but that have no effect on the grid
    /// (application cursor keys, mouse reporting, bracketed paste) are not
    /// tracked here; they are forwarded to the host or dropped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modes: u8 {
        /// DECTCEM: cursor visible.
        const SHOW_CURSOR   = 1 << 0;
        /// DECAWM: wrap to the next line at the right margin.
        const AUTOWRAP      = 1 << 1;
        /// DECSCNM: reverse video for the whole screen.
        const REVERSE_VIDEO = 1 << 2;
        /// DECOM: cursor addressing relative to the scrolling region.
        const ORIGIN        = 1 << 3;
        /// IRM: insert instead of replace on print.
        const INSERT        = 1 << 4;
        /// Blinking cursor (CSI ? 12).
        const BLINK_CURSOR  = 1 << 5;
    }
}

impl Default for Modes {
    fn default() -> Self {
        Modes::SHOW_CURSOR | Modes::AUTOWRAP
    }
}
