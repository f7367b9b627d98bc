//! The collaborator seam.
//!
//! The engine is a pure library: PTY writes, clipboard access, and window
//! control are injected through this trait. Every method has a no-op default
//! so hosts implement only what their platform provides.

/// Callbacks the terminal engine invokes on its host.
pub trait Host {
    /// Write reply bytes (device attributes, status reports, OSC colour
    /// reports) back to the child process.
    ///
    /// Called while the caller holds the terminal lock; implementations
    /// target a non-blocking descriptor and loop over short writes.
    fn write_to_pty(&mut self, bytes: &[u8]) {
        let _ = bytes;
    }

    /// OSC 52: the child placed base64-encoded text on the clipboard.
    fn copy(&mut self, base64: &str) {
        let _ = base64;
    }

    /// OSC 52 query: the child asked for the clipboard contents. The reply
    /// is emitted later, when [`poll_paste`](Self::poll_paste) yields.
    fn request_paste(&mut self) {}

    /// Poll for pending clipboard data (base64). The PTY worker drains this
    /// once per loop iteration.
    fn poll_paste(&mut self) -> Option<String> {
        None
    }

    /// DECCOLM switched the column count; the host resizes its window.
    /// The host owns font metrics, so the unit is columns.
    fn resize_window_cols(&mut self, cols: u16) {
        let _ = cols;
    }

    /// Grid geometry changed from inside the byte stream (DECCOLM); the
    /// session propagates the new size to the PTY.
    fn pty_resize(&mut self, rows: u16, cols: u16) {
        let _ = (rows, cols);
    }

    /// Frame bracket for the render path.
    fn before_draw(&mut self) {}

    /// Frame bracket for the render path.
    fn after_draw(&mut self) {}
}

/// A host that discards everything; used by tests and benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {}
