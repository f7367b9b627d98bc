//! The host-facing session facade.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, info, warn};
use vtgrid_core::{Host, Terminal};

use crate::config::SessionConfig;
use crate::pty::{open_shell, resize_pty};
use crate::worker::{SharedHost, SharedLink, SharedTerminal, Worker, spawn_reader, write_full};

/// A running terminal session: engine, child process, and worker thread.
///
/// The engine state is behind one mutex shared with the worker; facade
/// calls take it briefly and never across blocking I/O. Dropping the
/// session stops the worker and kills the child.
pub struct Session {
    terminal: SharedTerminal,
    host: SharedHost,
    link: SharedLink,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    config: SessionConfig,
    /// Scroll-view offset in pixels above the live bottom.
    scroll_offset: Mutex<f32>,
}

impl Session {
    /// Spawn the configured shell on a fresh PTY and start the worker.
    pub fn start(config: SessionConfig, host: impl Host + Send + 'static) -> io::Result<Self> {
        let mut terminal = Terminal::new(config.rows, config.cols);
        terminal.set_scrollback_capacity(config.scrollback);
        let terminal: SharedTerminal = Arc::new(Mutex::new(terminal));
        let host: SharedHost = Arc::new(Mutex::new(Box::new(host)));

        let (link, reader) = open_shell(&config, config.rows, config.cols)?;
        info!(shell = %config.shell, rows = config.rows, cols = config.cols, "session started");
        let link: SharedLink = Arc::new(Mutex::new(Some(link)));

        let (tx, rx) = mpsc::channel();
        spawn_reader(reader, tx.clone());

        let stop = Arc::new(AtomicBool::new(false));
        let worker = Worker {
            terminal: Arc::clone(&terminal),
            host: Arc::clone(&host),
            link: Arc::clone(&link),
            rx,
            tx,
            config: config.clone(),
            stop: Arc::clone(&stop),
        };
        let handle = std::thread::Builder::new()
            .name("vtgrid-pty-worker".to_string())
            .spawn(move || worker.run())?;

        Ok(Self {
            terminal,
            host,
            link,
            stop,
            worker: Some(handle),
            config,
            scroll_offset: Mutex::new(0.0),
        })
    }

    /// Write user input to the child and snap the scroll view back to the
    /// live bottom. Input is dropped while no child is attached (the brief
    /// restart window).
    pub fn send_input(&self, bytes: &[u8]) -> io::Result<()> {
        self.reset_scroll();
        let mut link = lock_or_io(&self.link)?;
        match link.as_mut() {
            Some(link) => write_full(link.writer.as_mut(), bytes),
            None => {
                debug!("input dropped, no child attached");
                Ok(())
            }
        }
    }

    /// Resize to an explicit grid geometry and push it to the PTY.
    pub fn resize_grid(&self, rows: u16, cols: u16) -> io::Result<()> {
        {
            let mut terminal = lock_or_io(&self.terminal)?;
            terminal.resize(rows, cols);
        }
        let link = lock_or_io(&self.link)?;
        if let Some(link) = link.as_ref() {
            resize_pty(link, rows.max(1), cols.max(1))?;
        }
        Ok(())
    }

    /// Resize from window pixels using the configured cell metrics.
    pub fn resize_px(&self, width: u32, height: u32) -> io::Result<()> {
        let cols = (width / u32::from(self.config.cell_width).max(1)).max(1);
        let rows = (height / u32::from(self.config.cell_height).max(1)).max(1);
        self.resize_grid(rows.min(u32::from(u16::MAX)) as u16, cols.min(u32::from(u16::MAX)) as u16)
    }

    /// Natural scrolling over history: positive `delta` scrolls toward the
    /// live bottom. The offset clamps to the history extent.
    pub fn scroll_by(&self, delta: f32) {
        let max = {
            let Ok(terminal) = self.terminal.lock() else {
                return;
            };
            terminal.grid().history_len() as f32 * f32::from(self.config.cell_height)
        };
        if let Ok(mut offset) = self.scroll_offset.lock() {
            *offset = (*offset - delta).clamp(0.0, max);
        }
    }

    /// The scroll offset expressed in whole history lines.
    #[must_use]
    pub fn scroll_offset_rows(&self) -> usize {
        self.scroll_offset
            .lock()
            .map(|offset| (*offset / f32::from(self.config.cell_height)) as usize)
            .unwrap_or(0)
    }

    fn reset_scroll(&self) {
        if let Ok(mut offset) = self.scroll_offset.lock() {
            *offset = 0.0;
        }
    }

    /// Run one frame: `before_draw`, snapshot under the lock, `after_draw`.
    ///
    /// The closure must copy what it needs; the lock is released before
    /// `after_draw` so GPU work never runs under it.
    pub fn render_frame<R>(&self, frame: impl FnOnce(&Terminal) -> R) -> Option<R> {
        if let Ok(mut host) = self.host.lock() {
            host.before_draw();
        }
        let result = {
            let terminal = self.terminal.lock().ok()?;
            frame(&terminal)
        };
        if let Ok(mut host) = self.host.lock() {
            host.after_draw();
        }
        Some(result)
    }

    /// The shared engine, for hosts that drive their own frame cadence.
    #[must_use]
    pub fn terminal(&self) -> Arc<Mutex<Terminal>> {
        Arc::clone(&self.terminal)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Ok(mut link) = self.link.lock() {
            if let Some(link) = link.as_mut() {
                if let Err(err) = link.child.kill() {
                    warn!(%err, "failed to kill child on shutdown");
                }
            }
            *link = None;
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn lock_or_io<'a, T>(mutex: &'a Mutex<T>) -> io::Result<std::sync::MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| io::Error::other("terminal state lock poisoned"))
}
