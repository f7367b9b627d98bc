//! The PTY I/O worker: byte pump, child restart, paste draining.
//!
//! A dedicated reader thread blocks on the PTY and forwards chunks over a
//! channel; the worker thread receives with a bounded timeout so the
//! clipboard paste queue makes progress even while the child is quiet. The
//! terminal lock is held only while parsing a received chunk.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use portable_pty::{MasterPty, PtySize};
use tracing::{debug, info, warn};
use vtgrid_core::{Host, Terminal};

use crate::config::SessionConfig;
use crate::pty::{PtyLink, open_shell};

/// Notice printed into the grid when the child goes away.
pub(crate) const RESTART_NOTICE: &str = "[program exited, restarting]";

pub(crate) type SharedTerminal = Arc<Mutex<Terminal>>;
pub(crate) type SharedHost = Arc<Mutex<Box<dyn Host + Send>>>;
pub(crate) type SharedLink = Arc<Mutex<Option<PtyLink>>>;

#[derive(Debug)]
pub(crate) enum ReaderMsg {
    Data(Vec<u8>),
    Eof,
    Err(io::Error),
}

/// Spawn the blocking reader for one child; ends when the child hangs up.
pub(crate) fn spawn_reader(mut reader: Box<dyn Read + Send>, tx: Sender<ReaderMsg>) {
    thread::spawn(move || {
        let mut buf = [0u8; 8192];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    let _ = tx.send(ReaderMsg::Eof);
                    break;
                }
                Ok(n) => {
                    if tx.send(ReaderMsg::Data(buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx.send(ReaderMsg::Err(err));
                    break;
                }
            }
        }
    });
}

/// Write all of `bytes`, looping over short writes and transient errors.
///
/// The PTY descriptor is effectively non-blocking for the small replies the
/// engine emits, so the retry loop terminates quickly in practice.
pub(crate) fn write_full(writer: &mut (dyn Write + Send), mut bytes: &[u8]) -> io::Result<()> {
    while !bytes.is_empty() {
        match writer.write(bytes) {
            Ok(0) => return Err(io::Error::new(io::ErrorKind::WriteZero, "pty writer closed")),
            Ok(n) => bytes = &bytes[n..],
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                ) => {}
            Err(err) => return Err(err),
        }
    }
    writer.flush()
}

/// Adapter handed to the parser during a feed: routes reply bytes to the
/// live PTY writer and geometry changes to the master, delegating the
/// clipboard and window callbacks to the embedding host.
pub(crate) struct WiredHost<'a> {
    pub(crate) client: &'a mut dyn Host,
    pub(crate) writer: &'a mut (dyn Write + Send),
    pub(crate) master: Option<&'a (dyn MasterPty + Send)>,
}

impl Host for WiredHost<'_> {
    fn write_to_pty(&mut self, bytes: &[u8]) {
        if let Err(err) = write_full(self.writer, bytes) {
            warn!(%err, "failed to write reply to pty");
        }
    }

    fn copy(&mut self, base64: &str) {
        self.client.copy(base64);
    }

    fn request_paste(&mut self) {
        self.client.request_paste();
    }

    fn poll_paste(&mut self) -> Option<String> {
        self.client.poll_paste()
    }

    fn resize_window_cols(&mut self, cols: u16) {
        self.client.resize_window_cols(cols);
    }

    fn pty_resize(&mut self, rows: u16, cols: u16) {
        if let Some(master) = self.master {
            let result = master.resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            });
            if let Err(err) = result {
                warn!(%err, "failed to push window size to pty");
            }
        }
    }

    fn before_draw(&mut self) {
        self.client.before_draw();
    }

    fn after_draw(&mut self) {
        self.client.after_draw();
    }
}

pub(crate) struct Worker {
    pub(crate) terminal: SharedTerminal,
    pub(crate) host: SharedHost,
    pub(crate) link: SharedLink,
    pub(crate) rx: Receiver<ReaderMsg>,
    pub(crate) tx: Sender<ReaderMsg>,
    pub(crate) config: SessionConfig,
    pub(crate) stop: Arc<AtomicBool>,
}

impl Worker {
    pub(crate) fn run(mut self) {
        while !self.stop.load(Ordering::Relaxed) {
            match self.rx.recv_timeout(self.config.poll_interval) {
                Ok(ReaderMsg::Data(bytes)) => self.feed(&bytes),
                Ok(ReaderMsg::Eof) => self.restart_child(),
                Ok(ReaderMsg::Err(err)) => {
                    // EIO is the usual way a vanished child surfaces.
                    info!(%err, "pty read failed, treating as child exit");
                    self.restart_child();
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.drain_paste();
        }
        debug!("pty worker stopped");
    }

    /// Parse one chunk under the terminal lock.
    fn feed(&self, bytes: &[u8]) {
        let Ok(mut terminal) = self.terminal.lock() else {
            return;
        };
        let Ok(mut host) = self.host.lock() else {
            return;
        };
        let Ok(mut link) = self.link.lock() else {
            return;
        };
        match link.as_mut() {
            Some(link) => {
                let mut wired = WiredHost {
                    client: host.as_mut(),
                    writer: link.writer.as_mut(),
                    master: Some(link.master.as_ref()),
                };
                terminal.feed(bytes, &mut wired);
            }
            // No child attached; still honour the bytes (replies are lost).
            None => terminal.feed(bytes, host.as_mut()),
        }
    }

    /// The child went away: drop the dead link, announce the restart in the
    /// grid, fork a fresh shell at the current grid size.
    fn restart_child(&mut self) {
        if self.stop.load(Ordering::Relaxed) {
            return;
        }
        info!("child exited, restarting shell");

        if let Ok(mut link) = self.link.lock() {
            *link = None;
        }

        let (rows, cols) = match self.terminal.lock() {
            Ok(mut terminal) => {
                terminal.insert_notice(RESTART_NOTICE);
                (terminal.grid().rows(), terminal.grid().cols())
            }
            Err(_) => return,
        };

        match open_shell(&self.config, rows, cols) {
            Ok((link, reader)) => {
                spawn_reader(reader, self.tx.clone());
                if let Ok(mut slot) = self.link.lock() {
                    *slot = Some(link);
                }
            }
            Err(err) => warn!(%err, "failed to restart shell"),
        }
    }

    /// Forward one pending clipboard paste as an OSC 52 reply.
    fn drain_paste(&self) {
        let payload = match self.host.lock() {
            Ok(mut host) => host.poll_paste(),
            Err(_) => None,
        };
        let Some(payload) = payload else {
            return;
        };
        if crate::clipboard::decode(&payload).is_none() {
            warn!("dropping clipboard paste that is not valid base64 text");
            return;
        }

        let Ok(mut link) = self.link.lock() else {
            return;
        };
        if let Some(link) = link.as_mut() {
            let mut reply = Vec::with_capacity(payload.len() + 9);
            reply.extend_from_slice(b"\x1b]52;c;");
            reply.extend_from_slice(payload.as_bytes());
            reply.extend_from_slice(b"\x1b\\");
            if let Err(err) = write_full(link.writer.as_mut(), &reply) {
                warn!(%err, "failed to write paste to pty");
            }
        }
    }
}
