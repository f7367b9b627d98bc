//! Child spawn on a fresh pseudo-terminal.

use std::fmt;
use std::io::{self, Read, Write};

use portable_pty::{Child, CommandBuilder, MasterPty, PtySize, native_pty_system};

use crate::config::SessionConfig;

/// The live end of a spawned child: master side, writer, and child handle.
///
/// Replaced wholesale when the child exits and a new one is forked.
pub(crate) struct PtyLink {
    pub(crate) master: Box<dyn MasterPty + Send>,
    pub(crate) writer: Box<dyn Write + Send>,
    pub(crate) child: Box<dyn Child + Send + Sync>,
}

impl fmt::Debug for PtyLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PtyLink")
            .field("child_pid", &self.child.process_id())
            .finish()
    }
}

/// Open a PTY pair sized `rows x cols` and spawn the configured shell on
/// the slave side. Returns the link plus a cloned reader for the pump
/// thread.
pub(crate) fn open_shell(
    config: &SessionConfig,
    rows: u16,
    cols: u16,
) -> io::Result<(PtyLink, Box<dyn Read + Send>)> {
    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(pty_error)?;

    let mut cmd = CommandBuilder::new(&config.shell);
    cmd.args(&config.shell_args);
    cmd.env("TERM", &config.term);
    for (key, value) in &config.env {
        cmd.env(key, value);
    }

    let child = pair.slave.spawn_command(cmd).map_err(pty_error)?;
    let reader = pair.master.try_clone_reader().map_err(pty_error)?;
    let writer = pair.master.take_writer().map_err(pty_error)?;

    Ok((
        PtyLink {
            master: pair.master,
            writer,
            child,
        },
        reader,
    ))
}

/// Push a window-size change to the child.
pub(crate) fn resize_pty(link: &PtyLink, rows: u16, cols: u16) -> io::Result<()> {
    link.master
        .resize(PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(pty_error)
}

fn pty_error<E: fmt::Display>(err: E) -> io::Error {
    io::Error::other(err.to_string())
}
