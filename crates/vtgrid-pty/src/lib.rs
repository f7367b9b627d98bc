#![forbid(unsafe_code)]

//! PTY worker and session facade for the vtgrid terminal engine.
//!
//! This crate attaches a [`vtgrid_core::Terminal`] to a real child process:
//!
//! - [`SessionConfig`] describes the child (shell, TERM, size) and the
//!   worker cadence.
//! - [`Session`] is the host-facing facade: start, send input, resize,
//!   scroll the view, snapshot a frame.
//! - The worker thread pumps child output into the engine under the shared
//!   lock, restarts the child when it exits, and drains clipboard pastes
//!   into OSC 52 writes.
//!
//! # Safety / policy
//!
//! - `#![forbid(unsafe_code)]`; `portable-pty` supplies the platform PTY.
//! - The terminal lock is held only around parse calls and snapshots, never
//!   across blocking reads.

pub mod clipboard;
pub mod config;
mod pty;
mod session;
mod worker;

pub use config::SessionConfig;
pub use session::Session;
pub use vtgrid_core::{Host, NullHost, Terminal};
