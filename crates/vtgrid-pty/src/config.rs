//! Session configuration.

use std::time::Duration;

/// Configuration for a PTY-backed terminal session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Grid height in rows.
    pub rows: u16,
    /// Grid width in columns.
    pub cols: u16,
    /// Program to spawn on the PTY.
    pub shell: String,
    /// Arguments passed to the program.
    pub shell_args: Vec<String>,
    /// TERM to set in the child.
    pub term: String,
    /// Extra environment variables to set in the child.
    pub env: Vec<(String, String)>,
    /// Scrollback cap in lines.
    pub scrollback: usize,
    /// Worker poll timeout; bounds paste-drain latency.
    pub poll_interval: Duration,
    /// Cell width in pixels, from the host's font metrics.
    pub cell_width: u16,
    /// Cell height in pixels, from the host's font metrics.
    pub cell_height: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            shell: "/bin/bash".to_string(),
            shell_args: Vec::new(),
            term: "xterm-256color".to_string(),
            env: Vec::new(),
            scrollback: 5000,
            poll_interval: Duration::from_millis(100),
            cell_width: 12,
            cell_height: 24,
        }
    }
}

impl SessionConfig {
    /// Override the grid dimensions.
    #[must_use]
    pub fn with_size(mut self, rows: u16, cols: u16) -> Self {
        self.rows = rows.max(1);
        self.cols = cols.max(1);
        self
    }

    /// Override the spawned program.
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Add an argument for the spawned program.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.shell_args.push(arg.into());
        self
    }

    /// Override TERM in the child.
    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    /// Add an environment variable in the child.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Override the scrollback cap.
    #[must_use]
    pub fn with_scrollback(mut self, lines: usize) -> Self {
        self.scrollback = lines;
        self
    }

    /// Override the worker poll timeout.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Supply the renderer's cell size in pixels.
    #[must_use]
    pub fn with_cell_metrics(mut self, width: u16, height: u16) -> Self {
        self.cell_width = width.max(1);
        self.cell_height = height.max(1);
        self
    }
}
