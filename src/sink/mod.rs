// src/sink/mod.rs

//! Output sink abstraction.
//!
//! Everything the pipeline wants to show the user (program output, compiler
//! diagnostics, status lines) goes through a [`Sink`]. The sink is the only
//! shared, concurrently mutated resource in the core: both stream pumps of a
//! run append to it at the same time.
//!
//! - [`ChannelSink`] turns every append into a message on an unbounded
//!   channel, so producers never block on presentation.
//! - [`console`] drains such a channel onto the terminal.

pub mod console;

use std::fmt;

use tokio::sync::mpsc;
use tracing::warn;

pub use console::spawn_console_writer;

/// Presentation tag attached to every append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// Child standard output.
    Normal,
    /// Child standard error.
    Error,
    /// Compiler diagnostics and host error reports.
    Diagnostic,
    /// Warnings and actionable hints.
    Warning,
    /// Host status lines (build succeeded, process reset, ...).
    Status,
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Style::Normal => "normal",
            Style::Error => "error",
            Style::Diagnostic => "diagnostic",
            Style::Warning => "warning",
            Style::Status => "status",
        };
        f.write_str(s)
    }
}

/// Consumer of textual output.
///
/// Implementations must tolerate concurrent calls from several producers and
/// must keep each individual `append` atomic with respect to the others.
pub trait Sink: Send + Sync {
    fn append(&self, text: &str, style: Style);

    fn append_line(&self, text: &str, style: Style) {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        self.append(&line, style);
    }
}

/// A single append, as sent over a [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkMessage {
    pub text: String,
    pub style: Style,
}

/// Sink that forwards appends as messages to whoever owns presentation.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkMessage>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Sink for ChannelSink {
    fn append(&self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        let msg = SinkMessage {
            text: text.to_string(),
            style,
        };
        // Nothing below the sink can report this, so log and drop.
        if self.tx.send(msg).is_err() {
            warn!(%style, "output sink closed; dropping {} bytes", text.len());
        }
    }
}
