// src/sink/console.rs

//! Terminal presentation for sink messages.

use std::io::Write;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{SinkMessage, Style};

/// Drain `rx` onto the terminal until every sender is gone.
///
/// Child standard output goes to stdout; everything else (child stderr,
/// diagnostics, hints, status lines) goes to stderr so that piping `jplay`
/// captures only the program's own output.
pub fn spawn_console_writer(mut rx: mpsc::UnboundedReceiver<SinkMessage>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            write_message(&msg);
        }
        debug!("console writer finished (sink closed)");
    })
}

fn write_message(msg: &SinkMessage) {
    let result = match msg.style {
        Style::Normal => {
            let mut out = std::io::stdout().lock();
            out.write_all(msg.text.as_bytes()).and_then(|_| out.flush())
        }
        _ => {
            let mut err = std::io::stderr().lock();
            err.write_all(msg.text.as_bytes()).and_then(|_| err.flush())
        }
    };

    if let Err(e) = result {
        debug!(error = %e, "failed to write to terminal");
    }
}
