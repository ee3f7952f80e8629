// src/control.rs

//! Keyboard control while watching: one command per line on stdin.
//!
//! | input          | event                |
//! |----------------|----------------------|
//! | `r`, `run`     | re-run the snippet   |
//! | `k`, `kill`    | kill the live run    |
//! | `q`, `quit`    | kill and exit        |

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::{SessionEvent, TriggerReason};

/// Map one input line to an event. Blank and unknown lines map to `None`.
pub fn parse_command(line: &str) -> Option<SessionEvent> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "run" => Some(SessionEvent::RunRequested {
            reason: TriggerReason::Manual,
        }),
        "k" | "kill" => Some(SessionEvent::KillRequested),
        "q" | "quit" | "exit" => Some(SessionEvent::ShutdownRequested),
        _ => None,
    }
}

/// Forward commands read from `input` until it closes or the runtime goes
/// away. End of input is not a shutdown: a closed stdin just stops control.
pub async fn forward_commands<R>(input: R, runtime_tx: mpsc::Sender<SessionEvent>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("control input closed");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read control input");
                return;
            }
        };

        let Some(event) = parse_command(&line) else {
            if !line.trim().is_empty() {
                eprintln!("jplay: unknown command {:?} (r = run, k = kill, q = quit)", line.trim());
            }
            continue;
        };
        if runtime_tx.send(event).await.is_err() {
            return;
        }
    }
}

/// Read commands from the process's stdin.
pub fn spawn_stdin_control(runtime_tx: mpsc::Sender<SessionEvent>) -> JoinHandle<()> {
    tokio::spawn(forward_commands(BufReader::new(tokio::io::stdin()), runtime_tx))
}
