// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::exec::ExitReport;
use crate::fs::FileSystem;

use super::session::{RunOutcome, Session};
use super::{RuntimeOptions, SessionEvent, SnippetSource};

/// What happened over the runtime's lifetime, for the exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeSummary {
    pub last_outcome: Option<RunOutcome>,
    pub last_exit: Option<ExitReport>,
    pub interrupted: bool,
}

impl RuntimeSummary {
    /// Process exit status for the binary.
    ///
    /// The child's own code when the last run exited normally, 130 after an
    /// interrupt, 1 for anything else (including a run that never started).
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            return 130;
        }
        match (&self.last_outcome, &self.last_exit) {
            (Some(RunOutcome::Started { run_id, .. }), Some(exit)) if exit.run_id == *run_id => {
                exit.code.unwrap_or(1)
            }
            _ => 1,
        }
    }
}

/// Drives a [`Session`] in response to `SessionEvent`s.
///
/// Events are handled one at a time. While a run is live the loop also
/// waits for it to exit, so exit reports interleave with user commands.
pub struct Runtime {
    session: Session,
    source: SnippetSource,
    fs: Arc<dyn FileSystem>,
    event_rx: mpsc::Receiver<SessionEvent>,
    options: RuntimeOptions,
    summary: RuntimeSummary,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("session", &self.session)
            .field("source", &self.source)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

enum Wake {
    Event(Option<SessionEvent>),
    Exited(Option<ExitReport>),
}

impl Runtime {
    pub fn new(
        session: Session,
        source: SnippetSource,
        fs: Arc<dyn FileSystem>,
        event_rx: mpsc::Receiver<SessionEvent>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            session,
            source,
            fs,
            event_rx,
            options,
            summary: RuntimeSummary::default(),
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `SessionEvent`s from `event_rx`.
    /// - Waits for the live child, if any, and reports its exit.
    /// - Returns after `ShutdownRequested`, when every sender is gone, or
    ///   (with `exit_when_idle`) once the first run is over.
    pub async fn run(mut self) -> RuntimeSummary {
        info!(source = ?self.source, "jplay runtime started");

        loop {
            if self.options.exit_when_idle
                && self.summary.last_outcome.is_some()
                && !self.session.awaiting_exit()
            {
                info!("run finished; exiting");
                break;
            }

            let wake = if self.session.awaiting_exit() {
                tokio::select! {
                    ev = self.event_rx.recv() => Wake::Event(ev),
                    report = self.session.wait_for_exit() => Wake::Exited(report),
                }
            } else {
                Wake::Event(self.event_rx.recv().await)
            };

            match wake {
                Wake::Exited(report) => {
                    debug!(?report, "run exited");
                    if report.is_some() {
                        self.summary.last_exit = report;
                    }
                }
                Wake::Event(None) => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
                Wake::Event(Some(SessionEvent::ShutdownRequested)) => {
                    info!("shutdown requested");
                    self.summary.interrupted = self.session.awaiting_exit();
                    break;
                }
                Wake::Event(Some(event)) => self.handle(event).await,
            }
        }

        self.session.shutdown().await;
        info!("runtime exiting");
        self.summary
    }

    async fn handle(&mut self, event: SessionEvent) {
        debug!(?event, "runtime received event");
        match event {
            SessionEvent::RunRequested { reason } => {
                info!(?reason, "run requested");
                let outcome = match self.source.load(self.fs.as_ref()) {
                    Ok(text) => self.session.run_source(&text).await,
                    Err(err) => self.session.report_error(&err),
                };
                self.summary.last_outcome = Some(outcome);
            }
            SessionEvent::KillRequested => self.session.kill().await,
            SessionEvent::ShutdownRequested => {}
        }
    }
}
