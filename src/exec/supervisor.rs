// src/exec/supervisor.rs

//! Single-child process supervisor.
//!
//! At most one child exists at a time. Starting a run always tears down the
//! previous one first, even if it is still producing output. Each run moves
//! through `Spawned -> Streaming -> {Exited | Killed}`:
//!
//! - `Exited` once both pumps have seen end-of-stream,
//! - `Killed` only through an explicit [`ProcessSupervisor::kill`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{JplayError, Result};
use crate::sink::{Sink, Style};

use super::launcher::{LiveProcess, ProcessLauncher};
use super::pump::{PumpExit, PumpHandle, StreamKind, StreamPump};

pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Spawned,
    Streaming,
    Exited,
    Killed,
}

/// How to start the JVM for a compiled class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// The `java` executable.
    pub program: PathBuf,
    /// Extra JVM arguments placed before the class name.
    pub run_args: Vec<String>,
    /// Working directory; compiled classes live here.
    pub cwd: PathBuf,
}

/// Reported once per run when it reaches `Exited`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReport {
    pub run_id: RunId,
    pub class_name: String,
    /// `None` if the process was ended by a signal.
    pub code: Option<i32>,
    pub elapsed: Duration,
}

/// What tearing down a run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teardown {
    pub run_id: RunId,
    pub phase: RunPhase,
    pub stdout: PumpExit,
    pub stderr: PumpExit,
}

/// The one live child and the two pumps attached to it.
struct ProcessHandle {
    run_id: RunId,
    class_name: String,
    process: Box<dyn LiveProcess>,
    stdout: PumpHandle,
    stderr: PumpHandle,
    cancel: CancellationToken,
    phase: RunPhase,
    exit_reported: bool,
    started: Instant,
}

impl ProcessHandle {
    fn phase(&self) -> RunPhase {
        match self.phase {
            RunPhase::Streaming if self.stdout.is_finished() && self.stderr.is_finished() => {
                RunPhase::Exited
            }
            phase => phase,
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // Pumps must never outlive their handle.
        self.cancel.cancel();
    }
}

pub struct ProcessSupervisor {
    launcher: Arc<dyn ProcessLauncher>,
    sink: Arc<dyn Sink>,
    spec: LaunchSpec,
    current: Option<ProcessHandle>,
    next_run_id: RunId,
}

impl fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("spec", &self.spec)
            .field("run_id", &self.current.as_ref().map(|h| h.run_id))
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl ProcessSupervisor {
    pub fn new(launcher: Arc<dyn ProcessLauncher>, sink: Arc<dyn Sink>, spec: LaunchSpec) -> Self {
        Self {
            launcher,
            sink,
            spec,
            current: None,
            next_run_id: 1,
        }
    }

    /// Phase of the current run, if there is one.
    pub fn phase(&self) -> Option<RunPhase> {
        self.current.as_ref().map(ProcessHandle::phase)
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.current.as_ref().map(|h| h.run_id)
    }

    /// True while the child's output is still being streamed.
    pub fn is_live(&self) -> bool {
        matches!(self.phase(), Some(RunPhase::Spawned | RunPhase::Streaming))
    }

    /// True if there is a run whose exit has not been reported yet.
    pub fn awaiting_exit(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.exit_reported)
    }

    /// Start `class_name` with `args`, superseding any current run.
    pub async fn run(&mut self, class_name: &str, args: &[String]) -> Result<RunId> {
        self.kill().await;

        let mut argv = self.spec.run_args.clone();
        argv.push(class_name.to_string());
        argv.extend(args.iter().cloned());

        let spawned = self
            .launcher
            .spawn(&self.spec.program, &argv, &self.spec.cwd)
            .map_err(|source| JplayError::SpawnFailure {
                program: self.spec.program.display().to_string(),
                source,
            })?;

        let run_id = self.next_run_id;
        self.next_run_id += 1;

        let cancel = CancellationToken::new();
        let mut handle = ProcessHandle {
            run_id,
            class_name: class_name.to_string(),
            stdout: StreamPump::new(
                StreamKind::Stdout,
                spawned.stdout,
                Arc::clone(&self.sink),
                cancel.clone(),
            )
            .spawn(),
            stderr: StreamPump::new(
                StreamKind::Stderr,
                spawned.stderr,
                Arc::clone(&self.sink),
                cancel.clone(),
            )
            .spawn(),
            process: spawned.process,
            cancel,
            phase: RunPhase::Spawned,
            exit_reported: false,
            started: Instant::now(),
        };
        handle.phase = RunPhase::Streaming;

        info!(
            run_id,
            class = %class_name,
            pid = ?handle.process.id(),
            "child process started"
        );
        self.current = Some(handle);
        Ok(run_id)
    }

    /// Tear down the current run, if any.
    ///
    /// Cancels both pumps and waits for them, then kills the process if it
    /// is still alive, then forgets the handle. Returns the final phase of
    /// the run and how each pump stopped; `None` when there was nothing to do.
    pub async fn kill(&mut self) -> Option<Teardown> {
        let mut handle = self.current.take()?;
        let phase_before = handle.phase();

        handle.cancel.cancel();
        let out = handle.stdout.join().await;
        let err = handle.stderr.join().await;
        debug!(run_id = handle.run_id, ?out, ?err, "pumps stopped");

        if handle.process.is_alive() {
            if let Err(e) = handle.process.kill().await {
                warn!(run_id = handle.run_id, error = %e, "failed to kill child process");
            }
        }

        let final_phase = match phase_before {
            RunPhase::Exited => RunPhase::Exited,
            _ => RunPhase::Killed,
        };
        handle.phase = final_phase;

        if final_phase == RunPhase::Killed {
            info!(run_id = handle.run_id, class = %handle.class_name, "child process killed");
            self.sink.append_line("Process reset.", Style::Status);
        } else {
            debug!(run_id = handle.run_id, "cleared exited run");
        }
        Some(Teardown {
            run_id: handle.run_id,
            phase: final_phase,
            stdout: out,
            stderr: err,
        })
    }

    /// Wait until the current run reaches `Exited` and report it.
    ///
    /// Returns `None` right away if there is no run or its exit was already
    /// reported. Cancel-safe with respect to the pumps.
    pub async fn wait_for_exit(&mut self) -> Option<ExitReport> {
        let handle = self.current.as_mut().filter(|h| !h.exit_reported)?;

        let out = handle.stdout.join().await;
        let err = handle.stderr.join().await;
        handle.phase = RunPhase::Exited;
        debug!(run_id = handle.run_id, ?out, ?err, "both output streams ended");

        let code = match handle.process.wait().await {
            Ok(code) => code,
            Err(e) => {
                warn!(run_id = handle.run_id, error = %e, "failed to reap child process");
                None
            }
        };
        handle.exit_reported = true;

        let report = ExitReport {
            run_id: handle.run_id,
            class_name: handle.class_name.clone(),
            code,
            elapsed: handle.started.elapsed(),
        };
        info!(
            run_id = report.run_id,
            exit_code = ?report.code,
            elapsed = ?report.elapsed,
            "child process exited"
        );
        Some(report)
    }
}
