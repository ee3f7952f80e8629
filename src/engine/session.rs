// src/engine/session.rs

//! The run pipeline for one interactive session.
//!
//! A [`Session`] is the explicit context object that every step shares: it
//! owns the transformer, the build runner, the supervisor with its single
//! live child, and the sink. Nothing here propagates errors to the caller;
//! every failure is written to the sink and summarised as a [`RunOutcome`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::build::BuildRunner;
use crate::errors::{JplayError, Result};
use crate::exec::{ExitReport, ProcessSupervisor, RunId};
use crate::sink::{Sink, Style};
use crate::transform::ScriptTransformer;

const SEPARATOR: &str = "----------------------------------------";

/// Pipeline step at which a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Transform,
    Write,
    Toolchain,
    Compile,
    Spawn,
    Internal,
}

impl Stage {
    fn of(err: &JplayError) -> Self {
        match err {
            JplayError::TransformRefused(_) | JplayError::UnnamedType => Stage::Transform,
            JplayError::WriteFailure { .. } => Stage::Write,
            JplayError::ToolchainMissing(_) => Stage::Toolchain,
            JplayError::CompileFailure { .. } => Stage::Compile,
            JplayError::SpawnFailure { .. } => Stage::Spawn,
            JplayError::IoError(_) => Stage::Load,
            _ => Stage::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A child process was spawned and is streaming.
    Started { run_id: RunId, class_name: String },
    /// The pipeline stopped early; the reason was already reported.
    Stopped(Stage),
}

impl RunOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, RunOutcome::Started { .. })
    }
}

pub struct Session {
    transformer: ScriptTransformer,
    builder: BuildRunner,
    supervisor: ProcessSupervisor,
    sink: Arc<dyn Sink>,
    program_args: Vec<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("builder", &self.builder)
            .field("supervisor", &self.supervisor)
            .field("program_args", &self.program_args)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        transformer: ScriptTransformer,
        builder: BuildRunner,
        supervisor: ProcessSupervisor,
        sink: Arc<dyn Sink>,
    ) -> Self {
        Self {
            transformer,
            builder,
            supervisor,
            sink,
            program_args: Vec::new(),
        }
    }

    /// Arguments passed to the snippet's `main`.
    pub fn with_program_args(mut self, args: Vec<String>) -> Self {
        self.program_args = args;
        self
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    /// Transform, build, kill the previous run, spawn.
    ///
    /// A snippet that fails to transform or compile leaves the previous run
    /// untouched.
    pub async fn run_source(&mut self, text: &str) -> RunOutcome {
        match self.try_run(text).await {
            Ok((run_id, class_name)) => RunOutcome::Started { run_id, class_name },
            Err(err) => {
                let stage = Stage::of(&err);
                self.report(&err);
                RunOutcome::Stopped(stage)
            }
        }
    }

    /// Report an error raised outside the pipeline (e.g. reading the file).
    pub fn report_error(&self, err: &JplayError) -> RunOutcome {
        self.report(err);
        RunOutcome::Stopped(Stage::of(err))
    }

    async fn try_run(&mut self, text: &str) -> Result<(RunId, String)> {
        let unit = self.transformer.transform(text)?;
        let class_name = unit.class_name().to_string();
        debug!(class = %class_name, kind = ?unit.kind(), "snippet transformed");

        let report = self.builder.build(&unit, self.sink.as_ref()).await?;
        if !report.success {
            return Err(JplayError::CompileFailure {
                class: class_name,
                status: report.status,
            });
        }

        // Kill first so the reset notice lands before the new run's banner.
        self.supervisor.kill().await;
        self.sink.append_line(
            &format!("Build succeeded in {} ms", report.elapsed.as_millis()),
            Style::Status,
        );
        self.sink.append_line(SEPARATOR, Style::Status);

        let run_id = self.supervisor.run(&class_name, &self.program_args).await?;
        Ok((run_id, class_name))
    }

    fn report(&self, err: &JplayError) {
        match err {
            // Diagnostics and "Failed to compile." were already relayed.
            JplayError::CompileFailure { class, status } => {
                info!(class = %class, status, "compile failed; nothing spawned");
            }
            _ => {
                warn!(error = %err, "run stopped");
                self.sink.append_line(&err.to_string(), Style::Diagnostic);
            }
        }
    }

    /// Kill the live run; a no-op when nothing is running.
    pub async fn kill(&mut self) {
        self.supervisor.kill().await;
    }

    pub fn awaiting_exit(&self) -> bool {
        self.supervisor.awaiting_exit()
    }

    /// Wait for the current run to exit and report its exit status.
    ///
    /// Cancel-safe; see [`ProcessSupervisor::wait_for_exit`].
    pub async fn wait_for_exit(&mut self) -> Option<ExitReport> {
        let report = self.supervisor.wait_for_exit().await?;
        let line = match report.code {
            Some(code) => format!(
                "Process exited with code {code} ({} ms)",
                report.elapsed.as_millis()
            ),
            None => format!(
                "Process terminated by signal ({} ms)",
                report.elapsed.as_millis()
            ),
        };
        self.sink.append_line(&line, Style::Status);
        Some(report)
    }

    /// Tear down the live run before the session goes away.
    pub async fn shutdown(&mut self) {
        debug!("session shutting down");
        self.supervisor.kill().await;
    }
}
