// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs compiled classes as child processes and relays their output.
//!
//! - [`launcher`] provides the `ProcessLauncher` trait and the tokio-backed
//!   `TokioLauncher` used in production; tests swap in in-memory pipes.
//! - [`pump`] owns the cancellable copy loops from child pipes to the sink.
//! - [`supervisor`] enforces the single-live-child state machine.
//! - [`misuse`] recognises launcher errors caused by a malformed entry point.

pub mod launcher;
pub mod misuse;
pub mod pump;
pub mod supervisor;

pub use launcher::{LiveProcess, OutputStream, ProcessLauncher, SpawnedProcess, TokioLauncher};
pub use misuse::RuntimeMisuse;
pub use pump::{PumpExit, PumpHandle, StreamKind, StreamPump};
pub use supervisor::{ExitReport, LaunchSpec, ProcessSupervisor, RunId, RunPhase, Teardown};
