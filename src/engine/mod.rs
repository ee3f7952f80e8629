// src/engine/mod.rs

//! Orchestration engine for jplay.
//!
//! This module ties together:
//! - the [`Session`], which owns one transformer, build runner and process
//!   supervisor and runs the transform -> build -> kill previous -> spawn
//!   pipeline for a snippet,
//! - the async [`Runtime`] loop that reacts to:
//!   - file-change triggers
//!   - run/kill commands typed on stdin
//!   - child process exit
//!   - shutdown signals

use std::path::PathBuf;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Why a run was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The initial run at start-up.
    Startup,
    /// The snippet file's content changed.
    FileChanged,
    /// The user asked for it (`r` on stdin).
    Manual,
}

/// Events flowing into the runtime from the watcher, stdin and signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// (Re)run the snippet, superseding any live run.
    RunRequested { reason: TriggerReason },
    /// Kill the live run, if any.
    KillRequested,
    /// Kill the live run and stop the runtime.
    ShutdownRequested,
}

/// Runtime options for the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit once the first requested run has finished (or stopped
    /// before spawning). Used when not watching.
    pub exit_when_idle: bool,
}

/// Where the snippet text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetSource {
    /// Re-read on every run.
    File(PathBuf),
    /// Fixed text, e.g. read once from stdin.
    Text(String),
}

impl SnippetSource {
    pub fn load(&self, fs: &dyn FileSystem) -> Result<String> {
        match self {
            SnippetSource::File(path) => Ok(fs.read_to_string(path)?),
            SnippetSource::Text(text) => Ok(text.clone()),
        }
    }
}

pub mod runtime;
pub mod session;

pub use runtime::{Runtime, RuntimeSummary};
pub use session::{RunOutcome, Session, Stage};
