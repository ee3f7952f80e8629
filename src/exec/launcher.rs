// src/exec/launcher.rs

//! Pluggable process launcher.
//!
//! The supervisor never touches `tokio::process` directly. Production code
//! uses [`TokioLauncher`]; tests provide a launcher whose "processes" are
//! in-memory pipes they control.

use std::fmt;
use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::debug;

/// One readable output pipe of a child.
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// A running (or finished but not yet reaped) OS process.
pub trait LiveProcess: Send {
    fn id(&self) -> Option<u32>;

    /// Non-blocking liveness check.
    fn is_alive(&mut self) -> bool;

    /// Forcibly terminate the process and reap it.
    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>>;

    /// Wait for the process to finish. `None` means it was ended by a signal.
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = io::Result<Option<i32>>> + Send + '_>>;
}

/// What a successful spawn hands back.
pub struct SpawnedProcess {
    pub stdout: OutputStream,
    pub stderr: OutputStream,
    pub process: Box<dyn LiveProcess>,
}

impl fmt::Debug for SpawnedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnedProcess")
            .field("pid", &self.process.id())
            .finish_non_exhaustive()
    }
}

pub trait ProcessLauncher: Send + Sync {
    /// Start `program` with `args` in `cwd`, with both output streams piped.
    fn spawn(&self, program: &Path, args: &[String], cwd: &Path) -> io::Result<SpawnedProcess>;
}

/// Launcher backed by `tokio::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn spawn(&self, program: &Path, args: &[String], cwd: &Path) -> io::Result<SpawnedProcess> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;
        debug!(pid = ?child.id(), ?program, ?args, "spawned child process");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("child stderr was not piped"))?;

        Ok(SpawnedProcess {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            process: Box::new(TokioProcess { child }),
        })
    }
}

struct TokioProcess {
    child: Child,
}

impl LiveProcess for TokioProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
        Box::pin(self.child.kill())
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = io::Result<Option<i32>>> + Send + '_>> {
        Box::pin(async move { self.child.wait().await.map(|status| status.code()) })
    }
}
