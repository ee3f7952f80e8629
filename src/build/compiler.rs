// src/build/compiler.rs

//! Pluggable compiler abstraction.
//!
//! The build runner talks to a `Compiler` instead of spawning `javac`
//! directly, so tests can swap in a fake that records invocations and returns
//! canned diagnostics.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{JplayError, Result};

/// What a compiler run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    /// Exit status; zero means success.
    pub status: i32,
    /// Everything the compiler printed, stdout then stderr.
    pub output: String,
}

impl CompileOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

pub trait Compiler: Send + Sync {
    /// Compile the file at `source`, passing `extra_args` before it.
    ///
    /// Returns [`JplayError::ToolchainMissing`] if the compiler binary itself
    /// cannot be started.
    fn compile<'a>(
        &'a self,
        source: &'a Path,
        extra_args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<CompileOutput>> + Send + 'a>>;
}

/// Runs the JDK's `javac` as a child process.
#[derive(Debug, Clone)]
pub struct JavacCompiler {
    program: PathBuf,
}

impl JavacCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Compiler for JavacCompiler {
    fn compile<'a>(
        &'a self,
        source: &'a Path,
        extra_args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<CompileOutput>> + Send + 'a>> {
        Box::pin(async move {
            info!(program = ?self.program, ?source, ?extra_args, "invoking compiler");

            let mut cmd = Command::new(&self.program);
            cmd.args(extra_args)
                .arg(source)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());

            let out = match cmd.output().await {
                Ok(out) => out,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(JplayError::ToolchainMissing(format!(
                        "{} not found",
                        self.program.display()
                    )));
                }
                Err(e) => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("running compiler {:?}", self.program))
                        .into());
                }
            };

            let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
            output.push_str(&String::from_utf8_lossy(&out.stderr));
            let status = out.status.code().unwrap_or(-1);
            debug!(status, bytes = output.len(), "compiler finished");

            Ok(CompileOutput { status, output })
        })
    }
}
