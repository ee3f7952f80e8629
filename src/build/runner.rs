// src/build/runner.rs

//! Persist a compilation unit and compile it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::errors::{JplayError, Result};
use crate::fs::FileSystem;
use crate::sink::{Sink, Style};
use crate::transform::CompilationUnit;

use super::compiler::Compiler;
use super::diagnostics::{self, Diagnostic};

/// Settings the build step needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Directory holding `<Class>.java` and the compiled classes.
    pub workdir: PathBuf,
    /// Extra compiler arguments, already split.
    pub compile_args: Vec<String>,
    /// Echo each build step to the sink.
    pub verbose: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from(".jplay"),
            compile_args: Vec::new(),
            verbose: false,
        }
    }
}

/// Result of a build that got as far as running the compiler.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub success: bool,
    pub status: i32,
    pub diagnostics: Vec<Diagnostic>,
    pub source_path: PathBuf,
    pub elapsed: Duration,
}

pub struct BuildRunner {
    fs: Arc<dyn FileSystem>,
    compiler: Option<Arc<dyn Compiler>>,
    options: BuildOptions,
}

impl std::fmt::Debug for BuildRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildRunner")
            .field("fs", &self.fs)
            .field("has_compiler", &self.compiler.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl BuildRunner {
    /// `compiler = None` means no toolchain is installed; every build will
    /// then fail with [`JplayError::ToolchainMissing`].
    pub fn new(
        fs: Arc<dyn FileSystem>,
        compiler: Option<Arc<dyn Compiler>>,
        options: BuildOptions,
    ) -> Self {
        Self {
            fs,
            compiler,
            options,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.options.workdir
    }

    /// Where the unit's source file is written.
    pub fn source_path(&self, unit: &CompilationUnit) -> PathBuf {
        self.options.workdir.join(unit.file_name())
    }

    /// Delete stale artifacts, write the unit, compile it.
    ///
    /// - Write failures and a missing compiler are errors; the compiler is
    ///   not run after a failed write.
    /// - A non-zero compiler exit is a normal outcome: the report comes back
    ///   with `success == false` and the diagnostics were already relayed to
    ///   `sink`.
    pub async fn build(&self, unit: &CompilationUnit, sink: &dyn Sink) -> Result<BuildReport> {
        let started = Instant::now();
        let class = unit.class_name();
        let source_path = self.source_path(unit);
        let class_path = self.options.workdir.join(format!("{class}.class"));

        self.progress(sink, "Deleting old temp files...");
        let mut stale = vec![source_path.clone(), class_path];
        stale.extend(self.nested_class_files(class));
        for path in &stale {
            if let Err(e) = self.fs.remove_if_exists(path) {
                warn!(path = ?path, error = %e, "could not remove stale build file");
            }
        }

        self.progress(sink, "Writing code to source file...");
        self.fs
            .write(&source_path, unit.source().as_bytes())
            .map_err(|source| JplayError::WriteFailure {
                path: source_path.clone(),
                source,
            })?;

        let Some(compiler) = self.compiler.as_ref() else {
            return Err(JplayError::ToolchainMissing("no javac on JAVA_HOME or PATH".to_string()));
        };

        self.progress(sink, "Compiling code...");
        let output = compiler
            .compile(&source_path, &self.options.compile_args)
            .await?;

        diagnostics::forward(&output.output, sink);
        let diagnostics = diagnostics::parse(&output.output);
        let elapsed = started.elapsed();

        info!(
            class = %class,
            status = output.status,
            diagnostics = diagnostics.len(),
            ?elapsed,
            "build finished"
        );

        if !output.success() {
            sink.append_line("Failed to compile.", Style::Warning);
        }

        Ok(BuildReport {
            success: output.success(),
            status: output.status,
            diagnostics,
            source_path,
            elapsed,
        })
    }

    /// `<Class>$*.class` files left by inner and anonymous classes.
    fn nested_class_files(&self, class: &str) -> Vec<PathBuf> {
        let prefix = format!("{class}$");
        match self.fs.list_dir(&self.options.workdir) {
            Ok(files) => files
                .into_iter()
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".class"))
                })
                .collect(),
            Err(e) => {
                warn!(dir = ?self.options.workdir, error = %e, "could not list build directory");
                Vec::new()
            }
        }
    }

    fn progress(&self, sink: &dyn Sink, step: &str) {
        if self.options.verbose {
            sink.append_line(step, Style::Status);
        }
    }
}
