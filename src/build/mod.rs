// src/build/mod.rs

//! Build step: write the synthesized unit to disk and compile it.
//!
//! - [`runner`] owns the sequence delete-stale → write → compile.
//! - [`compiler`] provides the `Compiler` trait and the `javac` backend.
//! - [`toolchain`] finds `javac` / `java`.
//! - [`diagnostics`] parses and relays compiler output.

pub mod compiler;
pub mod diagnostics;
pub mod runner;
pub mod toolchain;

pub use compiler::{CompileOutput, Compiler, JavacCompiler};
pub use diagnostics::{Diagnostic, Severity};
pub use runner::{BuildOptions, BuildReport, BuildRunner};
pub use toolchain::Toolchain;
