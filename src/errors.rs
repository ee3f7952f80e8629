// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JplayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The snippet declares a type whose name is reserved by the host.
    #[error("refusing to compile a type named '{0}': that name is reserved")]
    TransformRefused(String),

    /// A `class` keyword was found but no name could be read after it.
    #[error("could not determine the declared type name")]
    UnnamedType,

    #[error("failed to write source file {path:?}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Fatal Error: Java compiler not found ({0}). Install a JDK or set run.java_home.")]
    ToolchainMissing(String),

    #[error("compilation of '{class}' failed with exit code {status}")]
    CompileFailure { class: String, status: i32 },

    #[error("failed to start '{program}': {source}")]
    SpawnFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, JplayError>;
