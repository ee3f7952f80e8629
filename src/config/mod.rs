// src/config/mod.rs

//! Configuration loading and validation for jplay.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, falling back to defaults (`loader.rs`).
//! - Validate class names and split argument strings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{BuildSection, ConfigFile, RawConfigFile, RunSection, RunSettings, TransformSection};
pub use validate::split_args;
