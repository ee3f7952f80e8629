// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::build::BuildOptions;
use crate::transform::{TransformOptions, DEFAULT_IMPORTS};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [build]
/// compile_args = "-Xlint:all"
/// workdir = ".jplay"
/// verbose = false
///
/// [run]
/// run_args = "-Xmx256m"
/// java_home = "/usr/lib/jvm/default"
///
/// [transform]
/// wrapper_class = "Main"
/// reserved_class = "Playground"
/// default_imports = ["java.util.*", "java.io.*"]
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub transform: TransformSection,
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Extra `javac` arguments as a single shell-style string.
    #[serde(default)]
    pub compile_args: Option<String>,

    /// Where generated sources and compiled classes are kept.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,

    /// Echo each build step to the output.
    #[serde(default)]
    pub verbose: bool,
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".jplay")
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            compile_args: None,
            workdir: default_workdir(),
            verbose: false,
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSection {
    /// Extra `java` arguments, placed before the class name.
    #[serde(default)]
    pub run_args: Option<String>,

    /// JDK root; `bin/javac` and `bin/java` are looked up beneath it.
    #[serde(default)]
    pub java_home: Option<PathBuf>,
}

/// `[transform]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformSection {
    #[serde(default = "default_wrapper_class")]
    pub wrapper_class: String,

    #[serde(default = "default_reserved_class")]
    pub reserved_class: String,

    #[serde(default = "default_imports")]
    pub default_imports: Vec<String>,
}

fn default_wrapper_class() -> String {
    "Main".to_string()
}

fn default_reserved_class() -> String {
    "Playground".to_string()
}

fn default_imports() -> Vec<String> {
    DEFAULT_IMPORTS.iter().map(|s| s.to_string()).collect()
}

impl Default for TransformSection {
    fn default() -> Self {
        Self {
            wrapper_class: default_wrapper_class(),
            reserved_class: default_reserved_class(),
            default_imports: default_imports(),
        }
    }
}

/// `[run]` after validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSettings {
    pub run_args: Vec<String>,
    pub java_home: Option<PathBuf>,
}

/// Validated configuration.
///
/// Construct via `ConfigFile::try_from(raw)` (see `validate.rs`); argument
/// strings are already split and class names checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub build: BuildOptions,
    pub run: RunSettings,
    pub transform: TransformOptions,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        build: BuildOptions,
        run: RunSettings,
        transform: TransformOptions,
    ) -> Self {
        Self {
            build,
            run,
            transform,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            BuildOptions::default(),
            RunSettings::default(),
            TransformOptions::default(),
        )
    }
}
