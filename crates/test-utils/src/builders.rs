#![allow(dead_code)]

use std::path::PathBuf;

use jplay::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.build.workdir = dir.into();
        self
    }

    pub fn compile_args(mut self, args: &str) -> Self {
        self.config.build.compile_args = Some(args.to_string());
        self
    }

    pub fn verbose(mut self, val: bool) -> Self {
        self.config.build.verbose = val;
        self
    }

    pub fn run_args(mut self, args: &str) -> Self {
        self.config.run.run_args = Some(args.to_string());
        self
    }

    pub fn wrapper_class(mut self, name: &str) -> Self {
        self.config.transform.wrapper_class = name.to_string();
        self
    }

    pub fn reserved_class(mut self, name: &str) -> Self {
        self.config.transform.reserved_class = name.to_string();
        self
    }

    pub fn default_imports(mut self, imports: &[&str]) -> Self {
        self.config.transform.default_imports = imports.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
