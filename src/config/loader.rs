// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file and return the raw, unvalidated model.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Like [`load_from_path`], but a missing file yields the defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(?path, "no config file; using defaults");
        return Ok(RawConfigFile::default());
    }
    load_from_path(path)
}

/// Load (or default) and validate.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_or_default(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("Jplay.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_and_validate(dir.path().join("Jplay.toml")).unwrap();
        assert_eq!(cfg, ConfigFile::default());
    }

    #[test]
    fn reads_sections_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Jplay.toml");
        fs::write(
            &path,
            r#"
[build]
compile_args = "-Xlint:all -encoding UTF-8"
verbose = true

[run]
run_args = "-Xmx64m"
"#,
        )
        .unwrap();

        let cfg = load_and_validate(&path).unwrap();
        assert_eq!(cfg.build.compile_args, vec!["-Xlint:all", "-encoding", "UTF-8"]);
        assert!(cfg.build.verbose);
        assert_eq!(cfg.run.run_args, vec!["-Xmx64m"]);
        assert_eq!(cfg.transform.wrapper_class, "Main");
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Jplay.toml");
        fs::write(&path, "[build\nverbose = ").unwrap();
        assert!(matches!(
            load_and_validate(&path),
            Err(crate::errors::JplayError::TomlError(_))
        ));
    }
}
