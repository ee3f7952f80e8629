// src/config/validate.rs

use crate::build::BuildOptions;
use crate::config::model::{ConfigFile, RawConfigFile, RunSettings};
use crate::errors::{JplayError, Result};
use crate::scan::is_ident_char;
use crate::transform::TransformOptions;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = JplayError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_transform(&raw)?;

        let build = BuildOptions {
            workdir: raw.build.workdir,
            compile_args: split_args("build.compile_args", raw.build.compile_args.as_deref())?,
            verbose: raw.build.verbose,
        };
        let run = RunSettings {
            run_args: split_args("run.run_args", raw.run.run_args.as_deref())?,
            java_home: raw.run.java_home,
        };
        let transform = TransformOptions {
            wrapper_class: raw.transform.wrapper_class,
            reserved_class: raw.transform.reserved_class,
            default_imports: raw.transform.default_imports,
        };

        Ok(ConfigFile::new_unchecked(build, run, transform))
    }
}

fn validate_transform(cfg: &RawConfigFile) -> Result<()> {
    let t = &cfg.transform;
    for (key, name) in [
        ("transform.wrapper_class", &t.wrapper_class),
        ("transform.reserved_class", &t.reserved_class),
    ] {
        if !is_java_identifier(name) {
            return Err(JplayError::ConfigError(format!(
                "{key} must be a Java identifier (got '{name}')"
            )));
        }
    }

    if t.wrapper_class == t.reserved_class {
        return Err(JplayError::ConfigError(format!(
            "transform.wrapper_class and transform.reserved_class must differ (both '{}')",
            t.wrapper_class
        )));
    }

    for import in &t.default_imports {
        if import.trim().is_empty() || import.contains(';') {
            return Err(JplayError::ConfigError(format!(
                "transform.default_imports entries must be bare names like 'java.util.*' (got '{import}')"
            )));
        }
    }
    Ok(())
}

/// Split a shell-style argument string. `None` and blank mean no arguments.
pub fn split_args(key: &str, value: Option<&str>) -> Result<Vec<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(Vec::new());
    };
    shlex::split(value).ok_or_else(|| {
        JplayError::ConfigError(format!("{key} has unbalanced quotes: {value}"))
    })
}

fn is_java_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_ident_char(c) && !c.is_ascii_digit() => chars.all(is_ident_char),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(toml_text: &str) -> RawConfigFile {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn defaults_validate() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.transform, TransformOptions::default());
        assert!(cfg.build.compile_args.is_empty());
    }

    #[test]
    fn quoted_arguments_stay_together() {
        let args = split_args("k", Some(r#"-cp "lib dir/*" -g"#)).unwrap();
        assert_eq!(args, vec!["-cp", "lib dir/*", "-g"]);
    }

    #[test]
    fn blank_argument_string_is_empty() {
        assert!(split_args("k", Some("   ")).unwrap().is_empty());
        assert!(split_args("k", None).unwrap().is_empty());
    }

    #[test]
    fn unbalanced_quotes_are_rejected() {
        let err = ConfigFile::try_from(raw("[run]\nrun_args = '-Dx=\"oops'")).unwrap_err();
        assert!(matches!(err, JplayError::ConfigError(msg) if msg.contains("run.run_args")));
    }

    #[test]
    fn wrapper_must_differ_from_reserved() {
        let err = ConfigFile::try_from(raw(
            "[transform]\nwrapper_class = \"Playground\"",
        ))
        .unwrap_err();
        assert!(matches!(err, JplayError::ConfigError(_)));
    }

    #[test]
    fn class_names_must_be_identifiers() {
        for bad in ["1Main", "My Main", "", "Main;"] {
            let text = format!("[transform]\nwrapper_class = {bad:?}");
            assert!(ConfigFile::try_from(raw(&text)).is_err(), "{bad:?} accepted");
        }
        assert!(ConfigFile::try_from(raw("[transform]\nwrapper_class = \"_Snippet$1\"")).is_ok());
    }

    #[test]
    fn default_imports_must_be_bare_names() {
        let err = ConfigFile::try_from(raw(
            "[transform]\ndefault_imports = [\"java.util.*;\"]",
        ))
        .unwrap_err();
        assert!(matches!(err, JplayError::ConfigError(_)));
    }
}
