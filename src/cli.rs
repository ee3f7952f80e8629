// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `jplay`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jplay",
    version,
    about = "Compile and run Java snippets: bare statements, free methods, or whole classes.",
    long_about = None
)]
pub struct CliArgs {
    /// Snippet file. Read from stdin when omitted.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Re-run whenever FILE changes; `r`/`k`/`q` on stdin run, kill, quit.
    #[arg(long, short = 'w', requires = "file")]
    pub watch: bool,

    /// Print the generated compilation unit without building anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the config file (TOML). A missing file means defaults.
    ///
    /// Default: `Jplay.toml` in the current working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JPLAY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Extra javac arguments, overriding `build.compile_args`.
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    pub compile_args: Option<String>,

    /// Extra java arguments, overriding `run.run_args`.
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    pub run_args: Option<String>,

    /// Directory for generated sources and classes, overriding `build.workdir`.
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Arguments passed to the snippet's `main`.
    #[arg(last = true, value_name = "ARGS")]
    pub program_args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_arguments_go_to_the_program() {
        let args = CliArgs::try_parse_from(["jplay", "a.java", "--", "one", "--two"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("a.java")));
        assert_eq!(args.program_args, vec!["one", "--two"]);
        assert!(!args.watch);
    }

    #[test]
    fn watch_needs_a_file() {
        assert!(CliArgs::try_parse_from(["jplay", "--watch"]).is_err());
        assert!(CliArgs::try_parse_from(["jplay", "--watch", "a.java"]).is_ok());
    }

    #[test]
    fn argument_strings_may_start_with_a_dash() {
        let args = CliArgs::try_parse_from(["jplay", "--compile-args", "-Xlint:all", "a.java"]).unwrap();
        assert_eq!(args.compile_args.as_deref(), Some("-Xlint:all"));
    }
}
