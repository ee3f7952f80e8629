// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod control;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod scan;
pub mod sink;
pub mod transform;
pub mod watch;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::build::{BuildRunner, Compiler, JavacCompiler, Toolchain};
use crate::cli::CliArgs;
use crate::config::{default_config_path, load_or_default, ConfigFile, RawConfigFile};
use crate::engine::{
    Runtime, RuntimeOptions, Session, SessionEvent, SnippetSource, TriggerReason,
};
use crate::exec::{LaunchSpec, ProcessSupervisor, TokioLauncher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::scan::DirtyRegions;
use crate::sink::{spawn_console_writer, ChannelSink, Sink};
use crate::transform::ScriptTransformer;

/// How long to let buffered output reach the terminal before exiting.
const CONSOLE_DRAIN: Duration = Duration::from_millis(500);

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - toolchain discovery
/// - transformer / build runner / supervisor / session
/// - (optional) file watcher and stdin control
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<i32> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut raw = load_or_default(&config_path)
        .with_context(|| format!("loading config {config_path:?}"))?;
    apply_overrides(&mut raw, &args);
    let cfg = ConfigFile::try_from(raw)?;
    debug!(?cfg, "configuration resolved");

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let source = match &args.file {
        Some(path) => SnippetSource::File(path.clone()),
        None if args.watch => bail!("--watch needs a snippet file"),
        None => SnippetSource::Text(read_stdin().await?),
    };

    if args.dry_run {
        return print_dry_run(&cfg, &source, fs.as_ref());
    }

    let toolchain = Toolchain::discover(cfg.run.java_home.as_deref());
    info!(?toolchain, "toolchain");

    let (sink, sink_rx) = ChannelSink::new();
    let console = spawn_console_writer(sink_rx);
    let sink: Arc<dyn Sink> = Arc::new(sink);

    let compiler = toolchain
        .javac
        .map(|javac| Arc::new(JavacCompiler::new(javac)) as Arc<dyn Compiler>);
    let builder = BuildRunner::new(Arc::clone(&fs), compiler, cfg.build.clone());
    let supervisor = ProcessSupervisor::new(
        Arc::new(TokioLauncher),
        Arc::clone(&sink),
        LaunchSpec {
            program: toolchain.java,
            run_args: cfg.run.run_args.clone(),
            cwd: cfg.build.workdir.clone(),
        },
    );
    let session = Session::new(
        ScriptTransformer::new(cfg.transform.clone()),
        builder,
        supervisor,
        sink,
    )
    .with_program_args(args.program_args.clone());

    let (rt_tx, rt_rx) = mpsc::channel::<SessionEvent>(64);

    // File watcher and stdin commands only in --watch mode.
    let _watcher_handle = match (&source, args.watch) {
        (SnippetSource::File(path), true) => {
            let handle = crate::watch::spawn_watcher(path.clone(), Arc::clone(&fs), rt_tx.clone())?;
            crate::control::spawn_stdin_control(rt_tx.clone());
            Some(handle)
        }
        _ => None,
    };

    // Ctrl-C → kill the child and stop.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(SessionEvent::ShutdownRequested).await;
        });
    }

    rt_tx
        .send(SessionEvent::RunRequested {
            reason: TriggerReason::Startup,
        })
        .await?;

    let options = RuntimeOptions {
        exit_when_idle: !args.watch,
    };
    let runtime = Runtime::new(session, source, fs, rt_rx, options);
    let summary = runtime.run().await;
    debug!(?summary, "runtime finished");

    drop(rt_tx);
    if tokio::time::timeout(CONSOLE_DRAIN, console).await.is_err() {
        debug!("console writer still busy at exit");
    }

    Ok(summary.exit_code())
}

/// CLI flags win over the config file.
fn apply_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(compile_args) = &args.compile_args {
        raw.build.compile_args = Some(compile_args.clone());
    }
    if let Some(run_args) = &args.run_args {
        raw.run.run_args = Some(run_args.clone());
    }
    if let Some(workdir) = &args.workdir {
        raw.build.workdir = workdir.clone();
    }
}

async fn read_stdin() -> Result<String> {
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("reading snippet from stdin")?;
    Ok(text)
}

/// Print the unit that would be compiled, without touching the toolchain.
fn print_dry_run(cfg: &ConfigFile, source: &SnippetSource, fs: &dyn FileSystem) -> Result<i32> {
    let text = source.load(fs)?;
    let regions = DirtyRegions::scan(&text);

    let unit = match ScriptTransformer::new(cfg.transform.clone()).transform(&text) {
        Ok(unit) => unit,
        Err(err) => {
            eprintln!("{err}");
            return Ok(1);
        }
    };

    println!("jplay dry-run");
    println!("  class: {} ({:?})", unit.class_name(), unit.kind());
    println!("  dirty regions: {}", regions.len());
    for region in &regions {
        println!("    {region}");
    }
    println!("  user imports: {}", unit.user_imports().len());
    println!("  extracted methods: {}", unit.methods().len());
    println!(
        "  source file: {}",
        cfg.build.workdir.join(unit.file_name()).display()
    );
    if !cfg.build.compile_args.is_empty() {
        println!("  compile args: {:?}", cfg.build.compile_args);
    }
    if !cfg.run.run_args.is_empty() {
        println!("  run args: {:?}", cfg.run.run_args);
    }
    println!();
    print!("{}", unit.source());
    if !unit.source().ends_with('\n') {
        println!();
    }

    debug!("dry-run complete (no execution)");
    Ok(0)
}
