use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jplay::build::{BuildOptions, BuildRunner, Compiler, Severity};
use jplay::errors::JplayError;
use jplay::fs::mock::MockFileSystem;
use jplay::fs::{FileSystem, RealFileSystem};
use jplay::sink::Style;
use jplay::transform::ScriptTransformer;
use jplay_test_utils::{init_tracing, FakeCompiler, RecordingSink};

type TestResult = Result<(), Box<dyn Error>>;

const JAVAC_ERROR: &str = "\
.jplay/Main.java:9: error: cannot find symbol
undefinedCall();
^
  symbol:   method undefinedCall()
  location: class Main
1 error
";

fn options(verbose: bool) -> BuildOptions {
    BuildOptions {
        workdir: PathBuf::from(".jplay"),
        compile_args: vec!["-Xlint:all".to_string()],
        verbose,
    }
}

fn runner(fs: &MockFileSystem, compiler: Option<&FakeCompiler>, verbose: bool) -> BuildRunner {
    let fs: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let compiler = compiler.map(|c| Arc::new(c.clone()) as Arc<dyn Compiler>);
    BuildRunner::new(fs, compiler, options(verbose))
}

#[tokio::test]
async fn successful_build_writes_source_and_passes_args() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    let compiler = FakeCompiler::succeeding();
    let sink = RecordingSink::new();
    let unit = ScriptTransformer::default().transform("System.out.println(1);")?;

    let report = runner(&fs, Some(&compiler), false).build(&unit, &sink).await?;

    assert!(report.success);
    assert_eq!(report.source_path, Path::new(".jplay/Main.java"));
    assert_eq!(fs.contents(".jplay/Main.java").as_deref(), Some(unit.source()));
    assert_eq!(
        compiler.calls(),
        vec![(PathBuf::from(".jplay/Main.java"), vec!["-Xlint:all".to_string()])]
    );
    assert_eq!(sink.text(), "");
    Ok(())
}

#[tokio::test]
async fn stale_source_and_class_are_removed_first() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file(".jplay/Main.java", "old");
    fs.add_file(".jplay/Main.class", "old");
    let unit = ScriptTransformer::default().transform("int x;")?;

    runner(&fs, Some(&FakeCompiler::succeeding()), false)
        .build(&unit, &RecordingSink::new())
        .await?;

    assert_eq!(
        fs.removed(),
        vec![PathBuf::from(".jplay/Main.java"), PathBuf::from(".jplay/Main.class")]
    );
    assert!(!fs.exists(Path::new(".jplay/Main.class")));
    assert_ne!(fs.contents(".jplay/Main.java").as_deref(), Some("old"));
    Ok(())
}

#[tokio::test]
async fn nested_class_files_from_earlier_builds_are_removed() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file(".jplay/Main$1.class", "old");
    fs.add_file(".jplay/Main$Inner.class", "old");
    fs.add_file(".jplay/Mainly.class", "other");
    fs.add_file(".jplay/Other$1.class", "other");
    let unit = ScriptTransformer::default().transform("int x;")?;

    runner(&fs, Some(&FakeCompiler::succeeding()), false)
        .build(&unit, &RecordingSink::new())
        .await?;

    assert!(!fs.exists(Path::new(".jplay/Main$1.class")));
    assert!(!fs.exists(Path::new(".jplay/Main$Inner.class")));
    assert!(fs.exists(Path::new(".jplay/Mainly.class")));
    assert!(fs.exists(Path::new(".jplay/Other$1.class")));
    Ok(())
}

#[tokio::test]
async fn write_failure_aborts_before_compiling() -> TestResult {
    let fs = MockFileSystem::new();
    fs.set_fail_writes(true);
    let compiler = FakeCompiler::succeeding();
    let unit = ScriptTransformer::default().transform("int x;")?;

    let err = runner(&fs, Some(&compiler), false)
        .build(&unit, &RecordingSink::new())
        .await
        .unwrap_err();

    assert!(matches!(err, JplayError::WriteFailure { ref path, .. } if path == Path::new(".jplay/Main.java")));
    assert_eq!(compiler.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_toolchain_is_distinct_from_compile_failure() -> TestResult {
    let fs = MockFileSystem::new();
    let unit = ScriptTransformer::default().transform("int x;")?;

    let err = runner(&fs, None, false)
        .build(&unit, &RecordingSink::new())
        .await
        .unwrap_err();

    assert!(matches!(err, JplayError::ToolchainMissing(_)));
    assert!(err.to_string().starts_with("Fatal Error"));
    Ok(())
}

#[tokio::test]
async fn compile_failure_is_a_report_not_an_error() -> TestResult {
    let fs = MockFileSystem::new();
    let compiler = FakeCompiler::failing(1, JAVAC_ERROR);
    let sink = RecordingSink::new();
    let unit = ScriptTransformer::default().transform("undefinedCall();")?;

    let report = runner(&fs, Some(&compiler), false).build(&unit, &sink).await?;

    assert!(!report.success);
    assert_eq!(report.status, 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].severity, Severity::Error);
    assert_eq!(report.diagnostics[0].line, 9);
    assert!(sink.text_with_style(Style::Diagnostic).contains("cannot find symbol"));
    assert_eq!(sink.text_with_style(Style::Warning), "Failed to compile.\n");
    Ok(())
}

#[tokio::test]
async fn verbose_build_reports_each_step() -> TestResult {
    let fs = MockFileSystem::new();
    let sink = RecordingSink::new();
    let unit = ScriptTransformer::default().transform("int x;")?;

    runner(&fs, Some(&FakeCompiler::succeeding()), true)
        .build(&unit, &sink)
        .await?;

    assert_eq!(
        sink.text_with_style(Style::Status),
        "Deleting old temp files...\nWriting code to source file...\nCompiling code...\n"
    );
    Ok(())
}

#[tokio::test]
async fn real_filesystem_creates_the_workdir() -> TestResult {
    let dir = tempfile::tempdir()?;
    let workdir = dir.path().join("nested").join("work");
    let builder = BuildRunner::new(
        Arc::new(RealFileSystem),
        Some(Arc::new(FakeCompiler::succeeding())),
        BuildOptions {
            workdir: workdir.clone(),
            ..BuildOptions::default()
        },
    );
    let unit = ScriptTransformer::default().transform("public class Hello {}")?;

    let report = builder.build(&unit, &RecordingSink::new()).await?;

    assert_eq!(report.source_path, workdir.join("Hello.java"));
    assert_eq!(std::fs::read_to_string(workdir.join("Hello.java"))?, "public class Hello {}");
    Ok(())
}
