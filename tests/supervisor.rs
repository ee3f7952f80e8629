use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use jplay::errors::JplayError;
use jplay::exec::{LaunchSpec, ProcessSupervisor, PumpExit, RunPhase};
use jplay::sink::Style;
use jplay_test_utils::{init_tracing, with_timeout, FakeLauncher, RecordingSink};

type TestResult = Result<(), Box<dyn Error>>;

fn supervisor(launcher: &FakeLauncher, sink: &RecordingSink) -> ProcessSupervisor {
    ProcessSupervisor::new(
        Arc::new(launcher.clone()),
        Arc::new(sink.clone()),
        LaunchSpec {
            program: PathBuf::from("/jdk/bin/java"),
            run_args: vec!["-Xmx64m".to_string()],
            cwd: PathBuf::from(".jplay"),
        },
    )
}

#[tokio::test]
async fn run_spawns_java_with_class_and_args() -> TestResult {
    init_tracing();
    let launcher = FakeLauncher::new();
    let sink = RecordingSink::new();
    let mut sup = supervisor(&launcher, &sink);

    let run_id = sup.run("Main", &["a".to_string(), "b".to_string()]).await?;

    assert_eq!(sup.current_run(), Some(run_id));
    assert_eq!(sup.phase(), Some(RunPhase::Streaming));
    let spawn = &launcher.spawns()[0];
    assert_eq!(spawn.program, PathBuf::from("/jdk/bin/java"));
    assert_eq!(spawn.args, vec!["-Xmx64m", "Main", "a", "b"]);
    assert_eq!(spawn.cwd, PathBuf::from(".jplay"));

    sup.kill().await;
    Ok(())
}

#[tokio::test]
async fn output_is_streamed_with_stream_styles() -> TestResult {
    let launcher = FakeLauncher::new();
    let sink = RecordingSink::new();
    let mut sup = supervisor(&launcher, &sink);
    sup.run("Main", &[]).await?;

    let child = launcher.last_process();
    child.write_stdout("hello\n").await;
    child.write_stderr("oops\n").await;
    with_timeout(sink.wait_for("oops")).await;
    with_timeout(sink.wait_for("hello")).await;

    assert_eq!(sink.text_with_style(Style::Normal), "hello\n");
    assert_eq!(sink.text_with_style(Style::Error), "oops\n");

    sup.kill().await;
    Ok(())
}

#[tokio::test]
async fn second_run_supersedes_a_chatty_first_run() -> TestResult {
    let launcher = FakeLauncher::new();
    let sink = RecordingSink::new();
    let mut sup = supervisor(&launcher, &sink);

    let first_id = sup.run("Main", &[]).await?;
    let first = launcher.process(0);
    first.write_stdout("tick\n").await;
    with_timeout(sink.wait_for("tick")).await;

    let second_id = sup.run("Main", &[]).await?;

    assert_ne!(first_id, second_id);
    assert_eq!(launcher.spawn_count(), 2);
    assert!(first.was_killed());
    assert!(!first.is_alive());
    assert!(launcher.process(1).is_alive());
    assert_eq!(sup.current_run(), Some(second_id));
    assert!(sup.is_live());
    assert_eq!(sink.count("Process reset."), 1);

    // The first run's pumps are gone: nothing it could still say gets through.
    let before = sink.text();
    launcher.process(1).write_stdout("second\n").await;
    with_timeout(sink.wait_for("second")).await;
    assert_eq!(sink.text(), format!("{before}second\n"));

    sup.kill().await;
    Ok(())
}

#[tokio::test]
async fn kill_cancels_both_pumps_while_the_child_is_still_writing() -> TestResult {
    let launcher = FakeLauncher::new();
    let sink = RecordingSink::new();
    let mut sup = supervisor(&launcher, &sink);

    let run_id = sup.run("Main", &[]).await?;
    let child = launcher.process(0);
    child.write_stdout("tick\n").await;
    child.write_stderr("tock\n").await;
    with_timeout(sink.wait_for("tock")).await;
    with_timeout(sink.wait_for("tick")).await;
    assert!(child.is_alive());

    let teardown = with_timeout(sup.kill()).await.expect("live run is torn down");

    assert_eq!(teardown.run_id, run_id);
    assert_eq!(teardown.phase, RunPhase::Killed);
    assert_eq!(teardown.stdout, PumpExit::Cancelled);
    assert_eq!(teardown.stderr, PumpExit::Cancelled);
    assert!(child.was_killed());
    Ok(())
}

#[tokio::test]
async fn kill_is_idempotent() -> TestResult {
    let launcher = FakeLauncher::new();
    let sink = RecordingSink::new();
    let mut sup = supervisor(&launcher, &sink);

    assert_eq!(sup.kill().await, None);

    sup.run("Main", &[]).await?;
    assert_eq!(sup.kill().await.map(|t| t.phase), Some(RunPhase::Killed));
    assert_eq!(sup.kill().await, None);
    assert_eq!(sup.kill().await, None);

    assert_eq!(sup.phase(), None);
    assert!(!sup.awaiting_exit());
    assert_eq!(sink.count("Process reset."), 1);
    assert!(launcher.process(0).was_killed());
    Ok(())
}

#[tokio::test]
async fn end_of_both_streams_means_exited() -> TestResult {
    let launcher = FakeLauncher::new();
    let sink = RecordingSink::new();
    let mut sup = supervisor(&launcher, &sink);
    let run_id = sup.run("Main", &[]).await?;

    let child = launcher.last_process();
    child.write_stdout("done\n").await;
    child.exit(3).await;

    let report = with_timeout(sup.wait_for_exit()).await.expect("exit report");
    assert_eq!(report.run_id, run_id);
    assert_eq!(report.class_name, "Main");
    assert_eq!(report.code, Some(3));
    assert_eq!(sup.phase(), Some(RunPhase::Exited));
    assert!(!sup.is_live());
    assert!(!sup.awaiting_exit());
    assert!(sink.contains("done\n"));

    // Reported once only.
    assert!(sup.wait_for_exit().await.is_none());

    // Clearing an exited run is not a reset.
    let teardown = sup.kill().await.expect("exited run is cleared");
    assert_eq!(teardown.phase, RunPhase::Exited);
    assert_eq!(teardown.stdout, PumpExit::EndOfStream);
    assert_eq!(teardown.stderr, PumpExit::EndOfStream);
    assert!(!sink.contains("Process reset."));
    assert!(!child.was_killed());
    Ok(())
}

#[tokio::test]
async fn wait_for_exit_is_cancel_safe() -> TestResult {
    let launcher = FakeLauncher::new();
    let sink = RecordingSink::new();
    let mut sup = supervisor(&launcher, &sink);
    sup.run("Main", &[]).await?;

    let timed_out =
        tokio::time::timeout(std::time::Duration::from_millis(20), sup.wait_for_exit()).await;
    assert!(timed_out.is_err());
    assert!(sup.awaiting_exit());

    launcher.last_process().exit(0).await;
    let report = with_timeout(sup.wait_for_exit()).await.expect("exit report");
    assert_eq!(report.code, Some(0));
    Ok(())
}

#[tokio::test]
async fn misuse_on_stderr_adds_a_single_hint() -> TestResult {
    let launcher = FakeLauncher::new();
    let sink = RecordingSink::new();
    let mut sup = supervisor(&launcher, &sink);
    sup.run("Main", &[]).await?;

    let child = launcher.last_process();
    child
        .write_stderr("Error: Main method not found in class Main, please define the main method as:\n")
        .await;
    child
        .write_stderr("Error: Main method not found in class Main, please define the main method as:\n")
        .await;
    child.exit(1).await;
    with_timeout(sup.wait_for_exit()).await;

    let hints = sink.text_with_style(Style::Warning);
    assert_eq!(hints.matches("Malformed main method").count(), 1);
    Ok(())
}

#[tokio::test]
async fn spawn_failure_is_reported_and_previous_run_stays_dead() -> TestResult {
    let launcher = FakeLauncher::new();
    let sink = RecordingSink::new();
    let mut sup = supervisor(&launcher, &sink);

    sup.run("Main", &[]).await?;
    launcher.fail_next(io::ErrorKind::NotFound);

    let err = sup.run("Main", &[]).await.unwrap_err();

    assert!(matches!(err, JplayError::SpawnFailure { ref program, .. } if program == "/jdk/bin/java"));
    assert!(launcher.process(0).was_killed());
    assert_eq!(sup.current_run(), None);
    assert!(!sup.is_live());

    // The supervisor is still usable.
    sup.run("Main", &[]).await?;
    assert!(sup.is_live());
    sup.kill().await;
    Ok(())
}
