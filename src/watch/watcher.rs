// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{SessionEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::watch::hash::ChangeDetector;

/// Editors often emit a burst of events per save; wait this long for the
/// burst to settle before reading the file.
const SETTLE: Duration = Duration::from_millis(75);

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `file` and send `SessionEvent::RunRequested` whenever its content
/// changes.
///
/// The parent directory is watched (non-recursively) rather than the file
/// itself, so editors that save by writing a temp file and renaming it over
/// the original keep being followed.
pub fn spawn_watcher(
    file: impl Into<PathBuf>,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<SessionEvent>,
) -> Result<WatcherHandle> {
    let file = file.into();
    let file = file.canonicalize().unwrap_or(file);
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("jplay: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("jplay: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("watching {dir:?}"))?;

    info!(path = ?file, "file watcher started");

    let mut detector = match fs.read_to_string(&file) {
        Ok(text) => ChangeDetector::seeded(&text),
        Err(_) => ChangeDetector::new(),
    };

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !concerns(&event, &file) {
                continue;
            }
            debug!(?event, "snippet file event");

            tokio::time::sleep(SETTLE).await;
            while event_rx.try_recv().is_ok() {}

            if !process_file_change(fs.as_ref(), &file, &mut detector, &runtime_tx).await {
                break;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

fn concerns(event: &Event, file: &Path) -> bool {
    if event.kind.is_access() {
        return false;
    }
    event
        .paths
        .iter()
        .any(|p| p == file || (p.file_name() == file.file_name() && p.parent() == file.parent()))
}

/// Re-read `file` and request a run if its content changed.
///
/// Returns `false` once the runtime has gone away and watching is pointless.
pub async fn process_file_change(
    fs: &dyn FileSystem,
    file: &Path,
    detector: &mut ChangeDetector,
    runtime_tx: &mpsc::Sender<SessionEvent>,
) -> bool {
    let text = match fs.read_to_string(file) {
        Ok(text) => text,
        Err(err) => {
            // Mid-rename or deleted; the next event will tell.
            debug!(path = ?file, error = %err, "snippet not readable");
            return true;
        }
    };

    if !detector.observe(&text) {
        return true;
    }

    debug!(path = ?file, "snippet changed -> requesting run");
    let event = SessionEvent::RunRequested {
        reason: TriggerReason::FileChanged,
    };
    if let Err(err) = runtime_tx.send(event).await {
        warn!("failed to send SessionEvent::RunRequested: {err}");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[tokio::test]
    async fn unchanged_content_does_not_trigger() {
        let fs = MockFileSystem::new();
        let path = Path::new("/w/Snippet.java");
        fs.add_file(path, "int x = 1;");
        let mut det = ChangeDetector::seeded("int x = 1;");
        let (tx, mut rx) = mpsc::channel(4);

        assert!(process_file_change(&fs, path, &mut det, &tx).await);
        assert!(rx.try_recv().is_err());

        fs.add_file(path, "int x = 2;");
        assert!(process_file_change(&fs, path, &mut det, &tx).await);
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::RunRequested {
                reason: TriggerReason::FileChanged
            }
        );
    }

    #[tokio::test]
    async fn unreadable_file_keeps_watching() {
        let fs = MockFileSystem::new();
        let mut det = ChangeDetector::new();
        let (tx, mut rx) = mpsc::channel(4);
        assert!(process_file_change(&fs, Path::new("/gone.java"), &mut det, &tx).await);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_runtime_stops_watching() {
        let fs = MockFileSystem::new();
        let path = Path::new("/w/a.java");
        fs.add_file(path, "x");
        let mut det = ChangeDetector::new();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert!(!process_file_change(&fs, path, &mut det, &tx).await);
    }

    #[test]
    fn only_events_for_the_snippet_count() {
        let file = PathBuf::from("/w/a.java");
        let mut ev = Event::new(notify::EventKind::Modify(notify::event::ModifyKind::Any));
        ev.paths.push(PathBuf::from("/w/b.java"));
        assert!(!concerns(&ev, &file));
        ev.paths.push(file.clone());
        assert!(concerns(&ev, &file));

        let access = Event::new(notify::EventKind::Access(notify::event::AccessKind::Any))
            .add_path(file.clone());
        assert!(!concerns(&access, &file));
    }
}
