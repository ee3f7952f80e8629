use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::sync::Notify;

use jplay::exec::{LiveProcess, ProcessLauncher, SpawnedProcess};

const PIPE_CAPACITY: usize = 64 * 1024;

/// Arguments of one `spawn` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRecord {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// A fake launcher whose "processes" are in-memory pipes.
///
/// Every spawn is recorded and yields a [`FakeProcessControl`] through which
/// the test writes the child's output, ends it, or checks whether it was
/// killed.
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    spawns: Arc<Mutex<Vec<SpawnRecord>>>,
    processes: Arc<Mutex<Vec<FakeProcessControl>>>,
    fail_next: Arc<Mutex<Option<io::ErrorKind>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next spawn fail with `kind`.
    pub fn fail_next(&self, kind: io::ErrorKind) {
        *self.fail_next.lock().unwrap() = Some(kind);
    }

    pub fn spawns(&self) -> Vec<SpawnRecord> {
        self.spawns.lock().unwrap().clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.spawns.lock().unwrap().len()
    }

    /// Control handle for the `index`-th successful spawn.
    pub fn process(&self, index: usize) -> FakeProcessControl {
        self.processes.lock().unwrap()[index].clone()
    }

    pub fn last_process(&self) -> FakeProcessControl {
        self.processes
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no process spawned yet")
    }
}

impl ProcessLauncher for FakeLauncher {
    fn spawn(&self, program: &Path, args: &[String], cwd: &Path) -> io::Result<SpawnedProcess> {
        self.spawns.lock().unwrap().push(SpawnRecord {
            program: program.to_path_buf(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
        });

        if let Some(kind) = self.fail_next.lock().unwrap().take() {
            return Err(io::Error::new(kind, "simulated spawn failure"));
        }

        let (stdout_w, stdout_r) = tokio::io::duplex(PIPE_CAPACITY);
        let (stderr_w, stderr_r) = tokio::io::duplex(PIPE_CAPACITY);

        let mut processes = self.processes.lock().unwrap();
        let state = Arc::new(ProcState {
            pid: 1000 + processes.len() as u32,
            alive: AtomicBool::new(true),
            killed: AtomicBool::new(false),
            code: Mutex::new(None),
            exited: Notify::new(),
            stdout: tokio::sync::Mutex::new(Some(stdout_w)),
            stderr: tokio::sync::Mutex::new(Some(stderr_w)),
        });
        processes.push(FakeProcessControl {
            state: Arc::clone(&state),
        });

        Ok(SpawnedProcess {
            stdout: Box::new(stdout_r),
            stderr: Box::new(stderr_r),
            process: Box::new(FakeProcess { state }),
        })
    }
}

#[derive(Debug)]
struct ProcState {
    pid: u32,
    alive: AtomicBool,
    killed: AtomicBool,
    code: Mutex<Option<i32>>,
    exited: Notify,
    stdout: tokio::sync::Mutex<Option<DuplexStream>>,
    stderr: tokio::sync::Mutex<Option<DuplexStream>>,
}

impl ProcState {
    async fn close_pipes(&self) {
        self.stdout.lock().await.take();
        self.stderr.lock().await.take();
    }

    fn mark_exited(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.exited.notify_waiters();
    }
}

/// Test-side handle on a fake child.
#[derive(Debug, Clone)]
pub struct FakeProcessControl {
    state: Arc<ProcState>,
}

impl FakeProcessControl {
    pub async fn write_stdout(&self, text: &str) {
        write_pipe(&self.state.stdout, text).await;
    }

    pub async fn write_stderr(&self, text: &str) {
        write_pipe(&self.state.stderr, text).await;
    }

    /// Close both pipes without exiting, like a child that closed its
    /// output but keeps running.
    pub async fn close_pipes(&self) {
        self.state.close_pipes().await;
    }

    /// Close both pipes and exit with `code`.
    pub async fn exit(&self, code: i32) {
        *self.state.code.lock().unwrap() = Some(code);
        self.state.close_pipes().await;
        self.state.mark_exited();
    }

    pub fn is_alive(&self) -> bool {
        self.state.alive.load(Ordering::SeqCst)
    }

    pub fn was_killed(&self) -> bool {
        self.state.killed.load(Ordering::SeqCst)
    }
}

async fn write_pipe(pipe: &tokio::sync::Mutex<Option<DuplexStream>>, text: &str) {
    let mut guard = pipe.lock().await;
    let writer = guard.as_mut().expect("pipe already closed");
    writer.write_all(text.as_bytes()).await.expect("pipe write failed");
    writer.flush().await.expect("pipe flush failed");
}

struct FakeProcess {
    state: Arc<ProcState>,
}

impl LiveProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.state.pid)
    }

    fn is_alive(&mut self) -> bool {
        self.state.alive.load(Ordering::SeqCst)
    }

    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.state.killed.store(true, Ordering::SeqCst);
            self.state.close_pipes().await;
            self.state.mark_exited();
            Ok(())
        })
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = io::Result<Option<i32>>> + Send + '_>> {
        Box::pin(async move {
            loop {
                let notified = self.state.exited.notified();
                if !self.state.alive.load(Ordering::SeqCst) {
                    break;
                }
                notified.await;
            }
            if self.state.killed.load(Ordering::SeqCst) {
                return Ok(None);
            }
            Ok(*self.state.code.lock().unwrap())
        })
    }
}
