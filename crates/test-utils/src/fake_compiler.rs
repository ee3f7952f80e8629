use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use jplay::build::{CompileOutput, Compiler};
use jplay::errors::Result;

/// A fake compiler that:
/// - records every invocation (source path + extra args)
/// - returns a canned status and output without touching the disk.
#[derive(Debug, Clone)]
pub struct FakeCompiler {
    result: Arc<Mutex<CompileOutput>>,
    calls: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
}

impl FakeCompiler {
    pub fn succeeding() -> Self {
        Self::with_result(0, "")
    }

    pub fn failing(status: i32, output: &str) -> Self {
        Self::with_result(status, output)
    }

    pub fn with_result(status: i32, output: &str) -> Self {
        Self {
            result: Arc::new(Mutex::new(CompileOutput {
                status,
                output: output.to_string(),
            })),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Change what later compiles return.
    pub fn set_result(&self, status: i32, output: &str) {
        *self.result.lock().unwrap() = CompileOutput {
            status,
            output: output.to_string(),
        };
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Compiler for FakeCompiler {
    fn compile<'a>(
        &'a self,
        source: &'a Path,
        extra_args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<CompileOutput>> + Send + 'a>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((source.to_path_buf(), extra_args.to_vec()));
            Ok(self.result.lock().unwrap().clone())
        })
    }
}
