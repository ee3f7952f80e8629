// src/build/toolchain.rs

//! Locating `javac` and `java`.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Resolved executables for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// `None` when no compiler could be found.
    pub javac: Option<PathBuf>,
    /// Launcher for compiled classes. Falls back to a bare `java` so a
    /// missing runtime surfaces as a spawn failure.
    pub java: PathBuf,
}

impl Toolchain {
    /// Look in `java_home/bin` (configured, else `$JAVA_HOME`), then on `PATH`.
    pub fn discover(java_home: Option<&Path>) -> Self {
        let home = java_home
            .map(Path::to_path_buf)
            .or_else(|| env::var_os("JAVA_HOME").map(PathBuf::from));

        let javac = find_tool(home.as_deref(), "javac");
        let java = find_tool(home.as_deref(), "java").unwrap_or_else(|| PathBuf::from(exe_name("java")));

        debug!(?javac, ?java, "resolved java toolchain");
        Self { javac, java }
    }
}

fn exe_name(tool: &str) -> String {
    if cfg!(windows) {
        format!("{tool}.exe")
    } else {
        tool.to_string()
    }
}

fn find_tool(home: Option<&Path>, tool: &str) -> Option<PathBuf> {
    let name = exe_name(tool);
    if let Some(home) = home {
        let candidate = home.join("bin").join(&name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(&name))
        .find(|candidate| candidate.is_file())
}
