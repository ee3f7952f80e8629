// src/watch/mod.rs

//! File watching and change detection for `--watch`.
//!
//! Wires up a cross-platform filesystem watcher (`notify`) on the snippet
//! file and uses content hashing (`blake3`) so that only real edits trigger
//! a new run.

pub mod hash;
pub mod watcher;

pub use hash::{compute_content_hash, ChangeDetector};
pub use watcher::{process_file_change, spawn_watcher, WatcherHandle};
