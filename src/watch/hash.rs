// src/watch/hash.rs

//! Content hashing so that saves which do not change the snippet (touch,
//! editor autosave, duplicate notify events) do not restart the run.

use blake3::Hasher;
use tracing::debug;

/// Hash snippet text.
pub fn compute_content_hash(text: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Remembers the hash of the last content that triggered a run.
#[derive(Debug, Default, Clone)]
pub struct ChangeDetector {
    last: Option<String>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from already-seen content (the start-up run covers it).
    pub fn seeded(text: &str) -> Self {
        Self {
            last: Some(compute_content_hash(text)),
        }
    }

    /// Record `text`; true if it differs from the previous content.
    pub fn observe(&mut self, text: &str) -> bool {
        let hash = compute_content_hash(text);
        if self.last.as_deref() == Some(hash.as_str()) {
            debug!(hash = %hash, "content unchanged");
            return false;
        }
        debug!(hash = %hash, "content changed");
        self.last = Some(hash);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_is_not_a_change() {
        let mut det = ChangeDetector::seeded("int x = 1;");
        assert!(!det.observe("int x = 1;"));
        assert!(det.observe("int x = 2;"));
        assert!(!det.observe("int x = 2;"));
        assert!(det.observe("int x = 1;"));
    }

    #[test]
    fn first_observation_counts_as_change() {
        let mut det = ChangeDetector::new();
        assert!(det.observe(""));
        assert!(!det.observe(""));
    }
}
