use std::sync::{Arc, Mutex};
use std::time::Duration;

use jplay::sink::{Sink, Style};

/// A sink that keeps every append, for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    entries: Arc<Mutex<Vec<(String, Style)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, Style)> {
        self.entries.lock().unwrap().clone()
    }

    /// Everything appended, concatenated.
    pub fn text(&self) -> String {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.as_str())
            .collect()
    }

    /// Everything appended with `style`, concatenated.
    pub fn text_with_style(&self, style: Style) -> String {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, s)| *s == style)
            .map(|(text, _)| text.as_str())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }

    pub fn count(&self, needle: &str) -> usize {
        self.text().matches(needle).count()
    }

    /// Poll until `needle` shows up. Wrap in `with_timeout`.
    pub async fn wait_for(&self, needle: &str) {
        while !self.contains(needle) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl Sink for RecordingSink {
    fn append(&self, text: &str, style: Style) {
        self.entries.lock().unwrap().push((text.to_string(), style));
    }
}
