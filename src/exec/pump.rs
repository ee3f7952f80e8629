// src/exec/pump.rs

//! Stream pumps: relay one child output pipe to the sink.

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::sink::{Sink, Style};

use super::launcher::OutputStream;
use super::misuse;

const READ_BUF_SIZE: usize = 4096;
/// How much recent stderr text is kept for misuse classification.
const MISUSE_WINDOW: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn style(self) -> Style {
        match self {
            StreamKind::Stdout => Style::Normal,
            StreamKind::Stderr => Style::Error,
        }
    }
}

/// Why a pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    EndOfStream,
    Cancelled,
    Failed(String),
}

/// A cancellable copy loop from one pipe into the sink.
pub struct StreamPump {
    kind: StreamKind,
    reader: OutputStream,
    sink: Arc<dyn Sink>,
    cancel: CancellationToken,
    decoder: Utf8Decoder,
    misuse: Option<MisuseWatch>,
}

impl StreamPump {
    pub fn new(
        kind: StreamKind,
        reader: OutputStream,
        sink: Arc<dyn Sink>,
        cancel: CancellationToken,
    ) -> Self {
        let misuse = (kind == StreamKind::Stderr).then(MisuseWatch::default);
        Self {
            kind,
            reader,
            sink,
            cancel,
            decoder: Utf8Decoder::default(),
            misuse,
        }
    }

    pub fn spawn(self) -> PumpHandle {
        let kind = self.kind;
        let join = tokio::spawn(self.run());
        PumpHandle {
            kind,
            join,
            exit: None,
        }
    }

    async fn run(mut self) -> PumpExit {
        let mut buf = vec![0u8; READ_BUF_SIZE];

        loop {
            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!(stream = ?self.kind, "pump cancelled");
                    return PumpExit::Cancelled;
                }
                res = self.reader.read(&mut buf) => res,
            };

            match read {
                Ok(0) => {
                    let rest = self.decoder.finish();
                    self.emit(&rest);
                    debug!(stream = ?self.kind, "pump reached end of stream");
                    return PumpExit::EndOfStream;
                }
                Ok(n) => {
                    let text = self.decoder.decode(&buf[..n]);
                    self.emit(&text);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(stream = ?self.kind, error = %e, "reading child output failed");
                    return PumpExit::Failed(e.to_string());
                }
            }
        }
    }

    fn emit(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.sink.append(text, self.kind.style());

        if let Some(watch) = self.misuse.as_mut() {
            if let Some(hint) = watch.observe(text) {
                self.sink.append_line(hint.guidance(), Style::Warning);
            }
        }
    }
}

/// Owner's side of a spawned pump.
#[derive(Debug)]
pub struct PumpHandle {
    kind: StreamKind,
    join: JoinHandle<PumpExit>,
    exit: Option<PumpExit>,
}

impl PumpHandle {
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn is_finished(&self) -> bool {
        self.exit.is_some() || self.join.is_finished()
    }

    /// Wait for the pump task to end.
    ///
    /// Cancel-safe: the exit is cached once observed, so this can sit in a
    /// `select!` and be called again later.
    pub async fn join(&mut self) -> PumpExit {
        if let Some(exit) = &self.exit {
            return exit.clone();
        }
        let exit = match (&mut self.join).await {
            Ok(exit) => exit,
            Err(e) => PumpExit::Failed(format!("pump task failed: {e}")),
        };
        self.exit = Some(exit.clone());
        exit
    }
}

/// Incremental UTF-8 decoding that carries split sequences across reads.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(std::str::from_utf8(&self.pending[..valid]).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete sequence at the end; wait for more.
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Rolling window over stderr that fires at most one misuse hint.
#[derive(Debug, Default)]
struct MisuseWatch {
    seen: String,
    reported: bool,
}

impl MisuseWatch {
    fn observe(&mut self, text: &str) -> Option<misuse::RuntimeMisuse> {
        if self.reported {
            return None;
        }
        self.seen.push_str(text);
        if self.seen.len() > MISUSE_WINDOW {
            let cut = self.seen.len() - MISUSE_WINDOW / 2;
            let cut = (cut..self.seen.len())
                .find(|&i| self.seen.is_char_boundary(i))
                .unwrap_or(self.seen.len());
            self.seen.drain(..cut);
        }

        let hint = misuse::classify(&self.seen)?;
        self.reported = true;
        Some(hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_carries_split_multibyte_sequences() {
        let bytes = "héllo".as_bytes();
        let mut dec = Utf8Decoder::default();
        // 'é' is two bytes; split between them.
        let first = dec.decode(&bytes[..2]);
        let second = dec.decode(&bytes[2..]);
        assert_eq!(first, "h");
        assert_eq!(second, "éllo");
        assert_eq!(dec.finish(), "");
    }

    #[test]
    fn decoder_replaces_invalid_bytes() {
        let mut dec = Utf8Decoder::default();
        assert_eq!(dec.decode(&[b'a', 0xff, b'b']), "a\u{FFFD}b");
    }

    #[test]
    fn decoder_flushes_truncated_tail_lossily() {
        let mut dec = Utf8Decoder::default();
        assert_eq!(dec.decode(&[b'x', 0xc3]), "x");
        assert_eq!(dec.finish(), "\u{FFFD}");
    }

    #[test]
    fn misuse_watch_fires_once_across_chunks() {
        let mut watch = MisuseWatch::default();
        assert_eq!(watch.observe("Error: Main method not "), None);
        assert_eq!(
            watch.observe("found in class Main"),
            Some(misuse::RuntimeMisuse::EntrySignature)
        );
        assert_eq!(watch.observe("Error: Main method not found in class Main"), None);
    }

    #[test]
    fn stdout_is_normal_and_stderr_is_error() {
        assert_eq!(StreamKind::Stdout.style(), Style::Normal);
        assert_eq!(StreamKind::Stderr.style(), Style::Error);
    }
}
