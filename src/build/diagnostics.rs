// src/build/diagnostics.rs

//! Parsing of `javac` output into structured diagnostics.

use std::sync::LazyLock;

use regex::Regex;

use crate::sink::{Sink, Style};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>.+?\.java):(?P<line>\d+): (?P<sev>error|warning): (?P<msg>.*)$")
        .expect("valid diagnostic regex")
});

static SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+ (errors?|warnings?)$").expect("valid summary regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn style(self) -> Style {
        match self {
            Severity::Error => Style::Diagnostic,
            Severity::Warning => Style::Warning,
        }
    }
}

/// One compiler message with the source excerpt lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub message: String,
    pub detail: Vec<String>,
}

/// Parse compiler output. Lines that belong to no diagnostic (notes,
/// summaries, option warnings) are skipped.
pub fn parse(output: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut in_diagnostic = false;

    for line in output.lines() {
        if let Some(caps) = HEADER_RE.captures(line) {
            let severity = match &caps["sev"] {
                "warning" => Severity::Warning,
                _ => Severity::Error,
            };
            diagnostics.push(Diagnostic {
                file: caps["file"].to_string(),
                line: caps["line"].parse().unwrap_or(0),
                severity,
                message: caps["msg"].to_string(),
                detail: Vec::new(),
            });
            in_diagnostic = true;
        } else if SUMMARY_RE.is_match(line.trim()) || line.starts_with("Note: ") {
            in_diagnostic = false;
        } else if in_diagnostic {
            if let Some(last) = diagnostics.last_mut() {
                last.detail.push(line.to_string());
            }
        }
    }

    diagnostics
}

/// Relay raw compiler output to the sink line by line, styled by the
/// severity of the diagnostic each line belongs to.
pub fn forward(output: &str, sink: &dyn Sink) {
    let mut style = Style::Diagnostic;
    for line in output.lines() {
        if let Some(caps) = HEADER_RE.captures(line) {
            style = if &caps["sev"] == "warning" {
                Style::Warning
            } else {
                Style::Diagnostic
            };
        } else if SUMMARY_RE.is_match(line.trim()) || line.starts_with("Note: ") {
            style = Style::Diagnostic;
        }
        sink.append_line(line, style);
    }
}
