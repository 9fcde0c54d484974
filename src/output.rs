//! Captured output lines and the sinks they are delivered to.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info};

/// Channel an output line was written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Standard output
    Std,
    /// Error output
    Err,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Std => write!(f, "std"),
            StreamKind::Err => write!(f, "err"),
        }
    }
}

/// One line of output captured from an execution step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    pub kind: StreamKind,
    pub text: String,
}

impl OutputLine {
    pub fn new(kind: StreamKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn std(text: impl Into<String>) -> Self {
        Self::new(StreamKind::Std, text)
    }

    pub fn err(text: impl Into<String>) -> Self {
        Self::new(StreamKind::Err, text)
    }
}

/// Receiver for replayed output.
///
/// Invoked once per output line during the dispatch phase of a run. Any
/// `FnMut(StreamKind, &str)` closure is a sink.
pub trait OutputSink {
    fn emit(&mut self, kind: StreamKind, text: &str);
}

impl<F> OutputSink for F
where
    F: FnMut(StreamKind, &str),
{
    fn emit(&mut self, kind: StreamKind, text: &str) {
        self(kind, text)
    }
}

/// Sink that forwards output lines to `tracing`.
///
/// Standard lines are logged at `info`, error lines at `error`, both under
/// the `variant_engine::output` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn emit(&mut self, kind: StreamKind, text: &str) {
        match kind {
            StreamKind::Std => info!(target: "variant_engine::output", "{}", text),
            StreamKind::Err => error!(target: "variant_engine::output", "{}", text),
        }
    }
}

/// Sink that keeps every line in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    lines: Vec<OutputLine>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<OutputLine> {
        self.lines
    }
}

impl OutputSink for BufferSink {
    fn emit(&mut self, kind: StreamKind, text: &str) {
        self.lines.push(OutputLine::new(kind, text));
    }
}
