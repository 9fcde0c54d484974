//! Shared test utilities for integration tests

use parking_lot::Mutex;
use std::io;
use std::sync::{Arc, Mutex as StdMutex};
use variant_engine::{OutputLine, StreamKind, Variant};

/// Global mutex to serialize environment variable access across tests
pub static ENV_MUTEX: StdMutex<()> = StdMutex::new(());

/// Tool settings used as the variant type in integration tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSettings {
    pub name: String,
    pub live: bool,
    pub quiet: bool,
}

impl ToolSettings {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl Variant for ToolSettings {
    fn live_output(&self) -> bool {
        self.live
    }

    fn set_live_output(&mut self, enabled: bool) {
        self.live = enabled;
    }

    fn log_output(&self) -> bool {
        !self.quiet
    }
}

/// Generator producing one variant per name, in order
pub fn named(names: &[&str]) -> impl Fn(ToolSettings) -> Vec<ToolSettings> {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    move |base: ToolSettings| {
        names
            .iter()
            .map(|name| ToolSettings {
                name: name.clone(),
                ..base.clone()
            })
            .collect()
    }
}

/// Generator producing `n` variants named `v0..v{n-1}`
pub fn numbered(n: usize) -> impl Fn(ToolSettings) -> Vec<ToolSettings> {
    move |base: ToolSettings| {
        (0..n)
            .map(|i| ToolSettings {
                name: format!("v{}", i),
                ..base.clone()
            })
            .collect()
    }
}

/// Records the live-output flag each execution observed
#[derive(Default)]
pub struct LiveFlags {
    seen: Mutex<Vec<(String, bool)>>,
}

impl LiveFlags {
    pub fn record(&self, settings: &ToolSettings) {
        self.seen
            .lock()
            .push((settings.name.clone(), settings.live_output()));
    }

    pub fn all(&self) -> Vec<(String, bool)> {
        self.seen.lock().clone()
    }
}

pub fn std_line(settings: &ToolSettings) -> OutputLine {
    OutputLine::std(format!("{} done", settings.name))
}

/// Collect sink lines as `(kind, text)` pairs
pub fn pairs(lines: &[OutputLine]) -> Vec<(StreamKind, String)> {
    lines.iter().map(|l| (l.kind, l.text.clone())).collect()
}

/// In-memory writer for capturing formatted `tracing` events
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Parse JSON-formatted log lines, skipping anything that is not an event
pub fn json_events(content: &str) -> Vec<serde_json::Value> {
    content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

pub fn find_message<'a>(events: &'a [serde_json::Value], message: &str) -> Option<&'a serde_json::Value> {
    events
        .iter()
        .find(|event| event["fields"]["message"] == message)
}
