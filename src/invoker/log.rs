//! Invocation log.
//!
//! When configured, every model invocation appends one JSON line:
//!
//! ```jsonl
//! {"schema_version":1,"ts":1718000000000,"flow":"generate_notes","transport":"gemini","duration_ms":4200,...}
//! ```
//!
//! By default a prompt is recorded as a short preview only. With full capture
//! enabled each entry also carries the complete prompt and reply text.
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current schema version for log entries.
pub const INVOCATION_LOG_SCHEMA_VERSION: u32 = 1;

const PROMPT_PREVIEW_BYTES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum InvocationOutcome {
    Success,
    Failed,
}

/// What the invoker knows about one finished call.
pub(crate) struct InvocationRecord<'a> {
    pub(crate) flow: &'a str,
    pub(crate) transport: &'static str,
    pub(crate) duration: Duration,
    pub(crate) prompt: &'a str,
    /// Raw reply text; `None` when the transport failed.
    pub(crate) response: Option<&'a str>,
    pub(crate) outcome: InvocationOutcome,
    pub(crate) error: Option<String>,
}

#[derive(Debug, Serialize)]
struct LogEntry<'a> {
    schema_version: u32,
    /// Unix timestamp in milliseconds when the entry was written.
    ts: u64,
    flow: &'a str,
    transport: &'a str,
    duration_ms: u64,
    prompt_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_bytes: Option<usize>,
    outcome: InvocationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    prompt_preview: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a str>,
}

/// Append-only JSONL log of model invocations.
#[derive(Debug, Clone)]
pub struct InvocationLog {
    path: PathBuf,
    full_capture: bool,
}

impl InvocationLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            full_capture: false,
        }
    }

    /// Also record the complete prompt and reply text.
    pub fn with_full_capture(mut self, enabled: bool) -> Self {
        self.full_capture = enabled;
        self
    }

    pub(crate) fn append(&self, record: &InvocationRecord<'_>) -> Result<()> {
        let entry = LogEntry {
            schema_version: INVOCATION_LOG_SCHEMA_VERSION,
            ts: now_epoch_ms(),
            flow: record.flow,
            transport: record.transport,
            duration_ms: record.duration.as_millis() as u64,
            prompt_bytes: record.prompt.len(),
            response_bytes: record.response.map(str::len),
            outcome: record.outcome,
            error: record.error.as_deref(),
            prompt_preview: char_prefix(record.prompt, PROMPT_PREVIEW_BYTES),
            prompt: self.full_capture.then_some(record.prompt),
            response: record.response.filter(|_| self.full_capture),
        };
        let mut line = serde_json::to_string(&entry).context("serialize invocation log entry")?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create log dir {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("append to {}", self.path.display()))
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Longest prefix of `text` within `max_bytes` that ends on a char boundary.
fn char_prefix(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&idx| text.is_char_boundary(idx))
        .unwrap_or(0);
    &text[..end]
}
