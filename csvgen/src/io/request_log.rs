//! Per-request JSON logs written when debug logging is enabled.
//!
//! Each request becomes `<log_dir>/<unix-millis>.json`. These files are a
//! product feature toggled by `DEBUG`, unrelated to `tracing` output.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestLogEntry {
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub timestamp: String,
    pub method: String,
    pub path: String,
    /// Parsed JSON body, or `{}` when the body is absent or not JSON.
    pub body: Value,
    pub query: BTreeMap<String, String>,
    #[serde(skip)]
    pub received_at: DateTime<Utc>,
}

impl RequestLogEntry {
    /// Entry stamped with the current time.
    pub fn received_now(
        method: impl Into<String>,
        path: impl Into<String>,
        body: &[u8],
        query: BTreeMap<String, String>,
    ) -> Self {
        Self::new(Utc::now(), method, path, body, query)
    }

    pub fn new(
        received_at: DateTime<Utc>,
        method: impl Into<String>,
        path: impl Into<String>,
        body: &[u8],
        query: BTreeMap<String, String>,
    ) -> Self {
        let body = serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Default::default()));
        Self {
            timestamp: received_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            method: method.into(),
            path: path.into(),
            body,
            query,
            received_at,
        }
    }
}

/// Write `entry` into `log_dir`, creating the directory if needed.
///
/// Requests landing in the same millisecond get a `-N` suffix rather than
/// overwriting each other.
pub fn write_request_log(log_dir: &Path, entry: &RequestLogEntry) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("create log dir {}", log_dir.display()))?;

    let mut payload = serde_json::to_string_pretty(entry).context("serialize request log")?;
    payload.push('\n');

    let millis = entry.received_at.timestamp_millis();
    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            format!("{millis}.json")
        } else {
            format!("{millis}-{suffix}.json")
        };
        let path = log_dir.join(name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(payload.as_bytes())
                    .with_context(|| format!("write {}", path.display()))?;
                return Ok(path);
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(err) => {
                return Err(err).with_context(|| format!("create {}", path.display()));
            }
        }
    }
}
