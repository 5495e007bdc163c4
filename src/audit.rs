//! Append-only JSON Lines audit trail, one object per event.

use crate::item::{ItemResult, RunMode};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const AUDIT_FILE_NAME: &str = "process-downloads.audit.jsonl";

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum AuditEvent<'a> {
    Start {
        mode: RunMode,
    },
    Item(&'a ItemResult),
    ExtractionFailed {
        release: &'a str,
        path: &'a Path,
        output: &'a str,
    },
    Done {
        ok: usize,
        error: usize,
    },
}

pub struct AuditLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl AuditLog {
    /// The file is created on the first write, together with `log_dir`.
    pub fn new(log_dir: &Path) -> Self {
        Self {
            path: log_dir.join(AUDIT_FILE_NAME),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn start(&self, mode: RunMode) {
        self.write(AuditEvent::Start { mode });
    }

    pub fn item(&self, result: &ItemResult) {
        self.write(AuditEvent::Item(result));
    }

    pub fn extraction_failed(&self, result: &ItemResult, output: &str) {
        self.write(AuditEvent::ExtractionFailed {
            release: result.release(),
            path: result.source(),
            output,
        });
    }

    pub fn done(&self, ok: usize, error: usize) {
        self.write(AuditEvent::Done { ok, error });
    }

    /// Audit failures are logged and never abort the run
    fn write(&self, event: AuditEvent<'_>) {
        if let Err(e) = self.append(event) {
            tracing::warn!("Failed to write audit record to {}: {e}", self.path.display());
        }
    }

    fn append(&self, event: AuditEvent<'_>) -> io::Result<()> {
        let mut record = serde_json::to_value(&event)?;
        if let Value::Object(fields) = &mut record {
            fields.insert(
                "ts".to_string(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("audit log mutex poisoned"))?;

        if guard.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            *guard = Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?,
            );
        }

        match guard.as_mut() {
            Some(file) => file.write_all(line.as_bytes()),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").field("path", &self.path).finish()
    }
}
