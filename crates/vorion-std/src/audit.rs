// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! File-backed [`AuditPersist`] implementation: an append-only JSON-lines
//! log, one [`AuditRecord`] per line, written with a buffered writer under
//! a lock so concurrent `persist` calls serialize cleanly.

use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use vorion_audit::{AuditPersist, AuditRecord};

/// Appends flushed audit batches to a JSON-lines file and answers queries
/// by scanning it back to front.
///
/// Unlike [`crate::storage::FileStorage`], this backend never rewrites the
/// whole file — audit history is append-only by construction, so each
/// `persist` call is a single `write` plus `fsync`-free flush, keeping the
/// cost proportional to the batch rather than to total history size.
pub struct FileAuditPersist {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileAuditPersist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    fn read_all(&self) -> io::Result<Vec<AuditRecord>> {
        let Ok(file) = std::fs::File::open(&self.path) else {
            return Ok(Vec::new());
        };
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(error) => tracing::warn!(%error, "skipping malformed audit log line"),
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl AuditPersist for FileAuditPersist {
    async fn persist(&self, batch: &[AuditRecord]) -> Result<(), String> {
        let _guard = self.lock.lock().map_err(|error| error.to_string())?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|error| error.to_string())?;
        for record in batch {
            let line = serde_json::to_string(record).map_err(|error| error.to_string())?;
            writeln!(file, "{line}").map_err(|error| error.to_string())?;
        }
        Ok(())
    }

    async fn query(&self, tenant_id: &str, limit: usize) -> Vec<AuditRecord> {
        let limit = limit.min(1000);
        let records = self.read_all().unwrap_or_default();
        records
            .into_iter()
            .rev()
            .filter(|record| record.tenant_id == tenant_id)
            .take(limit)
            .collect()
    }
}
