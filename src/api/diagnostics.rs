//! Escalation hooks for failed requests
//!
//! - `DiagnosticsSink`: receives a structured record per failed request
//! - `UnauthorizedHandler`: the login-redirect side of a 401

use serde::Serialize;
use serde_json::Value;
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use super::error::ErrorKind;
use crate::models::HttpMethod;

/// Structured record of one failed request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRecord {
    pub id: Uuid,
    pub kind: ErrorKind,
    pub method: HttpMethod,
    pub path: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Fire-and-forget receiver of diagnostic records.
///
/// Called inline on the request path; implementations must not block.
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, entry: DiagnosticRecord);
}

/// Writes records to the tracing pipeline
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, entry: DiagnosticRecord) {
        warn!(
            id = %entry.id,
            kind = %entry.kind,
            method = %entry.method,
            path = %entry.path,
            status = ?entry.status,
            "request failed: {}",
            entry.message
        );
    }
}

/// Keeps records in memory (tests, CLI summaries)
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, entry: DiagnosticRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }
}

/// Reacts to a 401 on a path that requires re-authentication
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self, path: &str);
}

/// Default handler: logs the need to log in again
#[derive(Debug, Default, Clone, Copy)]
pub struct LogUnauthorized;

impl UnauthorizedHandler for LogUnauthorized {
    fn on_unauthorized(&self, path: &str) {
        warn!(path = %path, "session rejected, login required");
    }
}
