//! Audit log — records every interaction handled by the gateway.

use pacto_core::error::PactoError;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// An entry to write to the audit log.
pub struct AuditEntry {
    pub sender_id: String,
    pub input_text: String,
    pub status: AuditStatus,
    /// Branch taken or error summary.
    pub detail: Option<String>,
    pub processing_ms: Option<i64>,
}

/// Status of an audited interaction.
pub enum AuditStatus {
    Ok,
    Error,
}

impl AuditStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Audit logger backed by SQLite.
pub struct AuditLogger {
    pool: SqlitePool,
}

impl AuditLogger {
    /// Create a new audit logger sharing the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Write an entry to the audit log.
    pub async fn log(&self, entry: &AuditEntry) -> Result<(), PactoError> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO audit_log \
             (id, sender_id, input_text, status, detail, processing_ms) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&entry.sender_id)
        .bind(&entry.input_text)
        .bind(entry.status.as_str())
        .bind(&entry.detail)
        .bind(entry.processing_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| PactoError::Store(format!("audit log write failed: {e}")))?;

        debug!(
            "audit: {} [{}] {}",
            entry.sender_id,
            entry.status.as_str(),
            truncate(&entry.input_text, 80)
        );

        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
