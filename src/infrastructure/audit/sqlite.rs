//! SQLite audit log

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::domain::{AuditLog, DomainError, InferenceRecord, NewInferenceRecord, Scenario};

/// Audit log in an `inferences` table, one row per prediction
#[derive(Debug, Clone)]
pub struct SqliteAuditLog {
    pool: SqlitePool,
}

impl SqliteAuditLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `url` and ensure the table.
    ///
    /// In-memory databases are private to a connection, so they get a
    /// single-connection pool.
    pub async fn connect(url: &str) -> Result<Self, DomainError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DomainError::configuration(format!("Invalid audit url '{}': {}", url, e)))?
            .create_if_missing(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        if !in_memory {
            if let Some(parent) = options
                .get_filename()
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
            {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    DomainError::storage(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to open audit database: {}", e)))?;

        let log = Self::new(pool);
        log.ensure_table().await?;
        Ok(log)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inferences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts TEXT NOT NULL,
                session_id TEXT,
                scenario TEXT NOT NULL,
                input_json TEXT NOT NULL,
                pred_label INTEGER NOT NULL,
                pred_proba REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create inferences table: {}", e)))?;

        Ok(())
    }

    fn from_row(row: &SqliteRow) -> Result<InferenceRecord, DomainError> {
        let ts: String = row.get("ts");
        let scenario: String = row.get("scenario");
        let pred_label: i64 = row.get("pred_label");

        Ok(InferenceRecord {
            id: row.get("id"),
            ts: DateTime::parse_from_rfc3339(&ts)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| DomainError::storage(format!("Corrupt timestamp '{}': {}", ts, e)))?,
            session_id: row.get("session_id"),
            scenario: Scenario::from_str(&scenario)
                .map_err(|_| DomainError::storage(format!("Corrupt scenario '{}'", scenario)))?,
            input_json: row.get("input_json"),
            pred_label: u8::try_from(pred_label)
                .map_err(|_| DomainError::storage(format!("Corrupt label {}", pred_label)))?,
            pred_proba: row.get("pred_proba"),
        })
    }
}

#[async_trait]
impl AuditLog for SqliteAuditLog {
    async fn append(&self, record: NewInferenceRecord) -> Result<InferenceRecord, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO inferences (ts, session_id, scenario, input_json, pred_label, pred_proba)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.ts.to_rfc3339())
        .bind(record.session_id.as_deref())
        .bind(record.scenario.as_str())
        .bind(record.input_json.as_str())
        .bind(i64::from(record.pred_label))
        .bind(record.pred_proba)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::logging(format!("Failed to insert inference: {}", e)))?;

        Ok(record.with_id(result.last_insert_rowid()))
    }

    async fn recent(&self, limit: u32) -> Result<Vec<InferenceRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, ts, session_id, scenario, input_json, pred_label, pred_proba
            FROM inferences
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list inferences: {}", e)))?;

        rows.iter().map(Self::from_row).collect()
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
