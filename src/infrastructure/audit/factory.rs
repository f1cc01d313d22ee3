//! Audit log factory for runtime backend selection

use std::sync::Arc;

use super::in_memory::InMemoryAuditLog;
use super::sqlite::SqliteAuditLog;
use crate::config::AuditConfig;
use crate::domain::{AuditLog, DomainError};

/// Supported audit backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditBackend {
    InMemory,
    Sqlite,
}

impl AuditBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct AuditLogFactory;

impl AuditLogFactory {
    pub async fn create(config: &AuditConfig) -> Result<Arc<dyn AuditLog>, DomainError> {
        let backend = AuditBackend::parse(&config.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown audit backend '{}'", config.backend))
        })?;

        match backend {
            AuditBackend::InMemory => Ok(Arc::new(InMemoryAuditLog::new())),
            AuditBackend::Sqlite => Ok(Arc::new(SqliteAuditLog::connect(&config.url).await?)),
        }
    }
}
