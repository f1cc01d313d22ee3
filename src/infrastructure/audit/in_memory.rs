//! In-memory audit log (for testing/development)

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{AuditLog, DomainError, InferenceRecord, NewInferenceRecord};

#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: RwLock<Vec<InferenceRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, record: NewInferenceRecord) -> Result<InferenceRecord, DomainError> {
        let mut records = self.records.write().await;
        let stored = record.with_id(records.len() as i64 + 1);
        records.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<InferenceRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit as usize).cloned().collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
