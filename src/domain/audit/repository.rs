//! Audit log trait

use async_trait::async_trait;

use super::{InferenceRecord, NewInferenceRecord};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Append-only inference log.
///
/// Appends must be safe under concurrent callers; each produces exactly one
/// record.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append a record and return it with its assigned id
    async fn append(&self, record: NewInferenceRecord) -> Result<InferenceRecord, DomainError>;

    /// The `limit` most recent records, newest first
    async fn recent(&self, limit: u32) -> Result<Vec<InferenceRecord>, DomainError>;

    /// Backend name, for health reporting
    fn backend(&self) -> &'static str;
}
