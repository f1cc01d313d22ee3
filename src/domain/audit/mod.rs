//! Audit domain - Append-only record of every inference

mod record;
mod repository;

pub use record::{InferenceRecord, NewInferenceRecord};
pub use repository::AuditLog;

#[cfg(test)]
pub use repository::MockAuditLog;
