//! Inference audit log backends

mod factory;
mod in_memory;
mod sqlite;

pub use factory::{AuditBackend, AuditLogFactory};
pub use in_memory::InMemoryAuditLog;
pub use sqlite::SqliteAuditLog;
