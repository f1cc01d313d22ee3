//! Infrastructure layer - Storage, tracking and service implementations

pub mod audit;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;
pub mod tracking;
