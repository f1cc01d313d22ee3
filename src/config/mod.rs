//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuditConfig, LogFormat, LoggingConfig, MetricsConfig, PathsConfig, ServerConfig,
    TrackingConfig, TrainingConfig,
};
