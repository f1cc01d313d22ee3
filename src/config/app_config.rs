use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::LogisticRegressionConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub paths: PathsConfig,
    pub audit: AuditConfig,
    pub tracking: TrackingConfig,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

/// Locations of persisted state
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub models_dir: PathBuf,
    pub feature_template: PathBuf,
    pub dataset: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// `sqlite` or `memory`
    pub backend: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub enabled: bool,
    pub uri: String,
    pub timeout_secs: u64,
    pub experiment_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub folds: usize,
    pub seed: u64,
    pub max_iter: usize,
    /// Inverse L2 regularisation strength
    pub regularization: f64,
    pub tolerance: f64,
    /// Final grade at or above which a student counts as successful
    pub success_threshold: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            feature_template: PathBuf::from("models/feature_template.json"),
            dataset: PathBuf::from("data/student_full.csv"),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            url: "sqlite://api/inferences.sqlite?mode=rwc".to_string(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            uri: "http://student-mlflow:5000".to_string(),
            timeout_secs: 10,
            experiment_prefix: "student-success".to_string(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            seed: 42,
            max_iter: 2000,
            regularization: 1.0,
            tolerance: 1e-6,
            success_threshold: 10.0,
        }
    }
}

impl TrainingConfig {
    pub fn classifier(&self) -> LogisticRegressionConfig {
        LogisticRegressionConfig {
            c: self.regularization,
            max_iter: self.max_iter,
            tolerance: self.tolerance,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app: Self = config.try_deserialize()?;

        if let Ok(uri) = std::env::var("MLFLOW_TRACKING_URI") {
            app.tracking.uri = uri;
        }

        Ok(app)
    }
}
