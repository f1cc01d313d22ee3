//! Dataset service - validation and replacement of the canonical training data

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::domain::scenario::FINAL_GRADE;
use crate::domain::{DatasetRepository, DomainError, OutcomeDistribution, TrainingDataset};
use crate::infrastructure::storage::parse_csv;

/// What an accepted upload contained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSummary {
    pub status: &'static str,
    pub filename: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub success_distribution: OutcomeDistribution,
    pub message: String,
}

#[derive(Debug)]
pub struct DatasetService {
    repository: Arc<dyn DatasetRepository>,
    success_threshold: f64,
    /// Serializes replacements of the canonical dataset
    writer: Mutex<()>,
}

impl DatasetService {
    pub fn new(repository: Arc<dyn DatasetRepository>, success_threshold: f64) -> Self {
        Self {
            repository,
            success_threshold,
            writer: Mutex::new(()),
        }
    }

    /// Validate an uploaded CSV and make it the canonical dataset.
    ///
    /// Every check runs before the repository is touched, so a rejected
    /// upload leaves the previous dataset in place.
    pub async fn upload(&self, filename: &str, bytes: &[u8]) -> Result<UploadSummary, DomainError> {
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(DomainError::dataset(format!(
                "only .csv files are accepted, got '{}'",
                filename
            )));
        }

        let dataset = self.validate(bytes)?;
        let success_distribution = dataset.outcome_distribution()?;

        {
            let _guard = self.writer.lock().await;
            self.repository.replace(&dataset).await?;
        }

        tracing::info!(
            filename = %filename,
            rows = dataset.n_rows(),
            success = success_distribution.success,
            failure = success_distribution.failure,
            "Accepted training data upload"
        );

        Ok(UploadSummary {
            status: "uploaded",
            filename: filename.to_string(),
            rows: dataset.n_rows(),
            columns: dataset.column_names().into_iter().map(String::from).collect(),
            success_distribution,
            message: "Data uploaded successfully. Use /train to retrain the models.".to_string(),
        })
    }

    /// Parse and check CSV bytes, deriving the outcome column when absent
    pub fn validate(&self, bytes: &[u8]) -> Result<TrainingDataset, DomainError> {
        let dataset = parse_csv(bytes)?;
        dataset.require_columns(&[FINAL_GRADE])?;
        dataset.with_outcome(self.success_threshold)
    }

    /// The canonical dataset
    pub async fn current(&self) -> Result<TrainingDataset, DomainError> {
        self.repository.load().await?.ok_or_else(|| {
            DomainError::dataset(format!(
                "no training data at {}; upload a CSV first",
                self.repository.location()
            ))
        })
    }

    pub async fn exists(&self) -> Result<bool, DomainError> {
        self.repository.exists().await
    }

    pub fn location(&self) -> String {
        self.repository.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::mock::{sample_dataset, MockDatasetRepository};
    use crate::domain::scenario::OUTCOME_COLUMN;

    const CSV: &str = "school,higher,G1,G2,G3\nGP,yes,12,13,14\nMS,no,5,6,4\nGP,yes,9,10,10\n";

    fn service(repository: Arc<MockDatasetRepository>) -> DatasetService {
        DatasetService::new(repository, 10.0)
    }

    #[tokio::test]
    async fn test_upload_derives_success_and_replaces() {
        let repository = Arc::new(MockDatasetRepository::new());
        let summary = service(repository.clone())
            .upload("students.csv", CSV.as_bytes())
            .await
            .unwrap();

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns.last().map(String::as_str), Some(OUTCOME_COLUMN));
        assert_eq!(
            summary.success_distribution,
            OutcomeDistribution {
                success: 2,
                failure: 1
            }
        );
        assert_eq!(repository.current().unwrap().n_rows(), 3);
    }

    #[tokio::test]
    async fn test_non_csv_rejected_without_touching_dataset() {
        let previous = sample_dataset(10);
        let repository = Arc::new(MockDatasetRepository::new().with_dataset(previous.clone()));

        let err = service(repository.clone())
            .upload("students.xlsx", CSV.as_bytes())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Dataset { .. }));
        assert_eq!(repository.current(), Some(previous));
    }

    #[tokio::test]
    async fn test_missing_final_grade_rejected() {
        let previous = sample_dataset(10);
        let repository = Arc::new(MockDatasetRepository::new().with_dataset(previous.clone()));

        let err = service(repository.clone())
            .upload("students.csv", b"school,G1,G2\nGP,10,11\n")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Dataset { .. }));
        assert!(err.to_string().contains("G3"));
        assert_eq!(repository.current(), Some(previous));
    }

    #[tokio::test]
    async fn test_invalid_outcome_values_rejected() {
        let repository = Arc::new(MockDatasetRepository::new());

        let err = service(repository.clone())
            .upload("students.csv", b"G3,success\n12,1\n8,2\n")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Dataset { .. }));
        assert!(repository.current().is_none());
    }

    #[tokio::test]
    async fn test_current_without_upload() {
        let service = service(Arc::new(MockDatasetRepository::new()));

        let err = service.current().await.unwrap_err();
        assert!(matches!(err, DomainError::Dataset { .. }));
    }

    #[test]
    fn test_final_grade_only_upload_derives_outcome() {
        let service = service(Arc::new(MockDatasetRepository::new()));

        let dataset = service.validate(b"G3\n12\n8\n").unwrap();

        assert_eq!(dataset.column_names(), vec!["G3", OUTCOME_COLUMN]);
        assert_eq!(dataset.outcome().unwrap(), vec![1, 0]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_uploads_leave_one_complete_dataset() {
        use crate::infrastructure::storage::CsvDatasetRepository;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("student_full.csv");
        let service = Arc::new(DatasetService::new(
            Arc::new(CsvDatasetRepository::new(&path)),
            10.0,
        ));
        let small = CSV.to_string();
        let large = format!("school,G1,G2,G3\n{}", "GP,12,13,14\nMS,5,6,4\n".repeat(1000));

        let uploads: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                let content = if i % 2 == 0 { small.clone() } else { large.clone() };
                tokio::spawn(async move { service.upload("students.csv", content.as_bytes()).await })
            })
            .collect();

        for upload in uploads {
            upload.await.unwrap().unwrap();
        }

        let rows = service.current().await.unwrap().n_rows();
        assert!(rows == 3 || rows == 2000, "unexpected row count {}", rows);
    }
}
