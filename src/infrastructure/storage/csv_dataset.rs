//! CSV codec and file repository for the canonical training dataset

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use tokio::fs;

use super::fs::write_atomic;
use crate::domain::{Column, DatasetRepository, DomainError, TrainingDataset};

/// Parse CSV bytes with a header row into typed columns.
///
/// A column is numeric when every non-empty cell parses as a number; empty
/// cells in a numeric column are rejected. Semicolon separated files are
/// accepted when the header contains no comma.
pub fn parse_csv(bytes: &[u8]) -> Result<TrainingDataset, DomainError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .trim(Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DomainError::dataset(format!("Unreadable CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(DomainError::dataset("CSV has no header"));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| DomainError::dataset(format!("Malformed CSV row {}: {}", line + 1, e)))?;
        for (column, value) in cells.iter_mut().zip(record.iter()) {
            column.push(value.to_string());
        }
    }

    if cells.first().is_none_or(Vec::is_empty) {
        return Err(DomainError::dataset("CSV has no data rows"));
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| type_column(name, values))
        .collect::<Result<Vec<_>, _>>()?;

    TrainingDataset::new(columns)
}

/// Serialize a dataset back to comma separated CSV
pub fn write_csv(dataset: &TrainingDataset) -> Result<Vec<u8>, DomainError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    let to_err = |e: csv::Error| DomainError::internal(format!("Failed to write CSV: {}", e));

    writer.write_record(dataset.column_names()).map_err(to_err)?;
    for row in 0..dataset.n_rows() {
        writer
            .write_record(dataset.columns().iter().map(|c| c.cell_text(row)))
            .map_err(to_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| DomainError::internal(format!("Failed to flush CSV: {}", e)))
}

fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    if !header.contains(&b',') && header.contains(&b';') {
        b';'
    } else {
        b','
    }
}

fn type_column(name: String, values: Vec<String>) -> Result<Column, DomainError> {
    let non_empty: Vec<&String> = values.iter().filter(|v| !v.is_empty()).collect();
    let numeric = !non_empty.is_empty() && non_empty.iter().all(|v| v.parse::<f64>().is_ok());

    if !numeric {
        return Ok(Column::categorical(name, values));
    }

    if non_empty.len() != values.len() {
        return Err(DomainError::dataset(format!(
            "numeric column '{}' has {} empty cells",
            name,
            values.len() - non_empty.len()
        )));
    }

    let parsed = values
        .iter()
        .map(|v| v.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DomainError::dataset(format!("column '{}': {}", name, e)))?;

    Ok(Column::numeric(name, parsed))
}

/// Canonical dataset kept as a CSV file
#[derive(Debug, Clone)]
pub struct CsvDatasetRepository {
    path: PathBuf,
}

impl CsvDatasetRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DatasetRepository for CsvDatasetRepository {
    async fn load(&self) -> Result<Option<TrainingDataset>, DomainError> {
        match fs::read(&self.path).await {
            Ok(bytes) => parse_csv(&bytes).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn replace(&self, dataset: &TrainingDataset) -> Result<(), DomainError> {
        let bytes = write_csv(dataset)?;
        write_atomic(&self.path, &bytes).await?;

        tracing::info!(
            path = %self.path.display(),
            rows = dataset.n_rows(),
            "Replaced canonical dataset"
        );
        Ok(())
    }

    async fn exists(&self) -> Result<bool, DomainError> {
        fs::try_exists(&self.path)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to stat dataset: {}", e)))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
