//! Filesystem helpers

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::domain::DomainError;

/// Write `bytes` to `path` so readers see either the old or the new file.
///
/// Each call writes its own uniquely named temp file next to the target,
/// syncs it and renames it over the target. Concurrent writers never share a
/// temp file; the last rename wins.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
    let path = path.to_path_buf();
    let bytes = bytes.to_vec();

    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &bytes))
        .await
        .map_err(|e| DomainError::internal(format!("Write task failed: {}", e)))?
}

fn write_atomic_blocking(path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
    let parent = target_dir(path);
    std::fs::create_dir_all(&parent).map_err(|e| {
        DomainError::storage(format!("Failed to create {}: {}", parent.display(), e))
    })?;

    let prefix = format!(
        ".{}.",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    // Dropped on every error path below, which deletes the temp file
    let mut tmp = Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|e| {
            DomainError::storage(format!("Failed to create temp file in {}: {}", parent.display(), e))
        })?;

    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| {
            DomainError::storage(format!("Failed to write {}: {}", tmp.path().display(), e))
        })?;

    tmp.persist(path).map_err(|e| {
        DomainError::storage(format!("Failed to replace {}: {}", path.display(), e.error))
    })?;

    Ok(())
}

fn target_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_write_atomic_creates_parent_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model_s2.json");

        write_atomic(&path, b"first").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(entries(&dir.path().join("nested")), vec!["model_s2.json"]);
    }

    #[tokio::test]
    async fn test_failed_replace_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_s4.json");
        std::fs::create_dir(&path).unwrap();

        let err = write_atomic(&path, b"model").await.unwrap_err();

        assert!(matches!(err, DomainError::Storage { .. }));
        assert_eq!(entries(dir.path()), vec!["model_s4.json"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_never_tear_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Arc::new(dir.path().join("student_full.csv"));
        let small = Arc::new(b"G3\n12\n8\n".to_vec());
        let large = Arc::new("G3\n15\n".repeat(20_000).into_bytes());

        for _ in 0..10 {
            let writers: Vec<_> = (0..8)
                .map(|i| {
                    let path = path.clone();
                    let content = if i % 2 == 0 { small.clone() } else { large.clone() };
                    tokio::spawn(async move { write_atomic(&path, &content).await })
                })
                .collect();

            for writer in writers {
                writer.await.unwrap().unwrap();
            }

            let written = std::fs::read(path.as_ref()).unwrap();
            assert!(written == *small || written == *large);
        }

        assert_eq!(entries(dir.path()), vec!["student_full.csv"]);
    }
}
