//! File-based RecordRepository implementation.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::repository::{RecordRepository, RepositoryError, Result};

/// File-based implementation of RecordRepository.
///
/// Stores the record document as `{base_dir}/{name}.json`.
///
/// # Write Protocol
///
/// 1. Write the full document to `{name}.json.tmp`
/// 2. Flush it to disk
/// 3. Atomically rename over `{name}.json`
///
/// A crash mid-write leaves the previous document intact.
pub struct FileRecordRepository {
    path: PathBuf,
}

impl FileRecordRepository {
    /// Create a repository for the document `name` inside `base_dir`.
    ///
    /// The directory is created if it does not exist.
    pub fn new(base_dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir).map_err(|e| RepositoryError::io(base_dir, e))?;
        Ok(Self {
            path: base_dir.join(format!("{}.json", name)),
        })
    }

    /// Path of the document on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl RecordRepository for FileRecordRepository {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                tracing::debug!(
                    target: "records::repository",
                    "Loaded {} bytes from {}",
                    bytes.len(),
                    self.path.display()
                );
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepositoryError::io(&self.path, e)),
        }
    }

    fn save(&self, document: &[u8]) -> Result<()> {
        let temp_path = self.temp_path();

        write_synced(&temp_path, document).map_err(|e| RepositoryError::io(&temp_path, e))?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            RepositoryError::io(&self.path, e)
        })?;

        tracing::debug!(
            target: "records::repository",
            "Saved {} bytes to {}",
            document.len(),
            self.path.display()
        );

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
