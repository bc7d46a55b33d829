//! In-memory RecordRepository implementation for tests and embedding.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::repository::{RecordRepository, RepositoryError, Result};

/// In-memory implementation of RecordRepository.
///
/// Holds the last saved document. Can be switched to read-only to exercise
/// write-failure paths.
#[derive(Default)]
pub struct InMemoryRecordRepo {
    document: RwLock<Option<Vec<u8>>>,
    read_only: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryRecordRepo {
    /// Create an empty repository (no document stored).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with an existing document.
    pub fn with_document(document: impl Into<Vec<u8>>) -> Self {
        Self {
            document: RwLock::new(Some(document.into())),
            ..Self::default()
        }
    }

    /// Reject every subsequent save with [`RepositoryError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl RecordRepository for InMemoryRecordRepo {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        let document = self
            .document
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(document.clone())
    }

    fn save(&self, document: &[u8]) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(RepositoryError::ReadOnly);
        }

        let mut current = self
            .document
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *current = Some(document.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
