//! Repository contract for the durable record document.

use std::sync::Arc;

use super::Result;

/// Storage for the single named document holding every player record.
///
/// The document is opaque bytes at this layer: it is read whole on
/// activation and written whole on every checkpoint, reset and deactivation.
/// Encoding lives in [`super::codec`].
pub trait RecordRepository: Send + Sync {
    /// Read the stored document.
    ///
    /// Returns `Ok(None)` when nothing has been written yet.
    fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the stored document.
    fn save(&self, document: &[u8]) -> Result<()>;

    /// Human-readable location used in log lines.
    fn describe(&self) -> String;
}

impl<T: RecordRepository + ?Sized> RecordRepository for Arc<T> {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        (**self).load()
    }

    fn save(&self, document: &[u8]) -> Result<()> {
        (**self).save(document)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: RecordRepository + ?Sized> RecordRepository for Box<T> {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        (**self).load()
    }

    fn save(&self, document: &[u8]) -> Result<()> {
        (**self).save(document)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
