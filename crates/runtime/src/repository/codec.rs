//! JSON codec for the durable record document.
//!
//! # Document Layout
//!
//! ```text
//! {
//!   "players": {
//!     "76561198000000042": { "last_connection": "2026-01-02T03:04:05Z", "deaths": 3 }
//!   }
//! }
//! ```
//!
//! Player ids are written as decimal strings (JSON object keys) and timestamps
//! as RFC 3339, which keeps sub-second precision.

use records_core::RecordCollection;
use thiserror::Error;

/// Errors raised while converting between bytes and a [`RecordCollection`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("corrupted record document: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to encode record document: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Decodes a stored document.
///
/// A missing document, or one that is empty or whitespace, is the normal
/// first-start condition and yields an empty collection. Anything else that
/// fails to parse is [`CodecError::Corrupt`].
pub fn decode(bytes: Option<&[u8]>) -> Result<RecordCollection> {
    let Some(bytes) = bytes else {
        return Ok(RecordCollection::new());
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(RecordCollection::new());
    }

    serde_json::from_slice(bytes).map_err(CodecError::Corrupt)
}

/// Encodes the full collection as pretty-printed JSON.
pub fn encode(records: &RecordCollection) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(records).map_err(CodecError::Encode)
}
