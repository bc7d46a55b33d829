//! File-based repository implementations.

mod document;

pub use document::FileRecordRepository;
