//! In-memory repository implementations for testing and embedding.

mod document;

pub use document::InMemoryRecordRepo;
