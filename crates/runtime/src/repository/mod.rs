//! Repository layer for the durable record document.
//!
//! Repositories move the encoded document between memory and storage; the
//! [`codec`] turns it into a [`records_core::RecordCollection`] and back.

pub mod codec;
mod error;
mod file;
mod memory;
mod traits;

pub use codec::CodecError;
pub use error::{RepositoryError, Result};
pub use file::FileRecordRepository;
pub use memory::InMemoryRecordRepo;
pub use traits::RecordRepository;
