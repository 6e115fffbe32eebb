//! In-memory store backends.

pub mod records;
pub mod revisions;

pub use records::InMemoryRecordStore;
pub use revisions::InMemoryRevisionStore;
