//! Revision table models.

pub mod model;

pub use model::{RevisionRow, metadata_payload};
