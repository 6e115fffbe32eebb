//! # rewind-entity
//!
//! Row models mapping the Rewind domain types onto the `revisions` table.

pub mod revision;

pub use revision::RevisionRow;
