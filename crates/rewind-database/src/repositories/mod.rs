//! Concrete repository implementations.

pub mod revision;

pub use revision::PgRevisionRepository;
