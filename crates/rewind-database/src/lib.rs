//! # rewind-database
//!
//! PostgreSQL-backed revision persistence for Rewind. The repository owns
//! its connection pool; the migration runner sets up the schema.

pub mod migration;
pub mod repositories;

pub use repositories::PgRevisionRepository;
