//! # rewind-core
//!
//! Core crate for Rewind, the record revision and rollback engine.
//! Contains collaborator traits, configuration schemas, the revision and
//! snapshot domain types, the relation classifier, per-type revisioning
//! options, lifecycle hooks, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Rewind crates.

pub mod config;
pub mod error;
pub mod hooks;
pub mod options;
pub mod result;
pub mod revision;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
