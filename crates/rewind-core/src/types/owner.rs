//! Polymorphic owner reference.
//!
//! A revision can belong to any record type. Owners are addressed by an
//! explicit type tag plus primary key rather than a concrete entity type,
//! mirroring the `revisionable_type` / `revisionable_id` column pair in
//! the revisions table.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to the record that owns a revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    /// Type tag of the owning record (e.g. `"post"`, `"product"`).
    pub type_tag: String,
    /// Primary key of the owning record.
    pub id: Uuid,
}

impl OwnerRef {
    /// Create a new owner reference.
    pub fn new(type_tag: impl Into<String>, id: Uuid) -> Self {
        Self {
            type_tag: type_tag.into(),
            id,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_tag, self.id)
    }
}
