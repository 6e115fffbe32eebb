//! Relation descriptors and the relation classifier.
//!
//! Every relation declared on a revisionable record type carries a
//! [`RelationKind`]. The classifier maps declared kinds onto the two
//! restoration strategies the rollback engine knows: [`RelationClass::Direct`]
//! (foreign-key rows, restored by recreating/updating/deleting rows) and
//! [`RelationClass::Pivoted`] (join-table membership, restored by resetting
//! the membership set). Kinds outside those two groups are rejected outright
//! rather than silently skipped.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// The declared kind of a relation on a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Child-to-parent foreign key (the parent row is captured).
    BelongsTo,
    /// One-to-one child row.
    HasOne,
    /// One-to-many child rows.
    HasMany,
    /// Many-to-many membership through a join table.
    ManyToMany,
    /// Transitive relation through an intermediate table. Not revisionable.
    HasManyThrough,
    /// Polymorphic inverse relation. Not revisionable.
    MorphTo,
}

/// How a relation is snapshotted and restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationClass {
    /// Foreign-key-owned rows, restored row by row.
    Direct,
    /// Join-table membership, restored as a set.
    Pivoted,
}

impl RelationKind {
    /// Classify this kind into a restoration strategy.
    ///
    /// The classification is a pure function of the declared kind and is
    /// fixed for the lifetime of the record type's configuration. Kinds the
    /// engine cannot restore fail with `ErrorKind::UnsupportedRelation`.
    pub fn classify(self) -> AppResult<RelationClass> {
        match self {
            Self::BelongsTo | Self::HasOne | Self::HasMany => Ok(RelationClass::Direct),
            Self::ManyToMany => Ok(RelationClass::Pivoted),
            Self::HasManyThrough | Self::MorphTo => Err(AppError::unsupported_relation(
                format!("relation kind {self:?} cannot be revisioned"),
            )),
        }
    }
}

/// A named relation declared on a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// Relation name as registered on the record type.
    pub name: String,
    /// Declared relation kind.
    pub kind: RelationKind,
}

impl RelationDescriptor {
    /// Create a new relation descriptor.
    pub fn new(name: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Static description of a revisionable record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    /// Type tag used in the polymorphic owner reference.
    pub type_tag: String,
    /// Name of the soft-delete marker field, if the type supports
    /// soft deletion (e.g. `"deleted_at"`).
    pub soft_delete_field: Option<String>,
    /// All relations declared on the type.
    pub relations: Vec<RelationDescriptor>,
}

impl RecordDescriptor {
    /// Create a descriptor with no relations.
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            soft_delete_field: None,
            relations: Vec::new(),
        }
    }

    /// Set the soft-delete marker field.
    pub fn with_soft_delete_field(mut self, field: impl Into<String>) -> Self {
        self.soft_delete_field = Some(field.into());
        self
    }

    /// Declare a relation on the type.
    pub fn with_relation(mut self, name: impl Into<String>, kind: RelationKind) -> Self {
        self.relations.push(RelationDescriptor::new(name, kind));
        self
    }

    /// Look up a declared relation by name.
    pub fn relation(&self, name: &str) -> Option<&RelationDescriptor> {
        self.relations.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_direct_kinds_classify_as_direct() {
        for kind in [RelationKind::BelongsTo, RelationKind::HasOne, RelationKind::HasMany] {
            assert_eq!(kind.classify().expect("supported"), RelationClass::Direct);
        }
    }

    #[test]
    fn test_many_to_many_classifies_as_pivoted() {
        assert_eq!(
            RelationKind::ManyToMany.classify().expect("supported"),
            RelationClass::Pivoted
        );
    }

    #[test]
    fn test_unsupported_kinds_are_rejected() {
        for kind in [RelationKind::HasManyThrough, RelationKind::MorphTo] {
            let err = kind.classify().expect_err("unsupported");
            assert_eq!(err.kind, ErrorKind::UnsupportedRelation);
        }
    }

    #[test]
    fn test_descriptor_relation_lookup() {
        let descriptor = RecordDescriptor::new("post")
            .with_relation("tags", RelationKind::ManyToMany)
            .with_relation("reply", RelationKind::HasOne);

        assert_eq!(
            descriptor.relation("tags").map(|r| r.kind),
            Some(RelationKind::ManyToMany)
        );
        assert!(descriptor.relation("comments").is_none());
    }
}
