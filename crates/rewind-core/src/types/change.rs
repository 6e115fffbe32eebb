//! Observed record lifecycle transitions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The kind of lifecycle transition observed on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// The record was just created.
    Created,
    /// One or more persisted fields changed.
    Updated,
    /// The record was marked invisible without erasing it.
    SoftDeleted,
    /// The record was permanently destroyed.
    ForceDeleted,
}

/// A pending change evaluated by the revision policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeContext {
    /// What happened to the record.
    pub transition: TransitionKind,
    /// Names of the fields that changed. Empty for transitions that carry
    /// no field-level information (creation, force deletion).
    pub changed_fields: BTreeSet<String>,
}

impl ChangeContext {
    /// A creation transition.
    pub fn created() -> Self {
        Self {
            transition: TransitionKind::Created,
            changed_fields: BTreeSet::new(),
        }
    }

    /// An update transition touching the given fields.
    pub fn updated<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            transition: TransitionKind::Updated,
            changed_fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// A soft-deletion transition.
    pub fn soft_deleted() -> Self {
        Self {
            transition: TransitionKind::SoftDeleted,
            changed_fields: BTreeSet::new(),
        }
    }

    /// A permanent-deletion transition.
    pub fn force_deleted() -> Self {
        Self {
            transition: TransitionKind::ForceDeleted,
            changed_fields: BTreeSet::new(),
        }
    }
}
