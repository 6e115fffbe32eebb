//! Per-record-type revisioning options.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Revisioning policy configuration for one record type.
///
/// Built fluent-style and handed to the tracker at construction time:
///
/// ```
/// use rewind_core::options::RevisionOptions;
///
/// let options = RevisionOptions::new()
///     .revision_on_create()
///     .limit_revisions_to(30)
///     .relations_to_revision(["tags", "reply"])
///     .fields_to_exclude(["views"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RevisionOptions {
    /// Take a snapshot when the record is first created.
    #[serde(default)]
    pub revision_on_create: bool,
    /// Only changes to these fields trigger a revision. Empty means all
    /// fields. When non-empty this takes precedence over
    /// [`fields_to_exclude`](Self::fields_to_exclude).
    #[serde(default)]
    pub fields_to_revision: BTreeSet<String>,
    /// Changes touching only these fields never trigger a revision.
    #[serde(default)]
    pub fields_to_exclude: BTreeSet<String>,
    /// Relation names to capture in each snapshot. Untracked relations are
    /// never snapshotted or restored.
    #[serde(default)]
    pub relations_to_revision: BTreeSet<String>,
    /// Keep at most this many revisions per owner, evicting oldest first.
    #[serde(default)]
    pub revision_limit: Option<u32>,
    /// Persist a snapshot of the current state before rolling back, so the
    /// rollback itself can be undone.
    #[serde(default)]
    pub create_revision_on_rollback: bool,
}

impl RevisionOptions {
    /// Options with all defaults: revision every update, no creation
    /// snapshot, no limit, no tracked relations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the record when it is first created.
    pub fn revision_on_create(mut self) -> Self {
        self.revision_on_create = true;
        self
    }

    /// Restrict revisioning to changes in the given fields.
    pub fn fields_to_revision<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_to_revision = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Never revision changes confined to the given fields.
    pub fn fields_to_exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_to_exclude = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Track the given relations in every snapshot.
    pub fn relations_to_revision<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations_to_revision = relations.into_iter().map(Into::into).collect();
        self
    }

    /// Keep at most `limit` revisions per owner.
    pub fn limit_revisions_to(mut self, limit: u32) -> Self {
        self.revision_limit = Some(limit);
        self
    }

    /// Snapshot the pre-rollback state when rolling back.
    pub fn create_revision_on_rollback(mut self) -> Self {
        self.create_revision_on_rollback = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RevisionOptions::new();
        assert!(!options.revision_on_create);
        assert!(options.fields_to_revision.is_empty());
        assert!(options.revision_limit.is_none());
        assert!(!options.create_revision_on_rollback);
    }

    #[test]
    fn test_builder_chain() {
        let options = RevisionOptions::new()
            .revision_on_create()
            .limit_revisions_to(5)
            .fields_to_revision(["name", "content"])
            .relations_to_revision(["tags"]);

        assert!(options.revision_on_create);
        assert_eq!(options.revision_limit, Some(5));
        assert!(options.fields_to_revision.contains("name"));
        assert!(options.relations_to_revision.contains("tags"));
    }
}
