//! Revision policy evaluation.

use rewind_core::options::RevisionOptions;
use rewind_core::types::change::{ChangeContext, TransitionKind};

/// Decides whether a pending change is significant enough to snapshot.
#[derive(Debug, Clone)]
pub struct RevisionPolicy {
    options: RevisionOptions,
    soft_delete_field: Option<String>,
}

impl RevisionPolicy {
    /// Create a policy from the record type's options and soft-delete field.
    pub fn new(options: RevisionOptions, soft_delete_field: Option<String>) -> Self {
        Self {
            options,
            soft_delete_field,
        }
    }

    /// Whether a snapshot must be taken for this change.
    ///
    /// Soft deletions never snapshot: marking a record invisible is not a
    /// content change. Creation snapshots only when `revision_on_create` is
    /// set. For updates, a non-empty allow-list wins over the deny-list;
    /// with neither configured every update snapshots.
    pub fn should_snapshot(&self, change: &ChangeContext) -> bool {
        match change.transition {
            TransitionKind::SoftDeleted | TransitionKind::ForceDeleted => false,
            TransitionKind::Created => self.options.revision_on_create,
            TransitionKind::Updated => {
                if let Some(field) = &self.soft_delete_field {
                    if change.changed_fields.contains(field) {
                        return false;
                    }
                }

                if !self.options.fields_to_revision.is_empty() {
                    return change
                        .changed_fields
                        .iter()
                        .any(|f| self.options.fields_to_revision.contains(f));
                }

                if !self.options.fields_to_exclude.is_empty() {
                    return change
                        .changed_fields
                        .iter()
                        .any(|f| !self.options.fields_to_exclude.contains(f));
                }

                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(options: RevisionOptions) -> RevisionPolicy {
        RevisionPolicy::new(options, Some("deleted_at".to_string()))
    }

    #[test]
    fn test_every_update_snapshots_by_default() {
        let policy = policy(RevisionOptions::new());
        assert!(policy.should_snapshot(&ChangeContext::updated(["name"])));
    }

    #[test]
    fn test_creation_gated_by_revision_on_create() {
        assert!(!policy(RevisionOptions::new()).should_snapshot(&ChangeContext::created()));
        assert!(
            policy(RevisionOptions::new().revision_on_create())
                .should_snapshot(&ChangeContext::created())
        );
    }

    #[test]
    fn test_soft_deletion_never_snapshots() {
        let policy = policy(RevisionOptions::new());
        assert!(!policy.should_snapshot(&ChangeContext::soft_deleted()));
        // A dirty soft-delete marker on an update counts as a soft deletion.
        assert!(!policy.should_snapshot(&ChangeContext::updated(["deleted_at"])));
        assert!(!policy.should_snapshot(&ChangeContext::updated(["deleted_at", "name"])));
    }

    #[test]
    fn test_allow_list_requires_a_listed_field() {
        let policy = policy(RevisionOptions::new().fields_to_revision(["name", "content"]));
        assert!(policy.should_snapshot(&ChangeContext::updated(["name", "views"])));
        assert!(!policy.should_snapshot(&ChangeContext::updated(["views"])));
    }

    #[test]
    fn test_deny_list_ignores_confined_changes() {
        let policy = policy(RevisionOptions::new().fields_to_exclude(["views", "votes"]));
        assert!(!policy.should_snapshot(&ChangeContext::updated(["views"])));
        assert!(!policy.should_snapshot(&ChangeContext::updated(["views", "votes"])));
        assert!(policy.should_snapshot(&ChangeContext::updated(["views", "name"])));
    }

    #[test]
    fn test_allow_list_takes_precedence_over_deny_list() {
        let policy = policy(
            RevisionOptions::new()
                .fields_to_revision(["name"])
                .fields_to_exclude(["name"]),
        );
        assert!(policy.should_snapshot(&ChangeContext::updated(["name"])));
    }
}
