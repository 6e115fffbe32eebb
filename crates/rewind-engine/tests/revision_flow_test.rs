//! Lifecycle, policy, retention, and hook behavior of the tracker.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use uuid::Uuid;

use common::{attrs, harness, harness_as, insert_post};
use rewind_core::options::RevisionOptions;
use rewind_core::types::change::ChangeContext;
use rewind_engine::Outcome;

#[tokio::test]
async fn creation_produces_no_revision_by_default() {
    let h = harness(RevisionOptions::new());
    let id = insert_post(&h.records, "A", 10);

    let outcome = h
        .tracker
        .observe(id, &ChangeContext::created())
        .await
        .expect("observe");

    assert!(matches!(outcome, Outcome::Skipped));
    assert!(h.tracker.revisions_for(id).await.expect("list").is_empty());
}

#[tokio::test]
async fn creation_produces_exactly_one_revision_when_opted_in() {
    let h = harness(RevisionOptions::new().revision_on_create());
    let id = insert_post(&h.records, "A", 10);

    let outcome = h
        .tracker
        .observe(id, &ChangeContext::created())
        .await
        .expect("observe");

    assert!(matches!(outcome, Outcome::Created(_)));
    let revisions = h.tracker.revisions_for(id).await.expect("list");
    assert_eq!(revisions.len(), 1);
    assert_eq!(revisions[0].snapshot.attributes["name"], json!("A"));
}

#[tokio::test]
async fn allow_list_gates_updates() {
    let h = harness(RevisionOptions::new().fields_to_revision(["name"]));
    let id = insert_post(&h.records, "A", 10);

    let skipped = h
        .tracker
        .observe(id, &ChangeContext::updated(["views"]))
        .await
        .expect("observe");
    assert!(matches!(skipped, Outcome::Skipped));

    let created = h
        .tracker
        .observe(id, &ChangeContext::updated(["name", "views"]))
        .await
        .expect("observe");
    assert!(matches!(created, Outcome::Created(_)));
}

#[tokio::test]
async fn deny_list_skips_confined_updates() {
    let h = harness(RevisionOptions::new().fields_to_exclude(["views"]));
    let id = insert_post(&h.records, "A", 10);

    let skipped = h
        .tracker
        .observe(id, &ChangeContext::updated(["views"]))
        .await
        .expect("observe");
    assert!(matches!(skipped, Outcome::Skipped));

    let created = h
        .tracker
        .observe(id, &ChangeContext::updated(["name"]))
        .await
        .expect("observe");
    assert!(matches!(created, Outcome::Created(_)));
}

#[tokio::test]
async fn soft_deletion_never_creates_a_revision() {
    let h = harness(RevisionOptions::new());
    let id = insert_post(&h.records, "A", 10);

    let outcome = h
        .tracker
        .observe(id, &ChangeContext::soft_deleted())
        .await
        .expect("observe");
    assert!(matches!(outcome, Outcome::Skipped));

    // A dirty soft-delete marker column counts as a soft deletion too.
    let outcome = h
        .tracker
        .observe(id, &ChangeContext::updated(["deleted_at"]))
        .await
        .expect("observe");
    assert!(matches!(outcome, Outcome::Skipped));
}

#[tokio::test]
async fn permanent_destruction_purges_all_revisions() {
    let h = harness(RevisionOptions::new());
    let id = insert_post(&h.records, "A", 10);

    for _ in 0..3 {
        h.tracker
            .observe(id, &ChangeContext::updated(["name"]))
            .await
            .expect("observe");
    }
    assert_eq!(h.tracker.revisions_for(id).await.expect("list").len(), 3);

    let outcome = h
        .tracker
        .observe(id, &ChangeContext::force_deleted())
        .await
        .expect("observe");
    assert!(matches!(outcome, Outcome::Purged(3)));
    assert!(h.tracker.revisions_for(id).await.expect("list").is_empty());
}

#[tokio::test]
async fn retention_keeps_only_the_newest_revisions() {
    let h = harness(RevisionOptions::new().limit_revisions_to(3));
    let id = insert_post(&h.records, "v0", 0);

    for version in 1..=5 {
        h.tracker
            .observe(id, &ChangeContext::updated(["name"]))
            .await
            .expect("observe");
        h.records.set_attribute(id, "name", json!(format!("v{version}")));
    }

    // Five snapshots captured the superseded states v0..v4; the two
    // oldest were evicted.
    let revisions = h.tracker.revisions_for(id).await.expect("list");
    assert_eq!(revisions.len(), 3);
    let names: Vec<_> = revisions
        .iter()
        .map(|r| r.snapshot.attributes["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("v2"), json!("v3"), json!("v4")]);
}

#[tokio::test]
async fn revisions_filter_by_owner_and_author() {
    let user_a = Uuid::new_v4();
    let h = harness_as(RevisionOptions::new(), Some(user_a));
    let first = insert_post(&h.records, "first", 1);
    let second = insert_post(&h.records, "second", 2);

    h.tracker
        .observe(first, &ChangeContext::updated(["name"]))
        .await
        .expect("observe");
    h.tracker
        .observe(second, &ChangeContext::updated(["name"]))
        .await
        .expect("observe");

    let first_revisions = h.tracker.revisions_for(first).await.expect("list");
    assert_eq!(first_revisions.len(), 1);
    assert_eq!(first_revisions[0].owner.id, first);

    use rewind_core::traits::revision_store::RevisionStore;
    let by_author = h.revisions.find_by_author(user_a).await.expect("list");
    assert_eq!(by_author.len(), 2);
    let by_other = h
        .revisions
        .find_by_author(Uuid::new_v4())
        .await
        .expect("list");
    assert!(by_other.is_empty());
}

#[tokio::test]
async fn revisioning_hook_can_cancel_snapshot_creation() {
    let h = harness(RevisionOptions::new());
    let id = insert_post(&h.records, "A", 10);

    h.hooks.on_revisioning("post", |_| false);

    let outcome = h
        .tracker
        .observe(id, &ChangeContext::updated(["name"]))
        .await
        .expect("observe");

    assert!(matches!(outcome, Outcome::Cancelled));
    assert!(h.tracker.revisions_for(id).await.expect("list").is_empty());
}

#[tokio::test]
async fn revisioned_hook_fires_after_persist() {
    let h = harness(RevisionOptions::new());
    let id = insert_post(&h.records, "A", 10);

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    h.hooks.on_revisioned("post", move |_, revision| {
        assert_eq!(revision.snapshot.attributes["name"], json!("A"));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    h.tracker
        .observe(id, &ChangeContext::updated(["name"]))
        .await
        .expect("observe");

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn manual_save_bypasses_policy_and_hooks() {
    // Allow-list would reject everything, and the hook would cancel; the
    // manual path ignores both.
    let h = harness(RevisionOptions::new().fields_to_revision(["never_changed"]));
    h.hooks.on_revisioning("post", |_| false);
    let id = insert_post(&h.records, "A", 10);

    let revision = h.tracker.save_revision(id).await.expect("save");
    assert_eq!(revision.snapshot.attributes["name"], json!("A"));
    assert_eq!(h.tracker.revisions_for(id).await.expect("list").len(), 1);
}

#[tokio::test]
async fn snapshots_are_isolated_from_later_mutation() {
    let h = harness(RevisionOptions::new().relations_to_revision(["tags"]));
    let id = insert_post(&h.records, "A", 10);
    let tag = Uuid::new_v4();
    h.records
        .set_members(id, "tags", std::collections::BTreeSet::from([tag]));

    let revision = h.tracker.save_revision(id).await.expect("save");

    h.records.set_attribute(id, "name", json!("mutated"));
    h.records
        .set_members(id, "tags", std::collections::BTreeSet::new());

    let stored = h
        .tracker
        .revisions_for(id)
        .await
        .expect("list")
        .pop()
        .expect("revision");
    assert_eq!(stored.id, revision.id);
    assert_eq!(stored.snapshot.attributes["name"], json!("A"));
    assert_eq!(
        stored.snapshot.relations["tags"],
        rewind_core::types::snapshot::RelationState::Pivoted {
            member_ids: std::collections::BTreeSet::from([tag]),
            pivot_attributes: std::collections::BTreeMap::new(),
        }
    );
}

#[tokio::test]
async fn tracking_an_undeclared_relation_fails_the_snapshot() {
    let h = harness(RevisionOptions::new().relations_to_revision(["ghost"]));
    let id = insert_post(&h.records, "A", 10);

    let err = h.tracker.save_revision(id).await.expect_err("undeclared");
    assert_eq!(err.kind, rewind_core::error::ErrorKind::Validation);
}

#[tokio::test]
async fn tracking_an_unsupported_relation_kind_fails_fast() {
    use rewind_core::types::relation::{RecordDescriptor, RelationKind};

    let descriptor = RecordDescriptor::new("post")
        .with_relation("country", RelationKind::HasManyThrough);
    let h = common::harness_for(
        descriptor,
        RevisionOptions::new().relations_to_revision(["country"]),
        None,
    );
    let id = insert_post(&h.records, "A", 10);

    let err = h
        .tracker
        .observe(id, &ChangeContext::updated(["name"]))
        .await
        .expect_err("unsupported kind");
    assert_eq!(err.kind, rewind_core::error::ErrorKind::UnsupportedRelation);
    assert!(h.tracker.revisions_for(id).await.expect("list").is_empty());
}

#[tokio::test]
async fn concrete_scenario_only_name_change_is_captured() {
    let h = harness(RevisionOptions::new().relations_to_revision(["tags"]));
    let id = insert_post(&h.records, "A", 10);
    let tags: std::collections::BTreeSet<Uuid> = [Uuid::new_v4(), Uuid::new_v4()].into();
    h.records.set_members(id, "tags", tags.clone());

    // Update name A -> B, views and tags unchanged: one revision holding
    // the superseded state.
    let outcome = h
        .tracker
        .observe(id, &ChangeContext::updated(["name"]))
        .await
        .expect("observe");
    h.records.set_attribute(id, "name", json!("B"));

    let Outcome::Created(before) = outcome else {
        panic!("expected a revision");
    };
    assert_eq!(before.snapshot.attributes["name"], json!("A"));
    assert_eq!(before.snapshot.attributes["views"], json!(10));
    assert_eq!(h.tracker.revisions_for(id).await.expect("list").len(), 1);

    h.tracker.rollback_to(id, &before).await.expect("rollback");

    let attributes = attrs(&[("name", json!("A")), ("views", json!(10))]);
    use rewind_core::traits::record_store::RecordStore;
    assert_eq!(h.records.attributes(id).await.expect("attrs"), attributes);
    assert_eq!(h.records.members(id, "tags").await.expect("tags"), tags);
}
