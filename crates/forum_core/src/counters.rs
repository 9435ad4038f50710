//! Counter maintainer for denormalized `topicCount` aggregates.
//!
//! # Responsibility
//! - Own every write to `User.topicCount` and `Node.topicCount`.
//! - Keep counts in step with topic creation and destruction.
//! - Repair drift with an explicit recount.
//!
//! # Invariants
//! - Increments and decrements are single-document atomic updates; nothing
//!   spans the user and the node.
//! - A decrement only follows the removal of a topic that was counted.
//! - A vanished or malformed counter target is a logged no-op; other store
//!   failures propagate.

use crate::model::id::DocumentId;
use crate::model::node::Node;
use crate::model::topic::Topic;
use crate::model::user::User;
use crate::store::{
    from_document, Collection, Document, DocumentStore, Filter, StoreResult, Update,
};
use log::{info, warn};
use serde_json::Value;

pub const TOPIC_COUNT_FIELD: &str = "topicCount";

/// Outcome of a recount run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub users_fixed: usize,
    pub nodes_fixed: usize,
}

/// Seeds the counter on a user or node document about to be inserted.
pub fn initialize(doc: &mut Document) {
    doc.insert(TOPIC_COUNT_FIELD.to_string(), Value::from(0));
}

/// Counts a newly persisted topic against its author and node.
pub fn topic_created<S: DocumentStore>(store: &S, topic: &Topic) -> StoreResult<()> {
    adjust(store, Collection::User, &topic.author.id, 1)?;
    adjust(store, Collection::Node, &topic.node.id, 1)
}

/// Uncounts a topic that has just been removed.
pub fn topic_destroyed<S: DocumentStore>(store: &S, topic: &Topic) -> StoreResult<()> {
    adjust(store, Collection::User, &topic.author.id, -1)?;
    adjust(store, Collection::Node, &topic.node.id, -1)
}

fn adjust<S: DocumentStore>(
    store: &S,
    collection: Collection,
    raw_id: &str,
    delta: i64,
) -> StoreResult<()> {
    let Ok(id) = DocumentId::parse(raw_id) else {
        warn!(
            "event=counter_adjust module=counters status=skipped reason=malformed_target collection={collection} delta={delta}"
        );
        return Ok(());
    };

    let matched = store.update_by_id(collection, &id, &Update::new().inc(TOPIC_COUNT_FIELD, delta))?;
    if !matched {
        warn!(
            "event=counter_adjust module=counters status=skipped reason=missing_target collection={collection} id={id} delta={delta}"
        );
    }
    Ok(())
}

/// Recomputes every user's and node's `topicCount` from existing topics and
/// rewrites the counters that drifted.
pub fn reconcile_topic_counts<S: DocumentStore>(store: &S) -> StoreResult<ReconcileReport> {
    let mut report = ReconcileReport::default();

    for doc in store.find(Collection::User, &Filter::all())? {
        let user: User = from_document(doc)?;
        if recount(store, Collection::User, &user.id, user.topic_count, "author.id")? {
            report.users_fixed += 1;
        }
    }

    for doc in store.find(Collection::Node, &Filter::all())? {
        let node: Node = from_document(doc)?;
        if recount(store, Collection::Node, &node.id, node.topic_count, "node.id")? {
            report.nodes_fixed += 1;
        }
    }

    info!(
        "event=counter_reconcile module=counters status=ok users_fixed={} nodes_fixed={}",
        report.users_fixed, report.nodes_fixed
    );
    Ok(report)
}

fn recount<S: DocumentStore>(
    store: &S,
    collection: Collection,
    id: &DocumentId,
    stored: i64,
    reference_field: &str,
) -> StoreResult<bool> {
    let actual = store.count(Collection::Topic, &Filter::eq(reference_field, id.as_str()))? as i64;
    if actual == stored {
        return Ok(false);
    }

    store.update_by_id(collection, id, &Update::new().set(TOPIC_COUNT_FIELD, actual))?;
    Ok(true)
}
