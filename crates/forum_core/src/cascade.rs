//! Cascade deleter for topics.
//!
//! # Responsibility
//! - Remove a topic together with every comment that references it.
//! - Hand the removed topic to the counter maintainer.
//!
//! # Invariants
//! - Comments go first, then the topic, then the counters. A failure stops
//!   the remaining steps; steps already applied are not rolled back.
//! - Destroying an absent topic touches neither comments nor counters.

use crate::counters;
use crate::error::ForumResult;
use crate::model::comment::TOPIC_ID_FIELD;
use crate::model::id::DocumentId;
use crate::model::topic::Topic;
use crate::store::{from_document, Collection, DocumentStore, Filter};
use log::{error, info};

/// Destroys a topic and its dependents.
///
/// Returns the removed topic, or `None` when it did not exist.
pub fn destroy_topic<S: DocumentStore>(store: &S, id: &DocumentId) -> ForumResult<Option<Topic>> {
    let Some(doc) = store.find_by_id(Collection::Topic, id)? else {
        info!("event=topic_destroy module=cascade status=absent id={id}");
        return Ok(None);
    };
    let topic: Topic = from_document(doc)?;

    let comments_removed = match store.delete_many(
        Collection::Comment,
        &Filter::eq(TOPIC_ID_FIELD, id.as_str()),
    ) {
        Ok(count) => count,
        Err(err) => {
            error!(
                "event=topic_destroy module=cascade status=error step=comments id={id} error={err}"
            );
            return Err(err.into());
        }
    };

    if !store.delete_by_id(Collection::Topic, id)? {
        // A concurrent destroy won the race and already uncounted the topic.
        info!(
            "event=topic_destroy module=cascade status=absent id={id} comments_removed={comments_removed}"
        );
        return Ok(None);
    }

    counters::topic_destroyed(store, &topic)?;

    info!(
        "event=topic_destroy module=cascade status=ok id={id} comments_removed={comments_removed}"
    );
    Ok(Some(topic))
}
