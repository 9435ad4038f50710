//! Entity façades.
//!
//! # Responsibility
//! - Expose create/edit/destroy/find per entity to route and CLI layers.
//! - Compose sanitization, validation, timestamps, counters and cascades in
//!   a fixed order around each store write.
//!
//! # Invariants
//! - `create`/`edit` write nothing until the full pipeline has passed.
//! - `find_by_id` and `destroy` report absence as `None`/`false`, not as an
//!   error; `edit` requires the target to exist.

use crate::error::{ForumError, ForumResult};
use crate::model::id::DocumentId;
use crate::store::{
    from_document, to_document, Collection, Document, DocumentStore, Filter, Update,
};
use crate::timestamp::{now_epoch_ms, stamp_created, stamp_updated};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod comment_service;
pub mod node_service;
pub mod section_service;
pub mod topic_service;
pub mod user_service;

pub(crate) fn find_entity<S: DocumentStore, T: DeserializeOwned>(
    store: &S,
    collection: Collection,
    id: &DocumentId,
) -> ForumResult<Option<T>> {
    match store.find_by_id(collection, id)? {
        Some(doc) => Ok(Some(from_document(doc)?)),
        None => Ok(None),
    }
}

pub(crate) fn require_entity<S: DocumentStore, T: DeserializeOwned>(
    store: &S,
    collection: Collection,
    id: &DocumentId,
) -> ForumResult<T> {
    find_entity(store, collection, id)?.ok_or_else(|| ForumError::NotFound {
        collection,
        id: id.clone(),
    })
}

pub(crate) fn list_entities<S: DocumentStore, T: DeserializeOwned>(
    store: &S,
    collection: Collection,
    filter: &Filter,
) -> ForumResult<Vec<T>> {
    store
        .find(collection, filter)?
        .into_iter()
        .map(|doc| from_document(doc).map_err(ForumError::from))
        .collect()
}

/// Builds the insert body for a validated candidate.
pub(crate) fn candidate_document<T: Serialize>(fields: &T) -> ForumResult<Document> {
    let mut doc = to_document(fields)?;
    stamp_created(&mut doc, now_epoch_ms());
    Ok(doc)
}

/// Inserts a body and reads the stored entity back.
pub(crate) fn insert_and_read<S: DocumentStore, T: DeserializeOwned>(
    store: &S,
    collection: Collection,
    doc: &Document,
) -> ForumResult<T> {
    let id = store.insert(collection, doc)?;
    find_entity(store, collection, &id)?.ok_or(ForumError::InconsistentState(
        "created document not found in read-back",
    ))
}

/// Applies an edit delta (plus `updatedAt`) and reads the entity back.
pub(crate) fn update_and_read<S: DocumentStore, T: DeserializeOwned>(
    store: &S,
    collection: Collection,
    id: &DocumentId,
    delta: Update,
) -> ForumResult<T> {
    let delta = stamp_updated(delta, now_epoch_ms());
    if !store.update_by_id(collection, id, &delta)? {
        return Err(ForumError::NotFound {
            collection,
            id: id.clone(),
        });
    }
    find_entity(store, collection, id)?.ok_or(ForumError::InconsistentState(
        "updated document not found in read-back",
    ))
}
