//! Topic use-case service.
//!
//! # Responsibility
//! - Create, edit, destroy and look up topics.
//! - Trigger counter maintenance on create and the cascade on destroy.
//!
//! # Invariants
//! - Pipeline order is sanitize → fields → references → insert → counters.
//! - Edits write only the patched fields plus `updatedAt`; references and
//!   counters are never touched by an edit.

use crate::cascade;
use crate::config::ValidationLimits;
use crate::counters;
use crate::error::ForumResult;
use crate::model::id::DocumentId;
use crate::model::topic::{NewTopic, Topic, TopicPatch};
use crate::service::{
    candidate_document, find_entity, insert_and_read, list_entities, require_entity,
    update_and_read,
};
use crate::store::{Collection, DocumentStore, Filter, Update};
use crate::validation::run_pipeline;
use log::info;

/// Topic façade over a document store.
pub struct TopicService<S: DocumentStore> {
    store: S,
    limits: ValidationLimits,
}

impl<S: DocumentStore> TopicService<S> {
    /// Creates a service with default validation limits.
    pub fn new(store: S) -> Self {
        Self::with_limits(store, ValidationLimits::default())
    }

    pub fn with_limits(store: S, limits: ValidationLimits) -> Self {
        Self { store, limits }
    }

    /// Validates and persists a topic, then counts it against its author and
    /// node.
    ///
    /// A counter failure is surfaced after the topic has been stored.
    pub fn create(&self, fields: NewTopic) -> ForumResult<Topic> {
        let fields = run_pipeline(&self.store, &self.limits, fields, None)?;
        let doc = candidate_document(&fields)?;
        let topic: Topic = insert_and_read(&self.store, Collection::Topic, &doc)?;

        counters::topic_created(&self.store, &topic)?;

        info!(
            "event=topic_create module=service status=ok id={} node={} author={}",
            topic.id, topic.node.id, topic.author.id
        );
        Ok(topic)
    }

    /// Applies a partial edit after re-validating the merged topic.
    pub fn edit(&self, id: &DocumentId, patch: &TopicPatch) -> ForumResult<Topic> {
        let current: Topic = require_entity(&self.store, Collection::Topic, id)?;
        if patch.title.is_none() && patch.content.is_none() {
            return Ok(current);
        }

        let merged = patch.apply_to(NewTopic::from(&current));
        let merged = run_pipeline(&self.store, &self.limits, merged, Some(id))?;

        let mut delta = Update::new();
        if patch.title.is_some() {
            delta = delta.set("title", merged.title);
        }
        if patch.content.is_some() {
            delta = delta.set("content", merged.content);
        }

        let topic = update_and_read(&self.store, Collection::Topic, id, delta)?;
        info!("event=topic_edit module=service status=ok id={id}");
        Ok(topic)
    }

    /// Removes the topic and its comments and uncounts it.
    ///
    /// Returns `false` when the topic was already absent.
    pub fn destroy(&self, id: &DocumentId) -> ForumResult<bool> {
        Ok(cascade::destroy_topic(&self.store, id)?.is_some())
    }

    pub fn find_by_id(&self, id: &DocumentId) -> ForumResult<Option<Topic>> {
        find_entity(&self.store, Collection::Topic, id)
    }

    /// Lists topics posted to a node, oldest first.
    pub fn list_by_node(&self, node_id: &DocumentId) -> ForumResult<Vec<Topic>> {
        list_entities(
            &self.store,
            Collection::Topic,
            &Filter::eq("node.id", node_id.as_str()),
        )
    }

    /// Lists topics written by a user, oldest first.
    pub fn list_by_author(&self, user_id: &DocumentId) -> ForumResult<Vec<Topic>> {
        list_entities(
            &self.store,
            Collection::Topic,
            &Filter::eq("author.id", user_id.as_str()),
        )
    }
}
