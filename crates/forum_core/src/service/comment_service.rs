//! Comment use-case service.

use crate::config::ValidationLimits;
use crate::error::ForumResult;
use crate::model::comment::{Comment, CommentPatch, NewComment, TOPIC_ID_FIELD};
use crate::model::id::DocumentId;
use crate::service::{
    candidate_document, find_entity, insert_and_read, list_entities, require_entity,
    update_and_read,
};
use crate::store::{Collection, DocumentStore, Filter, Update};
use crate::validation::run_pipeline;
use log::info;

/// Comment façade over a document store.
pub struct CommentService<S: DocumentStore> {
    store: S,
    limits: ValidationLimits,
}

impl<S: DocumentStore> CommentService<S> {
    pub fn new(store: S) -> Self {
        Self::with_limits(store, ValidationLimits::default())
    }

    pub fn with_limits(store: S, limits: ValidationLimits) -> Self {
        Self { store, limits }
    }

    /// Validates and persists a comment on an existing topic.
    pub fn create(&self, fields: NewComment) -> ForumResult<Comment> {
        let fields = run_pipeline(&self.store, &self.limits, fields, None)?;
        let doc = candidate_document(&fields)?;
        let comment: Comment = insert_and_read(&self.store, Collection::Comment, &doc)?;

        info!(
            "event=comment_create module=service status=ok id={} topic={}",
            comment.id, comment.topic_id
        );
        Ok(comment)
    }

    pub fn edit(&self, id: &DocumentId, patch: &CommentPatch) -> ForumResult<Comment> {
        let current: Comment = require_entity(&self.store, Collection::Comment, id)?;
        if patch.content.is_none() {
            return Ok(current);
        }

        let merged = patch.apply_to(NewComment::from(&current));
        let merged = run_pipeline(&self.store, &self.limits, merged, Some(id))?;

        update_and_read(
            &self.store,
            Collection::Comment,
            id,
            Update::new().set("content", merged.content),
        )
    }

    /// Returns `false` when the comment was already absent.
    pub fn destroy(&self, id: &DocumentId) -> ForumResult<bool> {
        Ok(self.store.delete_by_id(Collection::Comment, id)?)
    }

    pub fn find_by_id(&self, id: &DocumentId) -> ForumResult<Option<Comment>> {
        find_entity(&self.store, Collection::Comment, id)
    }

    /// Lists comments on a topic, oldest first.
    pub fn list_for_topic(&self, topic_id: &DocumentId) -> ForumResult<Vec<Comment>> {
        list_entities(
            &self.store,
            Collection::Comment,
            &Filter::eq(TOPIC_ID_FIELD, topic_id.as_str()),
        )
    }
}
