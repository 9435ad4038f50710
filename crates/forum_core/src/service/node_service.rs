//! Node use-case service.
//!
//! Topics are posted to nodes through `node.id`; removing a node leaves those
//! topics in place and later counter updates against the node become no-ops.
//! `topicCount` is seeded by the counter maintainer and never written here.

use crate::config::ValidationLimits;
use crate::counters;
use crate::error::ForumResult;
use crate::model::id::DocumentId;
use crate::model::node::{NewNode, Node, NodePatch};
use crate::service::{
    candidate_document, find_entity, insert_and_read, list_entities, require_entity,
    update_and_read,
};
use crate::store::{Collection, DocumentStore, Filter, Update};
use crate::validation::run_pipeline;

/// Node façade over a document store.
pub struct NodeService<S: DocumentStore> {
    store: S,
    limits: ValidationLimits,
}

impl<S: DocumentStore> NodeService<S> {
    pub fn new(store: S) -> Self {
        Self::with_limits(store, ValidationLimits::default())
    }

    pub fn with_limits(store: S, limits: ValidationLimits) -> Self {
        Self { store, limits }
    }

    pub fn create(&self, fields: NewNode) -> ForumResult<Node> {
        let fields = run_pipeline(&self.store, &self.limits, fields, None)?;
        let mut doc = candidate_document(&fields)?;
        counters::initialize(&mut doc);
        insert_and_read(&self.store, Collection::Node, &doc)
    }

    pub fn edit(&self, id: &DocumentId, patch: &NodePatch) -> ForumResult<Node> {
        let current: Node = require_entity(&self.store, Collection::Node, id)?;
        if patch.name.is_none() {
            return Ok(current);
        }

        let merged = patch.apply_to(NewNode::from(&current));
        let merged = run_pipeline(&self.store, &self.limits, merged, Some(id))?;
        update_and_read(
            &self.store,
            Collection::Node,
            id,
            Update::new().set("name", merged.name),
        )
    }

    pub fn destroy(&self, id: &DocumentId) -> ForumResult<bool> {
        Ok(self.store.delete_by_id(Collection::Node, id)?)
    }

    pub fn find_by_id(&self, id: &DocumentId) -> ForumResult<Option<Node>> {
        find_entity(&self.store, Collection::Node, id)
    }

    /// Lists every node in creation order.
    pub fn list(&self) -> ForumResult<Vec<Node>> {
        list_entities(&self.store, Collection::Node, &Filter::all())
    }
}
