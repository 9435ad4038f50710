//! User use-case service.
//!
//! Users own topics through `author.id`; removing a user leaves those topics in
//! place and later counter updates against the user become no-ops.
//! `topicCount` is seeded by the counter maintainer and never written here.

use crate::config::ValidationLimits;
use crate::counters;
use crate::error::ForumResult;
use crate::model::id::DocumentId;
use crate::model::user::{NewUser, User, UserPatch};
use crate::service::{
    candidate_document, find_entity, insert_and_read, require_entity, update_and_read,
};
use crate::store::{Collection, DocumentStore, Update};
use crate::validation::run_pipeline;

/// User façade over a document store.
pub struct UserService<S: DocumentStore> {
    store: S,
    limits: ValidationLimits,
}

impl<S: DocumentStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self::with_limits(store, ValidationLimits::default())
    }

    pub fn with_limits(store: S, limits: ValidationLimits) -> Self {
        Self { store, limits }
    }

    pub fn create(&self, fields: NewUser) -> ForumResult<User> {
        let fields = run_pipeline(&self.store, &self.limits, fields, None)?;
        let mut doc = candidate_document(&fields)?;
        counters::initialize(&mut doc);
        insert_and_read(&self.store, Collection::User, &doc)
    }

    pub fn edit(&self, id: &DocumentId, patch: &UserPatch) -> ForumResult<User> {
        let current: User = require_entity(&self.store, Collection::User, id)?;
        if patch.name.is_none() {
            return Ok(current);
        }

        let merged = patch.apply_to(NewUser::from(&current));
        let merged = run_pipeline(&self.store, &self.limits, merged, Some(id))?;
        update_and_read(
            &self.store,
            Collection::User,
            id,
            Update::new().set("name", merged.name),
        )
    }

    pub fn destroy(&self, id: &DocumentId) -> ForumResult<bool> {
        Ok(self.store.delete_by_id(Collection::User, id)?)
    }

    pub fn find_by_id(&self, id: &DocumentId) -> ForumResult<Option<User>> {
        find_entity(&self.store, Collection::User, id)
    }
}
