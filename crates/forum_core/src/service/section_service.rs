//! Section use-case service.
//!
//! # Invariants
//! - Section names are unique; the pre-write check is backed by the store's
//!   unique index, which surfaces a lost race as `StoreError::Conflict`.
//! - `list` orders by `sort` ascending, then by name.

use crate::config::ValidationLimits;
use crate::error::ForumResult;
use crate::model::id::DocumentId;
use crate::model::section::{NewSection, Section, SectionPatch};
use crate::service::{
    candidate_document, find_entity, insert_and_read, list_entities, require_entity,
    update_and_read,
};
use crate::store::{Collection, DocumentStore, Filter, Update};
use crate::validation::run_pipeline;

/// Section façade over a document store.
pub struct SectionService<S: DocumentStore> {
    store: S,
    limits: ValidationLimits,
}

impl<S: DocumentStore> SectionService<S> {
    pub fn new(store: S) -> Self {
        Self::with_limits(store, ValidationLimits::default())
    }

    pub fn with_limits(store: S, limits: ValidationLimits) -> Self {
        Self { store, limits }
    }

    pub fn create(&self, fields: NewSection) -> ForumResult<Section> {
        let fields = run_pipeline(&self.store, &self.limits, fields, None)?;
        let doc = candidate_document(&fields)?;
        insert_and_read(&self.store, Collection::Section, &doc)
    }

    pub fn edit(&self, id: &DocumentId, patch: &SectionPatch) -> ForumResult<Section> {
        let current: Section = require_entity(&self.store, Collection::Section, id)?;
        if patch.name.is_none() && patch.sort.is_none() {
            return Ok(current);
        }

        let merged = patch.apply_to(NewSection::from(&current));
        let merged = run_pipeline(&self.store, &self.limits, merged, Some(id))?;

        let mut delta = Update::new();
        if patch.name.is_some() {
            delta = delta.set("name", merged.name);
        }
        if patch.sort.is_some() {
            delta = delta.set("sort", merged.sort);
        }
        update_and_read(&self.store, Collection::Section, id, delta)
    }

    pub fn destroy(&self, id: &DocumentId) -> ForumResult<bool> {
        Ok(self.store.delete_by_id(Collection::Section, id)?)
    }

    pub fn find_by_id(&self, id: &DocumentId) -> ForumResult<Option<Section>> {
        find_entity(&self.store, Collection::Section, id)
    }

    pub fn list(&self) -> ForumResult<Vec<Section>> {
        let mut sections: Vec<Section> =
            list_entities(&self.store, Collection::Section, &Filter::all())?;
        sections.sort_by(|left, right| {
            left.sort
                .cmp(&right.sort)
                .then_with(|| left.name.cmp(&right.name))
        });
        Ok(sections)
    }
}
