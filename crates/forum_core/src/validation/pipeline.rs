//! Ordered validation pipeline shared by every entity façade.
//!
//! Stages run in a fixed order over one candidate value:
//! sanitize → field rules → uniqueness → references. Field and reference
//! stages only read; the first store failure aborts the run.

use crate::config::ValidationLimits;
use crate::error::ForumResult;
use crate::model::id::DocumentId;
use crate::store::{Collection, DocumentStore, StoreResult};
use crate::validation::reference::{validate_references, ReferenceField};
use crate::validation::{ValidationError, Violation};
use log::debug;

/// A document about to be created or rewritten by an edit.
pub trait Candidate: Sized {
    const COLLECTION: Collection;

    /// Rewrites free-text fields into their inert form and canonicalizes
    /// reference ids. Never fails.
    fn sanitize(self) -> Self;

    /// Presence and length rules; no store access.
    fn check_fields(&self, limits: &ValidationLimits) -> Vec<Violation>;

    /// Uniqueness rules. `existing` is the document being edited, if any.
    fn check_unique<S: DocumentStore>(
        &self,
        _store: &S,
        _existing: Option<&DocumentId>,
    ) -> StoreResult<Vec<Violation>> {
        Ok(Vec::new())
    }

    /// Embedded references in field-declaration order.
    fn references(&self) -> Vec<ReferenceField<'_>> {
        Vec::new()
    }
}

/// Runs every stage and returns the sanitized candidate, or one
/// `ValidationError` listing all violations.
pub fn run_pipeline<S: DocumentStore, C: Candidate>(
    store: &S,
    limits: &ValidationLimits,
    candidate: C,
    existing: Option<&DocumentId>,
) -> ForumResult<C> {
    let candidate = candidate.sanitize();

    let mut violations = candidate.check_fields(limits);
    violations.extend(candidate.check_unique(store, existing)?);
    violations.extend(validate_references(store, &candidate.references())?);

    if violations.is_empty() {
        return Ok(candidate);
    }

    debug!(
        "event=validate module=validation status=rejected collection={} violations={}",
        C::COLLECTION,
        violations.len()
    );
    Err(ValidationError::new(C::COLLECTION, violations).into())
}
