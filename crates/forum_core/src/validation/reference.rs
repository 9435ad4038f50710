//! Reference validator.
//!
//! # Responsibility
//! - Confirm an embedded identifier is well-formed for the store.
//! - Confirm it resolves to an existing document of the expected collection.
//!
//! # Invariants
//! - A malformed id is rejected without touching the store.
//! - Every declared reference is checked, in declaration order, so callers
//!   see the complete set of bad references.

use crate::model::id::DocumentId;
use crate::store::{Collection, DocumentStore, StoreResult};
use crate::validation::{Violation, ViolationKind};
use log::debug;

/// One embedded reference declared by a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceField<'a> {
    /// Dotted field path reported in violations (`author.id`, `topicId`).
    pub field: &'static str,
    pub id: &'a str,
    pub target: Collection,
}

impl<'a> ReferenceField<'a> {
    pub fn new(field: &'static str, id: &'a str, target: Collection) -> Self {
        Self { field, id, target }
    }
}

/// Checks one reference. Store failures propagate; they are not violations.
pub fn validate_reference<S: DocumentStore>(
    store: &S,
    reference: &ReferenceField<'_>,
) -> StoreResult<Option<Violation>> {
    let id = match DocumentId::parse(reference.id) {
        Ok(id) => id,
        Err(_) => {
            return Ok(Some(Violation::new(
                reference.field,
                ViolationKind::MalformedReference {
                    value: reference.id.to_string(),
                },
            )));
        }
    };

    if store.find_by_id(reference.target, &id)?.is_some() {
        return Ok(None);
    }

    debug!(
        "event=reference_check module=validation status=dangling field={} target={}",
        reference.field, reference.target
    );
    Ok(Some(Violation::new(
        reference.field,
        ViolationKind::DanglingReference {
            id: id.as_str().to_string(),
        },
    )))
}

/// Checks every reference and returns all violations in declaration order.
pub fn validate_references<S: DocumentStore>(
    store: &S,
    references: &[ReferenceField<'_>],
) -> StoreResult<Vec<Violation>> {
    let mut violations = Vec::new();
    for reference in references {
        if let Some(violation) = validate_reference(store, reference)? {
            violations.push(violation);
        }
    }
    Ok(violations)
}
