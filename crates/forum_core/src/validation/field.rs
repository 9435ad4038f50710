//! Presence, length and uniqueness rules.

use crate::model::id::DocumentId;
use crate::store::{Collection, DocumentStore, Filter, StoreResult, ID_FIELD};
use crate::validation::{Violation, ViolationKind};
use serde_json::Value;

/// Inclusive character-count bounds for a required text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// At least one non-blank character, at most `max`.
    pub const fn required(max: usize) -> Self {
        Self { min: 1, max }
    }
}

/// Checks a required text field against `bounds`.
///
/// Blank input is reported as `Required` rather than `TooShort`. Lengths
/// count characters, not bytes.
pub fn check_text(field: &str, value: &str, bounds: LengthBounds) -> Option<Violation> {
    if value.trim().is_empty() {
        return Some(Violation::new(field, ViolationKind::Required));
    }

    let actual = value.chars().count();
    if actual < bounds.min {
        return Some(Violation::new(
            field,
            ViolationKind::TooShort {
                min: bounds.min,
                actual,
            },
        ));
    }
    if actual > bounds.max {
        return Some(Violation::new(
            field,
            ViolationKind::TooLong {
                max: bounds.max,
                actual,
            },
        ));
    }

    None
}

/// Checks that no other document in `collection` holds `value` in `field`.
///
/// `existing` names the document being edited, which may keep its own value.
/// Two concurrent creates can both pass this read; the store's unique index
/// rejects the loser.
pub fn check_unique<S: DocumentStore>(
    store: &S,
    collection: Collection,
    field: &str,
    value: &str,
    existing: Option<&DocumentId>,
) -> StoreResult<Option<Violation>> {
    let holders = store.find(collection, &Filter::eq(field, value))?;
    let taken = holders.iter().any(|holder| {
        let holder_id = holder
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|raw| DocumentId::parse(raw).ok());
        holder_id.as_ref() != existing || existing.is_none()
    });

    Ok(taken.then(|| Violation::new(field, ViolationKind::NotUnique)))
}

#[cfg(test)]
mod tests {
    use super::{check_text, LengthBounds};
    use crate::validation::ViolationKind;

    #[test]
    fn blank_text_is_required_not_short() {
        let violation = check_text("title", "   ", LengthBounds::new(5, 100)).unwrap();
        assert_eq!(violation.kind, ViolationKind::Required);
    }

    #[test]
    fn bounds_are_inclusive_and_count_characters() {
        let bounds = LengthBounds::new(5, 6);
        assert!(check_text("title", "héllo", bounds).is_none());
        assert!(check_text("title", "héllo!", bounds).is_none());
        assert_eq!(
            check_text("title", "test", bounds).unwrap().kind,
            ViolationKind::TooShort { min: 5, actual: 4 }
        );
        assert_eq!(
            check_text("title", "héllo!!", bounds).unwrap().kind,
            ViolationKind::TooLong { max: 6, actual: 7 }
        );
    }
}
