//! Embedded references between documents.

use crate::model::id::DocumentId;
use serde::{Deserialize, Serialize};

/// A field holding just the identifier of another document (`{ "id": … }`).
///
/// The id is kept as raw text so candidates can carry caller input that has
/// not been checked yet; the reference validator decides whether it is
/// well-formed and resolvable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedRef {
    pub id: String,
}

impl EmbeddedRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Lowercases a well-formed id so stored references match store keys;
    /// malformed text is left for the reference validator to report.
    pub fn canonical(self) -> Self {
        Self {
            id: DocumentId::canonical_text(&self.id),
        }
    }
}

impl From<&DocumentId> for EmbeddedRef {
    fn from(value: &DocumentId) -> Self {
        Self::new(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::EmbeddedRef;

    #[test]
    fn canonical_lowercases_only_well_formed_ids() {
        assert_eq!(
            EmbeddedRef::new("ABCDEF0123456789ABCDEF01").canonical().id,
            "abcdef0123456789abcdef01"
        );
        assert_eq!(EmbeddedRef::new("NOT-AN-ID").canonical().id, "NOT-AN-ID");
    }
}
