//! Section: top-level grouping with a unique name and a sort key.

use crate::config::ValidationLimits;
use crate::model::id::DocumentId;
use crate::sanitize::clean_in_place;
use crate::store::{Collection, DocumentStore, StoreResult};
use crate::validation::field::{check_text, check_unique};
use crate::validation::{Candidate, Violation};
use serde::{Deserialize, Serialize};

/// Persisted section document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub sort: i64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Section creation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSection {
    pub name: String,
    pub sort: i64,
}

impl NewSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort: 0,
        }
    }

    pub fn with_sort(mut self, sort: i64) -> Self {
        self.sort = sort;
        self
    }
}

impl From<&Section> for NewSection {
    fn from(value: &Section) -> Self {
        Self {
            name: value.name.clone(),
            sort: value.sort,
        }
    }
}

/// Partial section edit; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionPatch {
    pub name: Option<String>,
    pub sort: Option<i64>,
}

impl SectionPatch {
    pub fn apply_to(&self, mut fields: NewSection) -> NewSection {
        if let Some(name) = &self.name {
            fields.name = name.clone();
        }
        if let Some(sort) = self.sort {
            fields.sort = sort;
        }
        fields
    }
}

impl Candidate for NewSection {
    const COLLECTION: Collection = Collection::Section;

    fn sanitize(mut self) -> Self {
        clean_in_place(&mut self.name);
        self
    }

    fn check_fields(&self, limits: &ValidationLimits) -> Vec<Violation> {
        check_text("name", &self.name, limits.name())
            .into_iter()
            .collect()
    }

    fn check_unique<S: DocumentStore>(
        &self,
        store: &S,
        existing: Option<&DocumentId>,
    ) -> StoreResult<Vec<Violation>> {
        if self.name.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(
            check_unique(store, Collection::Section, "name", &self.name, existing)?
                .into_iter()
                .collect(),
        )
    }
}
