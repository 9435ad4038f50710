//! User: topic author with a denormalized topic counter.

use crate::config::ValidationLimits;
use crate::model::id::DocumentId;
use crate::sanitize::clean_in_place;
use crate::store::Collection;
use crate::validation::field::check_text;
use crate::validation::{Candidate, Violation};
use serde::{Deserialize, Serialize};

/// Persisted user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DocumentId,
    pub name: String,
    /// Number of existing topics authored by this user.
    #[serde(default)]
    pub topic_count: i64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// User creation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<&User> for NewUser {
    fn from(value: &User) -> Self {
        Self::new(value.name.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
}

impl UserPatch {
    pub fn apply_to(&self, mut fields: NewUser) -> NewUser {
        if let Some(name) = &self.name {
            fields.name = name.clone();
        }
        fields
    }
}

impl Candidate for NewUser {
    const COLLECTION: Collection = Collection::User;

    fn sanitize(mut self) -> Self {
        clean_in_place(&mut self.name);
        self
    }

    fn check_fields(&self, limits: &ValidationLimits) -> Vec<Violation> {
        check_text("name", &self.name, limits.name())
            .into_iter()
            .collect()
    }
}
