//! Node: forum category topics are posted to.

use crate::config::ValidationLimits;
use crate::model::id::DocumentId;
use crate::sanitize::clean_in_place;
use crate::store::Collection;
use crate::validation::field::check_text;
use crate::validation::{Candidate, Violation};
use serde::{Deserialize, Serialize};

/// Persisted node document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: DocumentId,
    pub name: String,
    /// Number of existing topics posted to this node.
    #[serde(default)]
    pub topic_count: i64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNode {
    pub name: String,
}

impl NewNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<&Node> for NewNode {
    fn from(value: &Node) -> Self {
        Self::new(value.name.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub name: Option<String>,
}

impl NodePatch {
    pub fn apply_to(&self, mut fields: NewNode) -> NewNode {
        if let Some(name) = &self.name {
            fields.name = name.clone();
        }
        fields
    }
}

impl Candidate for NewNode {
    const COLLECTION: Collection = Collection::Node;

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
