//! Comment: reply attached to a topic.

use crate::config::ValidationLimits;
use crate::model::id::DocumentId;
use crate::model::reference::EmbeddedRef;
use crate::sanitize::clean_in_place;
use crate::store::Collection;
use crate::validation::field::check_text;
use crate::validation::{Candidate, ReferenceField, Violation};
use serde::{Deserialize, Serialize};

/// Field holding the parent topic id; cascades filter on it.
pub const TOPIC_ID_FIELD: &str = "topicId";

/// Persisted comment document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: DocumentId,
    pub topic_id: String,
    pub content: String,
    pub author: EmbeddedRef,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Comment creation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub topic_id: String,
    pub content: String,
    pub author: EmbeddedRef,
}

impl NewComment {
    pub fn new(topic_id: impl Into<String>, content: impl Into<String>, author: EmbeddedRef) -> Self {
        Self {
            topic_id: topic_id.into(),
            content: content.into(),
            author,
        }
    }
}

impl From<&Comment> for NewComment {
    fn from(value: &Comment) -> Self {
        Self {
            topic_id: value.topic_id.clone(),
            content: value.content.clone(),
            author: value.author.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPatch {
    pub content: Option<String>,
}

impl CommentPatch {
    pub fn apply_to(&self, mut fields: NewComment) -> NewComment {
        if let Some(content) = &self.content {
            fields.content = content.clone();
        }
        fields
    }
}

impl Candidate for NewComment {
    const COLLECTION: Collection = Collection::Comment;

    fn sanitize(mut self) -> Self {
        clean_in_place(&mut self.content);
        self.topic_id = DocumentId::canonical_text(&self.topic_id);
        self.author = self.author.canonical();
        self
    }

    fn check_fields(&self, limits: &ValidationLimits) -> Vec<Violation> {
        check_text("content", &self.content, limits.comment_content())
            .into_iter()
            .collect()
    }

    fn references(&self) -> Vec<ReferenceField<'_>> {
        vec![
            ReferenceField::new(TOPIC_ID_FIELD, &self.topic_id, Collection::Topic),
            ReferenceField::new("author.id", &self.author.id, Collection::User),
        ]
    }
}
