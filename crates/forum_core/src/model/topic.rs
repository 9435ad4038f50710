//! Topic domain model.
//!
//! # Invariants
//! - `node.id` and `author.id` resolve to an existing node and user at
//!   validation time.
//! - `title` length stays within the configured bounds after sanitization.
//! - References are fixed at creation; edits only touch title and content.

use crate::config::ValidationLimits;
use crate::model::id::DocumentId;
use crate::model::reference::EmbeddedRef;
use crate::sanitize::clean_in_place;
use crate::store::Collection;
use crate::validation::field::check_text;
use crate::validation::{Candidate, ReferenceField, Violation};
use serde::{Deserialize, Serialize};

/// Persisted topic document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: DocumentId,
    pub title: String,
    /// Sanitized HTML body.
    pub content: String,
    pub node: EmbeddedRef,
    pub author: EmbeddedRef,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Topic creation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTopic {
    pub title: String,
    pub content: String,
    pub node: EmbeddedRef,
    pub author: EmbeddedRef,
}

impl NewTopic {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        node: EmbeddedRef,
        author: EmbeddedRef,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            node,
            author,
        }
    }
}

impl From<&Topic> for NewTopic {
    fn from(value: &Topic) -> Self {
        Self {
            title: value.title.clone(),
            content: value.content.clone(),
            node: value.node.clone(),
            author: value.author.clone(),
        }
    }
}

/// Partial topic edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl TopicPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    pub fn apply_to(&self, mut fields: NewTopic) -> NewTopic {
        if let Some(title) = &self.title {
            fields.title = title.clone();
        }
        if let Some(content) = &self.content {
            fields.content = content.clone();
        }
        fields
    }
}

impl Candidate for NewTopic {
    const COLLECTION: Collection = Collection::Topic;

    fn sanitize(mut self) -> Self {
        clean_in_place(&mut self.title);
        clean_in_place(&mut self.content);
        self.node = self.node.canonical();
        self.author = self.author.canonical();
        self
    }

    fn check_fields(&self, limits: &ValidationLimits) -> Vec<Violation> {
        [
            check_text("title", &self.title, limits.topic_title()),
            check_text("content", &self.content, limits.topic_content()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn references(&self) -> Vec<ReferenceField<'_>> {
        vec![
            ReferenceField::new("node.id", &self.node.id, Collection::Node),
            ReferenceField::new("author.id", &self.author.id, Collection::User),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{NewTopic, TopicPatch};
    use crate::config::ValidationLimits;
    use crate::model::reference::EmbeddedRef;
    use crate::validation::{Candidate, ViolationKind};

    fn candidate(title: &str) -> NewTopic {
        NewTopic::new(
            title,
            "body",
            EmbeddedRef::new("123456789012345678901234"),
            EmbeddedRef::new("123456789012345678901234"),
        )
    }

    #[test]
    fn title_bounds_follow_limits() {
        let limits = ValidationLimits::default();
        assert!(candidate("valid title").check_fields(&limits).is_empty());

        let short = candidate("test").check_fields(&limits);
        assert_eq!(short.len(), 1);
        assert!(matches!(short[0].kind, ViolationKind::TooShort { .. }));

        let long = candidate(&"test".repeat(99)).check_fields(&limits);
        assert!(matches!(long[0].kind, ViolationKind::TooLong { .. }));
    }

    #[test]
    fn sanitize_rewrites_title_and_content() {
        let mut topic = candidate("<script>alert('xss');</script>");
        topic.content = r#"<img src="a.png" onload="x()">"#.to_string();
        let topic = topic.sanitize();
        assert_eq!(topic.title, "[removed]alert&#40;'xss'&#41;;[removed]");
        assert_eq!(topic.content, r#"<img src="a.png">"#);
    }

    #[test]
    fn references_are_declared_node_then_author() {
        let topic = candidate("valid title");
        let fields: Vec<&str> = topic.references().iter().map(|r| r.field).collect();
        assert_eq!(fields, vec!["node.id", "author.id"]);
    }

    #[test]
    fn patch_only_replaces_given_fields() {
        let patched = TopicPatch::title("new title").apply_to(candidate("old title"));
        assert_eq!(patched.title, "new title");
        assert_eq!(patched.content, "body");
    }
}
