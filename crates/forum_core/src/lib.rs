//! Forum data layer.
//!
//! Documents (sections, nodes, users, topics, comments) live in a keyed
//! document store and link to each other through embedded identifiers. This
//! crate owns the lifecycle rules around them: sanitization, field and
//! reference validation, denormalized counters and cascading deletion.

pub mod cascade;
pub mod config;
pub mod counters;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod sanitize;
pub mod service;
pub mod store;
pub mod timestamp;
pub mod validation;

pub use config::{ForumConfig, ValidationLimits};
pub use counters::{reconcile_topic_counts, ReconcileReport};
pub use error::{ForumError, ForumResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::comment::{Comment, CommentPatch, NewComment};
pub use model::id::{DocumentId, InvalidDocumentId};
pub use model::node::{NewNode, Node, NodePatch};
pub use model::reference::EmbeddedRef;
pub use model::section::{NewSection, Section, SectionPatch};
pub use model::topic::{NewTopic, Topic, TopicPatch};
pub use model::user::{NewUser, User, UserPatch};
pub use service::comment_service::CommentService;
pub use service::node_service::NodeService;
pub use service::section_service::SectionService;
pub use service::topic_service::TopicService;
pub use service::user_service::UserService;
pub use store::{
    Collection, Document, DocumentStore, Filter, SqliteDocumentStore, StoreError, StoreResult,
    Update,
};
pub use validation::{ValidationError, Violation, ViolationKind};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
