//! Document store contracts.
//!
//! # Responsibility
//! - Define the keyed-collection API every façade and validator talks to.
//! - Keep the persistence engine swappable behind one trait.
//!
//! # Invariants
//! - Identifiers are generated by the store on insert, never by callers.
//! - Each `update_by_id` is atomic for its one document; nothing spans
//!   documents.
//! - A missing document is reported as `None`/`false`/`0`, not as an error.

use crate::db::DbError;
use crate::model::id::DocumentId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite_store;

pub use sqlite_store::SqliteDocumentStore;

/// A stored document body. Read paths inject the key under `id`.
pub type Document = Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Field name under which read paths expose the document key.
pub const ID_FIELD: &str = "id";

static FIELD_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid field regex")
});

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Section,
    Node,
    User,
    Topic,
    Comment,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Node => "node",
            Self::User => "user",
            Self::Topic => "topic",
            Self::Comment => "comment",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by document store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// A store-level constraint (unique index) rejected the write.
    Conflict {
        collection: Collection,
        message: String,
    },
    /// Document body could not be (de)serialized.
    Serialization(serde_json::Error),
    /// Filter or update references an unusable field path or value.
    InvalidQuery(String),
    /// Persisted data cannot be converted to a valid document.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict {
                collection,
                message,
            } => write!(f, "constraint violation in `{collection}`: {message}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::InvalidQuery(message) => write!(f, "invalid store query: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "document store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "document store requires table `{table}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Conjunction of equality conditions on dotted field paths.
///
/// The pseudo-field `id` matches the document key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// Matches every document in a collection.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Single-document delta: field assignments followed by integer increments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Vec<(String, Value)>,
    inc: Vec<(String, i64)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((field.into(), value.into()));
        self
    }

    pub fn inc(mut self, field: impl Into<String>, delta: i64) -> Self {
        self.inc.push((field.into(), delta));
        self
    }

    pub fn assignments(&self) -> &[(String, Value)] {
        &self.set
    }

    pub fn increments(&self) -> &[(String, i64)] {
        &self.inc
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.inc.is_empty()
    }

    /// Returns whether the delta assigns `field`.
    pub fn assigns(&self, field: &str) -> bool {
        self.set.iter().any(|(name, _)| name == field)
    }
}

/// Keyed document collections without multi-document transactions.
pub trait DocumentStore {
    /// Persists a new document and returns its generated key.
    fn insert(&self, collection: Collection, doc: &Document) -> StoreResult<DocumentId>;
    fn find_by_id(&self, collection: Collection, id: &DocumentId)
        -> StoreResult<Option<Document>>;
    /// Returns matching documents in insertion order.
    fn find(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>>;
    fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<usize>;
    /// Applies `delta`; returns `false` when no such document exists.
    fn update_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
        delta: &Update,
    ) -> StoreResult<bool>;
    /// Returns `false` when no such document exists.
    fn delete_by_id(&self, collection: Collection, id: &DocumentId) -> StoreResult<bool>;
    fn delete_many(&self, collection: Collection, filter: &Filter) -> StoreResult<usize>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn insert(&self, collection: Collection, doc: &Document) -> StoreResult<DocumentId> {
        (**self).insert(collection, doc)
    }

    fn find_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> StoreResult<Option<Document>> {
        (**self).find_by_id(collection, id)
    }

    fn find(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>> {
        (**self).find(collection, filter)
    }

    fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<usize> {
        (**self).count(collection, filter)
    }

    fn update_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
        delta: &Update,
    ) -> StoreResult<bool> {
        (**self).update_by_id(collection, id, delta)
    }

    fn delete_by_id(&self, collection: Collection, id: &DocumentId) -> StoreResult<bool> {
        (**self).delete_by_id(collection, id)
    }

    fn delete_many(&self, collection: Collection, filter: &Filter) -> StoreResult<usize> {
        (**self).delete_many(collection, filter)
    }
}

/// Serializes a value into a document body.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidData(format!(
            "expected a JSON object document, got `{other}`"
        ))),
    }
}

/// Deserializes a stored document into a typed entity.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Converts a dotted field path into a SQLite JSON path (`author.id` ->
/// `$.author.id`).
pub(crate) fn json_path(field: &str) -> StoreResult<String> {
    if !FIELD_PATH_RE.is_match(field) {
        return Err(StoreError::InvalidQuery(format!(
            "unsupported field path `{field}`"
        )));
    }
    Ok(format!("$.{field}"))
}
