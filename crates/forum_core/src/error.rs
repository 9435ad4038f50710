//! Top-level error surfaced by entity façades.

use crate::model::id::DocumentId;
use crate::store::{Collection, StoreError};
use crate::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ForumResult<T> = Result<T, ForumError>;

/// Failure of a façade operation. Each variant keeps its kind and the
/// offending field, reference or document.
#[derive(Debug)]
pub enum ForumError {
    /// Candidate rejected before any write.
    Validation(ValidationError),
    /// Document store operation failed.
    Store(StoreError),
    /// Operation requires an existing document (e.g. edit).
    NotFound {
        collection: Collection,
        id: DocumentId,
    },
    /// A write succeeded but its read-back did not.
    InconsistentState(&'static str),
}

impl ForumError {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for ForumError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => write!(f, "{collection} not found: {id}"),
            Self::InconsistentState(details) => write!(f, "inconsistent forum state: {details}"),
        }
    }
}

impl Error for ForumError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<ValidationError> for ForumError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ForumError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
