//! Candidate validation.
//!
//! # Responsibility
//! - Describe field-level and reference-level violations.
//! - Run the ordered sanitize → fields → uniqueness → references pipeline.
//!
//! # Invariants
//! - Validation never writes to the store.
//! - A rejected candidate reports every violation found, each naming its
//!   field.

use crate::store::Collection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod field;
pub mod pipeline;
pub mod reference;

pub use pipeline::{run_pipeline, Candidate};
pub use reference::ReferenceField;

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Value is missing or blank.
    Required,
    TooShort { min: usize, actual: usize },
    TooLong { max: usize, actual: usize },
    /// Another document already holds this value.
    NotUnique,
    /// Reference id is not a syntactically valid identifier.
    MalformedReference { value: String },
    /// Reference id is well-formed but names no existing document.
    DanglingReference { id: String },
}

impl ViolationKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
            Self::NotUnique => "not_unique",
            Self::MalformedReference { .. } => "malformed_reference",
            Self::DanglingReference { .. } => "dangling_reference",
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::MalformedReference { .. } | Self::DanglingReference { .. }
        )
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ViolationKind::Required => write!(f, "`{}` is required", self.field),
            ViolationKind::TooShort { min, actual } => write!(
                f,
                "`{}` must be at least {min} characters, got {actual}",
                self.field
            ),
            ViolationKind::TooLong { max, actual } => write!(
                f,
                "`{}` must be at most {max} characters, got {actual}",
                self.field
            ),
            ViolationKind::NotUnique => write!(f, "`{}` is already taken", self.field),
            ViolationKind::MalformedReference { value } => {
                write!(f, "`{}` holds malformed reference `{value}`", self.field)
            }
            ViolationKind::DanglingReference { id } => {
                write!(f, "`{}` references missing document `{id}`", self.field)
            }
        }
    }
}

/// Rejection of a candidate document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    collection: Collection,
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(collection: Collection, violations: Vec<Violation>) -> Self {
        Self {
            collection,
            violations,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns the first violation recorded for `field`.
    pub fn violation_for(&self, field: &str) -> Option<&Violation> {
        self.violations
            .iter()
            .find(|violation| violation.field == field)
    }

    pub fn has_reference_violation(&self) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.kind.is_reference())
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation failed: ", self.collection)?;
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}
