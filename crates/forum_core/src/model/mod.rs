//! Forum domain model.
//!
//! # Responsibility
//! - Define persisted entities, creation candidates and edit patches.
//! - Declare each entity's field rules and embedded references.
//!
//! # Invariants
//! - Every persisted entity is identified by a store-generated `DocumentId`.
//! - Links between entities are embedded identifiers, never foreign keys.
//! - Denormalized counters are absent from candidates and patches, so only
//!   the counter maintainer can write them.

pub mod comment;
pub mod id;
pub mod node;
pub mod reference;
pub mod section;
pub mod topic;
pub mod user;
