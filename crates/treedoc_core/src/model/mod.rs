//! Document tree domain model.
//!
//! # Responsibility
//! - Define the in-memory tree representation of one opened document.
//! - Define location identity and the schema contract consumed during
//!   tree construction.
//!
//! # Invariants
//! - Exactly one root per tree; no node is owned by two parents.
//! - Node type identifiers are immutable after construction.

pub mod node;
pub mod schema;
pub mod uri;
