//! Capability adaptation over document tree nodes.
//!
//! One concrete node type acquires multiple strongly-typed behavioral
//! facets on demand (document, editing context, history participant)
//! instead of static multiple inheritance. The set of attached facets is
//! schema-dependent, not fixed at compile time.
//!
//! # Invariants
//! - At most one facet per capability kind per node.
//! - Queries are total; a missing facet is `None`, never an error.

pub mod context;
pub mod document;
pub mod history;
pub mod map;
pub mod query;

pub use context::{ContextFacet, ContextId, ControlId, ControlMetadata, VisualControl};
pub use document::{DocumentFacet, DocumentId, LifecycleState};
pub use history::HistoryFacet;
pub use map::{FacetError, FacetKind, TreeFacet};
pub use query::{initialize_extensions, query, query_all, Capability, SubtreeFacets};
