//! Core domain logic for the tree-document workbench.
//! This crate is the single source of truth for lifecycle invariants.

pub mod codec;
pub mod facet;
pub mod logging;
pub mod model;
pub mod registry;
pub mod service;

pub use codec::{CodecError, CodecResult, JsonTreeCodec, TreeCodec};
pub use facet::context::{ContextFacet, ContextId, ControlId, ControlMetadata, VisualControl};
pub use facet::document::{DocumentFacet, DocumentId, LifecycleState};
pub use facet::history::HistoryFacet;
pub use facet::map::{FacetError, FacetKind, TreeFacet};
pub use facet::query::{initialize_extensions, query, query_all, Capability};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::node::{NodeError, NodeTypeId, TreeNode};
pub use model::schema::{NodeTypeSpec, Schema, SchemaError};
pub use model::uri::DocumentUri;
pub use registry::context_registry::{ActiveContextListener, ContextRegistry, ContextRegistryError};
pub use registry::control_host::{
    ControlHost, ControlHostError, ControlHostEvents, InProcessControlHost,
};
pub use registry::document_registry::{DocumentRegistry, DocumentRegistryError};
pub use service::document_service::{
    AlwaysAllowClose, CloseConfirmation, CloseDecision, DocumentKind, DocumentService,
    DocumentServiceError, DOCUMENT_CONTROL_CATEGORY,
};
pub use service::projection::{ActiveContextProjection, AutomationSink};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
