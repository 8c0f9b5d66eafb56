//! Use-case layer over the model, codec and registries.
//!
//! # Responsibility
//! - Expose the document lifecycle controller and the active-target
//!   projection as the crate's primary entry points.

pub mod document_service;
pub mod projection;

pub use document_service::{
    AlwaysAllowClose, CloseConfirmation, CloseDecision, DocumentKind, DocumentService,
    DocumentServiceError, DOCUMENT_CONTROL_CATEGORY,
};
pub use projection::{ActiveContextProjection, AutomationSink};
