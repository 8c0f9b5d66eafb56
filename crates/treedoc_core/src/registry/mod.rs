//! Open-resource registries.
//!
//! # Responsibility
//! - Track open documents and live editing contexts with one active
//!   selection each.
//! - Define the control-host seam toward the docking framework.
//!
//! # Invariants
//! - An active pointer only ever names a registered entry.

pub mod context_registry;
pub mod control_host;
pub mod document_registry;

pub use context_registry::{ActiveContextListener, ContextRegistry, ContextRegistryError};
pub use control_host::{
    ControlHost, ControlHostError, ControlHostEvents, InProcessControlHost,
};
pub use document_registry::{DocumentRegistry, DocumentRegistryError};
