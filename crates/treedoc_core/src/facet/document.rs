//! Document facet and lifecycle state machine.
//!
//! # Responsibility
//! - Mark one tree as an openable/savable unit with a location identity.
//! - Track lifecycle state: `Unopened -> Open -> Active <-> Inactive -> Closed`.
//!
//! # Invariants
//! - The uri is assigned once, at open time; save-as never reassigns it.
//! - `Closed` is terminal: no transition leaves it.
//! - The facet holds only a weak node reference and dies with its tree.

use crate::facet::map::{FacetError, FacetKind, TreeFacet};
use crate::facet::query::Capability;
use crate::model::node::TreeNode;
use crate::model::uri::DocumentUri;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Stable document identifier.
pub type DocumentId = Uuid;

/// Lifecycle states reachable by one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed but not yet opened through the lifecycle controller.
    Unopened,
    /// Opened and registered; not the active document.
    Open,
    /// The registry's active document.
    Active,
    /// Was active, another document took over.
    Inactive,
    /// Closed; terminal, no reopen without a fresh open.
    Closed,
}

impl LifecycleState {
    /// Stable string id used in logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unopened => "unopened",
            Self::Open => "open",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Closed => "closed",
        }
    }

    /// Returns whether a transition to `next` is permitted.
    ///
    /// Self-transitions are permitted so repeated activation stays
    /// idempotent.
    pub fn permits(self, next: LifecycleState) -> bool {
        if self == next {
            return true;
        }
        match (self, next) {
            (Self::Closed, _) => false,
            (_, Self::Closed) => true,
            (Self::Unopened, Self::Open) => true,
            (Self::Open | Self::Inactive, Self::Active) => true,
            (Self::Active, Self::Inactive) => true,
            _ => false,
        }
    }
}

/// Facet marking one tree as an openable/savable document.
pub struct DocumentFacet {
    id: DocumentId,
    node: Weak<TreeNode>,
    uri: RefCell<Option<DocumentUri>>,
    state: Cell<LifecycleState>,
}

impl DocumentFacet {
    /// Creates the facet and attaches it to the node's document slot.
    ///
    /// # Errors
    /// - Returns `FacetError::AlreadyAttached` when the node already
    ///   carries a document facet.
    pub fn attach(node: &Rc<TreeNode>) -> Result<Rc<Self>, FacetError> {
        let facet = Rc::new(Self {
            id: Uuid::new_v4(),
            node: Rc::downgrade(node),
            uri: RefCell::new(None),
            state: Cell::new(LifecycleState::Unopened),
        });
        node.facets_mut().attach_document(Rc::clone(&facet))?;
        Ok(facet)
    }

    /// Returns the stable document id.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the tree node this facet is attached to.
    ///
    /// `None` once the owning tree has been torn down.
    pub fn node(&self) -> Option<Rc<TreeNode>> {
        self.node.upgrade()
    }

    /// Returns the location identity assigned at open time.
    pub fn uri(&self) -> Option<DocumentUri> {
        self.uri.borrow().clone()
    }

    /// Assigns the open-time location identity.
    ///
    /// Called once by the lifecycle controller when the document is
    /// opened. Save-as intentionally does not go through this path.
    pub(crate) fn set_uri(&self, uri: DocumentUri) {
        *self.uri.borrow_mut() = Some(uri);
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    /// Moves the document to `next`.
    ///
    /// # Errors
    /// - Returns `FacetError::InvalidTransition` when the state machine
    ///   does not permit the step; `Closed` is terminal.
    pub(crate) fn transition_to(&self, next: LifecycleState) -> Result<(), FacetError> {
        let current = self.state.get();
        if !current.permits(next) {
            return Err(FacetError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        self.state.set(next);
        Ok(())
    }
}

impl std::fmt::Debug for DocumentFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentFacet")
            .field("id", &self.id)
            .field("state", &self.state.get())
            .field("uri", &self.uri.borrow())
            .finish()
    }
}

impl TreeFacet for DocumentFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::Document
    }
}

impl Capability for DocumentFacet {
    const KIND: FacetKind = FacetKind::Document;

    fn of(node: &TreeNode) -> Option<Rc<Self>> {
        node.facets().document()
    }
}
