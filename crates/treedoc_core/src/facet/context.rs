//! Editing-context facet and visual-control ownership.
//!
//! # Responsibility
//! - Mark one subtree as an independent undo/redo scope.
//! - Own exactly one visual control and one control-metadata record.
//!
//! # Invariants
//! - A tree's context facet is 1:1 with its document facet and 1:1 with
//!   the control it owns.
//! - The control keeps an O(1) back-link to the owning document.
//! - The history participant is resolved once, at extension
//!   initialization time.

use crate::facet::document::DocumentFacet;
use crate::facet::history::HistoryFacet;
use crate::facet::map::{FacetError, FacetKind, TreeFacet};
use crate::facet::query::{query_all, Capability};
use crate::model::node::TreeNode;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Stable editing-context identifier.
pub type ContextId = Uuid;

/// Stable visual-control identifier.
pub type ControlId = Uuid;

/// Display record for one hosted control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMetadata {
    /// User-facing title, derived from the document file name.
    pub title: String,
    /// Fixed grouping category inside the control host.
    pub category: String,
}

/// Handle for the visual control owned by one editing context.
///
/// The control itself is rendered by the external docking framework; the
/// core only tracks identity and the control-to-document back-link.
pub struct VisualControl {
    id: ControlId,
    document: RefCell<Option<Rc<DocumentFacet>>>,
}

impl VisualControl {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            id: Uuid::new_v4(),
            document: RefCell::new(None),
        })
    }

    /// Returns the stable control id.
    pub fn id(&self) -> ControlId {
        self.id
    }

    /// Returns the document this control displays, if linked.
    pub fn document(&self) -> Option<Rc<DocumentFacet>> {
        self.document.borrow().clone()
    }

    pub(crate) fn link_document(&self, document: &Rc<DocumentFacet>) {
        *self.document.borrow_mut() = Some(Rc::clone(document));
    }
}

/// Facet marking one subtree as an editing context.
pub struct ContextFacet {
    id: ContextId,
    node: Weak<TreeNode>,
    control: Rc<VisualControl>,
    metadata: RefCell<Option<ControlMetadata>>,
    history: RefCell<Option<Rc<HistoryFacet>>>,
}

impl ContextFacet {
    /// Creates the facet (with its owned control) and attaches it to the
    /// node's editing-context slot.
    ///
    /// # Errors
    /// - Returns `FacetError::AlreadyAttached` when the node already
    ///   carries an editing-context facet.
    pub fn attach(node: &Rc<TreeNode>) -> Result<Rc<Self>, FacetError> {
        let facet = Rc::new(Self {
            id: Uuid::new_v4(),
            node: Rc::downgrade(node),
            control: VisualControl::new(),
            metadata: RefCell::new(None),
            history: RefCell::new(None),
        });
        node.facets_mut().attach_context(Rc::clone(&facet))?;
        Ok(facet)
    }

    /// Returns the stable context id.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Returns the tree node this facet is attached to.
    pub fn node(&self) -> Option<Rc<TreeNode>> {
        self.node.upgrade()
    }

    /// Returns the visual control owned by this context.
    pub fn control(&self) -> Rc<VisualControl> {
        Rc::clone(&self.control)
    }

    /// Returns the current control metadata, if hosted.
    pub fn metadata(&self) -> Option<ControlMetadata> {
        self.metadata.borrow().clone()
    }

    pub(crate) fn set_metadata(&self, metadata: ControlMetadata) {
        *self.metadata.borrow_mut() = Some(metadata);
    }

    /// Clears the metadata record, signalling "no longer hosted".
    pub(crate) fn clear_metadata(&self) {
        *self.metadata.borrow_mut() = None;
    }

    /// Returns the history participant of this context's subtree.
    ///
    /// `None` until extension initialization ran, or when the subtree
    /// declares no history facet.
    pub fn history(&self) -> Option<Rc<HistoryFacet>> {
        self.history.borrow().clone()
    }
}

impl std::fmt::Debug for VisualControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualControl").field("id", &self.id).finish()
    }
}

impl std::fmt::Debug for ContextFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextFacet")
            .field("id", &self.id)
            .field("control", &self.control.id())
            .finish()
    }
}

impl TreeFacet for ContextFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::EditingContext
    }

    fn on_extensions_initialized(&self, node: &Rc<TreeNode>) {
        // First history participant in subtree order; absence is normal.
        *self.history.borrow_mut() = query_all::<HistoryFacet>(node).next();
    }
}

impl Capability for ContextFacet {
    const KIND: FacetKind = FacetKind::EditingContext;

    fn of(node: &TreeNode) -> Option<Rc<Self>> {
        node.facets().context()
    }
}
