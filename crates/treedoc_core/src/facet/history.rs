//! History-participant facet.
//!
//! # Responsibility
//! - Mark one node as the attachment point for an undo/history engine.
//!
//! # Invariants
//! - The core never implements undo/redo itself; this facet only makes
//!   the participant discoverable through capability queries.

use crate::facet::map::{FacetError, FacetKind, TreeFacet};
use crate::facet::query::Capability;
use crate::model::node::TreeNode;
use std::rc::{Rc, Weak};

/// Facet marking one node as an undo/history participant.
pub struct HistoryFacet {
    node: Weak<TreeNode>,
}

impl HistoryFacet {
    /// Creates the facet and attaches it to the node's history slot.
    ///
    /// # Errors
    /// - Returns `FacetError::AlreadyAttached` when the node already
    ///   carries a history facet.
    pub fn attach(node: &Rc<TreeNode>) -> Result<Rc<Self>, FacetError> {
        let facet = Rc::new(Self {
            node: Rc::downgrade(node),
        });
        node.facets_mut().attach_history(Rc::clone(&facet))?;
        Ok(facet)
    }

    /// Returns the tree node this facet is attached to.
    pub fn node(&self) -> Option<Rc<TreeNode>> {
        self.node.upgrade()
    }
}

impl std::fmt::Debug for HistoryFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryFacet").finish()
    }
}

impl TreeFacet for HistoryFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::History
    }
}

impl Capability for HistoryFacet {
    const KIND: FacetKind = FacetKind::History;

    fn of(node: &TreeNode) -> Option<Rc<Self>> {
        node.facets().history()
    }
}
