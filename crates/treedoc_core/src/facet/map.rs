//! Per-node typed capability map.
//!
//! # Responsibility
//! - Hold at most one attached facet per capability kind on one node.
//! - Expose total (never-failing) typed lookup for speculative queries.
//!
//! # Invariants
//! - One slot per `FacetKind`; re-attachment of an occupied kind fails.
//! - Lookup absence is a normal outcome, never an error.

use crate::facet::context::ContextFacet;
use crate::facet::document::DocumentFacet;
use crate::facet::history::HistoryFacet;
use crate::model::node::TreeNode;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Capability kind tag for facet attachment and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    /// Openable/savable unit with a location identity.
    Document,
    /// Undo/redo scope holder owning one visual control.
    EditingContext,
    /// Undo/history participant attachment point.
    History,
}

impl FacetKind {
    /// Stable string id used in schema declarations and logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::EditingContext => "editing_context",
            Self::History => "history",
        }
    }
}

/// Facet attachment and initialization errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetError {
    /// Node already carries a facet of this kind.
    AlreadyAttached(FacetKind),
    /// `initialize_extensions` was already run for this tree.
    AlreadyInitialized,
    /// Lifecycle transition not permitted from the current state.
    InvalidTransition {
        from: crate::facet::document::LifecycleState,
        to: crate::facet::document::LifecycleState,
    },
}

impl Display for FacetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyAttached(kind) => {
                write!(f, "facet of kind `{}` is already attached", kind.as_str())
            }
            Self::AlreadyInitialized => {
                write!(f, "tree extensions were already initialized")
            }
            Self::InvalidTransition { from, to } => write!(
                f,
                "lifecycle transition `{}` -> `{}` is not permitted",
                from.as_str(),
                to.as_str()
            ),
        }
    }
}

impl Error for FacetError {}

/// Hook contract shared by every attachable facet.
pub trait TreeFacet {
    /// Capability kind this facet occupies on its node.
    fn kind(&self) -> FacetKind;

    /// Called exactly once per tree, after the full tree exists.
    ///
    /// This is the only point where a facet may safely resolve sibling or
    /// descendant facets. No facet may assume ordering among siblings.
    fn on_extensions_initialized(&self, _node: &Rc<TreeNode>) {}
}

/// Typed facet slots for one node.
///
/// A typed map (one `Option` per kind) keeps capability lookup total and
/// avoids runtime type inspection on the query path.
#[derive(Default)]
pub struct FacetMap {
    document: Option<Rc<DocumentFacet>>,
    context: Option<Rc<ContextFacet>>,
    history: Option<Rc<HistoryFacet>>,
}

impl FacetMap {
    pub(crate) fn attach_document(&mut self, facet: Rc<DocumentFacet>) -> Result<(), FacetError> {
        if self.document.is_some() {
            return Err(FacetError::AlreadyAttached(FacetKind::Document));
        }
        self.document = Some(facet);
        Ok(())
    }

    pub(crate) fn attach_context(&mut self, facet: Rc<ContextFacet>) -> Result<(), FacetError> {
        if self.context.is_some() {
            return Err(FacetError::AlreadyAttached(FacetKind::EditingContext));
        }
        self.context = Some(facet);
        Ok(())
    }

    pub(crate) fn attach_history(&mut self, facet: Rc<HistoryFacet>) -> Result<(), FacetError> {
        if self.history.is_some() {
            return Err(FacetError::AlreadyAttached(FacetKind::History));
        }
        self.history = Some(facet);
        Ok(())
    }

    pub(crate) fn document(&self) -> Option<Rc<DocumentFacet>> {
        self.document.clone()
    }

    pub(crate) fn context(&self) -> Option<Rc<ContextFacet>> {
        self.context.clone()
    }

    pub(crate) fn history(&self) -> Option<Rc<HistoryFacet>> {
        self.history.clone()
    }

    /// Returns every attached facet in fixed slot order.
    ///
    /// The order is deterministic but facets must not rely on it.
    pub(crate) fn all(&self) -> Vec<Rc<dyn TreeFacet>> {
        let mut facets: Vec<Rc<dyn TreeFacet>> = Vec::new();
        if let Some(facet) = &self.document {
            facets.push(Rc::clone(facet) as Rc<dyn TreeFacet>);
        }
        if let Some(facet) = &self.context {
            facets.push(Rc::clone(facet) as Rc<dyn TreeFacet>);
        }
        if let Some(facet) = &self.history {
            facets.push(Rc::clone(facet) as Rc<dyn TreeFacet>);
        }
        facets
    }
}
