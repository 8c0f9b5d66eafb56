//! Typed capability queries and extension initialization.
//!
//! # Responsibility
//! - Provide total single-node lookup and lazy subtree enumeration of
//!   facets by capability kind.
//! - Run the one-time post-construction initialization pass over a tree.
//!
//! # Invariants
//! - `query` never fails; absence is an `Option`, not an error.
//! - `query_all` visits depth-first, root first, children left-to-right;
//!   the sequence is finite and not restartable across tree mutation.
//! - `initialize_extensions` runs exactly once per tree, parents before
//!   children.

use crate::facet::map::{FacetError, FacetKind};
use crate::model::node::TreeNode;
use std::marker::PhantomData;
use std::rc::Rc;

/// Typed capability lookup over one node.
///
/// Implemented by every facet type; keeps the query path free of runtime
/// type inspection.
pub trait Capability: Sized + 'static {
    /// Capability kind this facet type occupies.
    const KIND: FacetKind;

    /// Returns the node's facet of this kind, if attached.
    fn of(node: &TreeNode) -> Option<Rc<Self>>;
}

/// Returns the node's facet of kind `C`, or `None`.
///
/// Total by design: callers query capabilities speculatively and check
/// the result before use.
pub fn query<C: Capability>(node: &Rc<TreeNode>) -> Option<Rc<C>> {
    C::of(node)
}

/// Returns a lazy iterator over every `C`-facet in the subtree rooted at
/// `root`, depth-first, root first, children in order.
pub fn query_all<C: Capability>(root: &Rc<TreeNode>) -> SubtreeFacets<C> {
    SubtreeFacets {
        stack: vec![Rc::clone(root)],
        _kind: PhantomData,
    }
}

/// Lazy depth-first facet sequence produced by [`query_all`].
pub struct SubtreeFacets<C> {
    stack: Vec<Rc<TreeNode>>,
    _kind: PhantomData<C>,
}

impl<C: Capability> Iterator for SubtreeFacets<C> {
    type Item = Rc<C>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            let children = node.children();
            for child in children.iter().rev() {
                self.stack.push(Rc::clone(child));
            }
            if let Some(facet) = C::of(&node) {
                return Some(facet);
            }
        }
        None
    }
}

/// Runs the one-time initialization hook on every facet of a freshly
/// built tree, parents before children.
///
/// # Errors
/// - Returns `FacetError::AlreadyInitialized` on a repeated call for the
///   same tree.
pub fn initialize_extensions(root: &Rc<TreeNode>) -> Result<(), FacetError> {
    if root.extensions_initialized() {
        return Err(FacetError::AlreadyInitialized);
    }
    for node in root.descendants() {
        // Snapshot first so hooks may query the node's own facet map.
        let facets = node.facets().all();
        for facet in facets {
            facet.on_extensions_initialized(&node);
        }
    }
    root.mark_extensions_initialized();
    Ok(())
}
