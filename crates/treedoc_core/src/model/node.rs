//! Document tree node.
//!
//! # Responsibility
//! - Represent one schema-typed node in an opened document tree.
//! - Keep ordered child ownership and a non-owning parent back-reference.
//!
//! # Invariants
//! - `type_id` is immutable after construction.
//! - A node is owned by at most one parent (tree, not graph).
//! - Traversal order is depth-first: node first, children left-to-right.

use crate::facet::map::FacetMap;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::{Rc, Weak};

/// Schema-defined node type identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NodeTypeId = String;

/// Errors from tree structure mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Child node is already owned by a parent.
    AlreadyParented(NodeTypeId),
}

impl Display for NodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyParented(type_id) => {
                write!(f, "node of type `{type_id}` is already owned by a parent")
            }
        }
    }
}

impl Error for NodeError {}

/// One node of an in-memory document tree.
///
/// Nodes are shared single-threaded via `Rc`; parents own children and
/// children keep a `Weak` back-reference. Capability facets attach to the
/// node through the facet map and never outlive the tree.
pub struct TreeNode {
    type_id: NodeTypeId,
    parent: RefCell<Weak<TreeNode>>,
    children: RefCell<Vec<Rc<TreeNode>>>,
    facets: RefCell<FacetMap>,
    extensions_initialized: Cell<bool>,
}

impl TreeNode {
    /// Creates a detached node of the given type with no facets attached.
    pub fn new(type_id: impl Into<NodeTypeId>) -> Rc<Self> {
        Rc::new(Self {
            type_id: type_id.into(),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            facets: RefCell::new(FacetMap::default()),
            extensions_initialized: Cell::new(false),
        })
    }

    /// Returns the immutable schema type identifier.
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Returns the owning parent, or `None` for a tree root.
    pub fn parent(&self) -> Option<Rc<TreeNode>> {
        self.parent.borrow().upgrade()
    }

    /// Returns a snapshot of the ordered children.
    pub fn children(&self) -> Vec<Rc<TreeNode>> {
        self.children.borrow().clone()
    }

    /// Returns the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Appends one child to the end of the ordered child sequence.
    ///
    /// # Errors
    /// - Returns `NodeError::AlreadyParented` when the child is already
    ///   owned by another node.
    pub fn append_child(self: &Rc<Self>, child: Rc<TreeNode>) -> Result<(), NodeError> {
        if child.parent().is_some() {
            return Err(NodeError::AlreadyParented(child.type_id.clone()));
        }
        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(child);
        Ok(())
    }

    /// Returns a depth-first iterator over this node and every descendant,
    /// node first, children left-to-right.
    pub fn descendants(self: &Rc<Self>) -> Descendants {
        Descendants {
            stack: vec![Rc::clone(self)],
        }
    }

    /// Compares tree shape: equal type identifiers and recursively equal
    /// ordered children. Facets are ignored.
    pub fn structural_eq(&self, other: &TreeNode) -> bool {
        if self.type_id != other.type_id {
            return false;
        }
        let ours = self.children.borrow();
        let theirs = other.children.borrow();
        ours.len() == theirs.len()
            && ours
                .iter()
                .zip(theirs.iter())
                .all(|(a, b)| a.structural_eq(b))
    }

    pub(crate) fn facets(&self) -> Ref<'_, FacetMap> {
        self.facets.borrow()
    }

    pub(crate) fn facets_mut(&self) -> RefMut<'_, FacetMap> {
        self.facets.borrow_mut()
    }

    pub(crate) fn extensions_initialized(&self) -> bool {
        self.extensions_initialized.get()
    }

    pub(crate) fn mark_extensions_initialized(&self) {
        self.extensions_initialized.set(true);
    }
}

impl std::fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeNode")
            .field("type_id", &self.type_id)
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

/// Depth-first node iterator, root first, children in order.
pub struct Descendants {
    stack: Vec<Rc<TreeNode>>,
}

impl Iterator for Descendants {
    type Item = Rc<TreeNode>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children = node.children.borrow();
        for child in children.iter().rev() {
            self.stack.push(Rc::clone(child));
        }
        drop(children);
        Some(node)
    }
}
