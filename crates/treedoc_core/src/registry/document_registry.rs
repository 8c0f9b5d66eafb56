//! Open-document registry with active selection.
//!
//! # Responsibility
//! - Track every open document and which one is currently active.
//! - Own the strong root reference: removing a document tears its tree
//!   (and every attached facet) down.
//!
//! # Invariants
//! - The active document is always a registered document.
//! - Removing the active document clears the active pointer.

use crate::facet::document::{DocumentFacet, DocumentId};
use crate::model::node::TreeNode;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Document registration/selection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRegistryError {
    DocumentNotFound(DocumentId),
    DuplicateDocument(DocumentId),
    /// Document facet no longer has a living tree behind it.
    DetachedDocument(DocumentId),
}

impl Display for DocumentRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DocumentNotFound(id) => write!(f, "document is not registered: {id}"),
            Self::DuplicateDocument(id) => write!(f, "document already registered: {id}"),
            Self::DetachedDocument(id) => {
                write!(f, "document tree is already torn down: {id}")
            }
        }
    }
}

impl Error for DocumentRegistryError {}

struct OpenDocument {
    document: Rc<DocumentFacet>,
    // Keeps the tree (and every facet attached to it) alive while the
    // document stays registered.
    _root: Rc<TreeNode>,
}

/// Registry of open documents plus the active selection.
#[derive(Default)]
pub struct DocumentRegistry {
    documents: BTreeMap<DocumentId, OpenDocument>,
    active: Option<DocumentId>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one open document.
    ///
    /// # Errors
    /// - `DuplicateDocument` when the id is already registered.
    /// - `DetachedDocument` when the facet's tree is already gone.
    pub fn insert(&mut self, document: Rc<DocumentFacet>) -> Result<(), DocumentRegistryError> {
        let id = document.id();
        let root = document
            .node()
            .ok_or(DocumentRegistryError::DetachedDocument(id))?;
        if self.documents.contains_key(&id) {
            return Err(DocumentRegistryError::DuplicateDocument(id));
        }
        self.documents.insert(
            id,
            OpenDocument {
                document,
                _root: root,
            },
        );
        Ok(())
    }

    /// Removes one document, clearing the active pointer when needed.
    ///
    /// Dropping the entry releases the last strong tree reference, so
    /// no facet survives the removal.
    pub fn remove(&mut self, document: &Rc<DocumentFacet>) -> Result<(), DocumentRegistryError> {
        let id = document.id();
        if self.documents.remove(&id).is_none() {
            return Err(DocumentRegistryError::DocumentNotFound(id));
        }
        if self.active == Some(id) {
            self.active = None;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns whether the document is registered.
    pub fn contains(&self, id: DocumentId) -> bool {
        self.documents.contains_key(&id)
    }

    /// Returns one registered document by id.
    pub fn get(&self, id: DocumentId) -> Option<Rc<DocumentFacet>> {
        self.documents.get(&id).map(|entry| Rc::clone(&entry.document))
    }

    /// Returns sorted registered document ids.
    pub fn document_ids(&self) -> Vec<DocumentId> {
        self.documents.keys().copied().collect()
    }

    /// Returns the active document.
    pub fn active_document(&self) -> Option<Rc<DocumentFacet>> {
        let id = self.active?;
        self.get(id)
    }

    /// Selects the active document, or clears the selection with `None`.
    ///
    /// # Errors
    /// - `DocumentNotFound` when the document is not registered.
    pub fn set_active(
        &mut self,
        document: Option<&Rc<DocumentFacet>>,
    ) -> Result<(), DocumentRegistryError> {
        match document {
            None => {
                self.active = None;
                Ok(())
            }
            Some(document) => {
                let id = document.id();
                if !self.documents.contains_key(&id) {
                    return Err(DocumentRegistryError::DocumentNotFound(id));
                }
                self.active = Some(id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentRegistry, DocumentRegistryError};
    use crate::facet::document::DocumentFacet;
    use crate::model::node::TreeNode;
    use std::rc::Rc;

    fn open_document() -> (Rc<TreeNode>, Rc<DocumentFacet>) {
        let node = TreeNode::new("root");
        let document = DocumentFacet::attach(&node).expect("attach document facet");
        (node, document)
    }

    #[test]
    fn registers_and_selects_document() {
        let mut registry = DocumentRegistry::new();
        let (_node, document) = open_document();

        registry.insert(document.clone()).expect("insert document");
        assert_eq!(registry.len(), 1);
        assert!(registry.active_document().is_none());

        registry
            .set_active(Some(&document))
            .expect("document should be selectable");
        let active = registry.active_document().expect("active document");
        assert_eq!(active.id(), document.id());
    }

    #[test]
    fn rejects_duplicate_and_unknown_documents() {
        let mut registry = DocumentRegistry::new();
        let (_node, document) = open_document();
        let (_other_node, other) = open_document();

        registry.insert(document.clone()).expect("first insert");
        let duplicate = registry.insert(document.clone());
        assert!(matches!(
            duplicate,
            Err(DocumentRegistryError::DuplicateDocument(_))
        ));

        let unknown = registry.set_active(Some(&other));
        assert!(matches!(
            unknown,
            Err(DocumentRegistryError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn removing_active_document_clears_selection() {
        let mut registry = DocumentRegistry::new();
        let (_node, document) = open_document();
        registry.insert(document.clone()).expect("insert document");
        registry.set_active(Some(&document)).expect("select");

        registry.remove(&document).expect("remove document");
        assert!(registry.active_document().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_keeps_tree_alive_until_removal() {
        let mut registry = DocumentRegistry::new();
        let (node, document) = open_document();
        registry.insert(document.clone()).expect("insert document");

        drop(node);
        assert!(document.node().is_some());

        registry.remove(&document).expect("remove document");
        assert!(document.node().is_none());
    }
}
