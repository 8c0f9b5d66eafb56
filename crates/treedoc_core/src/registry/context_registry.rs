//! Editing-context registry with change notification.
//!
//! # Responsibility
//! - Track every registered editing context and which one is active.
//! - Notify listeners synchronously on every active-context change.
//!
//! # Invariants
//! - The active context is always a registered context.
//! - Removing the active context clears the pointer and notifies.
//! - Listeners run synchronously and must not re-enter the registry.

use crate::facet::context::{ContextFacet, ContextId};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Context registration/selection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextRegistryError {
    ContextNotFound(ContextId),
    DuplicateContext(ContextId),
}

impl Display for ContextRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContextNotFound(id) => write!(f, "editing context is not registered: {id}"),
            Self::DuplicateContext(id) => write!(f, "editing context already registered: {id}"),
        }
    }
}

impl Error for ContextRegistryError {}

/// Observer for active-context changes.
pub trait ActiveContextListener {
    /// Called after every change of the active context, including when
    /// the selection is cleared.
    fn active_context_changed(&self, active: Option<&Rc<ContextFacet>>);
}

/// Registry of editing contexts plus the active selection.
#[derive(Default)]
pub struct ContextRegistry {
    contexts: BTreeMap<ContextId, Rc<ContextFacet>>,
    active: Option<ContextId>,
    listeners: Vec<Rc<dyn ActiveContextListener>>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one change listener.
    pub fn add_listener(&mut self, listener: Rc<dyn ActiveContextListener>) {
        self.listeners.push(listener);
    }

    /// Registers one editing context.
    ///
    /// # Errors
    /// - `DuplicateContext` when the id is already registered.
    pub fn add_context(&mut self, context: Rc<ContextFacet>) -> Result<(), ContextRegistryError> {
        let id = context.id();
        if self.contexts.contains_key(&id) {
            return Err(ContextRegistryError::DuplicateContext(id));
        }
        self.contexts.insert(id, context);
        Ok(())
    }

    /// Removes one editing context; clears and notifies when it was the
    /// active one.
    ///
    /// # Errors
    /// - `ContextNotFound` when the context is not registered.
    pub fn remove_context(
        &mut self,
        context: &Rc<ContextFacet>,
    ) -> Result<(), ContextRegistryError> {
        let id = context.id();
        if self.contexts.remove(&id).is_none() {
            return Err(ContextRegistryError::ContextNotFound(id));
        }
        if self.active == Some(id) {
            self.active = None;
            self.notify();
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Returns whether the context is registered.
    pub fn contains(&self, id: ContextId) -> bool {
        self.contexts.contains_key(&id)
    }

    /// Returns sorted registered context ids.
    pub fn context_ids(&self) -> Vec<ContextId> {
        self.contexts.keys().copied().collect()
    }

    /// Returns the active editing context.
    pub fn active_context(&self) -> Option<Rc<ContextFacet>> {
        let id = self.active?;
        self.contexts.get(&id).cloned()
    }

    /// Selects the active context, or clears the selection with `None`.
    ///
    /// Notifies listeners only when the selection actually changes.
    ///
    /// # Errors
    /// - `ContextNotFound` when the context is not registered.
    pub fn set_active(
        &mut self,
        context: Option<&Rc<ContextFacet>>,
    ) -> Result<(), ContextRegistryError> {
        let next = match context {
            None => None,
            Some(context) => {
                let id = context.id();
                if !self.contexts.contains_key(&id) {
                    return Err(ContextRegistryError::ContextNotFound(id));
                }
                Some(id)
            }
        };
        if self.active != next {
            self.active = next;
            self.notify();
        }
        Ok(())
    }

    fn notify(&self) {
        let active = self.active_context();
        for listener in &self.listeners {
            listener.active_context_changed(active.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ActiveContextListener, ContextRegistry, ContextRegistryError};
    use crate::facet::context::ContextFacet;
    use crate::model::node::TreeNode;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingListener {
        changes: RefCell<Vec<Option<uuid::Uuid>>>,
    }

    impl RecordingListener {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                changes: RefCell::new(Vec::new()),
            })
        }
    }

    impl ActiveContextListener for RecordingListener {
        fn active_context_changed(&self, active: Option<&Rc<ContextFacet>>) {
            self.changes
                .borrow_mut()
                .push(active.map(|context| context.id()));
        }
    }

    fn context() -> (Rc<TreeNode>, Rc<ContextFacet>) {
        let node = TreeNode::new("root");
        let context = ContextFacet::attach(&node).expect("attach context");
        (node, context)
    }

    #[test]
    fn notifies_on_selection_and_clear() {
        let mut registry = ContextRegistry::new();
        let listener = RecordingListener::new();
        registry.add_listener(listener.clone());

        let (_node, ctx) = context();
        registry.add_context(ctx.clone()).expect("add context");
        registry.set_active(Some(&ctx)).expect("select context");
        registry.set_active(None).expect("clear selection");

        let changes = listener.changes.borrow();
        assert_eq!(changes.as_slice(), &[Some(ctx.id()), None]);
    }

    #[test]
    fn idempotent_selection_does_not_renotify() {
        let mut registry = ContextRegistry::new();
        let listener = RecordingListener::new();
        registry.add_listener(listener.clone());

        let (_node, ctx) = context();
        registry.add_context(ctx.clone()).expect("add context");
        registry.set_active(Some(&ctx)).expect("first select");
        registry.set_active(Some(&ctx)).expect("second select");

        assert_eq!(listener.changes.borrow().len(), 1);
    }

    #[test]
    fn removing_active_context_clears_and_notifies() {
        let mut registry = ContextRegistry::new();
        let listener = RecordingListener::new();
        registry.add_listener(listener.clone());

        let (_node, ctx) = context();
        registry.add_context(ctx.clone()).expect("add context");
        registry.set_active(Some(&ctx)).expect("select context");
        registry.remove_context(&ctx).expect("remove context");

        assert!(registry.active_context().is_none());
        let changes = listener.changes.borrow();
        assert_eq!(changes.as_slice(), &[Some(ctx.id()), None]);
    }

    #[test]
    fn rejects_duplicate_and_unknown_contexts() {
        let mut registry = ContextRegistry::new();
        let (_node, ctx) = context();
        let (_other_node, other) = context();

        registry.add_context(ctx.clone()).expect("add context");
        let duplicate = registry.add_context(ctx.clone());
        assert!(matches!(
            duplicate,
            Err(ContextRegistryError::DuplicateContext(_))
        ));

        let unknown = registry.set_active(Some(&other));
        assert!(matches!(
            unknown,
            Err(ContextRegistryError::ContextNotFound(_))
        ));
    }
}
