//! Active-target projection for automation surfaces.
//!
//! # Responsibility
//! - Mirror every active-context change into a flat (context, history)
//!   pair for menu/toolbar/shortcut consumers.
//!
//! # Invariants
//! - The published history participant is always the one cached by the
//!   active context; never resolved independently.

use crate::facet::context::ContextFacet;
use crate::facet::history::HistoryFacet;
use crate::registry::context_registry::ActiveContextListener;
use std::rc::Rc;

/// Consumer of the current automation targets.
pub trait AutomationSink {
    /// Receives the new active pair; both `None` when nothing is active.
    fn active_targets_changed(
        &self,
        context: Option<Rc<ContextFacet>>,
        history: Option<Rc<HistoryFacet>>,
    );
}

/// Listener publishing the active context and its history participant.
pub struct ActiveContextProjection {
    sink: Rc<dyn AutomationSink>,
}

impl ActiveContextProjection {
    pub fn new(sink: Rc<dyn AutomationSink>) -> Rc<Self> {
        Rc::new(Self { sink })
    }
}

impl ActiveContextListener for ActiveContextProjection {
    fn active_context_changed(&self, active: Option<&Rc<ContextFacet>>) {
        let history = active.and_then(|context| context.history());
        self.sink
            .active_targets_changed(active.cloned(), history);
    }
}

#[cfg(test)]
mod tests {
    use super::{ActiveContextProjection, AutomationSink};
    use crate::facet::context::ContextFacet;
    use crate::facet::history::HistoryFacet;
    use crate::facet::query::initialize_extensions;
    use crate::model::node::TreeNode;
    use crate::registry::context_registry::ContextRegistry;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingSink {
        pairs: RefCell<Vec<(Option<uuid::Uuid>, bool)>>,
    }

    impl RecordingSink {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                pairs: RefCell::new(Vec::new()),
            })
        }
    }

    impl AutomationSink for RecordingSink {
        fn active_targets_changed(
            &self,
            context: Option<Rc<ContextFacet>>,
            history: Option<Rc<HistoryFacet>>,
        ) {
            self.pairs
                .borrow_mut()
                .push((context.map(|c| c.id()), history.is_some()));
        }
    }

    #[test]
    fn publishes_context_with_its_history_participant() {
        let root = TreeNode::new("root");
        let context = ContextFacet::attach(&root).expect("attach context");
        HistoryFacet::attach(&root).expect("attach history");
        initialize_extensions(&root).expect("initialize extensions");

        let sink = RecordingSink::new();
        let mut registry = ContextRegistry::new();
        registry.add_listener(ActiveContextProjection::new(sink.clone()));
        registry.add_context(context.clone()).expect("add context");

        registry.set_active(Some(&context)).expect("select context");
        registry.set_active(None).expect("clear selection");

        let pairs = sink.pairs.borrow();
        assert_eq!(pairs.as_slice(), &[(Some(context.id()), true), (None, false)]);
    }

    #[test]
    fn publishes_no_history_when_subtree_declares_none() {
        let root = TreeNode::new("root");
        let context = ContextFacet::attach(&root).expect("attach context");
        initialize_extensions(&root).expect("initialize extensions");

        let sink = RecordingSink::new();
        let mut registry = ContextRegistry::new();
        registry.add_listener(ActiveContextProjection::new(sink.clone()));
        registry.add_context(context.clone()).expect("add context");
        registry.set_active(Some(&context)).expect("select context");

        let pairs = sink.pairs.borrow();
        assert_eq!(pairs.as_slice(), &[(Some(context.id()), false)]);
    }
}
