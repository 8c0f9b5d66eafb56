//! Control-host collaborator seam.
//!
//! # Responsibility
//! - Define the contract between the lifecycle controller and the
//!   external docking framework hosting visual controls.
//! - Provide an in-process baseline host for shells and tests.
//!
//! # Invariants
//! - A control is registered at most once; unknown controls are errors.
//! - Event callbacks flow through the registered owner handle only.

use crate::facet::context::{ControlId, ControlMetadata, VisualControl};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::{Rc, Weak};

/// Control-host registration/lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlHostError {
    DuplicateControl(ControlId),
    UnknownControl(ControlId),
    /// Registered owner handle is no longer alive.
    OwnerGone(ControlId),
}

impl Display for ControlHostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateControl(id) => write!(f, "control already registered: {id}"),
            Self::UnknownControl(id) => write!(f, "control is not registered: {id}"),
            Self::OwnerGone(id) => write!(f, "control owner is no longer alive: {id}"),
        }
    }
}

impl Error for ControlHostError {}

/// Event capability the control owner exposes to the host.
///
/// Implemented by the lifecycle controller; called by the host on user
/// interaction with the hosted control.
pub trait ControlHostEvents {
    /// The hosted control became the focused one.
    fn control_activated(&self, control: &Rc<VisualControl>);

    /// The hosted control lost focus. Explicitly a no-op for documents:
    /// only a subsequent activation changes the active selection.
    fn control_deactivated(&self, control: &Rc<VisualControl>);

    /// The user asked to close the hosted control. Returns whether the
    /// host may detach it.
    fn control_close_requested(&self, control: &Rc<VisualControl>) -> bool;
}

/// Docking-framework seam consumed by the lifecycle controller.
pub trait ControlHost {
    /// Registers one control under the given owner.
    fn register_control(
        &mut self,
        control: Rc<VisualControl>,
        metadata: ControlMetadata,
        owner: Weak<dyn ControlHostEvents>,
    ) -> Result<(), ControlHostError>;

    /// Unregisters one control.
    fn unregister_control(&mut self, control: ControlId) -> Result<(), ControlHostError>;

    /// Brings one registered control to front.
    fn show(&mut self, control: ControlId) -> Result<(), ControlHostError>;
}

struct HostedControl {
    control: Rc<VisualControl>,
    metadata: ControlMetadata,
    owner: Weak<dyn ControlHostEvents>,
}

/// In-process baseline host.
///
/// Stands in for the external docking framework: tracks registration and
/// the shown control, and drives owner callbacks the way the framework
/// would on user interaction.
#[derive(Default)]
pub struct InProcessControlHost {
    controls: BTreeMap<ControlId, HostedControl>,
    shown: Option<ControlId>,
}

impl InProcessControlHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the control is currently registered.
    pub fn is_registered(&self, control: ControlId) -> bool {
        self.controls.contains_key(&control)
    }

    /// Returns the control currently brought to front.
    pub fn shown_control(&self) -> Option<ControlId> {
        self.shown
    }

    /// Returns the metadata the control was registered with.
    pub fn metadata(&self, control: ControlId) -> Option<ControlMetadata> {
        self.controls.get(&control).map(|entry| entry.metadata.clone())
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Simulates the user focusing one hosted control.
    pub fn activate(&self, control: ControlId) -> Result<(), ControlHostError> {
        let entry = self
            .controls
            .get(&control)
            .ok_or(ControlHostError::UnknownControl(control))?;
        let owner = entry
            .owner
            .upgrade()
            .ok_or(ControlHostError::OwnerGone(control))?;
        owner.control_activated(&entry.control);
        Ok(())
    }

    /// Simulates the user unfocusing one hosted control.
    pub fn deactivate(&self, control: ControlId) -> Result<(), ControlHostError> {
        let entry = self
            .controls
            .get(&control)
            .ok_or(ControlHostError::UnknownControl(control))?;
        let owner = entry
            .owner
            .upgrade()
            .ok_or(ControlHostError::OwnerGone(control))?;
        owner.control_deactivated(&entry.control);
        Ok(())
    }

    /// Simulates the user closing one hosted control: asks the owner and
    /// detaches the control when permitted.
    ///
    /// The owner must re-register if it wants the control shown again.
    pub fn request_close(&mut self, control: ControlId) -> Result<bool, ControlHostError> {
        let entry = self
            .controls
            .get(&control)
            .ok_or(ControlHostError::UnknownControl(control))?;
        let owner = entry
            .owner
            .upgrade()
            .ok_or(ControlHostError::OwnerGone(control))?;
        let allowed = owner.control_close_requested(&Rc::clone(&entry.control));
        if allowed {
            self.controls.remove(&control);
            if self.shown == Some(control) {
                self.shown = None;
            }
        }
        Ok(allowed)
    }
}

impl ControlHost for InProcessControlHost {
    fn register_control(
        &mut self,
        control: Rc<VisualControl>,
        metadata: ControlMetadata,
        owner: Weak<dyn ControlHostEvents>,
    ) -> Result<(), ControlHostError> {
        let id = control.id();
        if self.controls.contains_key(&id) {
            return Err(ControlHostError::DuplicateControl(id));
        }
        self.controls.insert(
            id,
            HostedControl {
                control,
                metadata,
                owner,
            },
        );
        Ok(())
    }

    fn unregister_control(&mut self, control: ControlId) -> Result<(), ControlHostError> {
        if self.controls.remove(&control).is_none() {
            return Err(ControlHostError::UnknownControl(control));
        }
        if self.shown == Some(control) {
            self.shown = None;
        }
        Ok(())
    }

    fn show(&mut self, control: ControlId) -> Result<(), ControlHostError> {
        if !self.controls.contains_key(&control) {
            return Err(ControlHostError::UnknownControl(control));
        }
        self.shown = Some(control);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlHost, ControlHostError, InProcessControlHost};
    use crate::facet::context::{ContextFacet, ControlMetadata};
    use crate::model::node::TreeNode;
    use std::rc::Weak;

    fn metadata() -> ControlMetadata {
        ControlMetadata {
            title: "Login.tdoc".to_string(),
            category: "documents".to_string(),
        }
    }

    #[test]
    fn registers_shows_and_unregisters() {
        let node = TreeNode::new("root");
        let context = ContextFacet::attach(&node).expect("attach context");
        let control = context.control();
        let mut host = InProcessControlHost::new();

        host.register_control(control.clone(), metadata(), Weak::<Never>::new())
            .expect("register control");
        assert!(host.is_registered(control.id()));

        host.show(control.id()).expect("show control");
        assert_eq!(host.shown_control(), Some(control.id()));

        host.unregister_control(control.id())
            .expect("unregister control");
        assert!(!host.is_registered(control.id()));
        assert_eq!(host.shown_control(), None);
    }

    #[test]
    fn rejects_duplicate_and_unknown_controls() {
        let node = TreeNode::new("root");
        let context = ContextFacet::attach(&node).expect("attach context");
        let control = context.control();
        let mut host = InProcessControlHost::new();

        host.register_control(control.clone(), metadata(), Weak::<Never>::new())
            .expect("register control");
        let duplicate = host.register_control(control.clone(), metadata(), Weak::<Never>::new());
        assert!(matches!(
            duplicate,
            Err(ControlHostError::DuplicateControl(_))
        ));

        host.unregister_control(control.id())
            .expect("unregister control");
        let unknown = host.show(control.id());
        assert!(matches!(unknown, Err(ControlHostError::UnknownControl(_))));
    }

    /// Placeholder owner type for tests that never deliver events.
    struct Never;

    impl super::ControlHostEvents for Never {
        fn control_activated(&self, _control: &std::rc::Rc<crate::facet::context::VisualControl>) {}
        fn control_deactivated(
            &self,
            _control: &std::rc::Rc<crate::facet::context::VisualControl>,
        ) {
        }
        fn control_close_requested(
            &self,
            _control: &std::rc::Rc<crate::facet::context::VisualControl>,
        ) -> bool {
            true
        }
    }
}
