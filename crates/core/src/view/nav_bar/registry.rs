//! Registry of the nav bars mounted in one application.
//!
//! Several nav bars can coexist (one per navigation stack, for instance),
//! but only one of them is the primary bar shown at a time. The registry is
//! an explicit object: every controller receives a reference at
//! construction and registers its [`NavBarPresence`] there.

use super::HIDDEN_CLASS;
use crate::element::Element;
use crate::view::Id;
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Instances = RefCell<IndexMap<Id, Rc<NavBarPresence>>>;

/// The part of a nav bar that other bars may act upon.
#[derive(Debug)]
pub struct NavBarPresence {
    id: Id,
    handle: Option<String>,
    element: Element,
    primary: Cell<bool>,
}

impl NavBarPresence {
    pub fn new(id: Id, handle: Option<String>, element: Element) -> NavBarPresence {
        NavBarPresence {
            id,
            handle,
            element,
            primary: Cell::new(true),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    pub fn is_primary(&self) -> bool {
        self.primary.get()
    }

    /// Shows or hides this bar only, other bars are left alone.
    pub fn set_primary(&self, primary: bool) {
        self.primary.set(primary);
        self.element.toggle_class(HIDDEN_CLASS, !primary);
    }
}

#[derive(Debug, Clone, Default)]
pub struct NavBarRegistry {
    instances: Rc<Instances>,
}

impl NavBarRegistry {
    pub fn new() -> NavBarRegistry {
        NavBarRegistry::default()
    }

    pub fn register(&self, presence: Rc<NavBarPresence>) -> Registration {
        let id = presence.id();
        tracing::debug!(bar = id, handle = ?presence.handle(), "nav bar registered");
        self.instances.borrow_mut().insert(id, presence);

        Registration {
            id,
            instances: Rc::downgrade(&self.instances),
        }
    }

    /// Returns `true` if `id` was registered.
    pub fn deregister(&self, id: Id) -> bool {
        remove_instance(&self.instances, id)
    }

    /// Registered bars, in registration order.
    pub fn instances(&self) -> Vec<Rc<NavBarPresence>> {
        self.instances.borrow().values().cloned().collect()
    }

    pub fn get(&self, id: Id) -> Option<Rc<NavBarPresence>> {
        self.instances.borrow().get(&id).cloned()
    }

    pub fn by_handle(&self, handle: &str) -> Vec<Rc<NavBarPresence>> {
        self.instances
            .borrow()
            .values()
            .filter(|presence| presence.handle() == Some(handle))
            .cloned()
            .collect()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.instances.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.borrow().is_empty()
    }

    /// Makes `id` the only primary bar.
    pub fn enable(&self, id: Id) {
        for presence in self.instances() {
            presence.set_primary(presence.id() == id);
        }
    }
}

fn remove_instance(instances: &Instances, id: Id) -> bool {
    let removed = instances.borrow_mut().shift_remove(&id).is_some();
    if removed {
        tracing::debug!(bar = id, "nav bar deregistered");
    }
    removed
}

/// Deregistration handle returned by [`NavBarRegistry::register`].
#[derive(Debug)]
pub struct Registration {
    id: Id,
    instances: Weak<Instances>,
}

impl Registration {
    pub fn id(&self) -> Id {
        self.id
    }

    /// Removes the bar from the registry. Safe to call any number of times,
    /// even after the registry itself was dropped.
    pub fn deregister(&self) {
        if let Some(instances) = self.instances.upgrade() {
            remove_instance(&instances, self.id);
        }
    }
}
