//! Nav view coordinator.
//!
//! A nav view is a named slot where the router mounts the view of the
//! current state. Slots nest: the view mounted in one slot may declare
//! further slots, which are resolved against the state bound to their
//! nearest ancestor. The coordinator keeps those slots as an explicit tree
//! and runs the update routine on every router notification.
//!
//! # Update routine
//!
//! For each slot, parents first:
//!
//! 1. Look up the locals resolved for the slot's qualified name. Nothing
//!    happens if there are none, or if they are the same allocation as the
//!    ones applied last.
//! 2. Ask the view history for a transition plan.
//! 3. Record the locals and bind the state to the slot's view identity.
//! 4. Mount the view (`init`), link and update the slots it declares, then
//!    `animate`, passing the first direction reported by a descendant.
//!
//! Mounting a view that carries [`ViewData`](crate::view::ViewData) pushes
//! `Event::BeforeEnter` on the bus for the nav bar.

use crate::element::Element;
use crate::view::animator::Transition;
use crate::view::{Bus, Direction, Event, Id, TransitionId, ID_FEEDER};
use fxhash::FxHashMap;
use std::fmt;
use std::rc::{Rc, Weak};

pub mod history;
pub mod resolution;

use self::history::{SharedHistory, TransitionRequest};
use self::resolution::{qualified_name, Locals, Resolution, StateRef};

/// Attribute mirroring the state bound to a slot.
pub const STATE_ATTRIBUTE: &str = "data-view-state";
pub const SLOT_TAG: &str = "ion-nav-view";
pub const SLOT_NAME_ATTRIBUTE: &str = "name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(Id);

/// Identity record of the view currently mounted in a slot.
#[derive(Debug, Clone, Default)]
pub struct ViewIdentity {
    pub state: Option<Rc<StateRef>>,
}

#[derive(Debug)]
pub struct ViewSlot {
    id: SlotId,
    name: String,
    qualified_name: String,
    parent: Option<SlotId>,
    parent_state: Weak<StateRef>,
    element: Element,
    identity: ViewIdentity,
    last_locals: Option<Rc<Locals>>,
    view_element: Option<Element>,
    children: Vec<SlotId>,
}

impl ViewSlot {
    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn parent(&self) -> Option<SlotId> {
        self.parent
    }

    /// State the qualified name was derived from, while it is still alive.
    pub fn parent_state(&self) -> Option<Rc<StateRef>> {
        self.parent_state.upgrade()
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn identity(&self) -> &ViewIdentity {
        &self.identity
    }

    pub fn current_state(&self) -> Option<&Rc<StateRef>> {
        self.identity.state.as_ref()
    }

    pub fn last_locals(&self) -> Option<&Rc<Locals>> {
        self.last_locals.as_ref()
    }

    /// A slot becomes active once it mounted its first view.
    pub fn is_active(&self) -> bool {
        self.last_locals.is_some()
    }

    pub fn view_element(&self) -> Option<&Element> {
        self.view_element.as_ref()
    }

    pub fn children(&self) -> &[SlotId] {
        &self.children
    }
}

pub struct NavViewCoordinator {
    slots: FxHashMap<SlotId, ViewSlot>,
    roots: Vec<SlotId>,
    history: SharedHistory,
    pending: FxHashMap<TransitionId, Transition>,
}

impl NavViewCoordinator {
    pub fn new(history: SharedHistory) -> NavViewCoordinator {
        NavViewCoordinator {
            slots: FxHashMap::default(),
            roots: Vec::new(),
            history,
            pending: FxHashMap::default(),
        }
    }

    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    /// Adds a slot named `name` mounted on `element`.
    ///
    /// The qualified name is computed here, once, from the state bound to
    /// the nearest ancestor slot. An unknown `parent` links a root slot.
    pub fn link(&mut self, parent: Option<SlotId>, name: &str, element: Element) -> SlotId {
        let parent = parent.filter(|parent| {
            let known = self.slots.contains_key(parent);
            if !known {
                tracing::warn!(?parent, name, "unknown parent slot, linking as root");
            }
            known
        });

        let parent_state = self.nearest_state(parent);
        let qualified_name = qualified_name(name, parent_state.as_ref().map(|s| s.name.as_str()));
        let id = SlotId(ID_FEEDER.next());

        tracing::debug!(?id, slot = %qualified_name, "view slot linked");

        self.slots.insert(
            id,
            ViewSlot {
                id,
                name: name.to_string(),
                qualified_name,
                parent,
                parent_state: parent_state.as_ref().map(Rc::downgrade).unwrap_or_default(),
                element,
                identity: ViewIdentity::default(),
                last_locals: None,
                view_element: None,
                children: Vec::new(),
            },
        );

        match parent.and_then(|parent| self.slots.get_mut(&parent)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }

        id
    }

    /// Removes `id` and all its descendants.
    pub fn unlink(&mut self, id: SlotId) {
        let Some(slot) = self.slots.remove(&id) else {
            return;
        };

        for child in slot.children {
            self.unlink(child);
        }

        match slot.parent.and_then(|parent| self.slots.get_mut(&parent)) {
            Some(parent) => parent.children.retain(|child| *child != id),
            None => self.roots.retain(|root| *root != id),
        }

        tracing::trace!(?id, slot = %slot.qualified_name, "view slot unlinked");
    }

    pub fn slot(&self, id: SlotId) -> Option<&ViewSlot> {
        self.slots.get(&id)
    }

    pub fn find(&self, qualified_name: &str) -> Option<&ViewSlot> {
        self.slots
            .values()
            .find(|slot| slot.qualified_name == qualified_name)
    }

    pub fn roots(&self) -> &[SlotId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Router notification: a state change succeeded.
    pub fn on_state_change_success(&mut self, resolution: &Resolution, bus: &mut Bus) {
        tracing::trace!("state change succeeded");
        self.update(resolution, bus);
    }

    /// Router notification: view content is loading.
    pub fn on_view_content_loading(&mut self, resolution: &Resolution, bus: &mut Bus) {
        tracing::trace!("view content loading");
        self.update(resolution, bus);
    }

    /// Runs the update routine over every slot tree. Returns the first
    /// direction reported by a slot that mounted a new view.
    pub fn update(&mut self, resolution: &Resolution, bus: &mut Bus) -> Option<Direction> {
        let mut direction = None;
        for root in self.roots.clone() {
            let reported = self.update_slot(root, resolution, bus);
            direction = direction.or(reported);
        }
        direction
    }

    /// Runs the update routine for `id` and its descendants.
    ///
    /// Returns the direction of the transition started for this slot, or
    /// the one reported by a descendant when this slot didn't change.
    pub fn update_slot(
        &mut self,
        id: SlotId,
        resolution: &Resolution,
        bus: &mut Bus,
    ) -> Option<Direction> {
        let slot = self.slots.get(&id)?;

        let Some(resolved) = resolution.get(&slot.qualified_name) else {
            tracing::trace!(slot = %slot.qualified_name, "no view resolved");
            return self.update_children(id, resolution, bus);
        };

        if slot
            .last_locals
            .as_ref()
            .is_some_and(|locals| Rc::ptr_eq(locals, &resolved.locals))
        {
            tracing::trace!(slot = %slot.qualified_name, "view unchanged");
            return self.update_children(id, resolution, bus);
        }

        let resolved = resolved.clone();
        let element = slot.element.clone();
        let name = slot.qualified_name.clone();

        let mut plan = self.history.borrow_mut().transition(TransitionRequest {
            slot: &element,
            name: &name,
            locals: &resolved.locals,
            state: &resolved.state,
        });

        if let Some(slot) = self.slots.get_mut(&id) {
            slot.last_locals = Some(resolved.locals.clone());
            slot.identity.state = Some(resolved.state.clone());
        }
        element.set_attribute(STATE_ATTRIBUTE, &resolved.state.name);

        if let Some(view) = &resolved.locals.view {
            bus.push_back(Event::BeforeEnter(Some(
                view.clone().direction(plan.direction()),
            )));
        }

        let mut child_direction = None;
        let view_element = plan.init();
        self.relink_children(id, &view_element, &resolved.locals);

        let children = self
            .slots
            .get(&id)
            .map(|slot| slot.children.clone())
            .unwrap_or_default();
        for child in children {
            let reported = self.update_slot(child, resolution, bus);
            if child_direction.is_none() {
                child_direction = reported.filter(|direction| *direction != Direction::None);
            }
        }

        if let Some(transition) = plan.animate(child_direction) {
            self.pending.insert(transition.id, transition);
        }

        if let Some(slot) = self.slots.get_mut(&id) {
            slot.view_element = Some(view_element);
        }

        Some(child_direction.unwrap_or(plan.direction()))
    }

    /// Settles finished view transitions and detaches the views that left.
    pub fn handle_event(&mut self, evt: &Event) -> bool {
        let Event::TransitionEnd(id) = evt else {
            return false;
        };

        let Some(transition) = self.pending.remove(id) else {
            return false;
        };

        transition.settle();
        if let Some(leaving) = &transition.leaving {
            leaving.remove();
        }

        true
    }

    fn update_children(
        &mut self,
        id: SlotId,
        resolution: &Resolution,
        bus: &mut Bus,
    ) -> Option<Direction> {
        let children = self.slots.get(&id)?.children.clone();

        let mut direction = None;
        for child in children {
            let reported = self.update_slot(child, resolution, bus);
            direction = direction.or(reported);
        }
        direction
    }

    /// Replaces the children of `id` by the slots declared in `locals`.
    fn relink_children(&mut self, id: SlotId, view_element: &Element, locals: &Locals) {
        let previous = self
            .slots
            .get_mut(&id)
            .map(|slot| std::mem::take(&mut slot.children))
            .unwrap_or_default();
        for child in previous {
            self.unlink(child);
        }

        for name in &locals.slots {
            let element = Element::new(SLOT_TAG);
            element.set_attribute(SLOT_NAME_ATTRIBUTE, name);
            view_element.append(&element);
            self.link(Some(id), name, element);
        }
    }

    fn nearest_state(&self, mut current: Option<SlotId>) -> Option<Rc<StateRef>> {
        while let Some(id) = current {
            let slot = self.slots.get(&id)?;
            if let Some(state) = &slot.identity.state {
                return Some(state.clone());
            }
            current = slot.parent;
        }

        None
    }
}

impl fmt::Debug for NavViewCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavViewCoordinator")
            .field("slots", &self.slots)
            .field("roots", &self.roots)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
