//! Navigation bar controller.
//!
//! A [`NavBarController`] owns the visibility, title, back button and
//! button registration of one nav bar mount. Title changes that accompany
//! a navigation are animated by swapping the two containers of the bar
//! (see [`container`]): the off-screen container receives the new title and
//! becomes the sole active one once the animator reports completion.
//!
//! # Event Flow
//!
//! 1. The nav view pushes `Event::BeforeEnter` on the bus when a view is
//!    mounted.
//! 2. `handle_event()` routes it to `before_enter()`, which starts a title
//!    transition.
//! 3. The animator sends `Event::TransitionEnd` on the hub.
//! 4. `handle_event()` settles the transition and flips the active flags.
//!
//! Only the latest started transition may flip the flags. A completion for
//! a transition that was superseded in the meantime is ignored.

use crate::element::Element;
use crate::settings::NavBarSettings;
use crate::view::animator::{Transition, TransitionAnimator, TransitionKind};
use crate::view::nav_view::history::SharedHistory;
use crate::view::{Event, Hub, Id, NavBarAction, TransitionId, ViewData, ID_FEEDER};
use std::fmt;
use std::rc::Rc;

pub mod container;
pub mod registry;

pub use self::container::{ButtonMarkup, NavBarContainer};
pub use self::registry::{NavBarPresence, NavBarRegistry, Registration};

/// Marker of a non-primary bar, or of a hidden back button.
pub const HIDDEN_CLASS: &str = "hide";
/// Marker of a bar hidden with `show_bar(Some(false))`.
pub const INVISIBLE_CLASS: &str = "invisible";
/// Attribute set on the host's parent, pointing back to the controller id.
pub const BACK_REFERENCE_ATTRIBUTE: &str = "data-nav-bar";

type ShouldUpdate = Box<dyn Fn(Option<&ViewData>) -> bool>;

struct PendingTransition {
    transition: Transition,
    entering: usize,
}

pub struct NavBarController {
    id: Id,
    element: Element,
    parent: Option<Element>,
    presence: Rc<NavBarPresence>,
    registry: NavBarRegistry,
    registration: Registration,
    containers: Vec<NavBarContainer>,
    markup: ButtonMarkup,
    title: String,
    previous_title: String,
    visible: bool,
    back_button_shown: bool,
    default_transition: String,
    animator: Rc<dyn TransitionAnimator>,
    history: SharedHistory,
    hub: Hub,
    pending: Option<PendingTransition>,
    should_update: ShouldUpdate,
    destroyed: bool,
}

impl NavBarController {
    /// Creates a controller for the nav bar mounted on `element` and
    /// registers it in `registry`.
    ///
    /// The bar has no containers until [`init`](Self::init) is called;
    /// buttons should be registered before that.
    pub fn new(
        element: Element,
        settings: &NavBarSettings,
        registry: &NavBarRegistry,
        animator: Rc<dyn TransitionAnimator>,
        history: SharedHistory,
        hub: Hub,
    ) -> NavBarController {
        let id = ID_FEEDER.next();

        let parent = element.parent();
        if let Some(parent) = &parent {
            parent.set_attribute(BACK_REFERENCE_ATTRIBUTE, &id.to_string());
        }

        let presence = Rc::new(NavBarPresence::new(
            id,
            settings.handle.clone(),
            element.clone(),
        ));
        let registration = registry.register(presence.clone());

        NavBarController {
            id,
            element,
            parent,
            presence,
            registry: registry.clone(),
            registration,
            containers: Vec::new(),
            markup: ButtonMarkup::default(),
            title: String::new(),
            previous_title: String::new(),
            visible: true,
            back_button_shown: true,
            default_transition: settings.transition.clone(),
            animator,
            history,
            hub,
            pending: None,
            should_update: Box::new(|view_data| view_data.is_some()),
            destroyed: false,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn handle(&self) -> Option<&str> {
        self.presence.handle()
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn containers(&self) -> &[NavBarContainer] {
        &self.containers
    }

    /// Creates the two containers. Must be called once, before anything else.
    pub fn init<S: AsRef<str>>(&mut self, class_names: &[S]) {
        if !self.containers.is_empty() {
            tracing::warn!(bar = self.id, "nav bar initialized twice");
            return;
        }

        self.containers =
            Vec::from(container::create_pair(class_names, &self.markup, &self.element));
    }

    pub fn should_update(&self, view_data: Option<&ViewData>) -> bool {
        (self.should_update)(view_data)
    }

    /// Replaces the predicate gating [`before_enter`](Self::before_enter).
    pub fn set_should_update<F>(&mut self, predicate: F)
    where
        F: Fn(Option<&ViewData>) -> bool + 'static,
    {
        self.should_update = Box::new(predicate);
    }

    pub fn before_enter(&mut self, view_data: Option<&ViewData>) {
        if !self.should_update(view_data) {
            tracing::trace!(bar = self.id, "nav bar update skipped");
            return;
        }

        if self.containers.is_empty() {
            tracing::warn!(bar = self.id, "nav bar entered before init");
            return;
        }

        let data = view_data.cloned().unwrap_or_default();

        self.show_bar(Some(!data.hide_nav_bar));

        let has_back_view = self.history.borrow().back_view().is_some();
        self.show_back_button(Some(has_back_view && !data.hide_back_button));

        let Some(entering) = self.off_screen_index() else {
            return;
        };
        let leaving = self.active_index();

        self.title(
            Some(data.title.as_deref().unwrap_or_default()),
            Some(entering),
        );
        self.transition(entering, leaving, &data);
    }

    /// Starts the swap between two containers. The active flags only move
    /// once the animator reports completion.
    pub fn transition(&mut self, entering: usize, leaving: Option<usize>, view_data: &ViewData) {
        let Some(entering_element) = self
            .containers
            .get(entering)
            .and_then(|container| container.element())
            .cloned()
        else {
            return;
        };

        let leaving_element = leaving
            .and_then(|index| self.containers.get(index))
            .and_then(|container| container.element())
            .cloned();

        let name = view_data
            .transition
            .as_deref()
            .unwrap_or(&self.default_transition);

        let transition = Transition::new(
            TransitionKind::NavBar,
            name,
            view_data.direction,
            entering_element,
            leaving_element,
        );

        if let Some(previous) = self.pending.take() {
            tracing::debug!(bar = self.id, "superseding pending nav bar transition");
            previous.transition.settle();
        }

        tracing::debug!(
            bar = self.id,
            entering,
            ?leaving,
            name = %transition.name,
            direction = %transition.direction,
            "nav bar transition"
        );

        self.animator.start(&transition, &self.hub);
        self.pending = Some(PendingTransition {
            transition,
            entering,
        });
    }

    pub fn handle_event(&mut self, evt: &Event) -> bool {
        match evt {
            Event::TransitionEnd(id) => self.complete_transition(*id),
            Event::BeforeEnter(view_data) => {
                self.before_enter(view_data.as_ref());
                false
            }
            Event::NavBar { handle, action } if self.accepts(handle.as_deref()) => {
                self.apply(action);
                handle.is_some()
            }
            _ => false,
        }
    }

    /// Sets the visibility when `show` is given and returns the current one.
    pub fn show_bar(&mut self, show: Option<bool>) -> bool {
        if let Some(show) = show {
            self.visible = show;
            self.element.toggle_class(INVISIBLE_CLASS, !show);
            self.hub
                .send(Event::HeaderPresence {
                    bar: self.id,
                    present: show,
                })
                .ok();
        }

        self.visible
    }

    /// Sets the title when `val` is given and returns the current one.
    ///
    /// The on-screen container is written unless `container` names another.
    pub fn title(&mut self, val: Option<&str>, container: Option<usize>) -> &str {
        if let Some(val) = val {
            let target = container.or_else(|| self.active_index()).unwrap_or(0);
            self.previous_title = std::mem::replace(&mut self.title, val.to_string());

            if let Some(container) = self.containers.get_mut(target) {
                container.set_title(val);
            }
        }

        &self.title
    }

    pub fn previous_title(&self) -> &str {
        &self.previous_title
    }

    pub fn has_back_button(&self) -> bool {
        self.markup.back.is_some()
    }

    pub fn show_back_button(&mut self, show: Option<bool>) -> bool {
        if let Some(show) = show {
            self.back_button_shown = show;
            for container in &self.containers {
                container.set_back_button_visible(show);
            }
        }

        self.has_back_button() && self.back_button_shown
    }

    /// Asks the router to go to the previous view, if any.
    ///
    /// Always returns `false`, so callers can use it as a click handler that
    /// suppresses the default action.
    pub fn back(&self) -> bool {
        let back_view = self.history.borrow().back_view();

        match back_view {
            Some(back_view) => {
                tracing::debug!(bar = self.id, state = %back_view.entry().state, "nav bar back");
                back_view.go();
            }
            None => tracing::trace!(bar = self.id, "no back view"),
        }

        false
    }

    /// Records button markup for the next created containers.
    ///
    /// `"secondary"` and `"right"` target the secondary slot, anything else
    /// the primary one.
    pub fn register_buttons(&mut self, markup: &str, side: &str) {
        match side {
            "secondary" | "right" => self.markup.secondary = Some(markup.to_string()),
            _ => self.markup.primary = Some(markup.to_string()),
        }
    }

    pub fn register_back_button(&mut self, markup: &str) {
        self.markup.back = Some(markup.to_string());
    }

    /// Makes this bar the primary one and hides every other registered bar.
    pub fn enable(&self) {
        self.registry.enable(self.id);
    }

    pub fn is_primary(&self) -> bool {
        self.presence.is_primary()
    }

    /// Shows or hides this bar only.
    pub fn set_primary(&self, enable: bool) {
        self.presence.set_primary(enable);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Tears the bar down. Calling it again does nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }

        if let Some(parent) = &self.parent {
            parent.remove_attribute(BACK_REFERENCE_ATTRIBUTE);
        }

        for container in &mut self.containers {
            container.destroy();
        }

        self.pending = None;
        self.registration.deregister();
        self.destroyed = true;

        tracing::debug!(bar = self.id, "nav bar destroyed");
    }

    fn active_index(&self) -> Option<usize> {
        self.containers
            .iter()
            .position(|container| container.is_active())
    }

    fn off_screen_index(&self) -> Option<usize> {
        self.containers
            .iter()
            .position(|container| !container.is_active())
    }

    fn complete_transition(&mut self, id: TransitionId) -> bool {
        if !matches!(&self.pending, Some(pending) if pending.transition.id == id) {
            return false;
        }

        let Some(pending) = self.pending.take() else {
            return false;
        };

        pending.transition.settle();
        for (index, container) in self.containers.iter_mut().enumerate() {
            container.set_active(index == pending.entering);
        }

        true
    }

    fn accepts(&self, handle: Option<&str>) -> bool {
        handle.is_none() || handle == self.handle()
    }

    fn apply(&mut self, action: &NavBarAction) {
        match action {
            NavBarAction::SetTitle(title) => {
                self.title(Some(title), None);
            }
            NavBarAction::ShowBar(show) => {
                self.show_bar(Some(*show));
            }
            NavBarAction::ShowBackButton(show) => {
                self.show_back_button(Some(*show));
            }
            NavBarAction::Back => {
                self.back();
            }
            NavBarAction::Enable => self.enable(),
        }
    }
}

impl Drop for NavBarController {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for NavBarController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavBarController")
            .field("id", &self.id)
            .field("handle", &self.handle())
            .field("title", &self.title)
            .field("visible", &self.visible)
            .field("containers", &self.containers)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
