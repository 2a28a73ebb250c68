//! View history and transition planning.
//!
//! [`ViewHistory`] is the service the nav view consults whenever a slot has
//! to show a new view: it decides the navigation direction and hands back a
//! [`TransitionPlan`] that mounts the view (`init`) and animates the swap
//! (`animate`). The nav bar uses the same service to find the view a back
//! button leads to.
//!
//! [`HistoryStack`] is the stock implementation. It keeps a single stack of
//! leaf views, i.e. views whose template declares no nested slots. Container
//! views (tabs, side menus) are not recorded: their direction is the one of
//! the descendant that changed with them.

use crate::element::Element;
use crate::view::animator::{Transition, TransitionAnimator, TransitionKind};
use crate::view::nav_view::resolution::{Locals, StateRef};
use crate::view::{Direction, Event, Hub};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Class of the element wrapping one mounted view.
pub const VIEW_CLASS: &str = "pane";

pub type SharedHistory = Rc<RefCell<dyn ViewHistory>>;

/// What a slot asks for when it has to show `locals`.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRequest<'a> {
    pub slot: &'a Element,
    /// Qualified name of the slot.
    pub name: &'a str,
    pub locals: &'a Rc<Locals>,
    pub state: &'a Rc<StateRef>,
}

pub trait TransitionPlan {
    fn direction(&self) -> Direction;

    /// Mounts the new view into the slot and returns its element.
    fn init(&mut self) -> Element;

    /// Starts the swap once the view is mounted. A direction reported by a
    /// descendant slot during the same update takes precedence.
    fn animate(&mut self, child_direction: Option<Direction>) -> Option<Transition>;
}

pub trait ViewHistory {
    fn transition(&mut self, request: TransitionRequest<'_>) -> Box<dyn TransitionPlan>;

    fn back_view(&self) -> Option<BackView>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub state: String,
    pub slot: String,
}

/// The view a back navigation leads to.
#[derive(Debug)]
pub struct BackView {
    entry: HistoryEntry,
    hub: Hub,
}

impl BackView {
    pub fn entry(&self) -> &HistoryEntry {
        &self.entry
    }

    /// Asks the router to navigate back to this view.
    pub fn go(self) {
        self.hub
            .send(Event::Navigate {
                state: self.entry.state,
                direction: Direction::Back,
            })
            .ok();
    }
}

pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    animator: Rc<dyn TransitionAnimator>,
    hub: Hub,
    default_transition: String,
}

impl HistoryStack {
    pub fn new(
        animator: Rc<dyn TransitionAnimator>,
        hub: Hub,
        default_transition: &str,
    ) -> HistoryStack {
        HistoryStack {
            entries: Vec::new(),
            animator,
            hub,
            default_transition: default_transition.to_string(),
        }
    }

    /// Records a visit to `state` and returns the direction it implies.
    ///
    /// - the current entry again: `None`,
    /// - the entry below the current one: `Back`, the current entry is dropped,
    /// - anything else: `Forward`, or `None` for the very first entry.
    pub fn record(&mut self, state: &str, slot: &str) -> Direction {
        let len = self.entries.len();

        if self.entries.last().is_some_and(|entry| entry.state == state) {
            return Direction::None;
        }

        if len >= 2 && self.entries[len - 2].state == state {
            self.entries.pop();
            return Direction::Back;
        }

        self.entries.push(HistoryEntry {
            state: state.to_string(),
            slot: slot.to_string(),
        });

        if len == 0 {
            Direction::None
        } else {
            Direction::Forward
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl ViewHistory for HistoryStack {
    fn transition(&mut self, request: TransitionRequest<'_>) -> Box<dyn TransitionPlan> {
        let direction = if request.locals.slots.is_empty() {
            self.record(&request.state.name, request.name)
        } else {
            Direction::None
        };

        let name = request
            .locals
            .view
            .as_ref()
            .and_then(|view| view.transition.clone())
            .unwrap_or_else(|| self.default_transition.clone());

        tracing::debug!(
            slot = request.name,
            state = %request.state.name,
            %direction,
            "view transition planned"
        );

        Box::new(HistoryPlan {
            animator: self.animator.clone(),
            hub: self.hub.clone(),
            slot: request.slot.clone(),
            template: request.locals.template.clone(),
            name,
            direction,
            entering: None,
            leaving: None,
        })
    }

    fn back_view(&self) -> Option<BackView> {
        let len = self.entries.len();
        if len < 2 {
            return None;
        }

        Some(BackView {
            entry: self.entries[len - 2].clone(),
            hub: self.hub.clone(),
        })
    }
}

impl fmt::Debug for HistoryStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStack")
            .field("entries", &self.entries)
            .field("default_transition", &self.default_transition)
            .finish_non_exhaustive()
    }
}

struct HistoryPlan {
    animator: Rc<dyn TransitionAnimator>,
    hub: Hub,
    slot: Element,
    template: String,
    name: String,
    direction: Direction,
    entering: Option<Element>,
    leaving: Option<Element>,
}

impl TransitionPlan for HistoryPlan {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn init(&mut self) -> Element {
        if let Some(entering) = &self.entering {
            return entering.clone();
        }

        self.leaving = self
            .slot
            .children()
            .into_iter()
            .rev()
            .find(|child| child.has_class(VIEW_CLASS));

        let entering = Element::new("div").with_classes(&[VIEW_CLASS]);
        entering.set_html(&self.template);
        self.slot.append(&entering);
        self.entering = Some(entering.clone());

        entering
    }

    fn animate(&mut self, child_direction: Option<Direction>) -> Option<Transition> {
        let entering = self.entering.clone()?;
        let direction = child_direction.unwrap_or(self.direction);

        let transition = Transition::new(
            TransitionKind::View,
            &self.name,
            direction,
            entering,
            self.leaving.clone(),
        );
        self.animator.start(&transition, &self.hub);

        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::animator::{ImmediateAnimator, ENTERING_CLASS, LEAVING_CLASS};
    use crate::view::ViewData;
    use std::sync::mpsc::{channel, Receiver};

    fn stack() -> (HistoryStack, Receiver<Event>) {
        let (hub, receiver) = channel();
        (
            HistoryStack::new(Rc::new(ImmediateAnimator), hub, "slide-left-right"),
            receiver,
        )
    }

    #[test]
    fn record_computes_directions() {
        let (mut history, _receiver) = stack();

        assert_eq!(history.record("inbox", "@"), Direction::None);
        assert_eq!(history.record("inbox", "@"), Direction::None);
        assert_eq!(history.record("message", "@"), Direction::Forward);
        assert_eq!(history.record("reply", "@"), Direction::Forward);
        assert_eq!(history.record("message", "@"), Direction::Back);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().map(|e| e.state.as_str()), Some("message"));
    }

    #[test]
    fn back_view_needs_two_entries() {
        let (mut history, receiver) = stack();
        assert!(history.back_view().is_none());

        history.record("inbox", "@");
        assert!(history.back_view().is_none());

        history.record("message", "@");
        let back_view = history.back_view().unwrap();
        assert_eq!(back_view.entry().state, "inbox");

        back_view.go();
        assert!(matches!(
            receiver.try_recv(),
            Ok(Event::Navigate { state, direction: Direction::Back }) if state == "inbox"
        ));
    }

    #[test]
    fn clear_forgets_every_entry() {
        let (mut history, _receiver) = stack();
        history.record("inbox", "@");
        history.record("message", "@");

        history.clear();

        assert!(history.is_empty());
        assert!(history.back_view().is_none());
    }

    #[test]
    fn container_views_are_not_recorded() {
        let (mut history, _receiver) = stack();
        let slot = Element::new("ion-nav-view");
        let locals = Rc::new(Locals::new("<ion-tabs/>").slot("list"));
        let state = StateRef::new("home.tabs");

        let plan = history.transition(TransitionRequest {
            slot: &slot,
            name: "@",
            locals: &locals,
            state: &state,
        });

        assert_eq!(plan.direction(), Direction::None);
        assert!(history.is_empty());
    }

    #[test]
    fn plan_mounts_view_and_animates_against_previous_one() {
        let (mut history, receiver) = stack();
        let slot = Element::new("ion-nav-view");
        let first = Rc::new(Locals::new("<p>inbox</p>"));
        let second = Rc::new(Locals::new("<p>message</p>").view(ViewData {
            transition: Some("fade".to_string()),
            ..ViewData::titled("Message")
        }));

        let mut plan = history.transition(TransitionRequest {
            slot: &slot,
            name: "@",
            locals: &first,
            state: &StateRef::new("inbox"),
        });
        let inbox = plan.init();
        let transition = plan.animate(None).unwrap();
        assert!(transition.leaving.is_none());
        assert_eq!(transition.name, "slide-left-right");
        transition.settle();

        let mut plan = history.transition(TransitionRequest {
            slot: &slot,
            name: "@",
            locals: &second,
            state: &StateRef::new("message"),
        });
        let message = plan.init();
        assert!(message.ptr_eq(&plan.init()));
        let transition = plan.animate(None).unwrap();

        assert_eq!(slot.children().len(), 2);
        assert_eq!(message.html(), "<p>message</p>");
        assert_eq!(transition.direction, Direction::Forward);
        assert_eq!(transition.name, "fade");
        assert!(message.has_class(ENTERING_CLASS));
        assert!(inbox.has_class(LEAVING_CLASS));
        assert!(transition
            .leaving
            .as_ref()
            .is_some_and(|leaving| leaving.ptr_eq(&inbox)));
        assert_eq!(receiver.try_iter().count(), 2);
    }

    #[test]
    fn child_direction_overrides_plan_direction() {
        let (mut history, _receiver) = stack();
        let slot = Element::new("ion-nav-view");
        let locals = Rc::new(Locals::new("<ion-tabs/>").slot("list"));

        let mut plan = history.transition(TransitionRequest {
            slot: &slot,
            name: "@",
            locals: &locals,
            state: &StateRef::new("home.tabs"),
        });

        assert!(plan.animate(Some(Direction::Back)).is_none());
        plan.init();
        let transition = plan.animate(Some(Direction::Back)).unwrap();

        assert_eq!(transition.direction, Direction::Back);
        assert_eq!(transition.kind, TransitionKind::View);
    }
}
