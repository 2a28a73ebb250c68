//! Visual swap between an entering and a leaving element.
//!
//! An animator marks both elements for the duration of the transition and
//! reports completion by sending [`Event::TransitionEnd`] on the hub. The
//! component that started the transition observes that event, settles the
//! markers with [`Transition::settle`] and only then updates its own
//! bookkeeping.

use super::{Direction, Event, Hub, TransitionId};
use crate::element::Element;
use crate::settings::TransitionSettings;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

pub const ENTERING_CLASS: &str = "nav-entering";
pub const LEAVING_CLASS: &str = "nav-leaving";
pub const DIRECTION_ATTRIBUTE: &str = "nav-direction";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    NavBar,
    View,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::NavBar => "nav-bar",
            TransitionKind::View => "view",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub id: TransitionId,
    pub kind: TransitionKind,
    pub name: String,
    pub direction: Direction,
    pub entering: Element,
    pub leaving: Option<Element>,
}

impl Transition {
    pub fn new(
        kind: TransitionKind,
        name: &str,
        direction: Direction,
        entering: Element,
        leaving: Option<Element>,
    ) -> Transition {
        Transition {
            id: TransitionId::next(),
            kind,
            name: name.to_string(),
            direction,
            entering,
            leaving,
        }
    }

    /// Applies the in-flight markers to both elements.
    pub fn mark(&self) {
        self.entering.add_class(ENTERING_CLASS);
        self.entering.add_class(&self.name);
        self.entering
            .set_attribute(DIRECTION_ATTRIBUTE, self.direction.as_str());

        if let Some(leaving) = &self.leaving {
            leaving.add_class(LEAVING_CLASS);
            leaving.add_class(&self.name);
        }
    }

    /// Removes the in-flight markers once completion was observed.
    pub fn settle(&self) {
        self.entering.remove_class(ENTERING_CLASS);
        self.entering.remove_class(&self.name);
        self.entering.remove_attribute(DIRECTION_ATTRIBUTE);

        if let Some(leaving) = &self.leaving {
            leaving.remove_class(LEAVING_CLASS);
            leaving.remove_class(&self.name);
        }
    }
}

pub trait TransitionAnimator {
    /// Starts `transition`. Completion must eventually be reported as
    /// `Event::TransitionEnd(transition.id)` on `hub`.
    fn start(&self, transition: &Transition, hub: &Hub);
}

/// Swaps without any visible animation, completion is reported right away.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateAnimator;

impl TransitionAnimator for ImmediateAnimator {
    fn start(&self, transition: &Transition, hub: &Hub) {
        tracing::trace!(
            kind = transition.kind.as_str(),
            name = %transition.name,
            direction = %transition.direction,
            "immediate transition"
        );
        transition.mark();
        hub.send(Event::TransitionEnd(transition.id)).ok();
    }
}

/// Reports completion after a fixed duration from a timer thread.
#[derive(Debug, Clone, Copy)]
pub struct TimedAnimator {
    duration: Duration,
}

impl TimedAnimator {
    pub fn new(duration: Duration) -> TimedAnimator {
        TimedAnimator { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl TransitionAnimator for TimedAnimator {
    fn start(&self, transition: &Transition, hub: &Hub) {
        tracing::debug!(
            kind = transition.kind.as_str(),
            name = %transition.name,
            direction = %transition.direction,
            duration_ms = self.duration.as_millis() as u64,
            "timed transition"
        );
        transition.mark();

        let hub2 = hub.clone();
        let id = transition.id;
        let duration = self.duration;
        thread::spawn(move || {
            thread::sleep(duration);
            hub2.send(Event::TransitionEnd(id)).ok();
        });
    }
}

/// Picks the animator matching the configured duration.
pub fn animator_from_settings(settings: &TransitionSettings) -> Rc<dyn TransitionAnimator> {
    if settings.duration_ms == 0 {
        Rc::new(ImmediateAnimator)
    } else {
        Rc::new(TimedAnimator::new(Duration::from_millis(
            settings.duration_ms,
        )))
    }
}
