//! Snapshot of the external router's current resolution.
//!
//! The router resolves a target state into one [`ResolvedView`] per
//! qualified view-slot name. A slot shows a new view whenever the
//! [`Locals`] it resolves to is a different allocation than the one it
//! applied last, so the router must hand out a fresh `Rc` for every new
//! resolution and reuse the existing one otherwise.

use crate::view::ViewData;
use fxhash::FxHashMap;
use std::rc::Rc;

/// State bound to a view slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRef {
    pub name: String,
}

impl StateRef {
    pub fn new(name: &str) -> Rc<StateRef> {
        Rc::new(StateRef {
            name: name.to_string(),
        })
    }
}

/// Resolved content of one view slot.
#[derive(Debug, Default)]
pub struct Locals {
    pub template: String,
    pub view: Option<ViewData>,
    /// Names of the nested view slots declared by `template`.
    pub slots: Vec<String>,
}

impl Locals {
    pub fn new(template: &str) -> Locals {
        Locals {
            template: template.to_string(),
            ..Default::default()
        }
    }

    pub fn view(mut self, view: ViewData) -> Locals {
        self.view = Some(view);
        self
    }

    pub fn slot(mut self, name: &str) -> Locals {
        self.slots.push(name.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedView {
    pub locals: Rc<Locals>,
    pub state: Rc<StateRef>,
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    views: FxHashMap<String, ResolvedView>,
}

impl Resolution {
    pub fn new() -> Resolution {
        Resolution::default()
    }

    pub fn insert(&mut self, qualified_name: &str, locals: Rc<Locals>, state: Rc<StateRef>) {
        self.views
            .insert(qualified_name.to_string(), ResolvedView { locals, state });
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, qualified_name: &str, locals: Rc<Locals>, state: Rc<StateRef>) -> Self {
        self.insert(qualified_name, locals, state);
        self
    }

    pub fn get(&self, qualified_name: &str) -> Option<&ResolvedView> {
        self.views.get(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Joins a slot name and the state bound to its nearest ancestor slot.
pub fn qualified_name(name: &str, parent_state: Option<&str>) -> String {
    format!("{}@{}", name, parent_state.unwrap_or_default())
}
