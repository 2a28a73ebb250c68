//! The two title/button blocks of a nav bar.
//!
//! A nav bar never rebuilds its content on navigation. It owns exactly two
//! containers created once by [`create_pair`]: the on-screen one and the
//! off-screen one, which is always the target of the next transition. Only
//! the title of a container changes afterwards; the button markup is fixed
//! at creation from whatever was registered beforehand.

use super::HIDDEN_CLASS;
use crate::element::Element;
use crate::view::{Id, ID_FEEDER};

pub const CONTAINER_CLASS: &str = "nav-bar-block";
pub const ACTIVE_CLASS: &str = "nav-bar-active";
pub const TITLE_CLASS: &str = "title";
pub const BACK_BUTTON_CLASS: &str = "back-button";
pub const PRIMARY_BUTTONS_CLASS: &str = "buttons-primary";
pub const SECONDARY_BUTTONS_CLASS: &str = "buttons-secondary";

/// Button markup registered on a nav bar before its containers exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonMarkup {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub back: Option<String>,
}

#[derive(Debug)]
pub struct NavBarContainer {
    id: Id,
    element: Option<Element>,
    title_element: Option<Element>,
    back_element: Option<Element>,
    title: String,
    active: bool,
}

/// Creates both containers and appends their subtrees to `host`.
pub fn create_pair<S: AsRef<str>>(
    class_names: &[S],
    markup: &ButtonMarkup,
    host: &Element,
) -> [NavBarContainer; 2] {
    [
        NavBarContainer::new(class_names, markup, host),
        NavBarContainer::new(class_names, markup, host),
    ]
}

impl NavBarContainer {
    fn new<S: AsRef<str>>(class_names: &[S], markup: &ButtonMarkup, host: &Element) -> Self {
        let element = Element::new("div")
            .with_classes(class_names)
            .with_classes(&[CONTAINER_CLASS]);

        let back_element = markup.back.as_ref().map(|html| {
            let back = Element::new("div").with_classes(&[BACK_BUTTON_CLASS]);
            back.set_html(html);
            element.append(&back);
            back
        });

        if let Some(html) = &markup.primary {
            let buttons = Element::new("div").with_classes(&["buttons", PRIMARY_BUTTONS_CLASS]);
            buttons.set_html(html);
            element.append(&buttons);
        }

        let title_element = Element::new("h1").with_classes(&[TITLE_CLASS]);
        element.append(&title_element);

        if let Some(html) = &markup.secondary {
            let buttons =
                Element::new("div").with_classes(&["buttons", SECONDARY_BUTTONS_CLASS]);
            buttons.set_html(html);
            element.append(&buttons);
        }

        host.append(&element);

        NavBarContainer {
            id: ID_FEEDER.next(),
            element: Some(element),
            title_element: Some(title_element),
            back_element,
            title: String::new(),
            active: false,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn element(&self) -> Option<&Element> {
        self.element.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replaces the title content. Returns `false` when `text` is already
    /// shown, in which case nothing is written.
    pub fn set_title(&mut self, text: &str) -> bool {
        if self.title == text {
            return false;
        }

        if let Some(title_element) = &self.title_element {
            title_element.set_html(text);
        }
        self.title = text.to_string();

        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if let Some(element) = &self.element {
            element.toggle_class(ACTIVE_CLASS, active);
        }
    }

    pub fn set_back_button_visible(&self, visible: bool) {
        if let Some(back) = &self.back_element {
            back.toggle_class(HIDDEN_CLASS, !visible);
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.element.is_none()
    }

    /// Detaches the subtree and releases every handle.
    pub fn destroy(&mut self) {
        if let Some(element) = self.element.take() {
            element.remove();
        }
        self.title_element = None;
        self.back_element = None;
    }
}
