//! Retained element tree mutated by the navigation engine.
//!
//! The engine never renders anything itself. It manipulates lightweight
//! element handles (classes, data attributes, markup content and child
//! lists) and a host renderer mirrors them. Handles are reference counted,
//! so cloning an [`Element`] yields another handle to the same node.
//!
//! Every effective mutation bumps the revision of the node and of all its
//! ancestors, which gives callers a cheap way to tell whether a subtree was
//! touched at all.
//!
//! ```
//! use navdeck_core::element::Element;
//!
//! let host = Element::new("nav-bar");
//! let block = Element::new("div");
//! host.append(&block);
//!
//! let before = host.revision();
//! block.add_class("nav-bar-active");
//! assert!(host.revision() > before);
//! ```

use crate::view::{Id, ID_FEEDER};
use fxhash::FxHashMap;
use indexmap::IndexSet;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug)]
struct Node {
    id: Id,
    tag: String,
    classes: IndexSet<String>,
    attributes: FxHashMap<String, String>,
    html: String,
    children: Vec<Element>,
    parent: Weak<RefCell<Node>>,
    revision: u64,
}

/// Shared handle to a node of the element tree.
#[derive(Debug, Clone)]
pub struct Element(Rc<RefCell<Node>>);

impl Element {
    pub fn new(tag: &str) -> Element {
        Element(Rc::new(RefCell::new(Node {
            id: ID_FEEDER.next(),
            tag: tag.to_string(),
            classes: IndexSet::new(),
            attributes: FxHashMap::default(),
            html: String::new(),
            children: Vec::new(),
            parent: Weak::new(),
            revision: 0,
        })))
    }

    /// Builder-style helper that adds every class in `classes`.
    pub fn with_classes<S: AsRef<str>>(self, classes: &[S]) -> Element {
        for class in classes {
            self.add_class(class.as_ref());
        }
        self
    }

    pub fn id(&self) -> Id {
        self.0.borrow().id
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    /// Returns `true` if both handles point to the same node.
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.contains(class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.0.borrow().classes.iter().cloned().collect()
    }

    pub fn add_class(&self, class: &str) {
        if class.is_empty() || self.has_class(class) {
            return;
        }

        self.0.borrow_mut().classes.insert(class.to_string());
        self.touch();
    }

    pub fn remove_class(&self, class: &str) {
        if !self.has_class(class) {
            return;
        }

        self.0.borrow_mut().classes.shift_remove(class);
        self.touch();
    }

    /// Adds `class` when `on` is true, removes it otherwise.
    pub fn toggle_class(&self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        if self.attribute(name).as_deref() == Some(value) {
            return;
        }

        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
        self.touch();
    }

    pub fn remove_attribute(&self, name: &str) {
        if self.0.borrow_mut().attributes.remove(name).is_some() {
            self.touch();
        }
    }

    pub fn html(&self) -> String {
        self.0.borrow().html.clone()
    }

    pub fn set_html(&self, html: &str) {
        if self.0.borrow().html == html {
            return;
        }

        self.0.borrow_mut().html = html.to_string();
        self.touch();
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.borrow().children.clone()
    }

    pub fn parent(&self) -> Option<Element> {
        self.0.borrow().parent.upgrade().map(Element)
    }

    /// Appends `child` as the last child, detaching it from its previous parent.
    pub fn append(&self, child: &Element) {
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
        self.touch();
    }

    /// Detaches the node from its parent. Detached nodes are left untouched.
    pub fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };

        parent
            .0
            .borrow_mut()
            .children
            .retain(|child| !child.ptr_eq(self));
        self.0.borrow_mut().parent = Weak::new();
        parent.touch();
    }

    /// Depth-first search for the first descendant carrying `class`.
    pub fn find_by_class(&self, class: &str) -> Option<Element> {
        for child in self.children() {
            if child.has_class(class) {
                return Some(child);
            }

            if let Some(found) = child.find_by_class(class) {
                return Some(found);
            }
        }

        None
    }

    /// Monotonic counter of effective mutations on this node or its descendants.
    pub fn revision(&self) -> u64 {
        self.0.borrow().revision
    }

    fn touch(&self) {
        let mut current = Some(self.clone());
        while let Some(element) = current {
            element.0.borrow_mut().revision += 1;
            current = element.parent();
        }
    }
}
