//! Navigation vocabulary shared by the nav bar and the nav view.
//!
//! Components talk to each other and to the host application through
//! [`Event`]s. Two channels exist, mirroring how the rest of the UI loop is
//! driven:
//!
//! - the [`Hub`] is an `mpsc` sender owned by the application loop; it is
//!   used for anything that completes later (animation completion, router
//!   navigation requests, layout notifications),
//! - the [`Bus`] is a queue filled synchronously while handling a
//!   notification and drained by the caller right after.

use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;

pub mod animator;
pub mod nav_bar;
pub mod nav_view;

pub type Id = u64;
pub type Hub = Sender<Event>;
pub type Bus = VecDeque<Event>;

pub static ID_FEEDER: IdFeeder = IdFeeder::new();

/// Process-wide source of unique identifiers.
#[derive(Debug)]
pub struct IdFeeder(AtomicU64);

impl IdFeeder {
    pub const fn new() -> Self {
        IdFeeder(AtomicU64::new(1))
    }

    pub fn next(&self) -> Id {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdFeeder {
    fn default() -> Self {
        Self::new()
    }
}

/// Navigational sense used to pick the visual animation of a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Back,
    #[default]
    None,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Back => "back",
            Direction::None => "none",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown navigation direction: {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Direction::Forward),
            "back" => Ok(Direction::Back),
            "none" | "" => Ok(Direction::None),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// Identifies one started transition until its completion is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionId(Id);

impl TransitionId {
    pub fn next() -> TransitionId {
        TransitionId(ID_FEEDER.next())
    }
}

/// Per-view navigation metadata handed to the nav bar when a view enters.
///
/// Routers usually carry it as JSON state data, hence the camel-case keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewData {
    pub title: Option<String>,
    /// Transition name override; the nav bar default applies when absent.
    pub transition: Option<String>,
    pub direction: Direction,
    pub hide_back_button: bool,
    pub hide_nav_bar: bool,
}

impl ViewData {
    pub fn titled(title: &str) -> ViewData {
        ViewData {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub fn direction(mut self, direction: Direction) -> ViewData {
        self.direction = direction;
        self
    }

    pub fn from_json(json: &str) -> Result<ViewData, Error> {
        serde_json::from_str(json).context("can't parse view data")
    }
}

/// Delegate-style commands addressed to nav bars by handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavBarAction {
    SetTitle(String),
    ShowBar(bool),
    ShowBackButton(bool),
    Back,
    Enable,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// A view slot mounted a new view.
    BeforeEnter(Option<ViewData>),
    /// An animator finished the transition with the given id.
    TransitionEnd(TransitionId),
    /// Request for the external router to go to `state`.
    Navigate { state: String, direction: Direction },
    /// The nav bar `bar` was shown or hidden; parents adjust their layout.
    HeaderPresence { bar: Id, present: bool },
    /// Command for the nav bars registered under `handle` (all when `None`).
    NavBar {
        handle: Option<String>,
        action: NavBarAction,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_feeder_is_monotonic() {
        let feeder = IdFeeder::new();
        let first = feeder.next();
        let second = feeder.next();

        assert!(second > first);
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("Forward".parse::<Direction>(), Ok(Direction::Forward));
        assert_eq!(" back ".parse::<Direction>(), Ok(Direction::Back));
        assert_eq!("".parse::<Direction>(), Ok(Direction::None));
    }

    #[test]
    fn direction_rejects_unknown_values() {
        let err = "sideways".parse::<Direction>().unwrap_err();

        assert_eq!(err, ParseDirectionError("sideways".to_string()));
        assert_eq!(
            err.to_string(),
            "unknown navigation direction: \"sideways\""
        );
    }

    #[test]
    fn view_data_builder_sets_title_and_direction() {
        let data = ViewData::titled("Inbox").direction(Direction::Back);

        assert_eq!(data.title.as_deref(), Some("Inbox"));
        assert_eq!(data.direction, Direction::Back);
        assert!(!data.hide_back_button);
    }

    #[test]
    fn view_data_reads_router_state_data() -> Result<(), Error> {
        let data = ViewData::from_json(
            r#"{"title": "Compose", "hideBackButton": true, "direction": "forward"}"#,
        )?;

        assert_eq!(data.title.as_deref(), Some("Compose"));
        assert!(data.hide_back_button);
        assert!(!data.hide_nav_bar);
        assert_eq!(data.direction, Direction::Forward);
        assert!(data.transition.is_none());

        assert!(ViewData::from_json("{\"title\": 3}").is_err());
        Ok(())
    }
}
