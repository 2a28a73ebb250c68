//! Engine configuration.
//!
//! Settings are stored as TOML with kebab-case keys. Every field has a
//! default, so a partial file (or none at all) is valid:
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "debug"
//!
//! [nav-bar]
//! class-names = ["bar-header", "bar-positive"]
//! handle = "main"
//!
//! [transitions]
//! view = "slide-left-right"
//! duration-ms = 250
//! ```

use crate::helpers::{load_toml, save_toml};
use anyhow::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_NAV_BAR_TRANSITION: &str = "nav-title-slide-ios7";
pub const DEFAULT_VIEW_TRANSITION: &str = "slide-left-right";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub logging: LoggingSettings,
    pub nav_bar: NavBarSettings,
    pub transitions: TransitionSettings,
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings, Error> {
        load_toml(path)
    }

    /// Loads settings from `path`, falling back to the defaults.
    ///
    /// Logging is configured from the returned value, so failures are
    /// reported on stderr instead of through `tracing`.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Settings {
        let path = path.as_ref();
        if !path.exists() {
            return Settings::default();
        }

        match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("failed to load settings: {:#}; using defaults", e);
                Settings::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        save_toml(self, path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingSettings {
    pub enabled: bool,
    pub level: String,
    /// Number of run logs kept on disk, `0` keeps everything.
    pub max_files: usize,
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            enabled: false,
            level: "info".to_string(),
            max_files: 3,
            directory: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NavBarSettings {
    /// Classes applied to both title containers of a nav bar.
    pub class_names: Vec<String>,
    /// Delegate handle used to address the bar with `Event::NavBar`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// Title transition used when the entering view doesn't name one.
    pub transition: String,
}

impl Default for NavBarSettings {
    fn default() -> Self {
        NavBarSettings {
            class_names: vec!["bar-header".to_string()],
            handle: None,
            transition: DEFAULT_NAV_BAR_TRANSITION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransitionSettings {
    /// View transition used when the entering view doesn't name one.
    pub view: String,
    pub duration_ms: u64,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        TransitionSettings {
            view: DEFAULT_VIEW_TRANSITION.to_string(),
            duration_ms: 0,
        }
    }
}
