//! Navigation engine for hybrid mobile apps.
//!
//! A [`NavViewCoordinator`](view::nav_view::NavViewCoordinator) mounts the
//! views resolved by an external router into nested view slots and drives
//! their transitions. A [`NavBarController`](view::nav_bar::NavBarController)
//! keeps the header bar in sync, animating title changes between two
//! pre-built containers.

pub mod element;
pub mod helpers;
pub mod logging;
pub mod settings;
pub mod view;
