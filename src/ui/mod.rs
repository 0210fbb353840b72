//! Terminal user interface.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop, tick handling and terminal management
//! - `input` - Keyboard input per screen
//! - `events` - Background task results
//! - `helpers` - Task spawning, navigation, session expiry
//! - `render` - Header/status layout and screen dispatch
//! - `login`, `feed`, `create` - The three screens
//! - `status` - Status bar widget

mod create;
mod events;
mod feed;
mod helpers;
mod input;
mod login;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};
