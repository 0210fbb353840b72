//! quotedeck: a terminal client for an image-quotes service.
//!
//! Log in with a username and OTP, scroll an infinitely paginated feed of
//! quote cards, and post new quotes by uploading an image with a caption.

pub mod api;
pub mod app;
pub mod compose;
pub mod config;
pub mod feed;
pub mod session;
pub mod storage;
pub mod ui;
pub mod util;
