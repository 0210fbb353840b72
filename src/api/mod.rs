//! Client for the remote quotes service.
//!
//! - [`ApiClient`] issues the four REST calls (login, list, create, upload)
//! - [`Quote`] is the immutable card model shared with the feed and UI
//!
//! The service owns authentication, storage, pagination and media hosting;
//! this module only shapes requests and decodes responses.

mod client;
mod types;

pub use client::{ApiClient, ApiError};
pub use types::{format_date, MediaUpload, Quote};
