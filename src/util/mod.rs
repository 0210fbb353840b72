//! Small helpers shared by the views.
//!
//! - **Text**: Unicode-aware width, truncation, wrapping and control-char
//!   stripping for server-provided quote text
//! - **Links**: validation of media URLs before opening them externally
//!
//! ```
//! use quotedeck::util::{display_width, truncate_to_width};
//!
//! assert_eq!(display_width("Hello 世界"), 10);
//! assert_eq!(truncate_to_width("A long caption", 9), "A long...");
//! ```

mod links;
mod text;

pub use links::{validate_url_for_open, LinkError};
pub use text::{display_width, strip_control_chars, truncate_to_width, wrap_to_width};

/// Longest username/OTP accepted by the login form.
pub const MAX_CREDENTIAL_LENGTH: usize = 128;

/// Longest caption accepted by the create form.
pub const MAX_QUOTE_LENGTH: usize = 2000;
