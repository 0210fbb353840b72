//! Infinite-scroll quote feed.
//!
//! - [`pagination`] - offset cursor, in-flight guard, exhausted/failed status
//! - [`debounce`] - trailing-edge coalescing of "load more" triggers
//! - [`sentinel`] - detects the last card entering the viewport
//! - [`loader`] - awaitable page loading for non-UI callers
//!
//! # Example
//!
//! ```ignore
//! let mut loader = FeedLoader::new(api, DEFAULT_PAGE_SIZE);
//! while let Some(PageOutcome::Appended { .. }) = loader.load_next_page(&session).await {}
//! ```

mod debounce;
mod loader;
mod pagination;
mod sentinel;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use loader::FeedLoader;
pub use pagination::{FeedState, FeedStatus, PageOutcome, PageRequest, DEFAULT_PAGE_SIZE};
pub use sentinel::SentinelObserver;
