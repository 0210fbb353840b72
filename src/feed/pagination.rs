use crate::api::{ApiError, Quote};

/// Quotes requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Whether the feed believes more quotes can be fetched.
///
/// `Exhausted` is permanent for the lifetime of a feed view. `Failed` keeps
/// the view from fetching automatically but can be re-armed with
/// [`FeedState::retry`], so a flaky network is not mistaken for the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    HasMore,
    Exhausted,
    Failed { error: String },
}

/// A page fetch that has been admitted and must be completed with
/// [`FeedState::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub offset: usize,
    pub limit: usize,
}

/// What applying a page result did to the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Full page appended; more may be available.
    Appended { count: usize },
    /// Short (or empty) page appended; the feed is exhausted.
    Exhausted { count: usize },
    /// The fetch failed; `unauthorized` means the token was rejected.
    Failed { unauthorized: bool },
    /// The result belonged to an earlier feed view and was dropped.
    Stale,
}

/// Pagination cursor plus the append-only list of loaded quotes.
///
/// Invariants:
/// - `offset` only grows, by exactly the number of quotes in each applied page
/// - at most one request is in flight
/// - once `Exhausted`, no further request is admitted
#[derive(Debug)]
pub struct FeedState {
    quotes: Vec<Quote>,
    offset: usize,
    limit: usize,
    status: FeedStatus,
    in_flight: bool,
    generation: u64,
}

impl FeedState {
    /// Start an empty feed view. `generation` tags every request it admits.
    pub fn new(limit: usize, generation: u64) -> Self {
        Self {
            quotes: Vec::new(),
            offset: 0,
            limit: limit.max(1),
            status: FeedStatus::HasMore,
            in_flight: false,
            generation,
        }
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn more_available(&self) -> bool {
        self.status == FeedStatus::HasMore
    }

    /// Admit the next page fetch if every precondition holds.
    ///
    /// Returns `None` (and changes nothing) when there is no token, a fetch
    /// is already in flight, or no more quotes are believed available.
    pub fn try_begin(&mut self, authenticated: bool) -> Option<PageRequest> {
        if !authenticated {
            tracing::debug!("Skipping page fetch: no session token");
            return None;
        }
        if self.in_flight {
            tracing::debug!(offset = self.offset, "Skipping page fetch: already in flight");
            return None;
        }
        if !self.more_available() {
            tracing::debug!(status = ?self.status, "Skipping page fetch: nothing more to load");
            return None;
        }

        self.in_flight = true;
        Some(PageRequest {
            generation: self.generation,
            offset: self.offset,
            limit: self.limit,
        })
    }

    /// Apply the result of an admitted request.
    pub fn complete(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Quote>, ApiError>,
    ) -> PageOutcome {
        if request.generation != self.generation || request.offset != self.offset {
            tracing::debug!(
                request_generation = request.generation,
                current_generation = self.generation,
                "Dropping stale page result"
            );
            return PageOutcome::Stale;
        }
        self.in_flight = false;

        match result {
            Ok(page) => {
                let count = page.len();
                self.offset += count;
                self.quotes.extend(page);
                tracing::debug!(count, offset = self.offset, total = self.quotes.len(), "Page applied");

                if count < self.limit {
                    self.status = FeedStatus::Exhausted;
                    tracing::info!(total = self.quotes.len(), "Reached end of feed");
                    PageOutcome::Exhausted { count }
                } else {
                    PageOutcome::Appended { count }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, offset = self.offset, "Error fetching quotes");
                let unauthorized = e.is_auth_failure();
                self.status = FeedStatus::Failed {
                    error: e.to_string(),
                };
                PageOutcome::Failed { unauthorized }
            }
        }
    }

    /// Release the in-flight slot when the fetch died without a result
    /// (the task panicked). The feed moves to `Failed` so it can be retried.
    pub fn abandon(&mut self, error: impl Into<String>) -> bool {
        if !self.in_flight {
            return false;
        }
        self.in_flight = false;
        self.status = FeedStatus::Failed {
            error: error.into(),
        };
        true
    }

    /// Re-arm a failed feed so the same offset can be fetched again.
    ///
    /// Has no effect on an exhausted feed. Returns true if re-armed.
    pub fn retry(&mut self) -> bool {
        if matches!(self.status, FeedStatus::Failed { .. }) {
            self.status = FeedStatus::HasMore;
            tracing::debug!(offset = self.offset, "Feed re-armed after failure");
            true
        } else {
            false
        }
    }
}
