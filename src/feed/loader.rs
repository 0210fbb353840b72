use super::pagination::{FeedState, PageOutcome};
use crate::api::ApiClient;
use crate::session::Session;

/// Direct, awaitable page loading over a [`FeedState`].
///
/// The TUI splits admission and completion across a background task; this
/// type runs both back to back for callers that can simply await.
pub struct FeedLoader {
    api: ApiClient,
    state: FeedState,
}

impl FeedLoader {
    pub fn new(api: ApiClient, limit: usize) -> Self {
        Self {
            api,
            state: FeedState::new(limit, 0),
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// Fetch the next page at the current offset.
    ///
    /// Returns `None` when no request was issued (no token, nothing more to
    /// load, or a fetch already running).
    pub async fn load_next_page(&mut self, session: &Session) -> Option<PageOutcome> {
        let token = session.token();
        let request = self.state.try_begin(token.is_some())?;
        let token = token?;

        let result = self
            .api
            .list_quotes(token, request.limit, request.offset)
            .await;
        Some(self.state.complete(request, result))
    }

    /// Re-arm after a failed page. See [`FeedState::retry`].
    pub fn retry(&mut self) -> bool {
        self.state.retry()
    }
}
