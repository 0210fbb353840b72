use crate::api::{ApiClient, ApiError, Quote};
use crate::compose::{expand_home, ComposeError, QuoteDraft};
use crate::config::Config;
use crate::feed::{Debouncer, FeedState, PageRequest, SentinelObserver};
use crate::session::Session;
use ratatui::widgets::ListState;
use secrecy::SecretString;
use std::borrow::Cow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How long a status bar message stays up.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Delay between a successful create and the return to the feed.
pub const CREATE_REDIRECT_DELAY: Duration = Duration::from_secs(2);

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials and try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const QUOTE_CREATED_MESSAGE: &str = "Quote created successfully!";

// ============================================================================
// Routes
// ============================================================================

/// Screens of the client. `Feed` and `Create` need a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Feed,
    Create,
}

impl Route {
    pub fn is_protected(self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Path-style name, used in logs.
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Feed => "/",
            Route::Create => "/create",
        }
    }
}

// ============================================================================
// Forms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Otp,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub otp: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginForm {
    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Otp => &mut self.otp,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Otp,
            LoginField::Otp => LoginField::Username,
        };
    }

    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.otp.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateField {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Default)]
pub struct CreateForm {
    pub text: String,
    pub image_path: String,
    pub focus: CreateField,
    pub error: Option<String>,
    pub submitting: bool,
    /// Set when the quote was created; the view returns to the feed
    /// [`CREATE_REDIRECT_DELAY`] later.
    pub succeeded_at: Option<Instant>,
}

impl CreateForm {
    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            CreateField::Text => &mut self.text,
            CreateField::Image => &mut self.image_path,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            CreateField::Text => CreateField::Image,
            CreateField::Image => CreateField::Text,
        };
    }

    pub fn draft(&self) -> QuoteDraft {
        let image = self.image_path.trim();
        QuoteDraft {
            text: self.text.clone(),
            image: (!image.is_empty()).then(|| expand_home(image)),
        }
    }

    /// Accepts no input while a submit is running or after success.
    pub fn is_locked(&self) -> bool {
        self.submitting || self.succeeded_at.is_some()
    }

    pub fn redirect_due(&self) -> bool {
        self.succeeded_at
            .is_some_and(|at| at.elapsed() >= CREATE_REDIRECT_DELAY)
    }
}

// ============================================================================
// Background Events
// ============================================================================

/// Results reported by background tasks to the event loop.
pub enum AppEvent {
    LoginCompleted {
        result: Result<SecretString, ApiError>,
    },
    /// A page fetch finished. `request` carries the generation it was
    /// admitted under so results for a feed view that is gone are dropped.
    PageLoaded {
        request: PageRequest,
        result: Result<Vec<Quote>, ApiError>,
    },
    /// The create flow finished. `generation` is the create form it was
    /// submitted from; a form opened since then never sees the result.
    QuoteSubmitted {
        generation: u64,
        result: Result<Option<Quote>, ComposeError>,
    },
    /// A background task panicked.
    ///
    /// - `task`: which task (`"login"`, `"page_load"`, `"submit"`)
    /// - `error`: the panic message
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub api: ApiClient,
    pub session: Session,
    pub config: Config,

    pub route: Route,
    pub login: LoginForm,
    pub create: CreateForm,
    /// Bumped each time the create form is opened; tags submits.
    pub create_generation: u64,

    // Feed view
    pub feed: FeedState,
    /// Bumped each time the feed view is entered; tags page requests.
    pub feed_generation: u64,
    pub debouncer: Debouncer,
    pub sentinel: SentinelObserver,
    pub selected: usize,
    pub list_state: ListState,
    /// Index of the last card the latest render put on screen.
    pub last_visible: Option<usize>,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,

    pub login_handle: Option<JoinHandle<()>>,
    pub page_handle: Option<JoinHandle<()>>,
    pub submit_handle: Option<JoinHandle<()>>,
}

impl App {
    /// Start on the feed when a session was restored, else on the login screen.
    ///
    /// The feed is not loaded here; the event loop enters the initial route.
    pub fn new(api: ApiClient, session: Session, config: Config) -> Self {
        let route = if session.is_authenticated() {
            Route::Feed
        } else {
            Route::Login
        };
        let debouncer = Debouncer::new(config.debounce());
        let feed = FeedState::new(config.page_size, 0);

        Self {
            api,
            session,
            config,
            route,
            login: LoginForm::default(),
            create: CreateForm::default(),
            create_generation: 0,
            feed,
            feed_generation: 0,
            debouncer,
            sentinel: SentinelObserver::new(),
            selected: 0,
            list_state: ListState::default(),
            last_visible: None,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            login_handle: None,
            page_handle: None,
            submit_handle: None,
        }
    }

    /// Switch screens, redirecting protected routes to `Login` when there is
    /// no session. Returns the route actually entered.
    ///
    /// Entering `Feed` always starts a fresh feed view; the caller is
    /// responsible for kicking off its first page.
    pub fn navigate(&mut self, requested: Route) -> Route {
        let route = if requested.is_protected() && !self.session.is_authenticated() {
            tracing::info!(requested = requested.path(), "Redirecting to login: no session");
            Route::Login
        } else {
            requested
        };

        tracing::debug!(from = self.route.path(), to = route.path(), "Navigating");
        self.route = route;
        self.needs_redraw = true;

        match route {
            Route::Feed => self.reset_feed(),
            Route::Create => {
                self.create_generation = self.create_generation.wrapping_add(1);
                self.create = CreateForm::default();
            }
            Route::Login => {
                self.login.submitting = false;
                self.login.otp.clear();
            }
        }
        route
    }

    /// Discard the current feed view and start a new one at offset 0.
    pub fn reset_feed(&mut self) {
        self.feed_generation = self.feed_generation.wrapping_add(1);
        self.feed = FeedState::new(self.config.page_size, self.feed_generation);
        self.debouncer.cancel();
        self.sentinel.reset();
        self.selected = 0;
        self.list_state = ListState::default();
        self.last_visible = None;
    }

    pub fn selected_quote(&self) -> Option<&Quote> {
        self.feed.quotes().get(self.selected)
    }

    pub fn select_next(&mut self, step: usize) {
        let len = self.feed.quotes().len();
        if len > 0 {
            self.selected = (self.selected + step).min(len - 1);
        }
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selected = self.selected.saturating_sub(step);
    }

    pub fn select_last(&mut self) {
        self.selected = self.feed.quotes().len().saturating_sub(1);
    }

    /// Report what the last render showed; schedules a debounced "load more"
    /// when the last card has just come into view.
    pub fn observe_viewport(&mut self) {
        if self.route != Route::Feed {
            return;
        }
        let sentinel = self.feed.quotes().len().checked_sub(1);
        let visible = matches!(
            (sentinel, self.last_visible),
            (Some(last), Some(shown)) if shown >= last
        );
        if self.sentinel.observe(sentinel, visible) && self.feed.more_available() {
            tracing::debug!(sentinel = ?sentinel, "Sentinel visible, scheduling load");
            self.debouncer.trigger();
        }
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once it is older than [`STATUS_TTL`].
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

impl Drop for App {
    fn drop(&mut self) {
        for handle in [
            self.login_handle.take(),
            self.page_handle.take(),
            self.submit_handle.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
        tracing::debug!("Aborted background tasks on App drop");
    }
}
