//! Helpers shared by input and event handling: route changes, background
//! task spawning, session expiry.

use crate::app::{App, AppEvent, Route, SESSION_EXPIRED_MESSAGE};
use crate::compose;
use crate::util::validate_url_for_open;
use futures::FutureExt;
use secrecy::{ExposeSecret, SecretString};
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// A panicking background task would otherwise vanish without a result and
/// leave its in-flight flag set forever.
///
/// ```ignore
/// match catch_task_panic(async { do_work().await }).await {
///     Ok(result) => send(result),
///     Err(panic_msg) => send(AppEvent::TaskPanicked { task: "work", error: panic_msg }),
/// }
/// ```
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent, task: &'static str) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(task, error = %e, "Failed to send task result (receiver dropped)");
    }
}

/// Owned copy of the session token for a spawned task.
fn owned_token(app: &App) -> Option<SecretString> {
    app.session
        .token()
        .map(|t| SecretString::from(t.expose_secret().to_owned()))
}

/// Navigate and, when the feed view was entered, load its first page.
pub(super) fn go_to(app: &mut App, route: Route, event_tx: &mpsc::Sender<AppEvent>) -> Route {
    let entered = app.navigate(route);
    if entered == Route::Feed {
        spawn_page_load(app, event_tx);
    }
    entered
}

/// Spawn a login request for the credentials in the login form.
pub(super) fn spawn_login(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.login.submitting {
        return;
    }
    app.login.submitting = true;
    app.login.error = None;

    let api = app.api.clone();
    let username = app.login.username.trim().to_string();
    let otp = app.login.otp.trim().to_string();
    let tx = event_tx.clone();

    tracing::info!(username = %username, "Submitting login");

    app.login_handle = Some(tokio::spawn(async move {
        let event = match catch_task_panic(api.login(&username, &otp)).await {
            Ok(result) => AppEvent::LoginCompleted { result },
            Err(error) => {
                tracing::error!(error = %error, "Login task panicked");
                AppEvent::TaskPanicked {
                    task: "login",
                    error,
                }
            }
        };
        send_event(&tx, event, "login").await;
    }));
}

/// Spawn a fetch of the next feed page if the feed admits one.
///
/// Returns false when nothing was spawned (no session, a fetch already
/// running, or nothing more to load).
pub(super) fn spawn_page_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) -> bool {
    let token = owned_token(app);
    let Some(request) = app.feed.try_begin(token.is_some()) else {
        return false;
    };
    let Some(token) = token else {
        return false;
    };

    let api = app.api.clone();
    let tx = event_tx.clone();
    tracing::debug!(
        offset = request.offset,
        limit = request.limit,
        generation = request.generation,
        "Spawning page load"
    );

    // Not aborted on navigation; a late result is dropped by its generation.
    app.page_handle = Some(tokio::spawn(async move {
        let fetch = api.list_quotes(&token, request.limit, request.offset);
        let event = match catch_task_panic(fetch).await {
            Ok(result) => AppEvent::PageLoaded { request, result },
            Err(error) => {
                tracing::error!(error = %error, "Page load task panicked");
                AppEvent::TaskPanicked {
                    task: "page_load",
                    error,
                }
            }
        };
        send_event(&tx, event, "page_load").await;
    }));
    true
}

/// Spawn the upload-then-create flow for the create form's draft.
pub(super) fn spawn_submit(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.create.is_locked() {
        return;
    }
    app.create.submitting = true;
    app.create.error = None;

    let api = app.api.clone();
    let token = owned_token(app);
    let draft = app.create.draft();
    let generation = app.create_generation;
    let tx = event_tx.clone();

    app.submit_handle = Some(tokio::spawn(async move {
        let flow = compose::submit(&api, token.as_ref(), &draft);
        let event = match catch_task_panic(flow).await {
            Ok(result) => AppEvent::QuoteSubmitted { generation, result },
            Err(error) => {
                tracing::error!(error = %error, "Submit task panicked");
                AppEvent::TaskPanicked {
                    task: "submit",
                    error,
                }
            }
        };
        send_event(&tx, event, "submit").await;
    }));
}

/// Clear the session and return to the login screen.
pub(super) async fn logout(app: &mut App) {
    if let Err(e) = app.session.logout().await {
        tracing::error!(error = %e, "Failed to clear persisted session");
        app.set_status("Logged out, but the saved session could not be removed");
    } else {
        app.set_status("Logged out");
    }
    app.navigate(Route::Login);
}

/// The service rejected the token: drop it and ask for a new login.
pub(super) async fn expire_session(app: &mut App) {
    tracing::warn!(route = app.route.path(), "Session rejected by server");
    if let Err(e) = app.session.logout().await {
        tracing::error!(error = %e, "Failed to clear persisted session");
    }
    app.navigate(Route::Login);
    app.login.error = Some(SESSION_EXPIRED_MESSAGE.to_string());
}

/// Open the selected quote's media in the system browser.
pub(super) fn open_selected_media(app: &mut App) {
    let Some(quote) = app.selected_quote() else {
        return;
    };
    let Some(raw) = quote.media_url.clone().filter(|u| !u.trim().is_empty()) else {
        app.set_status("This quote has no image");
        return;
    };

    match validate_url_for_open(&raw) {
        Err(e) => app.set_status(e.to_string()),
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                app.set_status(format!("Failed to open browser: {e}"));
            } else {
                app.set_status("Opening image...");
            }
        }
    }
}
