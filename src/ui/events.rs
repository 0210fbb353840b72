//! Application event handling.
//!
//! Applies the results of background tasks (login, page loads, quote
//! submission) to the application state.

use crate::app::{App, AppEvent, Route, LOGIN_FAILED_MESSAGE, QUOTE_CREATED_MESSAGE};
use crate::feed::{FeedStatus, PageOutcome};
use tokio::sync::mpsc;

use super::helpers::{expire_session, go_to};

pub(super) async fn handle_app_event(
    app: &mut App,
    event: AppEvent,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match event {
        AppEvent::LoginCompleted { result } => {
            app.login.submitting = false;
            match result {
                Ok(token) => {
                    if let Err(e) = app.session.login(token).await {
                        tracing::error!(error = %e, "Session will not survive a restart");
                        app.set_status("Logged in, but the session could not be saved");
                    }
                    app.login = Default::default();
                    go_to(app, Route::Feed, event_tx);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Login failed");
                    app.login.error = Some(LOGIN_FAILED_MESSAGE.to_string());
                }
            }
        }

        AppEvent::PageLoaded { request, result } => match app.feed.complete(request, result) {
            PageOutcome::Failed { unauthorized: true } => {
                expire_session(app).await;
            }
            PageOutcome::Failed { .. } => {
                app.set_status("Failed to load quotes. Press r to retry.");
            }
            PageOutcome::Appended { .. } | PageOutcome::Exhausted { .. } | PageOutcome::Stale => {}
        },

        AppEvent::QuoteSubmitted { generation, result } => {
            if generation != app.create_generation || app.route != Route::Create {
                tracing::debug!(
                    generation,
                    current = app.create_generation,
                    "Quote submission finished after leaving its create form"
                );
                match result {
                    Ok(_) => app.set_status(QUOTE_CREATED_MESSAGE),
                    Err(e) if e.is_auth_failure() => expire_session(app).await,
                    Err(e) => {
                        tracing::warn!(error = %e, "Dropped result of an abandoned quote submission")
                    }
                }
                return;
            }

            app.create.submitting = false;
            match result {
                Ok(_) => {
                    app.create.succeeded_at = Some(tokio::time::Instant::now());
                    app.create.error = None;
                    app.set_status(QUOTE_CREATED_MESSAGE);
                }
                Err(e) if e.is_auth_failure() => {
                    tracing::warn!(error = %e, "Quote submission rejected");
                    expire_session(app).await;
                }
                Err(e) => {
                    if e.is_validation() {
                        tracing::debug!(error = %e, "Quote draft rejected");
                    } else {
                        tracing::error!(error = %e, "Failed to create quote");
                    }
                    app.create.error = Some(e.user_message());
                }
            }
        }

        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            match task {
                "login" => {
                    app.login.submitting = false;
                    app.login.error = Some(LOGIN_FAILED_MESSAGE.to_string());
                }
                "page_load" => {
                    app.feed.abandon(error.clone());
                }
                "submit" => {
                    app.create.submitting = false;
                    app.create.error = Some(crate::compose::CREATE_FAILED_MESSAGE.to_string());
                }
                _ => {}
            }
            app.set_status(format!("Internal error in {task}: {error}"));
        }
    }

    if matches!(app.feed.status(), FeedStatus::Failed { .. }) {
        app.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Quote};
    use crate::app::tests::test_app;
    use crate::compose::ComposeError;
    use secrecy::SecretString;

    fn quotes(n: usize) -> Vec<Quote> {
        (0..n)
            .map(|i| Quote {
                id: i.to_string(),
                text: format!("q{i}"),
                media_url: None,
                username: Some("ana".to_string()),
                created_at: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_page_loaded_appends() {
        let mut app = test_app(true).await;
        app.navigate(Route::Feed);
        let (tx, _rx) = mpsc::channel(4);
        let request = app.feed.try_begin(true).unwrap();

        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                request,
                result: Ok(quotes(20)),
            },
            &tx,
        )
        .await;
        assert_eq!(app.feed.quotes().len(), 20);
        assert!(app.feed.more_available());
    }

    #[tokio::test]
    async fn test_unauthorized_page_logs_out() {
        let mut app = test_app(true).await;
        app.navigate(Route::Feed);
        let (tx, _rx) = mpsc::channel(4);
        let request = app.feed.try_begin(true).unwrap();

        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                request,
                result: Err(ApiError::Unauthorized(401)),
            },
            &tx,
        )
        .await;
        assert_eq!(app.route, Route::Login);
        assert!(!app.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_failure_shows_message() {
        let mut app = test_app(false).await;
        app.login.submitting = true;
        let (tx, _rx) = mpsc::channel(4);

        handle_app_event(
            &mut app,
            AppEvent::LoginCompleted {
                result: Err(ApiError::HttpStatus(400)),
            },
            &tx,
        )
        .await;
        assert!(!app.login.submitting);
        assert_eq!(app.login.error.as_deref(), Some(LOGIN_FAILED_MESSAGE));
        assert_eq!(app.route, Route::Login);
    }

    #[tokio::test]
    async fn test_login_success_enters_feed() {
        let mut app = test_app(false).await;
        let (tx, _rx) = mpsc::channel(4);

        handle_app_event(
            &mut app,
            AppEvent::LoginCompleted {
                result: Ok(SecretString::from("fresh".to_string())),
            },
            &tx,
        )
        .await;
        assert!(app.session.is_authenticated());
        assert_eq!(app.route, Route::Feed);
        assert!(app.feed.is_loading());
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_form() {
        let mut app = test_app(true).await;
        app.navigate(Route::Create);
        app.create.text = "keep me".to_string();
        app.create.submitting = true;
        let generation = app.create_generation;
        let (tx, _rx) = mpsc::channel(4);

        handle_app_event(
            &mut app,
            AppEvent::QuoteSubmitted {
                generation,
                result: Err(ComposeError::Upload(ApiError::HttpStatus(500))),
            },
            &tx,
        )
        .await;
        assert_eq!(app.create.text, "keep me");
        assert_eq!(
            app.create.error.as_deref(),
            Some(crate::compose::CREATE_FAILED_MESSAGE)
        );
        assert!(app.create.succeeded_at.is_none());
    }

    #[tokio::test]
    async fn test_submit_success_schedules_redirect() {
        let mut app = test_app(true).await;
        app.navigate(Route::Create);
        let (tx, _rx) = mpsc::channel(4);

        let generation = app.create_generation;
        handle_app_event(
            &mut app,
            AppEvent::QuoteSubmitted {
                generation,
                result: Ok(None),
            },
            &tx,
        )
        .await;
        assert!(app.create.succeeded_at.is_some());
        assert_eq!(
            app.status_message.as_ref().map(|(m, _)| m.as_ref()),
            Some(QUOTE_CREATED_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_late_submit_success_leaves_reopened_form_alone() {
        let mut app = test_app(true).await;
        app.navigate(Route::Create);
        let first = app.create_generation;
        app.create.submitting = true;

        app.navigate(Route::Feed);
        app.navigate(Route::Create);
        app.create.text = "second draft".to_string();
        let (tx, _rx) = mpsc::channel(4);

        handle_app_event(
            &mut app,
            AppEvent::QuoteSubmitted {
                generation: first,
                result: Ok(None),
            },
            &tx,
        )
        .await;

        assert_eq!(app.route, Route::Create);
        assert_eq!(app.create.text, "second draft");
        assert!(!app.create.is_locked());
        assert!(app.create.succeeded_at.is_none());
        assert_eq!(
            app.status_message.as_ref().map(|(m, _)| m.as_ref()),
            Some(QUOTE_CREATED_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_late_submit_failure_does_not_touch_new_submit() {
        let mut app = test_app(true).await;
        app.navigate(Route::Create);
        let first = app.create_generation;

        app.navigate(Route::Feed);
        app.navigate(Route::Create);
        app.create.text = "second draft".to_string();
        app.create.submitting = true;
        let (tx, _rx) = mpsc::channel(4);

        handle_app_event(
            &mut app,
            AppEvent::QuoteSubmitted {
                generation: first,
                result: Err(ComposeError::Create(ApiError::HttpStatus(502))),
            },
            &tx,
        )
        .await;

        assert!(app.create.submitting);
        assert!(app.create.error.is_none());
        assert_eq!(app.create.text, "second draft");
    }

    #[tokio::test]
    async fn test_submit_result_after_leaving_create_is_dropped() {
        let mut app = test_app(true).await;
        app.navigate(Route::Create);
        let generation = app.create_generation;
        app.create.submitting = true;
        app.navigate(Route::Feed);
        let (tx, _rx) = mpsc::channel(4);

        handle_app_event(
            &mut app,
            AppEvent::QuoteSubmitted {
                generation,
                result: Ok(None),
            },
            &tx,
        )
        .await;

        assert_eq!(app.route, Route::Feed);
        assert!(app.create.succeeded_at.is_none());
    }

    #[tokio::test]
    async fn test_page_task_panic_releases_feed() {
        let mut app = test_app(true).await;
        app.navigate(Route::Feed);
        let (tx, _rx) = mpsc::channel(4);
        let _request = app.feed.try_begin(true).unwrap();

        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: "page_load",
                error: "boom".to_string(),
            },
            &tx,
        )
        .await;
        assert!(!app.feed.is_loading());
        assert!(app.feed.retry());
    }
}
