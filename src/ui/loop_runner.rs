//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background task events, Unix signals and a
//! periodic tick that drives the "load more" debouncer.

use crate::app::{App, AppEvent, Route};
use anyhow::Result;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::helpers::{go_to, spawn_page_load};
use super::input::handle_input;
use super::render::render;

/// Tick period; also the resolution of the debouncer.
const TICK: Duration = Duration::from_millis(250);

/// Number of frames in the loading spinner animation.
pub(super) const SPINNER_FRAMES: usize = 10;

/// Result of handling a key press.
pub enum Action {
    Continue,
    Quit,
}

/// Runs the TUI until the user quits or a termination signal arrives.
///
/// Enters `app.route` first (so a restored session starts loading the feed
/// right away). Installs a panic hook that restores the terminal before
/// unwinding.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(TICK);

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    let initial = app.route;
    go_to(app, initial, &event_tx);
    tracing::info!(route = app.route.path(), "Event loop started");

    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
            app.observe_viewport();
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Drain pending task results before waiting on more input.
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_app_event(app, event, &event_tx).await;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        app.needs_redraw = true;
                        match handle_input(app, key.code, key.modifiers, &event_tx).await {
                            Ok(Action::Quit) => break,
                            Ok(Action::Continue) => {}
                            Err(e) => app.set_status(format!("Error: {e}")),
                        }
                    }
                    Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => break,
                    _ => {}
                }
            }

            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_app_event(app, event, &event_tx).await;
            }

            _ = tick_interval.tick() => {
                handle_tick(app, &event_tx);
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Periodic work: fire the debounced page load, animate the spinner, and
/// leave the create screen once its success message has been shown.
pub(super) fn handle_tick(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.debouncer.fire_if_due() && app.route == Route::Feed && spawn_page_load(app, event_tx) {
        app.needs_redraw = true;
    }

    let busy = app.feed.is_loading() || app.login.submitting || app.create.submitting;
    if busy {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
        app.needs_redraw = true;
    }

    if app.route == Route::Create && app.create.redirect_due() {
        go_to(app, Route::Feed, event_tx);
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Quote;
    use crate::app::tests::test_app;
    use tokio::time;

    fn quotes(n: usize) -> Vec<Quote> {
        (0..n)
            .map(|i| Quote {
                id: i.to_string(),
                text: String::new(),
                media_url: None,
                username: None,
                created_at: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_tick_fires_debounced_load_once() {
        let mut app = test_app(true).await;
        app.navigate(Route::Feed);
        let req = app.feed.try_begin(true).unwrap();
        app.feed.complete(req, Ok(quotes(20)));
        let (tx, _rx) = mpsc::channel(4);

        time::pause();
        for _ in 0..5 {
            app.debouncer.trigger();
            time::advance(Duration::from_millis(200)).await;
            handle_tick(&mut app, &tx);
        }
        assert!(!app.feed.is_loading());

        time::advance(app.debouncer.delay()).await;
        handle_tick(&mut app, &tx);
        assert!(app.feed.is_loading());
        assert_eq!(app.feed.offset(), 20);
    }

    #[tokio::test]
    async fn test_tick_leaves_create_after_success() {
        let mut app = test_app(true).await;
        app.navigate(Route::Create);
        let (tx, _rx) = mpsc::channel(4);

        time::pause();
        app.create.succeeded_at = Some(time::Instant::now());
        handle_tick(&mut app, &tx);
        assert_eq!(app.route, Route::Create);

        time::advance(crate::app::CREATE_REDIRECT_DELAY).await;
        handle_tick(&mut app, &tx);
        assert_eq!(app.route, Route::Feed);
    }
}
