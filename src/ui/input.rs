//! Keyboard input handling, one handler per screen.

use crate::app::{App, AppEvent, CreateField, LoginField, Route};
use crate::util::{MAX_CREDENTIAL_LENGTH, MAX_QUOTE_LENGTH};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{go_to, logout, open_selected_media, spawn_login, spawn_page_load, spawn_submit};
use super::loop_runner::Action;

/// Cards moved by PageUp/PageDown.
const PAGE_STEP: usize = 5;

const MAX_PATH_LENGTH: usize = 4096;

pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Ok(Action::Quit);
    }

    match app.route {
        Route::Login => Ok(handle_login_input(app, code, event_tx)),
        Route::Feed => handle_feed_input(app, code, event_tx).await,
        Route::Create => Ok(handle_create_input(app, code, modifiers, event_tx)),
    }
}

/// Push a typed character into a form field, dropping control characters
/// and anything past `max` characters.
fn push_char(field: &mut String, c: char, max: usize) {
    if !c.is_control() && field.chars().count() < max {
        field.push(c);
    }
}

fn handle_login_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    if app.login.submitting {
        return match code {
            KeyCode::Esc => Action::Quit,
            _ => Action::Continue,
        };
    }

    match code {
        KeyCode::Esc => return Action::Quit,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.login.toggle_focus();
        }
        KeyCode::Backspace => {
            app.login.focused_mut().pop();
        }
        KeyCode::Char(c) => {
            push_char(app.login.focused_mut(), c, MAX_CREDENTIAL_LENGTH);
        }
        KeyCode::Enter => {
            if app.login.is_complete() {
                spawn_login(app, event_tx);
            } else if app.login.username.trim().is_empty() {
                app.login.focus = LoginField::Username;
                app.login.error = Some("Username is required".to_string());
            } else {
                app.login.focus = LoginField::Otp;
                app.login.error = Some("OTP is required".to_string());
            }
        }
        _ => {}
    }
    Action::Continue
}

async fn handle_feed_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match code {
        KeyCode::Char('q') => return Ok(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(1),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(1),
        KeyCode::PageDown => app.select_next(PAGE_STEP),
        KeyCode::PageUp => app.select_prev(PAGE_STEP),
        KeyCode::Char('g') | KeyCode::Home => app.selected = 0,
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Char('n') | KeyCode::Char('c') => {
            go_to(app, Route::Create, event_tx);
        }
        KeyCode::Char('h') => {
            go_to(app, Route::Feed, event_tx);
        }
        KeyCode::Char('L') => logout(app).await,
        KeyCode::Char('r') => {
            if app.feed.retry() {
                tracing::info!(offset = app.feed.offset(), "Retrying failed page");
                spawn_page_load(app, event_tx);
            }
        }
        KeyCode::Char('o') | KeyCode::Enter => open_selected_media(app),
        _ => {}
    }
    Ok(Action::Continue)
}

fn handle_create_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if code == KeyCode::Esc {
        go_to(app, Route::Feed, event_tx);
        return Action::Continue;
    }
    if app.create.is_locked() {
        return Action::Continue;
    }

    match code {
        KeyCode::Tab | KeyCode::BackTab => app.create.toggle_focus(),
        KeyCode::Backspace => {
            app.create.focused_mut().pop();
        }
        // Alt+Enter breaks the caption onto a new line.
        KeyCode::Enter if modifiers.contains(KeyModifiers::ALT) => {
            if app.create.focus == CreateField::Text {
                push_newline(&mut app.create.text);
            }
        }
        KeyCode::Enter => spawn_submit(app, event_tx),
        KeyCode::Char(c) => {
            let max = match app.create.focus {
                CreateField::Text => MAX_QUOTE_LENGTH,
                CreateField::Image => MAX_PATH_LENGTH,
            };
            push_char(app.create.focused_mut(), c, max);
        }
        _ => {}
    }
    Action::Continue
}

fn push_newline(text: &mut String) {
    if text.chars().count() < MAX_QUOTE_LENGTH {
        text.push('\n');
    }
}
