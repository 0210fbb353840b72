//! Render dispatch: header bar, the active screen, status bar.

use crate::app::{App, Route};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{create, feed, login, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub(super) fn spinner(app: &App) -> char {
    SPINNER[app.spinner_frame % SPINNER.len()]
}

pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        // Nothing is on screen, so the sentinel is not visible either.
        app.last_visible = None;
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.route {
        Route::Login => login::render(f, app, chunks[1]),
        Route::Feed => feed::render(f, app, chunks[1]),
        Route::Create => create::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);
}

/// Title on the left; when signed in, the navigation hints on the right.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let style = Style::default().bg(Color::Blue).fg(Color::White);
    let title = Span::styled(" QuoteApp ", style.add_modifier(Modifier::BOLD));

    let mut spans = vec![title];
    if app.session.is_authenticated() {
        let active = |route: Route| {
            if app.route == route {
                style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
            } else {
                style
            }
        };
        spans.push(Span::styled("  ", style));
        spans.push(Span::styled("[h] Home", active(Route::Feed)));
        spans.push(Span::styled("  ", style));
        spans.push(Span::styled("[n] Create Quote", active(Route::Create)));
        spans.push(Span::styled("  ", style));
        spans.push(Span::styled("[L] Logout", style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).style(style), area);
}
