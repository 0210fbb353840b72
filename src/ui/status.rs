use crate::app::{App, Route};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar: the current message, else key hints for the screen.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.route {
            Route::Login => Cow::Borrowed("[Tab]switch field [Enter]log in [Esc]quit"),
            Route::Feed => Cow::Borrowed(
                "[j/k]move [o]pen image [n]ew quote [r]etry [L]ogout [q]uit",
            ),
            Route::Create => Cow::Borrowed(
                "[Tab]switch field [Alt+Enter]new line [Enter]submit [Esc]back",
            ),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
