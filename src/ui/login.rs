use crate::app::{App, LoginField};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::render::spinner;

const FORM_WIDTH: u16 = 44;
const FORM_HEIGHT: u16 = 11;

/// Render the centered login form.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let width = FORM_WIDTH.min(area.width);
    let height = FORM_HEIGHT.min(area.height);
    let form = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    if form.width < 10 || form.height < 5 {
        return;
    }

    f.render_widget(Clear, form);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Login ");
    let inner = block.inner(form);
    f.render_widget(block, form);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let form_state = &app.login;
    let masked = "•".repeat(form_state.otp.chars().count());
    render_field(
        f,
        rows[0],
        "Username",
        &form_state.username,
        form_state.focus == LoginField::Username,
    );
    render_field(f, rows[1], "OTP", &masked, form_state.focus == LoginField::Otp);

    let footer = if form_state.submitting {
        Line::from(format!("{} Logging in...", spinner(app)))
    } else if let Some(error) = &form_state.error {
        Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red)))
    } else {
        Line::from(Span::styled(
            "Press Enter to log in",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(
        Paragraph::new(footer)
            .alignment(Alignment::Center)
            .wrap(ratatui::widgets::Wrap { trim: true }),
        rows[2],
    );
}

/// One bordered text input. The focused field shows a cursor mark.
pub(super) fn render_field(f: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if focused { "_" } else { "" };

    // Keep the tail visible when the value is wider than the box.
    let room = area.width.saturating_sub(3) as usize;
    let shown: String = {
        let chars: Vec<char> = value.chars().collect();
        let skip = chars.len().saturating_sub(room);
        chars[skip..].iter().collect()
    };

    let paragraph = Paragraph::new(Line::from(vec![
        Span::raw(shown),
        Span::styled(cursor, Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {label} ")),
    );
    f.render_widget(paragraph, area);
}
