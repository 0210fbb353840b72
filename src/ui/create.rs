use crate::app::{App, CreateField};
use crate::compose::{expand_home, image_mime};
use crate::util::wrap_to_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::login::render_field;
use super::render::spinner;

/// Render the create form (left) and a preview of the card (right).
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_form(f, app, columns[0]);
    render_preview(f, app, columns[1]);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Create Quote ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(inner);

    let form = &app.create;
    let text_focused = form.focus == CreateField::Text;
    let border = if text_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let mut caption = form.text.clone();
    if text_focused && !form.is_locked() {
        caption.push('_');
    }
    f.render_widget(
        Paragraph::new(caption)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(" Quote text "),
            ),
        rows[0],
    );

    render_field(
        f,
        rows[1],
        "Image file",
        &form.image_path,
        form.focus == CreateField::Image && !form.is_locked(),
    );

    let footer = if form.submitting {
        Line::from(format!("{} Uploading and creating...", spinner(app)))
    } else if form.succeeded_at.is_some() {
        Line::from(Span::styled(
            crate::app::QUOTE_CREATED_MESSAGE,
            Style::default().fg(Color::Green),
        ))
    } else if let Some(error) = &form.error {
        Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red)))
    } else {
        Line::from(Span::styled(
            "Enter to submit",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(Paragraph::new(footer).wrap(Wrap { trim: true }), rows[2]);
}

/// The terminal cannot show the image itself, so the preview names the file
/// and its type under the caption.
fn render_preview(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Preview ");
    let inner = block.inner(area);
    let width = inner.width.max(1) as usize;

    let mut lines: Vec<Line> = Vec::new();
    let path = app.create.image_path.trim();
    if path.is_empty() {
        lines.push(Line::from(Span::styled(
            "[ no image selected ]",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let path = expand_home(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let kind = image_mime(&path).unwrap_or("not an image");
        lines.push(Line::from(Span::styled(
            format!("[ {name} ]"),
            Style::default().fg(Color::Blue),
        )));
        lines.push(Line::from(Span::styled(
            kind,
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    for line in wrap_to_width(&app.create.text, width) {
        lines.push(Line::from(Span::styled(
            line,
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}
