use crate::api::Quote;
use crate::app::App;
use crate::feed::FeedStatus;
use crate::util::{strip_control_chars, truncate_to_width, wrap_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::render::spinner;

/// Render the quote cards plus a one-line footer with the pagination state.
///
/// Also records which card is the last one on screen so the event loop can
/// tell whether the sentinel (the final card) is visible.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let (list_area, footer_area) = (chunks[0], chunks[1]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Quotes ({}) ", app.feed.quotes().len()));
    let inner = block.inner(list_area);

    if app.feed.quotes().is_empty() {
        let msg = if app.feed.is_loading() {
            format!("{} Loading quotes...", spinner(app))
        } else {
            match app.feed.status() {
                FeedStatus::Failed { .. } => "Could not load quotes. Press r to retry.".to_string(),
                _ => "No quotes yet. Press n to create one.".to_string(),
            }
        };
        f.render_widget(Paragraph::new(msg).block(block), list_area);
        app.last_visible = None;
        render_footer(f, app, footer_area);
        return;
    }

    let width = inner.width.saturating_sub(2) as usize;
    let cards: Vec<Text<'static>> = app
        .feed
        .quotes()
        .iter()
        .map(|q| card(q, width))
        .collect();
    let heights: Vec<usize> = cards.iter().map(|c| c.lines.len()).collect();

    let items: Vec<ListItem> = cards.into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▌ ");

    app.list_state.select(Some(app.selected));
    f.render_stateful_widget(list, list_area, &mut app.list_state);

    app.last_visible = last_visible(&heights, app.list_state.offset(), inner.height as usize);
    render_footer(f, app, footer_area);
}

/// Index of the last card with at least one row inside the viewport.
pub(super) fn last_visible(heights: &[usize], offset: usize, viewport: usize) -> Option<usize> {
    let mut used = 0;
    let mut last = None;
    for (i, h) in heights.iter().enumerate().skip(offset) {
        if used >= viewport {
            break;
        }
        last = Some(i);
        used += h;
    }
    last
}

/// One quote card: caption, author line, image link, separator.
fn card(quote: &Quote, width: usize) -> Text<'static> {
    let width = width.max(10);
    let caption = strip_control_chars(&quote.text);
    let mut lines: Vec<Line<'static>> = wrap_to_width(&caption, width)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().add_modifier(Modifier::BOLD))))
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no text)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let author = strip_control_chars(quote.author()).into_owned();
    let date = quote.created_date();
    let byline = if date.is_empty() {
        format!("- {author}")
    } else {
        format!("- {author} · {date}")
    };
    lines.push(Line::from(Span::styled(
        truncate_to_width(&byline, width).into_owned(),
        Style::default().fg(Color::Yellow),
    )));

    let media = match quote.media_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => Span::styled(
            truncate_to_width(&strip_control_chars(url), width).into_owned(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        ),
        None => Span::styled("(no image)", Style::default().fg(Color::DarkGray)),
    };
    lines.push(Line::from(media));
    lines.push(Line::from(""));

    Text::from(lines)
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.feed.is_loading() {
        (
            format!("{} Loading more quotes...", spinner(app)),
            Style::default().fg(Color::Cyan),
        )
    } else {
        match app.feed.status() {
            FeedStatus::HasMore => (String::new(), Style::default()),
            FeedStatus::Exhausted => (
                "No more quotes".to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            FeedStatus::Failed { error } => (
                format!("Failed to load quotes ({error}). Press r to retry."),
                Style::default().fg(Color::Red),
            ),
        }
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_visible_counts_partial_cards() {
        // Cards of 4 rows, 10-row viewport: cards 0, 1 full, card 2 partial.
        assert_eq!(last_visible(&[4, 4, 4, 4], 0, 10), Some(2));
    }

    #[test]
    fn test_last_visible_with_offset() {
        assert_eq!(last_visible(&[4, 4, 4, 4], 2, 10), Some(3));
    }

    #[test]
    fn test_last_visible_empty_viewport() {
        assert_eq!(last_visible(&[4, 4], 0, 0), None);
        assert_eq!(last_visible(&[], 0, 10), None);
    }

    #[test]
    fn test_card_layout() {
        let quote = Quote {
            id: "1".to_string(),
            text: "Be yourself; everyone else is already taken.".to_string(),
            media_url: Some("https://cdn.example.com/a.png".to_string()),
            username: Some("oscar".to_string()),
            created_at: Some("2024-03-05T10:00:00Z".to_string()),
        };
        let text = card(&quote, 20);
        let rendered: Vec<String> = text
            .lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();

        assert!(rendered.len() >= 5);
        assert!(rendered.contains(&"- oscar · 2024-03-05".to_string()));
        assert_eq!(rendered.last().map(String::as_str), Some(""));
    }

    #[test]
    fn test_card_strips_escape_sequences() {
        let quote = Quote {
            id: "1".to_string(),
            text: "\x1b[2Jhello".to_string(),
            media_url: None,
            username: None,
            created_at: None,
        };
        let text = card(&quote, 40);
        let first: String = text.lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "hello");
        let byline: String = text.lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(byline, "- Unknown");
    }
}
