// Category bar widget: the category selector as a row of tabs.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = if state.snapshot.categories.is_empty() {
        Line::from(Span::styled(
            "No categories",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(category_spans(
            &state.snapshot.categories,
            state.snapshot.category.as_deref(),
        ))
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Category (←/→)"),
    );
    frame.render_widget(paragraph, area);
}

/// One span per category, the active one highlighted, separated by spaces.
pub fn category_spans(categories: &[String], active: Option<&str>) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(categories.len() * 2);
    for category in categories {
        let style = if Some(category.as_str()) == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {category} "), style));
        spans.push(Span::raw(" "));
    }
    spans
}
