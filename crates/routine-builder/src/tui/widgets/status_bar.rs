// Status bar widget: selection count, current category, chat availability.
// Also renders the key help line at the bottom of the screen.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{Focus, ViewState};

/// Render the status bar into the given area.
///
/// Layout: [title] [selected count] [category] [chat indicator]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![
        Span::styled(
            " Routine Builder ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            selected_label(state.snapshot.selected_count),
            Style::default().fg(Color::White),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(
            state
                .snapshot
                .category
                .clone()
                .unwrap_or_else(|| "no category".to_string()),
            Style::default().fg(Color::White),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
    ];

    let (dot, dot_color) = chat_indicator(state.snapshot.chat_enabled);
    spans.push(Span::styled(format!("{dot} chat"), Style::default().fg(dot_color)));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Render the key help line for the focused panel.
pub fn render_help(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state.focus),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(paragraph, area);
}

pub fn selected_label(count: usize) -> String {
    match count {
        1 => "1 product selected".to_string(),
        n => format!("{n} products selected"),
    }
}

pub fn chat_indicator(enabled: bool) -> (&'static str, Color) {
    if enabled {
        ("●", Color::Green)
    } else {
        ("●", Color::Red)
    }
}

pub fn help_text(focus: Focus) -> &'static str {
    match focus {
        Focus::Grid => {
            " ←/→ category  ↑/↓ move  Enter select  Tab selected  x clear  g routine  i chat  q quit"
        }
        Focus::Selected => " ↑/↓ move  d remove  Tab grid  x clear  g routine  i chat  q quit",
        Focus::ChatInput => " Enter send  Esc back  Ctrl+C quit",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
