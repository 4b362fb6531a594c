// Chat window widget: the conversation transcript and the message input.
//
// Assistant replies go through the markdown renderer. A pending request
// shows its streamed text so far, or a thinking indicator before the first
// token. The view stays pinned to the newest message.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::focused_border_style;
use crate::protocol::TranscriptEntry;
use crate::tui::markdown::reply_lines;
use crate::tui::ViewState;

pub const THINKING_TEXT: &str = "Thinking...";
const WELCOME_TEXT: &str =
    "Ask about skincare, or press g to build a routine from your selection.";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let lines = transcript_lines(state);

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2) as usize;
    let rows = wrapped_rows(&lines, inner_width);
    let scroll = rows.saturating_sub(inner_height) as u16;

    let border = if state.snapshot.chat_enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Chat")
                .border_style(border),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Render the single-line message input. The cursor is placed after the
/// typed text while the input has focus.
pub fn render_input(frame: &mut Frame, area: Rect, state: &ViewState, focused: bool) {
    let content = if state.chat_input.is_empty() && !focused {
        Line::from(Span::styled(
            "Press i to type a message",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(state.chat_input.clone())
    };

    // Keep the tail of long input visible.
    let inner_width = area.width.saturating_sub(2) as usize;
    let typed = state.chat_input.chars().count();
    let offset = if focused {
        (typed + 1).saturating_sub(inner_width)
    } else {
        0
    };

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Message")
                .border_style(focused_border_style(focused, Style::default())),
        )
        .scroll((0, offset as u16));
    frame.render_widget(paragraph, area);

    if focused && area.width > 2 && area.height > 2 {
        let x = area.x + 1 + (typed - offset) as u16;
        frame.set_cursor_position((x.min(area.x + area.width - 2), area.y + 1));
    }
}

/// Build display lines for the whole transcript.
pub fn transcript_lines(state: &ViewState) -> Vec<Line<'static>> {
    if state.transcript.is_empty() {
        return vec![Line::from(Span::styled(
            WELCOME_TEXT,
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let mut lines = Vec::new();
    for (i, entry) in state.transcript.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        match entry {
            TranscriptEntry::User { text, at } => {
                lines.push(header("You", Color::Cyan, Some(at.format("%H:%M").to_string())));
                lines.extend(text.lines().map(|l| Line::from(l.to_string())));
            }
            TranscriptEntry::Assistant { text, at } => {
                lines.push(header(
                    "Assistant",
                    Color::Magenta,
                    Some(at.format("%H:%M").to_string()),
                ));
                lines.extend(reply_lines(text));
            }
            TranscriptEntry::Pending { request_id } => {
                lines.push(header("Assistant", Color::Magenta, None));
                match state.streaming.get(request_id) {
                    Some(partial) if !partial.is_empty() => lines.extend(reply_lines(partial)),
                    _ => lines.push(Line::from(Span::styled(
                        THINKING_TEXT,
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::ITALIC),
                    ))),
                }
            }
            TranscriptEntry::Error { message } => {
                lines.push(Line::from(Span::styled(
                    format!("Error: {message}"),
                    Style::default().fg(Color::Red),
                )));
            }
            TranscriptEntry::Notice { message } => {
                lines.push(Line::from(Span::styled(
                    message.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }
    lines
}

fn header(who: &'static str, color: Color, time: Option<String>) -> Line<'static> {
    let mut spans = vec![Span::styled(
        who,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(time) = time {
        spans.push(Span::styled(
            format!("  {time}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

/// Rows the lines occupy once wrapped to `width` columns.
fn wrapped_rows(lines: &[Line], width: u16) -> usize {
    if width == 0 {
        return 0;
    }
    let width = width as usize;
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
