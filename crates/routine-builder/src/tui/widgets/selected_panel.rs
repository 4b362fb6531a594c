// Selected products panel: the current selection in insertion order.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::focused_border_style;
use crate::tui::ViewState;
use crate::view::{SelectedPanel, SelectedRow};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, focused: bool) {
    let rows = state.snapshot.selected.rows();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Selected ({})", rows.len()))
        .border_style(focused_border_style(focused, Style::default()));

    match &state.snapshot.selected {
        SelectedPanel::Placeholder(message) => {
            let paragraph = Paragraph::new(Span::styled(
                *message,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))
            .block(block);
            frame.render_widget(paragraph, area);
        }
        SelectedPanel::Rows(rows) => {
            let items: Vec<ListItem> = rows.iter().map(row_item).collect();
            let list = List::new(items).block(block).highlight_style(if focused {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            });
            let mut list_state = ListState::default();
            list_state.select(Some(state.selected_cursor));
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

fn row_item(row: &SelectedRow) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(
            row.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", row.brand), Style::default().fg(Color::Gray)),
        Span::styled("  [d] remove", Style::default().fg(Color::Red)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductId;
    use crate::view::{RemoveControl, NO_SELECTION_MESSAGE};

    fn row(id: i64, name: &str) -> SelectedRow {
        SelectedRow {
            id: ProductId(id),
            name: name.to_string(),
            brand: "Brand".to_string(),
            remove: RemoveControl {
                key: id.to_string(),
                generation: 1,
            },
        }
    }

    fn screen_text(state: &ViewState) -> String {
        let backend = ratatui::backend::TestBackend::new(50, 6);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state, false))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..6u16)
            .map(|y| (0..50u16).map(|x| buffer[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn placeholder_when_nothing_selected() {
        let mut state = ViewState::default();
        state.snapshot.selected = SelectedPanel::Placeholder(NO_SELECTION_MESSAGE);
        let text = screen_text(&state);
        assert!(text.contains(NO_SELECTION_MESSAGE));
        assert!(text.contains("Selected (0)"));
    }

    #[test]
    fn rows_are_listed_in_order() {
        let mut state = ViewState::default();
        state.snapshot.selected =
            SelectedPanel::Rows(vec![row(3, "Night Cream"), row(1, "Foam Wash")]);
        let text = screen_text(&state);
        assert!(text.contains("Selected (2)"));
        let night = text.find("Night Cream").unwrap();
        let foam = text.find("Foam Wash").unwrap();
        assert!(night < foam);
    }
}
