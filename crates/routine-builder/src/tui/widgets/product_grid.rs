// Product grid widget: the cards of the current category.
//
// Each card shows a selection marker, name and brand, with the description
// dimmed on a second line. Selected cards are drawn in green. The card
// under the cursor is highlighted when the grid has focus.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::focused_border_style;
use crate::tui::ViewState;
use crate::view::ProductCard;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, focused: bool) {
    let title = match &state.snapshot.category {
        Some(category) => format!("Products: {category}"),
        None => "Products".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(focused_border_style(focused, Style::default()));

    if let Some(message) = state.snapshot.grid_placeholder {
        let paragraph = Paragraph::new(Span::styled(
            message,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = state.snapshot.cards.iter().map(card_item).collect();
    let list = List::new(items).block(block).highlight_style(if focused {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    });

    let mut list_state = ListState::default();
    if !state.snapshot.cards.is_empty() {
        list_state.select(Some(state.grid_cursor));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn card_item(card: &ProductCard) -> ListItem<'static> {
    let (marker, style) = if card.selected {
        (
            "[x] ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        ("[ ] ", Style::default().fg(Color::White))
    };
    let headline = Line::from(vec![
        Span::styled(marker, style),
        Span::styled(card.name.clone(), style),
        Span::styled(
            format!("  {}", card.brand),
            Style::default().fg(Color::Gray),
        ),
    ]);
    let description = Line::from(Span::styled(
        format!("    {}", card.description),
        Style::default().fg(Color::DarkGray),
    ));
    ListItem::new(Text::from(vec![headline, description]))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{CHOOSE_CATEGORY_MESSAGE, EMPTY_CATEGORY_MESSAGE};

    fn card(key: &str, name: &str, selected: bool) -> ProductCard {
        ProductCard {
            key: key.to_string(),
            name: name.to_string(),
            brand: "Brand".to_string(),
            description: "Gentle and fragrance free.".to_string(),
            image: String::new(),
            selected,
        }
    }

    fn screen_text(state: &ViewState, width: u16, height: u16) -> String {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state, true))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn placeholder_is_shown_before_a_category_is_chosen() {
        let mut state = ViewState::default();
        state.snapshot.grid_placeholder = Some(CHOOSE_CATEGORY_MESSAGE);
        let text = screen_text(&state, 60, 5);
        assert!(text.contains("Select a category"));
    }

    #[test]
    fn empty_category_message_is_shown() {
        let mut state = ViewState::default();
        state.snapshot.category = Some("mask".into());
        state.snapshot.grid_placeholder = Some(EMPTY_CATEGORY_MESSAGE);
        let text = screen_text(&state, 60, 5);
        assert!(text.contains("No products in this category"));
        assert!(text.contains("Products: mask"));
    }

    #[test]
    fn cards_show_selection_markers() {
        let mut state = ViewState::default();
        state.snapshot.cards = vec![card("1", "Foam Wash", true), card("2", "Clay Mask", false)];
        let text = screen_text(&state, 60, 8);
        assert!(text.contains("[x] Foam Wash"));
        assert!(text.contains("[ ] Clay Mask"));
    }

    #[test]
    fn card_items_span_two_lines() {
        let item = card_item(&card("1", "Foam Wash", true));
        assert_eq!(item.height(), 2);
        let unselected = card_item(&card("2", "Clay Mask", false));
        assert_eq!(unselected.height(), 2);
    }

    #[test]
    fn render_does_not_panic_with_cursor_past_end() {
        let mut state = ViewState::default();
        state.snapshot.cards = vec![card("1", "Foam Wash", false)];
        state.grid_cursor = 4;
        screen_text(&state, 30, 4);
    }
}
