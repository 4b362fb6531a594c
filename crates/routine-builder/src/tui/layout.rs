// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +-------------------------+------------------------+
// | Category Bar (3 rows)    | Chat Window (fill)     |
// | Product Grid (fill)      |                        |
// | Selected Panel (35%)     +------------------------+
// |                          | Chat Input (3 rows)    |
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub category_bar: Rect,
    pub product_grid: Rect,
    pub selected_panel: Rect,
    pub chat_window: Rect,
    pub chat_input: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // body
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let body = vertical[1];
    let help_bar = vertical[2];

    // Horizontal: picker (55%) | chat (45%)
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body);

    let picker = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Percentage(35),
        ])
        .split(horizontal[0]);

    let chat = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(horizontal[1]);

    AppLayout {
        status_bar,
        category_bar: picker[0],
        product_grid: picker[1],
        selected_panel: picker[2],
        chat_window: chat[0],
        chat_input: chat[1],
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 160, 50)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        let rects = [
            ("status_bar", layout.status_bar),
            ("category_bar", layout.category_bar),
            ("product_grid", layout.product_grid),
            ("selected_panel", layout.selected_panel),
            ("chat_window", layout.chat_window),
            ("chat_input", layout.chat_input),
            ("help_bar", layout.help_bar),
        ];
        for (name, rect) in rects {
            assert!(rect.width > 0, "{name} has zero width");
            assert!(rect.height > 0, "{name} has zero height");
        }
    }

    #[test]
    fn fixed_rows_have_fixed_heights() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(layout.category_bar.height, 3);
        assert_eq!(layout.chat_input.height, 3);
    }

    #[test]
    fn picker_is_left_of_chat() {
        let layout = build_layout(test_area());
        assert!(layout.product_grid.x < layout.chat_window.x);
        assert_eq!(layout.product_grid.x, layout.selected_panel.x);
        assert_eq!(layout.chat_window.x, layout.chat_input.x);
    }

    #[test]
    fn zones_span_full_width() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.width, 160);
        assert_eq!(layout.help_bar.width, 160);
        assert_eq!(
            layout.product_grid.width + layout.chat_window.width,
            160
        );
    }
}
