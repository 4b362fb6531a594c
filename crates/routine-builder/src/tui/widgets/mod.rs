// TUI widget modules for each screen panel.

pub mod category_bar;
pub mod chat_window;
pub mod product_grid;
pub mod selected_panel;
pub mod status_bar;

use ratatui::style::{Color, Modifier, Style};

/// Highlight a panel border when it holds keyboard focus, otherwise keep
/// the panel's own border style.
pub fn focused_border_style(focused: bool, base: Style) -> Style {
    if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        base
    }
}
