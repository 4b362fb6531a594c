// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app loop, or into local ViewState mutations (focus, cursors, chat input).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::protocol::UserCommand;

use super::{Focus, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app loop. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // On Windows crossterm also emits Release events.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.focus == Focus::ChatInput {
        return handle_chat_input(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Char('q') => Some(UserCommand::Quit),

        // Category selection
        KeyCode::Right | KeyCode::Char('c') => step_category(view_state, true),
        KeyCode::Left => step_category(view_state, false),

        // Focus
        KeyCode::Tab | KeyCode::BackTab => {
            view_state.focus = match view_state.focus {
                Focus::Grid => Focus::Selected,
                _ => Focus::Grid,
            };
            None
        }
        KeyCode::Char('i') => {
            view_state.focus = Focus::ChatInput;
            None
        }

        // Cursor movement in the focused list
        KeyCode::Up | KeyCode::Char('k') => {
            move_cursor(view_state, false);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_cursor(view_state, true);
            None
        }

        // Selection
        KeyCode::Enter | KeyCode::Char(' ') if view_state.focus == Focus::Grid => view_state
            .snapshot
            .cards
            .get(view_state.grid_cursor)
            .map(|card| UserCommand::ToggleCard(card.key.clone())),
        KeyCode::Char('d') | KeyCode::Delete if view_state.focus == Focus::Selected => view_state
            .snapshot
            .selected
            .rows()
            .get(view_state.selected_cursor)
            .map(|row| UserCommand::RemoveSelected(row.remove.clone())),
        KeyCode::Char('x') => Some(UserCommand::ClearSelection),

        KeyCode::Char('g') => Some(UserCommand::GenerateRoutine),

        _ => None,
    }
}

fn handle_chat_input(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Enter => {
            let text = std::mem::take(&mut view_state.chat_input);
            Some(UserCommand::SubmitChat(text))
        }
        KeyCode::Esc => {
            view_state.focus = Focus::Grid;
            None
        }
        KeyCode::Backspace => {
            view_state.chat_input.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.chat_input.push(c);
            None
        }
        _ => None,
    }
}

/// Move to the next (or previous) category, wrapping around. With no
/// category chosen yet, forward picks the first and back picks the last.
fn step_category(view_state: &ViewState, forward: bool) -> Option<UserCommand> {
    let categories = &view_state.snapshot.categories;
    if categories.is_empty() {
        return None;
    }
    let current = view_state
        .snapshot
        .category
        .as_ref()
        .and_then(|c| categories.iter().position(|x| x == c));
    let len = categories.len();
    let next = match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    };
    Some(UserCommand::SelectCategory(categories[next].clone()))
}

fn move_cursor(view_state: &mut ViewState, down: bool) {
    let (cursor, len) = match view_state.focus {
        Focus::Grid => (&mut view_state.grid_cursor, view_state.snapshot.cards.len()),
        Focus::Selected => (
            &mut view_state.selected_cursor,
            view_state.snapshot.selected.rows().len(),
        ),
        Focus::ChatInput => return,
    };
    if down {
        if *cursor + 1 < len {
            *cursor += 1;
        }
    } else {
        *cursor = cursor.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductId;
    use crate::view::{ProductCard, RemoveControl, SelectedPanel, SelectedRow};
    use crossterm::event::KeyEventState;

    /// Helper to create a KeyEvent with no modifiers.
    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl_key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn card(key: &str) -> ProductCard {
        ProductCard {
            key: key.to_string(),
            name: format!("P{key}"),
            brand: "B".to_string(),
            description: String::new(),
            image: String::new(),
            selected: false,
        }
    }

    fn row(id: i64, generation: u64) -> SelectedRow {
        SelectedRow {
            id: ProductId(id),
            name: format!("P{id}"),
            brand: "B".to_string(),
            remove: RemoveControl {
                key: id.to_string(),
                generation,
            },
        }
    }

    fn state_with_categories() -> ViewState {
        let mut state = ViewState::default();
        state.snapshot.categories = vec!["cleanser".into(), "toner".into(), "serum".into()];
        state
    }

    // -- Quit --

    #[test]
    fn q_quits() {
        let mut state = ViewState::default();
        assert_eq!(handle_key(key(KeyCode::Char('q')), &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn ctrl_c_quits_even_in_chat_input() {
        let mut state = ViewState::default();
        state.focus = Focus::ChatInput;
        assert_eq!(
            handle_key(ctrl_key(KeyCode::Char('c')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let mut event = key(KeyCode::Char('q'));
        event.kind = KeyEventKind::Release;
        assert_eq!(handle_key(event, &mut state), None);
    }

    // -- Categories --

    #[test]
    fn right_from_no_category_selects_first() {
        let mut state = state_with_categories();
        assert_eq!(
            handle_key(key(KeyCode::Right), &mut state),
            Some(UserCommand::SelectCategory("cleanser".into()))
        );
    }

    #[test]
    fn left_from_no_category_selects_last() {
        let mut state = state_with_categories();
        assert_eq!(
            handle_key(key(KeyCode::Left), &mut state),
            Some(UserCommand::SelectCategory("serum".into()))
        );
    }

    #[test]
    fn c_cycles_and_wraps() {
        let mut state = state_with_categories();
        state.snapshot.category = Some("serum".into());
        assert_eq!(
            handle_key(key(KeyCode::Char('c')), &mut state),
            Some(UserCommand::SelectCategory("cleanser".into()))
        );
    }

    #[test]
    fn category_keys_without_categories_do_nothing() {
        let mut state = ViewState::default();
        assert_eq!(handle_key(key(KeyCode::Right), &mut state), None);
    }

    // -- Grid --

    #[test]
    fn enter_toggles_card_under_cursor() {
        let mut state = ViewState::default();
        state.snapshot.cards = vec![card("4"), card("9")];
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::ToggleCard("9".into()))
        );
        assert_eq!(
            handle_key(key(KeyCode::Char(' ')), &mut state),
            Some(UserCommand::ToggleCard("9".into()))
        );
    }

    #[test]
    fn enter_on_empty_grid_does_nothing() {
        let mut state = ViewState::default();
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), None);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut state = ViewState::default();
        state.snapshot.cards = vec![card("1"), card("2")];
        for _ in 0..5 {
            handle_key(key(KeyCode::Down), &mut state);
        }
        assert_eq!(state.grid_cursor, 1);
        for _ in 0..5 {
            handle_key(key(KeyCode::Up), &mut state);
        }
        assert_eq!(state.grid_cursor, 0);
    }

    // -- Selected panel --

    #[test]
    fn tab_switches_focus_between_lists() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, Focus::Selected);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, Focus::Grid);
    }

    #[test]
    fn d_removes_row_under_cursor_with_its_generation() {
        let mut state = ViewState::default();
        state.snapshot.selected = SelectedPanel::Rows(vec![row(1, 7), row(2, 7)]);
        state.focus = Focus::Selected;
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Char('d')), &mut state),
            Some(UserCommand::RemoveSelected(RemoveControl {
                key: "2".into(),
                generation: 7,
            }))
        );
    }

    #[test]
    fn d_in_grid_does_nothing() {
        let mut state = ViewState::default();
        state.snapshot.selected = SelectedPanel::Rows(vec![row(1, 1)]);
        assert_eq!(handle_key(key(KeyCode::Char('d')), &mut state), None);
    }

    #[test]
    fn x_clears_and_g_generates() {
        let mut state = ViewState::default();
        assert_eq!(
            handle_key(key(KeyCode::Char('x')), &mut state),
            Some(UserCommand::ClearSelection)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('g')), &mut state),
            Some(UserCommand::GenerateRoutine)
        );
    }

    // -- Chat input --

    #[test]
    fn chat_input_captures_text_and_submits() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('i')), &mut state);
        assert_eq!(state.focus, Focus::ChatInput);

        for c in "hiq".chars() {
            assert_eq!(handle_key(key(KeyCode::Char(c)), &mut state), None);
        }
        handle_key(key(KeyCode::Backspace), &mut state);
        assert_eq!(state.chat_input, "hi");

        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::SubmitChat("hi".into()))
        );
        assert!(state.chat_input.is_empty());
        assert_eq!(state.focus, Focus::ChatInput);
    }

    #[test]
    fn esc_leaves_chat_input_keeping_draft() {
        let mut state = ViewState::default();
        state.focus = Focus::ChatInput;
        state.chat_input = "draft".into();
        handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(state.focus, Focus::Grid);
        assert_eq!(state.chat_input, "draft");
    }
}
