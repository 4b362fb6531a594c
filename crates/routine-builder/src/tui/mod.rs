// Terminal front end: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the app's snapshot and chat
// transcript. The app loop pushes `UiUpdate` messages over an mpsc channel;
// the TUI applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod markdown;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{AppSnapshot, TranscriptEntry, UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Which panel receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Grid,
    Selected,
    ChatInput,
}

/// TUI-local state that mirrors the application state for rendering.
#[derive(Debug, Default)]
pub struct ViewState {
    pub snapshot: AppSnapshot,
    pub transcript: Vec<TranscriptEntry>,
    /// Partial reply text for pending requests, keyed by request id.
    pub streaming: HashMap<u64, String>,
    pub focus: Focus,
    pub grid_cursor: usize,
    pub selected_cursor: usize,
    pub chat_input: String,
}

impl ViewState {
    /// Replace the picker state, keeping cursors inside the new lists.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        self.grid_cursor = clamp_cursor(self.grid_cursor, snapshot.cards.len());
        self.selected_cursor = clamp_cursor(self.selected_cursor, snapshot.selected.rows().len());
        self.snapshot = snapshot;
    }

    /// Replace the transcript and drop partial text for requests that are
    /// no longer pending.
    pub fn apply_transcript(&mut self, entries: Vec<TranscriptEntry>) {
        self.streaming.retain(|id, _| {
            entries
                .iter()
                .any(|e| matches!(e, TranscriptEntry::Pending { request_id } if request_id == id))
        });
        self.transcript = entries;
    }
}

fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => state.apply_snapshot(*snapshot),
        UiUpdate::Transcript(entries) => state.apply_transcript(entries),
        UiUpdate::ReplyToken { request_id, text } => {
            state.streaming.entry(request_id).or_default().push_str(&text);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::category_bar::render(frame, layout.category_bar, state);
    widgets::product_grid::render(frame, layout.product_grid, state, state.focus == Focus::Grid);
    widgets::selected_panel::render(
        frame,
        layout.selected_panel,
        state,
        state.focus == Focus::Selected,
    );
    widgets::chat_window::render(frame, layout.chat_window, state);
    widgets::chat_window::render_input(
        frame,
        layout.chat_input,
        state,
        state.focus == Focus::ChatInput,
    );
    widgets::status_bar::render_help(frame, layout.help_bar, state);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // App loop has shut down.
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::from(e)),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::from(e));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
