// Application state and orchestration logic.
//
// The central event loop that serialises user commands from the TUI and chat
// events from spawned request tasks. Owns the selection store and every view
// model, and pushes UI updates to the TUI render loop.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::chat::{ChatClient, ChatMessage, Conversation, OutboundTurn};
use crate::protocol::{AppSnapshot, ChatEvent, TranscriptEntry, UiUpdate, UserCommand};
use crate::selection::SelectionStore;
use crate::view::{CardGrid, RemoveControl, SelectedPanelBinder};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const EMPTY_ROUTINE_NOTICE: &str = "Select at least one product to generate a routine.";
pub const CHAT_DISABLED_NOTICE: &str =
    "Chat is disabled. Set [chat] endpoint in config/app.toml to enable it.";
const ROUTINE_REQUEST_LABEL: &str = "Generate a routine with my selected products.";

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub catalog: Catalog,
    pub selection: SelectionStore,
    pub grid: CardGrid,
    pub selected_panel: SelectedPanelBinder,
    pub conversation: Conversation,
    pub transcript: Vec<TranscriptEntry>,
    /// Requests awaiting a reply, with the user message each one commits.
    pub in_flight: HashMap<u64, ChatMessage>,
    pub chat_tasks: Vec<JoinHandle<()>>,
    pub next_request_id: u64,
    /// Shared with spawned request tasks.
    pub chat_client: Arc<ChatClient>,
    /// Spawned tasks report back through clones of this sender.
    pub chat_tx: mpsc::Sender<ChatEvent>,
}

impl AppState {
    pub fn new(
        catalog: Catalog,
        selection: SelectionStore,
        chat_client: ChatClient,
        chat_tx: mpsc::Sender<ChatEvent>,
    ) -> Self {
        let mut selected_panel = SelectedPanelBinder::new();
        selected_panel.refresh(&selection);

        let mut transcript = Vec::new();
        if !chat_client.is_enabled() {
            transcript.push(TranscriptEntry::Notice {
                message: CHAT_DISABLED_NOTICE.to_string(),
            });
        }

        AppState {
            catalog,
            selection,
            grid: CardGrid::new(),
            selected_panel,
            conversation: Conversation::new(),
            transcript,
            in_flight: HashMap::new(),
            chat_tasks: Vec::new(),
            next_request_id: 1,
            chat_client: Arc::new(chat_client),
            chat_tx,
        }
    }

    // -- Picker --

    pub fn select_category(&mut self, category: &str) {
        info!("Category selected: {}", category);
        self.grid.show_category(&self.catalog, category, &self.selection);
    }

    /// Toggle the card keyed `key`. Returns `true` if the selection changed.
    pub fn toggle_card(&mut self, key: &str) -> bool {
        match self.grid.click(key, &mut self.selection) {
            Some(outcome) => {
                debug!("Card {} toggled: {:?}", key, outcome);
                self.selected_panel.refresh(&self.selection);
                true
            }
            None => false,
        }
    }

    /// Handle a remove click from the selected panel. Returns `true` if the
    /// selection changed.
    pub fn remove_selected(&mut self, control: &RemoveControl) -> bool {
        let removed = self
            .selected_panel
            .click_remove(control, &mut self.selection);
        if removed {
            self.grid.sync_selection(&self.selection);
        }
        removed
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.grid.sync_selection(&self.selection);
        self.selected_panel.refresh(&self.selection);
    }

    // -- Chat --

    /// Send free-text `input`. Returns the request id, or `None` when the
    /// input is blank and nothing was sent.
    pub fn submit_chat(&mut self, input: &str) -> Option<u64> {
        let turn = self.conversation.prepare(input, self.selection.list())?;
        self.transcript.push(TranscriptEntry::User {
            text: turn.user.content.clone(),
            at: Local::now(),
        });
        Some(self.start_request(turn))
    }

    /// Ask for a routine built from the current selection. With nothing
    /// selected a notice is shown instead and `None` is returned.
    pub fn generate_routine(&mut self) -> Option<u64> {
        let Some(turn) = self.conversation.prepare_routine(self.selection.list()) else {
            info!("Routine requested with an empty selection");
            self.transcript.push(TranscriptEntry::Notice {
                message: EMPTY_ROUTINE_NOTICE.to_string(),
            });
            return None;
        };
        self.transcript.push(TranscriptEntry::User {
            text: ROUTINE_REQUEST_LABEL.to_string(),
            at: Local::now(),
        });
        Some(self.start_request(turn))
    }

    fn start_request(&mut self, turn: OutboundTurn) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        self.in_flight.insert(request_id, turn.user);
        self.transcript.push(TranscriptEntry::Pending { request_id });

        let client = Arc::clone(&self.chat_client);
        let tx = self.chat_tx.clone();
        let messages = turn.messages;
        let message_count = messages.len();

        let handle = tokio::spawn(async move {
            if let Err(e) = client.send_turn(messages, tx, request_id).await {
                warn!("Chat task {} failed: {}", request_id, e);
            }
        });

        self.chat_tasks.retain(|h| !h.is_finished());
        self.chat_tasks.push(handle);
        info!(
            "Started chat request {} ({} messages, {} in flight)",
            request_id,
            message_count,
            self.in_flight.len()
        );
        request_id
    }

    /// Fold a chat event into state. Returns the UI update to push, if any.
    /// Events for unknown requests are discarded.
    pub fn apply_chat_event(&mut self, event: ChatEvent) -> Option<UiUpdate> {
        let request_id = event.request_id();
        if !self.in_flight.contains_key(&request_id) {
            debug!("Discarding event for unknown chat request {}", request_id);
            return None;
        }

        match event {
            ChatEvent::Token { text, request_id } => Some(UiUpdate::ReplyToken { request_id, text }),
            ChatEvent::Complete {
                full_text,
                request_id,
            } => {
                let user = self.in_flight.remove(&request_id)?;
                self.conversation.commit(user, full_text.clone());
                self.resolve_pending(
                    request_id,
                    TranscriptEntry::Assistant {
                        text: full_text,
                        at: Local::now(),
                    },
                );
                info!("Chat request {} complete", request_id);
                Some(UiUpdate::Transcript(self.transcript.clone()))
            }
            ChatEvent::Error {
                message,
                request_id,
            } => {
                self.in_flight.remove(&request_id);
                warn!("Chat request {} failed: {}", request_id, message);
                self.resolve_pending(request_id, TranscriptEntry::Error { message });
                Some(UiUpdate::Transcript(self.transcript.clone()))
            }
        }
    }

    fn resolve_pending(&mut self, request_id: u64, entry: TranscriptEntry) {
        let slot = self.transcript.iter_mut().find(
            |e| matches!(e, TranscriptEntry::Pending { request_id: id } if *id == request_id),
        );
        match slot {
            Some(slot) => *slot = entry,
            None => self.transcript.push(entry),
        }
    }

    /// Abort every outstanding request task.
    pub fn cancel_chat_tasks(&mut self) {
        let count = self.chat_tasks.len();
        for handle in self.chat_tasks.drain(..) {
            handle.abort();
        }
        if count > 0 {
            info!("Cancelled {} chat tasks", count);
        }
    }

    // -- Snapshot --

    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            categories: self.catalog.categories(),
            category: self.grid.category().map(str::to_string),
            grid_placeholder: self.grid.placeholder(),
            cards: self.grid.cards().to_vec(),
            selected: self.selected_panel.panel().clone(),
            selected_count: self.selection.len(),
            chat_enabled: self.chat_client.is_enabled(),
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. Chat events from request tasks
/// 2. User commands from the TUI
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut chat_rx: mpsc::Receiver<ChatEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let _ = ui_tx
        .send(UiUpdate::Snapshot(Box::new(state.build_snapshot())))
        .await;
    let _ = ui_tx
        .send(UiUpdate::Transcript(state.transcript.clone()))
        .await;

    let mut chat_open = true;

    loop {
        tokio::select! {
            // --- Chat events (only poll when channel is open) ---
            chat_event = chat_rx.recv(), if chat_open => {
                match chat_event {
                    Some(event) => {
                        if let Some(update) = state.apply_chat_event(event) {
                            let _ = ui_tx.send(update).await;
                        }
                    }
                    None => {
                        info!("Chat channel closed");
                        chat_open = false;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    state.cancel_chat_tasks();
    info!("Application event loop exiting");
    Ok(())
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let snapshot_changed = match cmd {
        UserCommand::SelectCategory(category) => {
            state.select_category(&category);
            true
        }
        UserCommand::ToggleCard(key) => state.toggle_card(&key),
        UserCommand::RemoveSelected(control) => state.remove_selected(&control),
        UserCommand::ClearSelection => {
            state.clear_selection();
            true
        }
        UserCommand::SubmitChat(input) => {
            if state.submit_chat(&input).is_some() {
                let _ = ui_tx
                    .send(UiUpdate::Transcript(state.transcript.clone()))
                    .await;
            }
            false
        }
        UserCommand::GenerateRoutine => {
            state.generate_routine();
            let _ = ui_tx
                .send(UiUpdate::Transcript(state.transcript.clone()))
                .await;
            false
        }
        UserCommand::Quit => false,
    };

    if snapshot_changed {
        let _ = ui_tx
            .send(UiUpdate::Snapshot(Box::new(state.build_snapshot())))
            .await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
