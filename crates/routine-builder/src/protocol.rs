// Messages exchanged between the chat tasks, the app loop and the terminal
// front end.

use chrono::{DateTime, Local};

use crate::view::{ProductCard, RemoveControl, SelectedPanel};

// ---------------------------------------------------------------------------
// Chat task -> app loop
// ---------------------------------------------------------------------------

/// Progress of one chat request. `request_id` ties every event to the
/// submission that started it.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Token { text: String, request_id: u64 },
    Complete { full_text: String, request_id: u64 },
    Error { message: String, request_id: u64 },
}

impl ChatEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            ChatEvent::Token { request_id, .. }
            | ChatEvent::Complete { request_id, .. }
            | ChatEvent::Error { request_id, .. } => *request_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Front end -> app loop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    SelectCategory(String),
    /// Card click, keyed by the card's lookup key.
    ToggleCard(String),
    RemoveSelected(RemoveControl),
    ClearSelection,
    SubmitChat(String),
    GenerateRoutine,
    Quit,
}

// ---------------------------------------------------------------------------
// App loop -> front end
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// Full picker state after a selection or category change.
    Snapshot(Box<AppSnapshot>),
    /// The chat transcript after it changed.
    Transcript(Vec<TranscriptEntry>),
    /// A streamed fragment of a pending reply.
    ReplyToken { request_id: u64, text: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppSnapshot {
    pub categories: Vec<String>,
    pub category: Option<String>,
    pub grid_placeholder: Option<&'static str>,
    pub cards: Vec<ProductCard>,
    pub selected: SelectedPanel,
    pub selected_count: usize,
    pub chat_enabled: bool,
}

/// One line item of the chat window.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    User { text: String, at: DateTime<Local> },
    Assistant { text: String, at: DateTime<Local> },
    /// A request still waiting for its reply.
    Pending { request_id: u64 },
    Error { message: String },
    Notice { message: String },
}
